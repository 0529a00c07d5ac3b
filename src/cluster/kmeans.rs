use super::init::InitMethod;
use crate::distance::{argmin_rows, cross_distance, pairwise_distance};
use crate::error::{KMeansError, Result};
use crate::metrics::euclidean_distortion;
use crate::{Labels, Matrix};
use log::{debug, info, warn};
use ndarray::{Array1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// K-means clustering with multi-restart seed selection and Lloyd refinement.
///
/// `fit` seeds `n_restarts` candidate centroid sets, keeps the one whose
/// nearest-centroid assignment has the lowest distortion, then refines it
/// until the centroids stop moving or `max_iter` is reached.
///
/// Not thread-safe: a `fit` must not overlap another `fit` or `predict` on the
/// same instance.
#[derive(Clone, Debug)]
pub struct KMeans {
    pub cluster_centers: Option<Matrix>,
    pub labels: Option<Labels>,
    pub inertia: Option<f64>,
    pub n_iter: Option<usize>,
    n_clusters: usize,
    max_iter: usize,
    n_restarts: usize,
    tolerance: f64,
    random_state: Option<u64>,
    init: InitMethod,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        if n_clusters == 0 {
            panic!("n_clusters must be > 0, got {}", n_clusters);
        }

        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            n_iter: None,
            n_clusters,
            max_iter: 500,
            n_restarts: 15,
            tolerance: 0.0,
            random_state: None,
            init: InitMethod::FurthestPoint,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        if max_iter == 0 {
            panic!("max_iter must be > 0, got {}", max_iter);
        }
        self.max_iter = max_iter;
        self
    }

    /// Number of seedings compared before refinement.
    pub fn n_restarts(mut self, n_restarts: usize) -> Self {
        if n_restarts == 0 {
            panic!("n_restarts must be > 0, got {}", n_restarts);
        }
        self.n_restarts = n_restarts;
        self
    }

    /// Largest centroid shift still treated as converged. The default of 0.0
    /// stops only when an update leaves every coordinate unchanged.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        if tolerance.is_nan() || tolerance < 0.0 {
            panic!("tolerance must be >= 0, got {}", tolerance);
        }
        self.tolerance = tolerance;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Fits using a ChaCha generator seeded from `random_state`, or from
    /// entropy when no seed was set.
    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.fit_with_rng(x, &mut rng)
    }

    /// Fits drawing every random choice from `rng`.
    pub fn fit_with_rng<R: Rng>(&mut self, x: &Matrix, rng: &mut R) -> Result<()> {
        self.validate(x)?;

        let (mut centroids, seed_distortion) = self.select_seed(x, rng)?;
        debug!(
            "selected seed with distortion {:.6} out of {} restarts",
            seed_distortion, self.n_restarts
        );

        let mut n_iter = 0;
        let mut converged = false;
        for iteration in 0..self.max_iter {
            n_iter = iteration + 1;

            let labels = assign(&x.view(), &centroids)?;
            let new_centroids = self.update_centroids(x, &labels, &centroids);
            check_finite(&new_centroids, "centroid update overflowed")?;

            if new_centroids == centroids {
                converged = true;
                break;
            }

            let shift = max_centroid_shift(&centroids, &new_centroids);
            centroids = new_centroids;

            if self.tolerance > 0.0 && shift <= self.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            info!("k-means converged after {} iterations", n_iter);
        } else {
            info!("k-means stopped at max_iter={} without converging", self.max_iter);
        }

        let labels = assign(&x.view(), &centroids)?;
        let inertia = euclidean_distortion(x, &labels)?;
        if !inertia.is_finite() {
            return Err(KMeansError::InvalidData(
                "distortion overflowed; rescale the input".to_string(),
            ));
        }

        self.cluster_centers = Some(centroids);
        self.labels = Some(labels);
        self.inertia = Some(inertia);
        self.n_iter = Some(n_iter);

        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> Result<Labels> {
        let centroids = self.fitted_centroids(x)?;
        check_finite(x, "input contains NaN or infinite values")?;
        assign(&x.view(), centroids)
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Labels> {
        self.fit(x)?;
        self.labels.clone().ok_or(KMeansError::NotFitted)
    }

    /// Distance from every sample to every centroid, shape (n_samples, k).
    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        let centroids = self.fitted_centroids(x)?;
        cross_distance(&x.view(), Some(&centroids.view()))
    }

    /// Negative distortion of the predicted assignment; higher is better.
    pub fn score(&self, x: &Matrix) -> Result<f64> {
        let labels = self.predict(x)?;
        Ok(-euclidean_distortion(x, &labels)?)
    }

    pub fn get_centroids(&self) -> Result<&Matrix> {
        self.cluster_centers.as_ref().ok_or(KMeansError::NotFitted)
    }

    fn fitted_centroids(&self, x: &Matrix) -> Result<&Matrix> {
        let centroids = self.get_centroids()?;

        if x.ncols() != centroids.ncols() {
            return Err(KMeansError::InvalidDimensions(format!(
                "Number of features in X ({}) doesn't match training data ({})",
                x.ncols(),
                centroids.ncols()
            )));
        }

        Ok(centroids)
    }

    fn validate(&self, x: &Matrix) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(KMeansError::EmptyInput);
        }

        if x.nrows() < self.n_clusters {
            return Err(KMeansError::InsufficientData(format!(
                "n_samples={} should be >= n_clusters={}",
                x.nrows(),
                self.n_clusters
            )));
        }

        check_finite(x, "input contains NaN or infinite values")
    }

    /// Seeds `n_restarts` candidates and returns the one whose unrefined
    /// assignment has the lowest distortion, with that distortion. Ties keep
    /// the earliest candidate.
    fn select_seed<R: Rng>(&self, x: &Matrix, rng: &mut R) -> Result<(Matrix, f64)> {
        let mut best: Option<(Matrix, f64)> = None;

        for restart in 0..self.n_restarts {
            let candidate = self.init.seed(&x.view(), self.n_clusters, rng)?;
            let labels = assign(&x.view(), &candidate)?;
            let distortion = euclidean_distortion(x, &labels)?;
            debug!("restart {}: distortion {:.6}", restart, distortion);

            let improves = match &best {
                Some((_, best_distortion)) => distortion < *best_distortion,
                None => true,
            };
            if improves {
                best = Some((candidate, distortion));
            }
        }

        best.ok_or_else(|| KMeansError::InvalidK("no restarts were run".to_string()))
    }

    /// Mean of the members of each cluster. A cluster left without members
    /// keeps its previous centroid.
    fn update_centroids(&self, x: &Matrix, labels: &Labels, previous: &Matrix) -> Matrix {
        let mut sums = Matrix::zeros((self.n_clusters, x.ncols()));
        let mut counts: Array1<usize> = Array1::zeros(self.n_clusters);

        for (row, &label) in x.outer_iter().zip(labels.iter()) {
            let mut sum = sums.row_mut(label);
            sum += &row;
            counts[label] += 1;
        }

        let mut centroids = previous.clone();
        for k in 0..self.n_clusters {
            if counts[k] == 0 {
                warn!("cluster {} has no members; keeping its previous centroid", k);
                continue;
            }
            centroids
                .row_mut(k)
                .assign(&sums.row(k).mapv(|v| v / counts[k] as f64));
        }

        centroids
    }
}

/// Nearest-centroid index for every row of `x`.
fn assign(x: &ArrayView2<f64>, centroids: &Matrix) -> Result<Labels> {
    let distances = cross_distance(x, Some(&centroids.view()))?;
    Ok(argmin_rows(&distances.view()))
}

fn check_finite(values: &Matrix, context: &str) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(KMeansError::InvalidData(context.to_string()));
    }
    Ok(())
}

fn max_centroid_shift(old_centroids: &Matrix, new_centroids: &Matrix) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old, new)| pairwise_distance(&old, &new))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::collections::HashSet;

    fn two_blobs() -> Matrix {
        array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]]
    }

    #[test]
    fn test_kmeans_basic() {
        let x = array![
            [1.0, 1.0],
            [1.5, 2.0],
            [3.0, 4.0],
            [5.0, 7.0],
            [3.5, 5.0],
            [4.5, 5.0],
            [3.5, 4.5]
        ];

        let mut kmeans = KMeans::new(2).random_state(0);
        let labels = kmeans.fit_predict(&x).unwrap();

        assert_eq!(labels.len(), x.nrows());
        assert!(kmeans.cluster_centers.is_some());
        assert!(kmeans.inertia.is_some());
        assert!(kmeans.n_iter.unwrap() >= 1);

        let unique_labels: HashSet<usize> = labels.iter().copied().collect();
        assert_eq!(unique_labels.len(), 2);
    }

    #[test]
    fn test_two_blob_centroids() {
        let x = two_blobs();
        let mut kmeans = KMeans::new(2).random_state(1);
        kmeans.fit(&x).unwrap();

        let mut centers: Vec<(f64, f64)> = kmeans
            .get_centroids()
            .unwrap()
            .outer_iter()
            .map(|c| (c[0], c[1]))
            .collect();
        centers.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        assert_relative_eq!(centers[0].0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(centers[0].1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(centers[1].0, 10.0, epsilon = 1e-12);
        assert_relative_eq!(centers[1].1, 10.5, epsilon = 1e-12);
        assert_relative_eq!(kmeans.inertia.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kmeans_predict() {
        let x_train = array![[0.0, 0.0], [1.0, 1.0], [10.0, 10.0], [11.0, 11.0]];
        let x_test = array![[0.5, 0.5], [10.5, 10.5], [0.0, 0.2]];

        let mut kmeans = KMeans::new(2).random_state(2);
        kmeans.fit(&x_train).unwrap();

        let train_labels = kmeans.predict(&x_train).unwrap();
        let labels = kmeans.predict(&x_test).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], train_labels[0]);
        assert_eq!(labels[1], train_labels[2]);
        assert_eq!(labels[2], train_labels[0]);

        assert_eq!(kmeans.predict(&x_test).unwrap(), labels);
    }

    #[test]
    fn test_kmeans_transform() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [10.0, 10.0]];

        let mut kmeans = KMeans::new(2).random_state(3);
        kmeans.fit(&x).unwrap();

        let distances = kmeans.transform(&x).unwrap();
        assert_eq!(distances.shape(), &[3, 2]);
        for distance in distances.iter() {
            assert!(*distance >= 0.0);
        }
    }

    #[test]
    fn test_kmeans_invalid_clusters() {
        std::panic::catch_unwind(|| {
            KMeans::new(0);
        })
        .expect_err("Should panic on zero clusters");
    }

    #[test]
    fn test_kmeans_insufficient_samples() {
        let x = array![[1.0, 2.0]];
        let mut kmeans = KMeans::new(2);

        assert!(matches!(kmeans.fit(&x), Err(KMeansError::InsufficientData(_))));
        assert!(kmeans.cluster_centers.is_none());
    }

    #[test]
    fn test_kmeans_rejects_non_finite() {
        let x = array![[1.0, 2.0], [f64::NAN, 0.0]];
        let mut kmeans = KMeans::new(1);
        assert!(matches!(kmeans.fit(&x), Err(KMeansError::InvalidData(_))));
    }

    #[test]
    fn test_kmeans_predict_without_fit() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let kmeans = KMeans::new(2);

        assert_eq!(kmeans.predict(&x), Err(KMeansError::NotFitted));
        assert!(kmeans.get_centroids().is_err());
    }

    #[test]
    fn test_kmeans_dimension_mismatch() {
        let x_train = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let x_test = array![[1.0, 2.0], [3.0, 4.0]];

        let mut kmeans = KMeans::new(2).random_state(4);
        kmeans.fit(&x_train).unwrap();

        assert!(matches!(
            kmeans.predict(&x_test),
            Err(KMeansError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_single_cluster() {
        let x = array![[1.0], [2.0], [3.0], [6.0]];
        let mut kmeans = KMeans::new(1).random_state(5);
        let labels = kmeans.fit_predict(&x).unwrap();

        assert!(labels.iter().all(|&l| l == 0));
        assert_relative_eq!(kmeans.get_centroids().unwrap()[[0, 0]], 3.0, epsilon = 1e-12);
        assert_relative_eq!(kmeans.inertia.unwrap(), 14.0, epsilon = 1e-12);
    }

    #[test]
    fn test_k_equals_m() {
        let x = array![[0.0, 3.0], [1.0, -2.0], [7.0, 7.0], [2.5, 0.0]];
        let mut kmeans = KMeans::new(4).random_state(6);
        let labels = kmeans.fit_predict(&x).unwrap();

        let unique_labels: HashSet<usize> = labels.iter().copied().collect();
        assert_eq!(unique_labels.len(), 4);
        assert_eq!(kmeans.inertia.unwrap(), 0.0);
    }

    #[test]
    fn test_refinement_never_worse_than_seed() {
        let x = array![
            [0.0, 0.0], [0.4, 0.1], [1.0, 0.3], [2.0, 2.2], [2.1, 1.9],
            [5.0, 5.0], [5.5, 4.8], [6.0, 5.2], [9.0, 0.5], [8.5, 1.0],
            [3.0, 3.5], [7.0, 2.0]
        ];
        let kmeans = KMeans::new(3).n_restarts(5);

        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let (_, seed_distortion) = kmeans.select_seed(&x, &mut rng).unwrap();

        let mut fitted = kmeans.clone();
        fitted
            .fit_with_rng(&x, &mut ChaCha8Rng::seed_from_u64(21))
            .unwrap();

        assert!(fitted.inertia.unwrap() <= seed_distortion + 1e-12);
    }

    #[test]
    fn test_empty_cluster_keeps_previous_centroid() {
        let x = array![[0.0], [1.0], [2.0]];
        let kmeans = KMeans::new(2);
        let previous = array![[1.0], [100.0]];
        let labels = array![0, 0, 0];

        let updated = kmeans.update_centroids(&x, &labels, &previous);
        assert_eq!(updated, array![[1.0], [100.0]]);
    }

    #[test]
    fn test_max_iter_caps_refinement() {
        let x = array![
            [0.0, 0.0], [0.4, 0.1], [1.0, 0.3], [2.0, 2.2], [2.1, 1.9],
            [5.0, 5.0], [5.5, 4.8], [6.0, 5.2], [9.0, 0.5], [8.5, 1.0]
        ];
        let mut kmeans = KMeans::new(3).max_iter(1).random_state(8);
        kmeans.fit(&x).unwrap();

        assert_eq!(kmeans.n_iter, Some(1));
        assert_eq!(kmeans.labels.as_ref().unwrap().len(), x.nrows());
    }

    #[test]
    fn test_seeded_fits_are_reproducible() {
        let x = array![[0.0, 1.0], [3.0, 1.0], [4.0, 4.0], [9.0, 2.0], [8.0, 8.0], [1.0, 7.0]];

        let mut a = KMeans::new(3).random_state(99).init(InitMethod::Random);
        let mut b = KMeans::new(3).random_state(99).init(InitMethod::Random);
        a.fit(&x).unwrap();
        b.fit(&x).unwrap();

        assert_eq!(a.cluster_centers, b.cluster_centers);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn test_predict_rejects_non_finite() {
        let mut kmeans = KMeans::new(2).random_state(12);
        kmeans.fit(&two_blobs()).unwrap();

        let x = array![[0.0, 0.5], [f64::NAN, 10.0]];
        assert!(matches!(kmeans.predict(&x), Err(KMeansError::InvalidData(_))));
    }

    #[test]
    fn test_overflowing_input_is_rejected() {
        let x = array![[1e308, 0.0], [-1e308, 0.0], [1e308, 1.0], [-1e308, 1.0]];
        let mut kmeans = KMeans::new(2).random_state(13);

        assert!(matches!(kmeans.fit(&x), Err(KMeansError::InvalidData(_))));
        assert!(kmeans.cluster_centers.is_none());
    }

    #[test]
    fn test_converges_on_exact_equality() {
        let mut kmeans = KMeans::new(2).random_state(14);
        kmeans.fit(&two_blobs()).unwrap();

        // Seeds are data points; one update moves them to the means, the next
        // leaves them unchanged.
        assert_eq!(kmeans.n_iter, Some(2));
        assert!(kmeans.n_iter.unwrap() < 500);
    }

    #[test]
    fn test_tolerance_stops_early() {
        let mut kmeans = KMeans::new(2).tolerance(100.0).random_state(14);
        kmeans.fit(&two_blobs()).unwrap();

        assert_eq!(kmeans.n_iter, Some(1));
        assert_eq!(kmeans.labels.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_tiny_shift_is_not_convergence() {
        // Squared coordinate differences underflow to zero here, so only the
        // equality check can end the loop.
        let x = array![[0.0], [3e-170]];
        let mut kmeans = KMeans::new(2).random_state(15);
        kmeans.fit(&x).unwrap();

        assert_eq!(kmeans.n_iter, Some(2));
    }

    #[test]
    fn test_restart_ties_keep_first_candidate() {
        // With k equal to the sample count every candidate has distortion 0,
        // but candidates differ in row order depending on the first draw.
        let x = array![[0.0], [1.0], [5.0]];
        let kmeans = KMeans::new(3).n_restarts(15);

        let mut replay = ChaCha8Rng::seed_from_u64(16);
        let candidates: Vec<Matrix> = (0..15)
            .map(|_| InitMethod::FurthestPoint.seed(&x.view(), 3, &mut replay).unwrap())
            .collect();
        assert!(candidates.iter().any(|c| c != &candidates[0]));

        let (chosen, distortion) = kmeans
            .select_seed(&x, &mut ChaCha8Rng::seed_from_u64(16))
            .unwrap();
        assert_eq!(distortion, 0.0);
        assert_eq!(chosen, candidates[0]);
    }

    #[test]
    fn test_score_is_negative_distortion() {
        let x = two_blobs();
        let mut kmeans = KMeans::new(2).random_state(10);
        kmeans.fit(&x).unwrap();

        assert_relative_eq!(kmeans.score(&x).unwrap(), -1.0, epsilon = 1e-12);
    }
}
