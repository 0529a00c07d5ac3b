use crate::distance::{cross_distance, min_rows};
use crate::error::{KMeansError, Result};
use crate::Matrix;
use ndarray::{ArrayView2, Axis};
use rand::seq::index;
use rand::Rng;

/// Centroid seeding strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitMethod {
    /// One uniformly drawn point, then repeatedly the point farthest from its
    /// nearest chosen centroid.
    #[default]
    FurthestPoint,
    /// k distinct points drawn uniformly without replacement.
    Random,
}

impl InitMethod {
    pub fn seed<R: Rng>(&self, x: &ArrayView2<f64>, k: usize, rng: &mut R) -> Result<Matrix> {
        match self {
            InitMethod::FurthestPoint => init_centroids(x, k, rng),
            InitMethod::Random => random_init(x, k, rng),
        }
    }
}

fn check_seed_args(x: &ArrayView2<f64>, k: usize) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(KMeansError::EmptyInput);
    }
    if k == 0 {
        return Err(KMeansError::InvalidK("k must be greater than 0".to_string()));
    }
    if x.nrows() < k {
        return Err(KMeansError::InsufficientData(format!(
            "n_samples={} should be >= n_clusters={}",
            x.nrows(),
            k
        )));
    }
    Ok(())
}

/// Furthest-point seeding.
///
/// Only the first centroid is random; every later pick is determined by the
/// first, so different draws from `rng` give different seed sets.
pub fn init_centroids<R: Rng>(x: &ArrayView2<f64>, k: usize, rng: &mut R) -> Result<Matrix> {
    check_seed_args(x, k)?;

    let first_idx = rng.gen_range(0..x.nrows());
    let centroids = x.select(Axis(0), &[first_idx]);

    extend_centroids(x, centroids, k)
}

/// Grows `centroids` to `k` rows by furthest-point selection from `x`.
///
/// Each new centroid is the sample whose distance to its nearest existing
/// centroid is largest (first such sample on ties).
pub fn extend_centroids(x: &ArrayView2<f64>, mut centroids: Matrix, k: usize) -> Result<Matrix> {
    check_seed_args(x, k)?;

    if centroids.nrows() == 0 {
        return Err(KMeansError::InvalidK(
            "furthest-point extension needs at least one starting centroid".to_string(),
        ));
    }
    if centroids.nrows() > k {
        return Err(KMeansError::InvalidK(format!(
            "{} starting centroids already exceed k={}",
            centroids.nrows(),
            k
        )));
    }
    if centroids.ncols() != x.ncols() {
        return Err(KMeansError::InvalidDimensions(format!(
            "centroids have {} features, data has {}",
            centroids.ncols(),
            x.ncols()
        )));
    }

    while centroids.nrows() < k {
        let distances = cross_distance(x, Some(&centroids.view()))?;
        let nearest = min_rows(&distances.view());

        let mut far_idx = 0;
        let mut far_dist = f64::NEG_INFINITY;
        for (i, &d) in nearest.iter().enumerate() {
            if d > far_dist {
                far_dist = d;
                far_idx = i;
            }
        }

        centroids
            .push_row(x.row(far_idx))
            .map_err(|e| KMeansError::InvalidShape(e.to_string()))?;
    }

    Ok(centroids)
}

/// Uniform seeding: `k` distinct rows of `x`.
pub fn random_init<R: Rng>(x: &ArrayView2<f64>, k: usize, rng: &mut R) -> Result<Matrix> {
    check_seed_args(x, k)?;

    let indices = index::sample(rng, x.nrows(), k).into_vec();
    Ok(x.select(Axis(0), &indices))
}
