//! Euclidean distances between points and between sample sets.

use crate::error::{KMeansError, Result};
use crate::{Labels, Matrix, Vector};
use ndarray::{ArrayD, ArrayView1, ArrayView2, ArrayViewD, Axis, IxDyn};

/// Euclidean length of a single point.
#[inline]
pub fn norm(a: &ArrayView1<f64>) -> f64 {
    a.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Euclidean distance between two points of equal dimension.
#[inline]
pub fn pairwise_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Distance from one point to every row of `set`.
pub fn distance_to_set(a: &ArrayView1<f64>, set: &ArrayView2<f64>) -> Result<Vector> {
    if a.len() != set.ncols() {
        return Err(KMeansError::InvalidDimensions(format!(
            "point has {} features, set has {}",
            a.len(),
            set.ncols()
        )));
    }

    Ok(set
        .outer_iter()
        .map(|row| pairwise_distance(a, &row))
        .collect())
}

/// Distance matrix between the rows of `x` (m1 x n) and the rows of `y` (m2 x n).
///
/// Entry `(i, j)` is the distance between `x[i]` and `y[j]`. When `y` is `None`
/// the self-distance matrix of `x` is returned; its diagonal is exactly zero and
/// it is exactly symmetric.
pub fn cross_distance(x: &ArrayView2<f64>, y: Option<&ArrayView2<f64>>) -> Result<Matrix> {
    let x = x.view();
    let y = match y {
        Some(y) => y.view(),
        None => x.view(),
    };

    if x.ncols() != y.ncols() {
        return Err(KMeansError::InvalidDimensions(format!(
            "x has {} features, y has {}",
            x.ncols(),
            y.ncols()
        )));
    }

    let mut distances = Matrix::zeros((x.nrows(), y.nrows()));
    for (i, xi) in x.outer_iter().enumerate() {
        for (j, yj) in y.outer_iter().enumerate() {
            distances[[i, j]] = pairwise_distance(&xi, &yj);
        }
    }

    Ok(distances)
}

/// Dynamic-rank form of [`cross_distance`].
///
/// Both inputs must have rank >= 2; the last two axes are (samples, features)
/// and any leading axes are batch axes that must agree between `x` and `y`.
/// The result has shape `batch.. x m1 x m2`.
pub fn cross_distance_dyn(x: &ArrayViewD<f64>, y: Option<&ArrayViewD<f64>>) -> Result<ArrayD<f64>> {
    let x = x.view();
    let y = match y {
        Some(y) => y.view(),
        None => x.view(),
    };

    for (name, arr) in [("x", &x), ("y", &y)] {
        if arr.ndim() < 2 {
            return Err(KMeansError::InvalidShape(format!(
                "{} must have rank >= 2, got rank {} (wrap a single point as a 1-row set)",
                name,
                arr.ndim()
            )));
        }
    }

    let (x_batch, x_tail) = x.shape().split_at(x.ndim() - 2);
    let (y_batch, y_tail) = y.shape().split_at(y.ndim() - 2);

    if x_batch != y_batch {
        return Err(KMeansError::InvalidShape(format!(
            "batch axes differ: {:?} vs {:?}",
            x_batch, y_batch
        )));
    }
    if x_tail[1] != y_tail[1] {
        return Err(KMeansError::InvalidDimensions(format!(
            "x has {} features, y has {}",
            x_tail[1], y_tail[1]
        )));
    }

    let batches: usize = x_batch.iter().product();
    let (m1, m2, n) = (x_tail[0], y_tail[0], x_tail[1]);

    let shape_err = |e: ndarray::ShapeError| KMeansError::InvalidShape(e.to_string());
    let x3 = x.to_shape((batches, m1, n)).map_err(shape_err)?;
    let y3 = y.to_shape((batches, m2, n)).map_err(shape_err)?;

    let mut values = Vec::with_capacity(batches * m1 * m2);
    for (xb, yb) in x3.outer_iter().zip(y3.outer_iter()) {
        let block = cross_distance(&xb, Some(&yb))?;
        values.extend(block.iter().copied());
    }

    let mut out_shape = x_batch.to_vec();
    out_shape.extend_from_slice(&[m1, m2]);
    ArrayD::from_shape_vec(IxDyn(&out_shape), values).map_err(shape_err)
}

/// Index of the smallest entry in each row. Ties resolve to the lowest index.
pub fn argmin_rows(distances: &ArrayView2<f64>) -> Labels {
    distances
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (j, &d) in row.iter().enumerate() {
                if d < best_dist {
                    best_dist = d;
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Smallest entry in each row.
pub fn min_rows(distances: &ArrayView2<f64>) -> Vector {
    distances
        .axis_iter(Axis(0))
        .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}
