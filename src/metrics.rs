//! Quality metrics for a cluster assignment.
//!
//! Both metrics take any `(samples, labels)` pair; they do not need a fitted
//! model. Label values need not be contiguous or start at zero.

use crate::distance::cross_distance;
use crate::error::{KMeansError, Result};
use crate::{Labels, Matrix};
use ndarray::Axis;
use std::collections::BTreeMap;

fn check_lengths(x: &Matrix, labels: &Labels) -> Result<()> {
    if x.nrows() != labels.len() {
        return Err(KMeansError::LengthMismatch {
            samples: x.nrows(),
            labels: labels.len(),
        });
    }
    Ok(())
}

/// Sample indices per distinct label, ordered by label.
pub(crate) fn group_by_label(labels: &Labels) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }
    groups
}

/// Sum over clusters of the squared deviations of each member from its
/// cluster mean. Lower is better.
pub fn euclidean_distortion(x: &Matrix, labels: &Labels) -> Result<f64> {
    check_lengths(x, labels)?;

    let mut distortion = 0.0;
    for members in group_by_label(labels).values() {
        let xc = x.select(Axis(0), members);
        let mu = xc.mean_axis(Axis(0)).ok_or(KMeansError::EmptyInput)?;
        distortion += (&xc - &mu).mapv(|v| v * v).sum();
    }

    Ok(distortion)
}

/// Mean silhouette coefficient with Euclidean distance, in `[-1, 1]`.
///
/// Cohesion of a point is its mean distance to the other members of its
/// cluster (divisor clamped to 1 for singletons); separation is the smallest
/// mean distance to any other cluster. Needs at least two distinct labels.
pub fn euclidean_silhouette(x: &Matrix, labels: &Labels) -> Result<f64> {
    check_lengths(x, labels)?;
    if x.nrows() == 0 {
        return Err(KMeansError::EmptyInput);
    }

    let groups = group_by_label(labels);
    if groups.len() < 2 {
        return Err(KMeansError::DegenerateClustering(format!(
            "silhouette needs at least 2 distinct labels, got {}",
            groups.len()
        )));
    }

    let distances = cross_distance(&x.view(), None)?;

    // mean_dist[[i, c]]: mean distance from sample i to cluster c
    let cluster_ids: Vec<usize> = groups.keys().copied().collect();
    let mut mean_dist = Matrix::zeros((x.nrows(), cluster_ids.len()));
    for (c, members) in groups.values().enumerate() {
        for i in 0..x.nrows() {
            let total: f64 = members.iter().map(|&j| distances[[i, j]]).sum();
            let own = usize::from(labels[i] == cluster_ids[c]);
            let div = (members.len() - own).max(1);
            mean_dist[[i, c]] = total / div as f64;
        }
    }

    let mut score_sum = 0.0;
    for i in 0..x.nrows() {
        let mut cohesion = 0.0;
        let mut separation = f64::INFINITY;
        for (c, &id) in cluster_ids.iter().enumerate() {
            if id == labels[i] {
                cohesion = mean_dist[[i, c]];
            } else {
                separation = separation.min(mean_dist[[i, c]]);
            }
        }

        let denom = cohesion.max(separation);
        if denom > 0.0 {
            score_sum += (separation - cohesion) / denom;
        }
    }

    Ok(score_sum / x.nrows() as f64)
}
