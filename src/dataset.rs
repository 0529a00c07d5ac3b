//! Conversion boundary between tabular input and the numeric core.
//!
//! Everything downstream of [`Dataset`] sees a plain `Matrix` whose rows all
//! have the same length and hold finite values.

use crate::error::{KMeansError, Result};
use crate::{Matrix, Vector};
use ndarray::Axis;

#[derive(Clone, Debug)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Matrix,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, features: Matrix) -> Result<Self> {
        if feature_names.len() != features.ncols() {
            return Err(KMeansError::InvalidDimensions(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                features.ncols()
            )));
        }
        check_finite(&features)?;

        Ok(Self {
            feature_names,
            features,
        })
    }

    /// Builds a dataset from row records, rejecting ragged rows and
    /// non-finite values.
    pub fn from_rows<S, R>(feature_names: &[S], rows: &[R]) -> Result<Self>
    where
        S: AsRef<str>,
        R: AsRef<[f64]>,
    {
        let n_features = feature_names.len();
        let mut values = Vec::with_capacity(rows.len() * n_features);

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_features {
                return Err(KMeansError::InvalidData(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    n_features
                )));
            }
            values.extend_from_slice(row);
        }

        let features = Matrix::from_shape_vec((rows.len(), n_features), values)
            .map_err(|e| KMeansError::InvalidShape(e.to_string()))?;
        let names = feature_names.iter().map(|n| n.as_ref().to_string()).collect();

        Self::new(names, features)
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn column(&self, name: &str) -> Option<Vector> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .map(|j| self.features.column(j).to_owned())
    }

    /// Keeps only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| {
                self.feature_names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| KMeansError::InvalidData(format!("unknown column '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            feature_names: names.iter().map(|n| n.to_string()).collect(),
            features: self.features.select(Axis(1), &indices),
        })
    }

    pub fn into_matrix(self) -> Matrix {
        self.features
    }
}

fn check_finite(features: &Matrix) -> Result<()> {
    for ((i, j), v) in features.indexed_iter() {
        if !v.is_finite() {
            return Err(KMeansError::InvalidData(format!(
                "non-finite value {} at row {}, column {}",
                v, i, j
            )));
        }
    }
    Ok(())
}
