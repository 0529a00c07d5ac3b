//! Caller-side feature scaling. The clustering core never rescales its input,
//! so features on very different scales should go through this first.

use crate::error::{KMeansError, Result};
use crate::{Matrix, Vector};
use ndarray::Axis;

/// Standardizes each column to zero mean and unit variance. Constant columns
/// are centred but not divided.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        let mean = data.mean_axis(Axis(0)).ok_or(KMeansError::EmptyInput)?;
        let std = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = self.params(data)?;
        Ok((data - mean) / std)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }

    /// Maps scaled values (e.g. fitted centroids) back to the original units.
    pub fn inverse_transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = self.params(data)?;
        Ok(data * std + mean)
    }

    fn params(&self, data: &Matrix) -> Result<(&Vector, &Vector)> {
        let (mean, std) = match (self.mean.as_ref(), self.std.as_ref()) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(KMeansError::NotFitted),
        };

        if data.ncols() != mean.len() {
            return Err(KMeansError::InvalidDimensions(format!(
                "Number of features in X ({}) doesn't match fitted data ({})",
                data.ncols(),
                mean.len()
            )));
        }

        Ok((mean, std))
    }
}
