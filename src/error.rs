use thiserror::Error;

/// Error types for the clustering engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    /// The number of clusters is invalid for the given data
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Input has no samples or no features
    #[error("Input matrix must have at least one sample and one feature")]
    EmptyInput,

    /// Model has not been fitted yet
    #[error("KMeans not fitted. Call fit() first.")]
    NotFitted,

    /// Feature count differs between data and model, or between two sample sets
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// Array rank is not usable as a sample set
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Sample matrix and assignment vector lengths differ
    #[error("Length mismatch: {samples} samples but {labels} labels")]
    LengthMismatch { samples: usize, labels: usize },

    /// Tabular input rejected at the conversion boundary
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Metric is undefined for this assignment
    #[error("Degenerate clustering: {0}")]
    DegenerateClustering(String),
}

pub type Result<T> = std::result::Result<T, KMeansError>;
