//! # farkmeans
//!
//! K-means clustering over dense `ndarray` matrices with furthest-point seeding,
//! multi-restart seed selection and Lloyd refinement, plus the distortion and
//! silhouette metrics for judging any assignment.
//!
//! ## Example
//!
//! ```rust
//! use farkmeans::{KMeans, metrics};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
//!
//! let mut kmeans = KMeans::new(2).random_state(7);
//! let labels = kmeans.fit_predict(&x).unwrap();
//!
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let distortion = metrics::euclidean_distortion(&x, &labels).unwrap();
//! assert!((distortion - 1.0).abs() < 1e-9);
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod cluster;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod metrics;
pub mod preprocessing;

pub use cluster::{InitMethod, KMeans};
pub use dataset::Dataset;
pub use error::{KMeansError, Result};
pub use preprocessing::StandardScaler;

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
/// Cluster index per sample, in sample order.
pub type Labels = Array1<usize>;
