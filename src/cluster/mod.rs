//! K-means clustering.
//!
//! - `KMeans`: multi-restart seeding followed by Lloyd refinement
//! - `init`: furthest-point and uniform centroid seeding
//!
//! # Examples
//!
//! ```rust
//! use farkmeans::{KMeans, Matrix};
//! use ndarray::array;
//!
//! let x: Matrix = array![
//!     [1.0, 1.0],
//!     [1.5, 2.0],
//!     [3.0, 4.0],
//!     [5.0, 7.0],
//!     [3.5, 5.0],
//!     [4.5, 5.0]
//! ];
//!
//! let mut kmeans = KMeans::new(2).max_iter(100).random_state(42);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! assert_eq!(labels.len(), 6);
//!
//! let centers = kmeans.get_centroids().unwrap();
//! assert_eq!(centers.shape(), &[2, 2]);
//! ```
//!
//! Seeding can also be driven directly with any `rand::Rng`:
//!
//! ```rust
//! use farkmeans::cluster::init::init_centroids;
//! use ndarray::array;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0]];
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let seeds = init_centroids(&x.view(), 2, &mut rng).unwrap();
//! assert_eq!(seeds.nrows(), 2);
//! ```

pub mod init;
mod kmeans;

pub use init::InitMethod;
pub use kmeans::KMeans;
