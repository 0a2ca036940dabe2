//! Multi-task Gaussian process covariance from convolved generalized Matérn
//! kernels.
//!
//! Every task (an observational data set) carries its own smoothness ν and
//! length scale. Tasks are coupled through the convolution of their basis
//! functions, which is integrated numerically once per task pair on a grid
//! over (lag, l1, l2). Covariance matrices for new amplitudes and length
//! scales are then assembled by interpolation only.
//!
//! # Example
//!
//! ```
//! use mtgp::prelude::*;
//! use nalgebra::{DMatrix, DVector};
//!
//! let config = KernelConfig::new(
//!     vec![
//!         TaskDescriptor::squared_exponential(0.5, 2.0),
//!         TaskDescriptor::new("5/2".parse().unwrap(), 0.5, 2.0),
//!     ],
//!     9,
//! );
//! let data = vec![
//!     DVector::from_vec(vec![0.0, 0.5, 1.0]),
//!     DVector::from_vec(vec![0.25, 0.75]),
//! ];
//!
//! let kernel = MultiTaskKernel::new(data, config).unwrap();
//! let params = DMatrix::from_row_slice(2, 2, &[1.0, 1.2, 0.5, 0.8]);
//! let cov = kernel.covariance(&params).unwrap();
//!
//! assert_eq!(cov.shape(), (5, 5));
//! assert_eq!(cov, cov.transpose());
//! ```

// Test the README
#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod config;
pub mod consts;
pub mod kernel;
pub mod misc;
pub mod prelude;
pub mod result;
