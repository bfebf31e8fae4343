//! This library implements polynomial [least squares](https://en.wikipedia.org/wiki/Least_squares)
//! fitting of one-dimensional samples.
//!
//! Given N samples `(x_i, d_i)` and a polynomial degree, it builds the (N, M) design matrix
//! `G[i][j] = x_i^j` with `M = degree + 1` and computes the coefficients `m`
//! minimizing `||G.m - d||_2` with a dense solver (SVD by default, QR or normal equations).
//!
//! The fitted model is implemented by [PolynomialFit] parameterized by [PolyFitParams],
//! following [linfa](https://github.com/rust-ml/linfa) conventions. The [polyfit] function
//! is a shortcut for the common case.
//!
//! ```
//! use lsqfit_poly::polyfit;
//! use ndarray::array;
//!
//! let x = array![-2., -1., 0., 1., 2.];
//! let d = x.mapv(|v| 1. + 0.25 * v + v * v);
//! let model = polyfit(&x, &d, 2).expect("Polynomial fitted");
//! assert_eq!(model.coefficients().len(), 3);
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod basis;
mod errors;
pub mod lstsq;
pub mod metrics;

mod parameters;

pub use algorithm::*;
pub use basis::{ConstantBasis, LinearBasis, MonomialBasis, PolynomialBasis, QuadraticBasis};
pub use errors::*;
pub use lstsq::LstsqMethod;
pub use metrics::PredictScore;
pub use parameters::*;
