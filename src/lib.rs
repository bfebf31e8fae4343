//! `lsqfit` fits polynomials to noisy one-dimensional samples with dense least squares.
//!
//! This crate gathers:
//! * [poly]: polynomial least-squares fitting following
//!   [linfa](https://github.com/rust-ml/linfa) conventions,
//! * [synth]: synthetic noisy samples drawn from known polynomials,
//! * [plot]: terminal rendering of samples and fitted curves,
//!
//! and provides the `lsqfit` binary driving the three of them.
//!
//! ```
//! use lsqfit::poly::polyfit;
//! use lsqfit::synth::SyntheticPolynomial;
//! use ndarray::array;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! let synth = SyntheticPolynomial::new(array![-2.0f64, 0.25, 1.0])
//!     .with_rng(Xoshiro256Plus::seed_from_u64(42))
//!     .noise(0., 0.);
//! let (x, d) = synth.sample(20);
//! let model = polyfit(&x, &d, 2).expect("Polynomial fitted");
//! assert!((model.coefficients()[2] - 1.0).abs() < 1e-9);
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
pub use lsqfit_poly as poly;
pub use lsqfit_synth as synth;

pub mod plot;
