//! A module for the polynomial bases used to build the design matrix.
//!
//! A basis of degree `d` maps each scalar sample `x` to the monomials
//! `[1, x, x^2, ..., x^d]`, so that the model reads `m_0 + m_1.x + ... + m_d.x^d`.
//!
//! The following bases are implemented:
//! * constant, linear and quadratic as zero-sized types,
//! * monomial of any given degree.

use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1};
use paste::paste;
use std::convert::TryFrom;
use std::fmt;

/// A trait for polynomial bases in one variable
pub trait PolynomialBasis<F: Float>: Clone + Copy + Default + fmt::Display + Sync {
    /// Degree of the polynomial
    fn degree(&self) -> usize;

    /// Number of model parameters, i.e. `degree + 1`
    fn n_params(&self) -> usize {
        self.degree() + 1
    }

    /// Design matrix of the given `x` samples specified as a (n,) vector.
    /// Returns a (n, degree + 1) matrix where column j holds `x^j`.
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array2<F> {
        vandermonde(x, self.degree())
    }

    /// Derivatives of the basis functions wrt x at the given `x` samples.
    /// Returns a (n, degree + 1) matrix where column j holds `j.x^(j-1)`.
    fn jacobian(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array2<F> {
        vandermonde_derivative(x, self.degree())
    }
}

/// Vandermonde matrix of `x` with increasing powers from 0 to `degree`
pub fn vandermonde<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    degree: usize,
) -> Array2<F> {
    let mut g = Array2::<F>::ones((x.len(), degree + 1));
    for j in 1..=degree {
        g.column_mut(j).assign(&x.mapv(|v| v.powi(j as i32)));
    }
    g
}

/// Derivative of [`vandermonde`] wrt `x`
pub fn vandermonde_derivative<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    degree: usize,
) -> Array2<F> {
    let mut jac = Array2::<F>::zeros((x.len(), degree + 1));
    for j in 1..=degree {
        let k = F::cast(j);
        jac.column_mut(j).assign(&x.mapv(|v| k * v.powi(j as i32 - 1)));
    }
    jac
}

/// A polynomial basis of arbitrary degree.
///
/// The default value is the quadratic basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonomialBasis(pub usize);

impl Default for MonomialBasis {
    fn default() -> Self {
        MonomialBasis(2)
    }
}

impl<F: Float> PolynomialBasis<F> for MonomialBasis {
    fn degree(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MonomialBasis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MonomialBasis({})", self.0)
    }
}

macro_rules! declare_fixed_basis {
    ($basis:ident, $degree:expr, $doc:expr) => {
        paste! {
            #[doc = $doc]
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
            pub struct [<$basis Basis>]();

            impl<F: Float> PolynomialBasis<F> for [<$basis Basis>] {
                fn degree(&self) -> usize {
                    $degree
                }
            }

            impl From<[<$basis Basis>]> for MonomialBasis {
                fn from(_item: [<$basis Basis>]) -> Self {
                    MonomialBasis($degree)
                }
            }

            impl fmt::Display for [<$basis Basis>] {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "{}Basis", stringify!($basis))
                }
            }

            impl From<[<$basis Basis>]> for String {
                fn from(_item: [<$basis Basis>]) -> Self {
                    [<$basis Basis>]().to_string()
                }
            }

            impl TryFrom<String> for [<$basis Basis>] {
                type Error = &'static str;
                fn try_from(s: String) -> Result<Self, Self::Error> {
                    if s == stringify!([<$basis Basis>]) {
                        Ok(Self::default())
                    } else {
                        Err(concat!(
                            "Bad string value for ",
                            stringify!([<$basis Basis>]),
                            ", should be '",
                            stringify!([<$basis Basis>]),
                            "'"
                        ))
                    }
                }
            }
        }
    };
}

declare_fixed_basis!(Constant, 0, "Zero order polynomial basis: `[1]`");
declare_fixed_basis!(Linear, 1, "First order polynomial basis: `[1, x]`");
declare_fixed_basis!(Quadratic, 2, "Second order polynomial basis: `[1, x, x^2]`");
