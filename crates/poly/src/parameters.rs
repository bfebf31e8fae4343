use crate::basis::{PolynomialBasis, QuadraticBasis};
use crate::errors::{PolyFitError, Result};
use crate::lstsq::LstsqMethod;
use linfa::{Float, ParamGuard};

/// A set of validated polynomial fit parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PolyFitValidParams<F: Float, B: PolynomialBasis<F>> {
    /// Polynomial basis defining the design matrix columns
    pub(crate) basis: B,
    /// Dense least-squares solver
    pub(crate) method: LstsqMethod,
    /// Relative cutoff on singular values for rank decisions (None: eps * max(n, m))
    pub(crate) rcond: Option<F>,
    /// Return the minimum-norm solution instead of failing when n_samples < n_params
    pub(crate) min_norm_underdetermined: bool,
}

impl<F: Float, B: PolynomialBasis<F>> Default for PolyFitValidParams<F, B> {
    fn default() -> PolyFitValidParams<F, B> {
        PolyFitValidParams {
            basis: B::default(),
            method: LstsqMethod::default(),
            rcond: None,
            min_norm_underdetermined: false,
        }
    }
}

impl<F: Float, B: PolynomialBasis<F>> PolyFitValidParams<F, B> {
    /// Get polynomial basis
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// Get least-squares solver method
    pub fn method(&self) -> LstsqMethod {
        self.method
    }

    /// Get the user given relative cutoff, if any
    pub fn rcond(&self) -> Option<F> {
        self.rcond
    }

    /// Relative cutoff actually used for a (n_samples, n_params) design matrix
    pub fn effective_rcond(&self, n_samples: usize, n_params: usize) -> F {
        self.rcond
            .unwrap_or_else(|| F::epsilon() * F::cast(n_samples.max(n_params)))
    }

    /// Whether under-determined systems are solved with the minimum-norm solution
    pub fn min_norm_underdetermined(&self) -> bool {
        self.min_norm_underdetermined
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [polynomial fit algorithm](struct.PolynomialFit.html).
pub struct PolyFitParams<F: Float, B: PolynomialBasis<F>>(PolyFitValidParams<F, B>);

impl<F: Float, B: PolynomialBasis<F>> PolyFitParams<F, B> {
    /// A constructor for fit parameters given a polynomial basis
    pub fn new(basis: B) -> PolyFitParams<F, B> {
        Self(PolyFitValidParams {
            basis,
            ..Default::default()
        })
    }

    /// A constructor for fit parameters from validated parameters
    pub fn new_from_valid(params: &PolyFitValidParams<F, B>) -> Self {
        Self(params.clone())
    }

    /// Set polynomial basis.
    pub fn basis(mut self, basis: B) -> Self {
        self.0.basis = basis;
        self
    }

    /// Set least-squares solver method.
    pub fn method(mut self, method: LstsqMethod) -> Self {
        self.0.method = method;
        self
    }

    /// Set the relative cutoff on singular values.
    ///
    /// Singular values lower than `rcond * max(singular values)` are considered zero
    /// when computing the rank of the design matrix.
    pub fn rcond(mut self, rcond: Option<F>) -> Self {
        self.0.rcond = rcond;
        self
    }

    /// Solve under-determined systems (fewer samples than parameters) with
    /// the minimum-norm solution instead of returning
    /// [PolyFitError::UnderdeterminedError].
    ///
    /// Only honoured by [LstsqMethod::Svd].
    pub fn min_norm_underdetermined(mut self, enabled: bool) -> Self {
        self.0.min_norm_underdetermined = enabled;
        self
    }
}

impl<F: Float, B: PolynomialBasis<F>> From<PolyFitValidParams<F, B>> for PolyFitParams<F, B> {
    fn from(valid: PolyFitValidParams<F, B>) -> Self {
        PolyFitParams(valid)
    }
}

impl<F: Float, B: PolynomialBasis<F>> ParamGuard for PolyFitParams<F, B> {
    type Checked = PolyFitValidParams<F, B>;
    type Error = PolyFitError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if let Some(rcond) = self.0.rcond {
            if !rcond.is_finite() || rcond < F::zero() {
                return Err(PolyFitError::InvalidValueError(format!(
                    "`rcond` should be a finite non negative value, got {}",
                    rcond
                )));
            }
        }
        let degree = self.0.basis.degree();
        if degree >= i32::MAX as usize {
            return Err(PolyFitError::InvalidValueError(format!(
                "polynomial degree {} is too large",
                degree
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fit parameters of a second order polynomial `d = m_0 + m_1.x + m_2.x^2`
pub type QuadraticFit<F> = PolyFitParams<F, QuadraticBasis>;

impl<F: Float> QuadraticFit<F> {
    /// Quadratic fit parameters constructor
    pub fn params() -> PolyFitParams<F, QuadraticBasis> {
        PolyFitParams::new(QuadraticBasis())
    }
}
