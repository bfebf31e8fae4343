use crate::basis::*;
use crate::errors::{PolyFitError, Result};
use crate::lstsq::{lstsq, LstsqMethod};
use crate::parameters::{PolyFitParams, PolyFitValidParams};

use linfa::prelude::{Dataset, DatasetBase, Fit, Float, PredictInplace};
use linfa::ParamGuard;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2};

use log::{debug, warn};
use std::fmt;

/// A polynomial model `d(x) = m_0 + m_1.x + ... + m_M-1.x^(M-1)` whose coefficients
/// `m` are estimated from N samples `(x_i, d_i)` by ordinary least squares:
///
/// `m = argmin ||G.m - d||_2`
///
/// where `G` is the (N, M) design matrix, `G[i][j] = x_i^j`.
///
/// # Implementation
///
/// * Based on [ndarray](https://github.com/rust-ndarray/ndarray)
///   and [linfa](https://github.com/rust-ml/linfa), parameters are checked with
///   linfa `ParamGuard` and the model is trained with linfa `Fit` trait
/// * Dense least squares are solved with [linfa-linalg](https://github.com/rust-ml/linfa-linalg),
///   see [LstsqMethod] for the available solvers (SVD by default)
/// * When the design matrix is rank deficient the SVD solver returns the minimum-norm
///   least-squares solution, other solvers fail with [PolyFitError::RankDeficiencyError]
/// * When there are fewer samples than parameters the fit fails with
///   [PolyFitError::UnderdeterminedError] unless the minimum-norm solution is requested
///   with [PolyFitParams::min_norm_underdetermined]
/// * Solver diagnostics (rank, singular values of `G`, residual sum of squares)
///   are kept in the fitted model
///
/// # Example
///
/// ```
/// use lsqfit_poly::QuadraticFit;
/// use linfa::prelude::*;
/// use ndarray::{array, Axis};
///
/// let x = array![-2f64, -1., 0., 1., 2.];
/// let d = x.mapv(|v| 1. + 0.25 * v + v * v);
///
/// let model = QuadraticFit::params()
///     .fit(&Dataset::new(x.insert_axis(Axis(1)), d))
///     .expect("Quadratic fitted");
///
/// let m = model.coefficients();
/// assert!((m[0] - 1.).abs() < 1e-9 && (m[1] - 0.25).abs() < 1e-9 && (m[2] - 1.).abs() < 1e-9);
///
/// let dpred = model.predict(&array![[3.]]).expect("prediction");
/// assert!((dpred[0] - 10.75).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct PolynomialFit<F: Float, B: PolynomialBasis<F>> {
    /// Least-squares coefficients, one per basis function
    coefficients: Array1<F>,
    /// Effective rank of the design matrix
    rank: usize,
    /// Singular values of the design matrix in descending order
    singular_values: Array1<F>,
    /// Relative cutoff used to compute the rank
    rcond: F,
    /// Residual sum of squares ||G.m - d||^2
    rss: F,
    /// Predicted values at training samples G.m
    fitted_values: Array1<F>,
    /// Training dataset (input, output)
    pub(crate) training_data: (Array2<F>, Array1<F>),
    /// Parameters used to fit this model
    pub(crate) params: PolyFitValidParams<F, B>,
}

impl<F: Float, B: PolynomialBasis<F>> Clone for PolynomialFit<F, B> {
    fn clone(&self) -> Self {
        Self {
            coefficients: self.coefficients.to_owned(),
            rank: self.rank,
            singular_values: self.singular_values.to_owned(),
            rcond: self.rcond,
            rss: self.rss,
            fitted_values: self.fitted_values.to_owned(),
            training_data: self.training_data.clone(),
            params: self.params.clone(),
        }
    }
}

impl<F: Float, B: PolynomialBasis<F>> fmt::Display for PolynomialFit<F, B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PolyFit(basis={}, method={}, coefficients={}, rank={}, rss={})",
            self.params.basis, self.params.method, self.coefficients, self.rank, self.rss,
        )
    }
}

impl<F: Float, B: PolynomialBasis<F>> PolynomialFit<F, B> {
    /// Polynomial fit parameters constructor
    pub fn params<NewB: PolynomialBasis<F>>(basis: NewB) -> PolyFitParams<F, NewB> {
        PolyFitParams::new(basis)
    }

    /// Least-squares coefficients `[m_0, ..., m_degree]` in increasing power order
    pub fn coefficients(&self) -> &Array1<F> {
        &self.coefficients
    }

    /// Polynomial basis of the model
    pub fn basis(&self) -> &B {
        &self.params.basis
    }

    /// Degree of the polynomial model
    pub fn degree(&self) -> usize {
        self.params.basis.degree()
    }

    /// Effective rank of the design matrix
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Singular values of the design matrix in descending order
    pub fn singular_values(&self) -> &Array1<F> {
        &self.singular_values
    }

    /// Relative cutoff used to compute the rank of the design matrix
    pub fn rcond(&self) -> F {
        self.rcond
    }

    /// Residual sum of squares of the training samples
    pub fn residual_sum_of_squares(&self) -> F {
        self.rss
    }

    /// Predicted values at training samples
    pub fn fitted_values(&self) -> &Array1<F> {
        &self.fitted_values
    }

    /// Residuals `d - d_pred` at training samples
    pub fn residuals(&self) -> Array1<F> {
        &self.training_data.1 - &self.fitted_values
    }

    /// Training dataset as (n, 1) inputs and (n,) outputs
    pub fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }

    /// Validated parameters used to fit this model
    pub fn fit_params(&self) -> &PolyFitValidParams<F, B> {
        &self.params
    }

    /// Predict output values at n given `x` points specified as a (n, 1) matrix.
    /// Returns n scalar output values as a vector (n,).
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let x = single_column(x)?;
        Ok(self.predict_samples(&x))
    }

    /// Predict derivatives `dd/dx` at n given `x` points specified as a (n, 1) matrix.
    pub fn predict_derivatives(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Array1<F>> {
        let x = single_column(x)?;
        Ok(self.params.basis.jacobian(&x).dot(&self.coefficients))
    }

    /// Predict output values at the given (n,) `x` samples
    pub fn predict_samples(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        self.params.basis.value(x).dot(&self.coefficients)
    }

    /// Evaluate the polynomial at a single point with Horner's scheme
    pub fn value_at(&self, x: F) -> F {
        self.coefficients
            .iter()
            .rev()
            .fold(F::zero(), |acc, &m| acc * x + m)
    }
}

fn single_column<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Result<ArrayView1<'_, F>> {
    if x.ncols() != 1 {
        return Err(PolyFitError::InvalidInputError(format!(
            "x samples should be a (n, 1) matrix, got ({}, {})",
            x.nrows(),
            x.ncols()
        )));
    }
    Ok(x.column(0))
}

impl<F, D, B> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for PolynomialFit<F, B>
where
    F: Float,
    D: Data<Elem = F>,
    B: PolynomialBasis<F>,
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(x.ncols(), 1, "Polynomial inputs must be a single column.");

        *y = self.predict_samples(&x.column(0));
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros((x.nrows(),))
    }
}

impl<F: Float, B: PolynomialBasis<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, PolyFitError> for PolyFitValidParams<F, B>
{
    type Object = PolynomialFit<F, B>;

    /// Fit polynomial coefficients using least squares
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = single_column(dataset.records())?;
        let d = dataset.targets();

        if x.len() != d.len() {
            return Err(PolyFitError::InvalidInputError(format!(
                "x and d samples should have the same length, got {} and {}",
                x.len(),
                d.len()
            )));
        }
        let n_samples = x.len();
        if n_samples == 0 {
            return Err(PolyFitError::InvalidInputError(
                "sample set is empty".to_string(),
            ));
        }
        let n_params = self.basis.n_params();
        if n_samples < n_params
            && !(self.min_norm_underdetermined && self.method == LstsqMethod::Svd)
        {
            return Err(PolyFitError::UnderdeterminedError {
                n_samples,
                n_params,
            });
        }

        let training_data = (x.to_owned().insert_axis(Axis(1)), d.to_owned());
        let rcond = self.effective_rcond(n_samples, n_params);

        // Design matrix G[i][j] = x_i^j
        let g = self.basis.value(&x);
        if x.iter().chain(g.iter()).any(|v| !v.is_finite()) {
            warn!("Non finite x samples or powers: polynomial coefficients set to NaN");
            let coefficients = Array1::from_elem(n_params, F::nan());
            let fitted_values = Array1::from_elem(n_samples, F::nan());
            return Ok(PolynomialFit {
                coefficients,
                rank: 0,
                singular_values: Array1::from_elem(n_params.min(n_samples), F::nan()),
                rcond,
                rss: F::nan(),
                fitted_values,
                training_data,
                params: self.clone(),
            });
        }

        debug!(
            "Fit {} on {} samples with {} solver",
            self.basis, n_samples, self.method
        );
        let sol = lstsq(&g, d, self.method, rcond)?;
        if sol.rank < n_params {
            warn!(
                "Design matrix rank {} < {} parameters: minimum-norm solution returned",
                sol.rank, n_params
            );
        }

        let fitted_values = g.dot(&sol.solution);
        let rss = (d - &fitted_values).mapv(|v| v * v).sum();
        Ok(PolynomialFit {
            coefficients: sol.solution,
            rank: sol.rank,
            singular_values: sol.singular_values,
            rcond,
            rss,
            fitted_values,
            training_data,
            params: self.clone(),
        })
    }
}

/// Fit a polynomial of the given `degree` to `(x, d)` samples using the SVD solver.
///
/// Returns [PolyFitError::InvalidInputError] when `x` and `d` lengths differ
/// and [PolyFitError::UnderdeterminedError] when there are fewer samples than `degree + 1`.
pub fn polyfit<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    d: &ArrayBase<impl Data<Elem = F>, Ix1>,
    degree: usize,
) -> Result<PolynomialFit<F, MonomialBasis>> {
    if x.len() != d.len() {
        return Err(PolyFitError::InvalidInputError(format!(
            "x and d samples should have the same length, got {} and {}",
            x.len(),
            d.len()
        )));
    }
    let dataset = Dataset::new(x.to_owned().insert_axis(Axis(1)), d.to_owned());
    PolyFitParams::new(MonomialBasis(degree)).check()?.fit(&dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuadraticFit;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use linfa::prelude::Predict;
    use lsqfit_synth::SyntheticPolynomial;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    const METHODS: [LstsqMethod; 3] = [
        LstsqMethod::Svd,
        LstsqMethod::Qr,
        LstsqMethod::NormalEquations,
    ];

    fn quadratic(x: &Array1<f64>, m: [f64; 3]) -> Array1<f64> {
        x.mapv(|v| m[0] + m[1] * v + m[2] * v * v)
    }

    #[test]
    fn test_concrete_scenario() {
        let x = array![-2., -1., 0., 1., 2.];
        let d = quadratic(&x, [1., 0.25, 1.]);
        let model = polyfit(&x, &d, 2).expect("Polynomial fitted");
        assert_eq!(model.coefficients().len(), 3);
        assert_abs_diff_eq!(*model.coefficients(), array![1., 0.25, 1.], epsilon = 1e-12);
        assert_eq!(model.rank(), 3);
        assert_abs_diff_eq!(model.residual_sum_of_squares(), 0., epsilon = 1e-20);
        assert_abs_diff_eq!(*model.fitted_values(), d, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_recovery_all_methods() {
        let m = [-2.0, 0.25, 1.0];
        let x = array![-4.5, -3., -0.1, 0.7, 2., 3.3, 5.];
        let d = quadratic(&x, m);
        for method in METHODS {
            let model = QuadraticFit::params()
                .method(method)
                .fit(&Dataset::new(x.to_owned().insert_axis(Axis(1)), d.to_owned()))
                .expect("Quadratic fitted");
            for (actual, expected) in model.coefficients().iter().zip(m.iter()) {
                assert_relative_eq!(*actual, *expected, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_exact_recovery_three_points() {
        let x = array![1., 2., 4.];
        let d = quadratic(&x, [3., -1.5, 0.5]);
        let model = polyfit(&x, &d, 2).expect("Polynomial fitted");
        assert_abs_diff_eq!(*model.coefficients(), array![3., -1.5, 0.5], epsilon = 1e-9);
    }

    #[test]
    fn test_residual_minimization() {
        let x = Array::linspace(-5., 5., 40);
        let noise = Array::linspace(0., 1., 40).mapv(|v: f64| (13. * v).sin());
        let d = quadratic(&x, [-2., 0.25, 1.]) + noise;
        for method in METHODS {
            let model = QuadraticFit::params()
                .method(method)
                .fit(&Dataset::new(x.to_owned().insert_axis(Axis(1)), d.to_owned()))
                .expect("Quadratic fitted");

            // normal equations optimality condition G^T.(G.m - d) = 0
            let g = QuadraticBasis().value(&x);
            let grad = g.t().dot(&(g.dot(model.coefficients()) - &d));
            assert_abs_diff_eq!(grad, Array1::zeros(3), epsilon = 1e-8);

            // no perturbed coefficients do better
            let rss = model.residual_sum_of_squares();
            for k in 0..3 {
                for delta in [-1e-3, 1e-3] {
                    let mut m = model.coefficients().to_owned();
                    m[k] += delta;
                    let other = (g.dot(&m) - &d).mapv(|v| v * v).sum();
                    assert!(other > rss);
                }
            }
        }
    }

    #[test]
    fn test_determinism() {
        let x = Array::linspace(-1., 3., 17);
        let d = x.mapv(|v: f64| v.exp());
        let m1 = polyfit(&x, &d, 4).unwrap();
        let m2 = polyfit(&x, &d, 4).unwrap();
        assert_eq!(m1.coefficients(), m2.coefficients());
        assert_eq!(m1.singular_values(), m2.singular_values());
    }

    #[test]
    fn test_dimension_invariant() {
        let x = Array::linspace(0., 1., 12);
        let d = x.mapv(|v: f64| v.sin());
        for degree in 0..6 {
            let model = polyfit(&x, &d, degree).unwrap();
            assert_eq!(model.coefficients().len(), degree + 1);
            assert_eq!(model.degree(), degree);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let res = polyfit(&array![1., 2., 3., 4.], &array![1., 2., 3.], 2);
        assert!(matches!(res, Err(PolyFitError::InvalidInputError(_))));

        let res = QuadraticFit::<f64>::params().fit(&Dataset::new(
            array![[1., 2.], [3., 4.], [5., 6.], [7., 8.]],
            array![1., 2., 3., 4.],
        ));
        assert!(matches!(res, Err(PolyFitError::InvalidInputError(_))));
    }

    #[test]
    fn test_empty_samples() {
        let res = polyfit(&Array1::<f64>::zeros(0), &Array1::<f64>::zeros(0), 2);
        assert!(matches!(res, Err(PolyFitError::InvalidInputError(_))));
    }

    #[test]
    fn test_underdetermined_error() {
        let x = array![0., 1.];
        let d = array![1., 3.];
        let res = polyfit(&x, &d, 2);
        assert!(matches!(
            res,
            Err(PolyFitError::UnderdeterminedError {
                n_samples: 2,
                n_params: 3
            })
        ));

        // only the SVD solver supports minimum-norm solutions
        let res = QuadraticFit::params()
            .method(LstsqMethod::Qr)
            .min_norm_underdetermined(true)
            .fit(&Dataset::new(x.insert_axis(Axis(1)), d));
        assert!(matches!(res, Err(PolyFitError::UnderdeterminedError { .. })));
    }

    #[test]
    fn test_underdetermined_min_norm() {
        let x = array![0., 1.];
        let d = array![1., 3.];
        let model = QuadraticFit::params()
            .min_norm_underdetermined(true)
            .fit(&Dataset::new(x.to_owned().insert_axis(Axis(1)), d.to_owned()))
            .expect("Minimum norm solution");
        let m = model.coefficients();
        assert_eq!(model.rank(), 2);
        // interpolates: m0 = 1 and m0 + m1 + m2 = 3, min norm gives m1 = m2 = 1
        assert_abs_diff_eq!(*m, array![1., 1., 1.], epsilon = 1e-10);
        assert_abs_diff_eq!(model.residual_sum_of_squares(), 0., epsilon = 1e-20);
    }

    #[test]
    fn test_rank_deficient() {
        // only two distinct x values for three parameters
        let x = array![-1., -1., 1., 1., 1.];
        let d = array![0., 0., 2., 2., 2.];
        let model = QuadraticFit::params()
            .rcond(Some(1e-10))
            .fit(&Dataset::new(x.to_owned().insert_axis(Axis(1)), d.to_owned()))
            .expect("Minimum norm solution");
        assert_eq!(model.rank(), 2);
        // constant and quadratic columns are identical: m0 = m2 = 0.5, m1 = 1
        assert_abs_diff_eq!(*model.coefficients(), array![0.5, 1., 0.5], epsilon = 1e-10);

        let res = QuadraticFit::params()
            .method(LstsqMethod::Qr)
            .rcond(Some(1e-10))
            .fit(&Dataset::new(x.insert_axis(Axis(1)), d));
        assert!(matches!(
            res,
            Err(PolyFitError::RankDeficiencyError {
                rank: 2,
                n_params: 3
            })
        ));
    }

    #[test]
    fn test_nan_propagation() {
        let x = array![0., 1., 2., 3.];
        let d = array![1., f64::NAN, 2., 3.];
        let model = polyfit(&x, &d, 1).unwrap();
        assert!(model.coefficients().iter().all(|v| v.is_nan()));

        let x = array![0., f64::INFINITY, 2., 3.];
        let d = array![1., 2., 2., 3.];
        let model = polyfit(&x, &d, 1).unwrap();
        assert!(model.coefficients().iter().all(|v| v.is_nan()));
        assert_eq!(model.rank(), 0);

        let model = polyfit(&array![f64::NAN, 1.], &array![1., 2.], 0).unwrap();
        assert!(model.coefficients()[0].is_nan());
    }

    #[test]
    fn test_overflowing_powers() {
        // 1e200^2 overflows to Inf in the design matrix
        let x: Array1<f64> = array![1e200, 1., 2., 3.];
        let d = array![1., 2., 3., 4.];
        for method in METHODS {
            let model = QuadraticFit::params()
                .method(method)
                .fit(&Dataset::new(x.to_owned().insert_axis(Axis(1)), d.to_owned()))
                .expect("Quadratic fitted");
            assert!(model.coefficients().iter().all(|v| v.is_nan()));
            assert!(model.residual_sum_of_squares().is_nan());
            assert_eq!(model.rank(), 0);
        }
        // same samples are fine with a line
        let model = polyfit(&x, &d, 1).unwrap();
        assert!(model.coefficients().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_predictions() {
        let x = array![-2., -1., 0., 1., 2.];
        let d = quadratic(&x, [1., 0.25, 1.]);
        let model = polyfit(&x, &d, 2).unwrap();

        let xtest = array![[3.], [-0.5]];
        let expected = array![10.75, 1.125];
        assert_abs_diff_eq!(model.predict(&xtest).unwrap(), expected, epsilon = 1e-10);
        // linfa Predict trait
        let ypred: Array1<f64> = Predict::predict(&model, &xtest);
        assert_abs_diff_eq!(ypred, expected, epsilon = 1e-10);
        assert_abs_diff_eq!(model.value_at(3.), 10.75, epsilon = 1e-10);

        // dd/dx = 0.25 + 2x
        assert_abs_diff_eq!(
            model.predict_derivatives(&xtest).unwrap(),
            array![6.25, -0.75],
            epsilon = 1e-10
        );
        assert!(matches!(
            model.predict(&array![[1., 2.]]),
            Err(PolyFitError::InvalidInputError(_))
        ));
    }

    #[test]
    fn test_residuals() {
        let x = array![0., 1., 2., 3.];
        let d = array![0., 1., 1., 2.];
        let model = polyfit(&x, &d, 1).unwrap();
        let r = model.residuals();
        assert_abs_diff_eq!(r.sum(), 0., epsilon = 1e-12);
        assert_abs_diff_eq!(
            r.mapv(|v| v * v).sum(),
            model.residual_sum_of_squares(),
            epsilon = 1e-12
        );
        assert_eq!(model.training_data().0.dim(), (4, 1));
    }

    #[test]
    fn test_display() {
        let x = array![0., 1., 2.];
        let model = polyfit(&x, &x, 1).unwrap();
        assert!(model
            .to_string()
            .starts_with("PolyFit(basis=MonomialBasis(1), method=SVD"));
    }

    #[test]
    fn test_noisy_quadratic() {
        // 100 evenly spaced samples on [-5, 5] with U[0, 5) noise
        let rng = Xoshiro256Plus::seed_from_u64(42);
        let synth = SyntheticPolynomial::new(array![-2.0, 0.25, 1.0]).with_rng(rng);
        let dataset = synth.sample_dataset(100);
        let model = QuadraticFit::params()
            .fit(&dataset)
            .expect("Quadratic fitted");
        let m = model.coefficients();
        // the noise mean (2.5) is absorbed by the constant term
        assert_abs_diff_eq!(m[0], 0.5, epsilon = 0.8);
        assert_abs_diff_eq!(m[1], 0.25, epsilon = 0.15);
        assert_abs_diff_eq!(m[2], 1.0, epsilon = 0.08);
    }
}
