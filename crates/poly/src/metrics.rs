//! A module for metrics to evaluate polynomial fit quality.
//!
//! Goodness of fit on training samples is given by [r2_score] and [rmse],
//! predictivity is estimated with k-fold cross validation through [PredictScore].

use linfa::dataset::Dataset;
use linfa::{
    traits::{Fit, Predict, PredictInplace},
    Float, ParamGuard,
};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1};

use crate::{basis::PolynomialBasis, PolyFitError, PolyFitParams, PolynomialFit};

/// Coefficient of determination `1 - RSS / TSS` of predictions `y_pred` wrt `y_true`.
///
/// Returns NaN when `y_true` is constant.
pub fn r2_score<F: Float>(
    y_true: &ArrayBase<impl Data<Elem = F>, Ix1>,
    y_pred: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> F {
    let mean = y_true.mean().unwrap_or_else(F::nan);
    let rss = (y_true - y_pred).mapv(|v| v * v).sum();
    let tss = y_true.mapv(|v| (v - mean) * (v - mean)).sum();
    if tss == F::zero() {
        return F::nan();
    }
    F::one() - rss / tss
}

/// Root mean squared error of predictions `y_pred` wrt `y_true`
pub fn rmse<F: Float>(
    y_true: &ArrayBase<impl Data<Elem = F>, Ix1>,
    y_pred: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> F {
    (y_true - y_pred)
        .mapv(|v| v * v)
        .mean()
        .unwrap_or_else(F::nan)
        .sqrt()
}

/// A trait for Q2 predictive coefficient cross validation score
pub trait PredictScore<F, ER, P, O>
where
    F: Float,
    ER: std::error::Error + From<linfa::error::Error>,
    P: Fit<Array2<F>, Array1<F>, ER, Object = O> + ParamGuard,
    O: PredictInplace<Array2<F>, Array1<F>>,
{
    /// Return the training data (xt, yt)
    fn training_data(&self) -> &(Array2<F>, Array1<F>);

    /// Return the model parameters
    fn params(&self) -> P;

    /// Compute quality metric Q2 with kfold cross validation.
    ///
    /// `kfold` should be in `[1, n_samples]`, otherwise a parameter error is returned.
    fn q2_score(&self, kfold: usize) -> Result<F, ER> {
        let (xt, yt) = self.training_data();
        if kfold == 0 || kfold > xt.nrows() {
            return Err(ER::from(linfa::error::Error::Parameters(format!(
                "kfold should be in [1, {}], got {}",
                xt.nrows(),
                kfold
            ))));
        }
        let dataset = Dataset::new(xt.to_owned(), yt.to_owned());
        let yt_mean = yt.mean().unwrap_or_else(F::nan);
        // Predictive Residual Sum of Squares
        let mut press = F::zero();
        // Total Sum of Squares
        let mut tss = F::zero();
        for (train, valid) in dataset.fold(kfold).into_iter() {
            let params = self.params();
            let model: O = params.fit(&train)?;
            let pred = model.predict(valid.records());
            press += (valid.targets() - pred).mapv(|v| v * v).sum();
            tss += (valid.targets() - yt_mean).mapv(|v| v * v).sum();
        }
        Ok(F::one() - press / tss)
    }

    /// Q2 predictive coefficient with Leave-One-Out Cross-Validation
    fn looq2_score(&self) -> Result<F, ER> {
        self.q2_score(self.training_data().0.nrows())
    }
}

impl<F, B> PredictScore<F, PolyFitError, PolyFitParams<F, B>, Self> for PolynomialFit<F, B>
where
    F: Float,
    B: PolynomialBasis<F>,
{
    fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }

    fn params(&self) -> PolyFitParams<F, B> {
        PolyFitParams::from(self.params.clone())
    }
}
