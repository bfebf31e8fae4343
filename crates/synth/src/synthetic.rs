use std::sync::{Arc, RwLock};

use crate::polynomial::evaluate;
use linfa::{Dataset, Float};
use log::debug;
use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Ix1};
use ndarray_rand::{rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt};
use rand_xoshiro::Xoshiro256Plus;

type RngRef<R> = Arc<RwLock<R>>;

/// Placement of the x samples within the x limits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum XSampling {
    /// Evenly spaced samples including both limits
    #[default]
    Grid,
    /// Uniform random samples sorted in increasing order
    Random,
}

/// A generator of noisy samples `d = p(x) + e` where `p` is a known polynomial
/// and `e ~ U[noise_low, noise_high)`.
#[derive(Clone, Debug)]
pub struct SyntheticPolynomial<F: Float, R: Rng> {
    /// True polynomial coefficients in increasing power order
    coefficients: Array1<F>,
    /// Sampling interval [lower, upper] of x
    xlimits: (F, F),
    /// Placement of x samples
    x_sampling: XSampling,
    /// Uniform noise bounds [low, high)
    noise: (F, F),
    /// Random generator used for reproducibility
    rng: RngRef<R>,
}

impl<F: Float> SyntheticPolynomial<F, Xoshiro256Plus> {
    /// Default x sampling interval
    pub const DEFAULT_XLIMITS: (f64, f64) = (-5., 5.);
    /// Default uniform noise bounds
    pub const DEFAULT_NOISE: (f64, f64) = (0., 5.);

    /// Constructor given the true polynomial coefficients `[m_0, ..., m_k]`
    ///
    /// ```
    /// use lsqfit_synth::SyntheticPolynomial;
    /// use ndarray::array;
    ///
    /// let synth = SyntheticPolynomial::new(array![-2.0, 0.25, 1.0]);
    /// ```
    pub fn new(coefficients: Array1<F>) -> Self {
        Self::new_with_rng(coefficients, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng> SyntheticPolynomial<F, R> {
    /// Constructor given the true polynomial coefficients and a random generator
    pub fn new_with_rng(coefficients: Array1<F>, rng: R) -> Self {
        SyntheticPolynomial {
            coefficients,
            xlimits: (
                F::cast(SyntheticPolynomial::<F, Xoshiro256Plus>::DEFAULT_XLIMITS.0),
                F::cast(SyntheticPolynomial::<F, Xoshiro256Plus>::DEFAULT_XLIMITS.1),
            ),
            x_sampling: XSampling::default(),
            noise: (
                F::cast(SyntheticPolynomial::<F, Xoshiro256Plus>::DEFAULT_NOISE.0),
                F::cast(SyntheticPolynomial::<F, Xoshiro256Plus>::DEFAULT_NOISE.1),
            ),
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Set random generator
    pub fn with_rng<R2: Rng>(self, rng: R2) -> SyntheticPolynomial<F, R2> {
        SyntheticPolynomial {
            coefficients: self.coefficients,
            xlimits: self.xlimits,
            x_sampling: self.x_sampling,
            noise: self.noise,
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Set x sampling interval.
    ///
    /// **Panics** if `lower > upper`.
    pub fn xlimits(mut self, lower: F, upper: F) -> Self {
        if lower > upper {
            panic!("xlimits lower bound {lower} greater than upper bound {upper}");
        }
        self.xlimits = (lower, upper);
        self
    }

    /// Set placement of x samples
    pub fn x_sampling(mut self, x_sampling: XSampling) -> Self {
        self.x_sampling = x_sampling;
        self
    }

    /// Set uniform noise bounds, `low == high` gives a constant offset.
    ///
    /// **Panics** if `low > high`.
    pub fn noise(mut self, low: F, high: F) -> Self {
        if low > high {
            panic!("noise lower bound {low} greater than upper bound {high}");
        }
        self.noise = (low, high);
        self
    }

    /// True polynomial coefficients
    pub fn coefficients(&self) -> &Array1<F> {
        &self.coefficients
    }

    /// Sampling interval of x
    pub fn get_xlimits(&self) -> (F, F) {
        self.xlimits
    }

    /// Uniform noise bounds
    pub fn get_noise(&self) -> (F, F) {
        self.noise
    }

    /// Generate `ns` x locations within the x limits
    pub fn sample_x(&self, ns: usize) -> Array1<F> {
        let (lower, upper) = self.xlimits;
        match self.x_sampling {
            XSampling::Grid => Array1::linspace(lower, upper, ns),
            XSampling::Random => {
                let u = self.uniform(ns);
                let mut x = u.mapv(|v| lower + (upper - lower) * v).to_vec();
                x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                Array1::from_vec(x)
            }
        }
    }

    /// Generate `ns` noiseless samples `(x, p(x))`
    pub fn sample_noiseless(&self, ns: usize) -> (Array1<F>, Array1<F>) {
        let x = self.sample_x(ns);
        let d = evaluate(&self.coefficients, &x);
        (x, d)
    }

    /// Generate `ns` noisy samples `(x, p(x) + e)`
    pub fn sample(&self, ns: usize) -> (Array1<F>, Array1<F>) {
        let (x, d) = self.sample_noiseless(ns);
        let noise = self.noise_values(ns);
        debug!(
            "Generated {} samples with noise in [{}, {})",
            ns, self.noise.0, self.noise.1
        );
        (x, d + noise)
    }

    /// Generate `ns` noisy samples as a linfa dataset with (ns, 1) records
    pub fn sample_dataset(&self, ns: usize) -> Dataset<F, F, Ix1> {
        let (x, d) = self.sample(ns);
        Dataset::new(x.insert_axis(Axis(1)), d)
    }

    /// Add uniform noise to the given values
    pub fn add_noise(&self, d: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        d + &self.noise_values(d.len())
    }

    fn noise_values(&self, ns: usize) -> Array1<F> {
        let (low, high) = self.noise;
        self.uniform(ns).mapv(|v| low + (high - low) * v)
    }

    /// Draw `ns` values in [0, 1)
    fn uniform(&self, ns: usize) -> Array1<F> {
        let mut rng = self.rng.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Array::random_using(ns, Uniform::new(0., 1.), &mut *rng).mapv(|v: f64| F::cast(v))
    }
}

/// Training samples as (ns, 1) records
pub fn as_records<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array2<F> {
    x.to_owned().insert_axis(Axis(1))
}
