use thiserror::Error;

/// A result type for polynomial least-squares fitting
pub type Result<T> = std::result::Result<T, PolyFitError>;

/// An error when fitting a [`PolynomialFit`](crate::PolynomialFit)
#[derive(Error, Debug)]
pub enum PolyFitError {
    /// When samples are malformed (length mismatch, empty set, more than one input column)
    #[error("InvalidInput error: {0}")]
    InvalidInputError(String),
    /// When there are fewer samples than model parameters
    #[error("Underdetermined system: {n_samples} samples for {n_params} parameters")]
    UnderdeterminedError {
        /// Number of samples N
        n_samples: usize,
        /// Number of model parameters M
        n_params: usize,
    },
    /// When the design matrix is not full column rank and the solver needs it to be
    #[error("Rank deficient design matrix: rank {rank} < {n_params} parameters")]
    RankDeficiencyError {
        /// Effective rank of the design matrix
        rank: usize,
        /// Number of model parameters M
        n_params: usize,
    },
    /// When the least-squares computation itself fails
    #[error("Least squares computation error: {0}")]
    LstsqComputationError(String),
    #[error(transparent)]
    /// When linear algebra computation fails
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
    /// When error due to a bad parameter value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
