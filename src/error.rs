//! Error types for the epiforecast crate

use thiserror::Error;

/// Custom error types for the epiforecast crate
#[derive(Debug, Error)]
pub enum EpiError {
    /// Unrecognized frequency code
    #[error("Unsupported frequency: {0}")]
    UnknownFrequency(String),

    /// Too few observations to fit the rate forecaster
    #[error("Insufficient data: {observed} observations, {frequency} frequency requires at least {required}")]
    InsufficientData {
        observed: usize,
        required: usize,
        frequency: &'static str,
    },

    /// A logit rate series is (near-)constant, so the VAR covariance is singular
    #[error("Singular covariance: logit series for rate '{rate}' has near-zero variance")]
    SingularCovariance { rate: String },

    /// Series lengths do not line up at an integration boundary
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Rate value outside the open interval (0, 1)
    #[error("Rate value {0} is outside the open interval (0, 1)")]
    InvalidRate(f64),

    /// Invalid parameter passed by the caller
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation called before the model state it needs was produced
    #[error("Model state error: {0}")]
    ModelState(String),

    /// A compartment went negative under the reject-scenario policy
    #[error("Compartment {compartment} went negative at step {step} in scenario '{scenario}'")]
    NegativeCompartment {
        compartment: &'static str,
        step: usize,
        scenario: String,
    },

    /// Simulation produced a non-finite compartment value
    #[error("Non-finite compartment value at step {step} in scenario '{scenario}'")]
    NumericalOverflow { step: usize, scenario: String },

    /// Every scenario simulation in the ensemble failed
    #[error("All {failed} scenario simulations failed")]
    EmptyEnsemble { failed: usize },

    /// Some scenario simulations failed and the caller asked for a complete ensemble
    #[error("{failed} of {total} scenario simulations failed")]
    PartialEnsemble { failed: usize, total: usize },

    /// Forecast and ground-truth indices do not overlap
    #[error("Alignment error: {0}")]
    Alignment(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, EpiError>;
