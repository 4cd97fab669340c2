//! # Epiforecast
//!
//! A Rust library for epidemic trajectory forecasting. Time-varying
//! epidemiological rates are logit-transformed, modeled with a vector
//! autoregression, and forecast with confidence bands; every combination of
//! per-rate confidence levels becomes one deterministic SIRD/SIRDV
//! simulation scenario, and the resulting ensemble is collapsed into
//! central-tendency series with uncertainty retained.
//!
//! ## Features
//!
//! - Frequency-aware fitting parameters (daily, business-day, weekly,
//!   monthly, annual) with fractional recovery lags
//! - VAR forecasting of 3 or 4 logit-transformed rates with confidence bands
//! - Exhaustive 3^k scenario enumeration in reproducible order
//! - Parallel scenario ensemble with per-scenario failure records
//! - Mean / median / geometric-mean / harmonic-mean aggregation
//! - Frequency resampling and MAE/RMSE/MAPE/SMAPE evaluation
//!
//! ## Quick Start
//!
//! ```no_run
//! use epiforecast::{
//!     CentralTendency, EnsembleConfig, EpidemicModel, Frequency, InitialState, RateSeries,
//! };
//!
//! # fn run(timestamps: Vec<chrono::DateTime<chrono::Utc>>, logits: Vec<Vec<f64>>) -> epiforecast::Result<()> {
//! // Logit-transformed alpha/beta/gamma columns from the data-preparation layer
//! let rates = RateSeries::new(Frequency::Annual, timestamps, logits)?;
//!
//! let mut model = EpidemicModel::new(rates, EnsembleConfig::default());
//! model.fit()?;
//! model.forecast(5, 0.95)?;
//!
//! let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);
//! let population = vec![1_000_000.0; 5];
//! model.run_simulations(&initial, &population)?;
//!
//! let results = model.aggregate(&[CentralTendency::Mean, CentralTendency::Median])?;
//! # let _ = results;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod forecast;
pub mod frequency;
pub mod metrics;
pub mod model;
pub mod resample;
pub mod scenario;
pub mod simulation;
pub mod transform;

// Re-export commonly used types
pub use crate::aggregate::{aggregate, AggregatedResult, CentralTendency, DegenerateCell};
pub use crate::data::{
    Compartment, CompartmentState, InitialState, ModelVariant, RateSeries, TimeSeries,
};
pub use crate::ensemble::{run_ensemble, EnsembleConfig, EnsembleResult, ScenarioFailure};
pub use crate::error::{EpiError, Result};
pub use crate::forecast::{FittedRateForecaster, RateForecast, RateForecaster};
pub use crate::frequency::{Frequency, FrequencyProfile};
pub use crate::metrics::{evaluate, EvaluationReport};
pub use crate::model::{EpidemicModel, ReproductionForecast};
pub use crate::resample::{resample, AggregationRole};
pub use crate::scenario::{enumerate_scenarios, Level, Scenario};
pub use crate::simulation::{simulate, ClampPolicy, SimulationConfig, Trajectory};
pub use crate::transform::{logistic, logit, logit_clamped};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
