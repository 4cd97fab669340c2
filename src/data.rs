//! Core data types: rate series, compartment states, and timestamped series

use crate::error::{EpiError, Result};
use crate::frequency::Frequency;
use crate::transform::logistic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rate names in fixed column order: infection, recovery, mortality, vaccination
pub const RATE_NAMES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// Model variant, chosen once from the number of rate series and fixed for
/// the model's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Three rates (alpha, beta, gamma), four compartments (S, I, R, D)
    Sird,
    /// Four rates (alpha, beta, gamma, delta), five compartments (S, I, R, D, V)
    Sirdv,
}

impl ModelVariant {
    /// Variant implied by the number of rate columns
    pub fn from_rate_count(k: usize) -> Result<Self> {
        match k {
            3 => Ok(ModelVariant::Sird),
            4 => Ok(ModelVariant::Sirdv),
            _ => Err(EpiError::InvalidParameter(format!(
                "expected 3 or 4 rate series, got {}",
                k
            ))),
        }
    }

    /// Number of forecasted rates
    pub fn rate_count(&self) -> usize {
        match self {
            ModelVariant::Sird => 3,
            ModelVariant::Sirdv => 4,
        }
    }

    /// Number of simulated compartments
    pub fn compartment_count(&self) -> usize {
        match self {
            ModelVariant::Sird => 4,
            ModelVariant::Sirdv => 5,
        }
    }

    /// Number of confidence-level scenarios (3^k)
    pub fn scenario_count(&self) -> usize {
        3usize.pow(self.rate_count() as u32)
    }

    /// Compartments simulated by this variant
    pub fn compartments(&self) -> &'static [Compartment] {
        match self {
            ModelVariant::Sird => &[
                Compartment::Susceptible,
                Compartment::Infected,
                Compartment::Recovered,
                Compartment::Deceased,
            ],
            ModelVariant::Sirdv => &[
                Compartment::Susceptible,
                Compartment::Infected,
                Compartment::Recovered,
                Compartment::Deceased,
                Compartment::Vaccinated,
            ],
        }
    }

    /// Rate names forecasted by this variant
    pub fn rate_names(&self) -> &'static [&'static str] {
        &RATE_NAMES[..self.rate_count()]
    }
}

/// A named sub-population of the compartmental model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Compartment {
    Susceptible,
    Infected,
    Recovered,
    Deceased,
    Vaccinated,
}

impl Compartment {
    /// Single-letter code used in labels and diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Infected => "I",
            Compartment::Recovered => "R",
            Compartment::Deceased => "D",
            Compartment::Vaccinated => "V",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Compartment::Susceptible => "Susceptible",
            Compartment::Infected => "Infected",
            Compartment::Recovered => "Recovered",
            Compartment::Deceased => "Deceased",
            Compartment::Vaccinated => "Vaccinated",
        }
    }
}

impl std::fmt::Display for Compartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Time-indexed logit-transformed rate series for fitting the forecaster.
///
/// Columns are ordered alpha, beta, gamma and, for SIRDV input, delta.
/// The index must be strictly increasing; the model variant is fixed by the
/// column count at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSeries {
    frequency: Frequency,
    timestamps: Vec<DateTime<Utc>>,
    /// One column per rate, each of length `timestamps.len()`
    logits: Vec<Vec<f64>>,
    variant: ModelVariant,
}

impl RateSeries {
    /// Create a rate series from logit-transformed rate columns
    pub fn new(
        frequency: Frequency,
        timestamps: Vec<DateTime<Utc>>,
        logits: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let variant = ModelVariant::from_rate_count(logits.len())?;
        for (name, column) in variant.rate_names().iter().zip(&logits) {
            if column.len() != timestamps.len() {
                return Err(EpiError::DimensionMismatch {
                    context: format!("logit_{} column", name),
                    expected: timestamps.len(),
                    actual: column.len(),
                });
            }
            if let Some(bad) = column.iter().find(|v| !v.is_finite()) {
                return Err(EpiError::InvalidParameter(format!(
                    "non-finite value {} in logit_{} column",
                    bad, name
                )));
            }
        }
        if timestamps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EpiError::InvalidParameter(
                "timestamps must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            frequency,
            timestamps,
            logits,
            variant,
        })
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Logit-space column for one rate
    pub fn logit_column(&self, rate_index: usize) -> &[f64] {
        &self.logits[rate_index]
    }

    /// Rate-space column (inverse-logit applied)
    pub fn rate_column(&self, rate_index: usize) -> Vec<f64> {
        self.logits[rate_index].iter().map(|&x| logistic(x)).collect()
    }

    /// Basic reproduction number R0(t) = alpha(t) / (beta(t) + gamma(t))
    /// over the historical rates
    pub fn reproduction_number(&self) -> TimeSeries {
        let alpha = self.rate_column(0);
        let beta = self.rate_column(1);
        let gamma = self.rate_column(2);
        let values = alpha
            .iter()
            .zip(beta.iter().zip(gamma.iter()))
            .map(|(&a, (&b, &g))| a / (b + g))
            .collect();
        TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
        }
    }
}

/// Compartment counts at the start of the simulation, taken from the last
/// historical observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub deceased: f64,
    /// Present iff the model is the SIRDV variant
    pub vaccinated: Option<f64>,
}

impl InitialState {
    /// SIRD initial state
    pub fn sird(susceptible: f64, infected: f64, recovered: f64, deceased: f64) -> Self {
        Self {
            susceptible,
            infected,
            recovered,
            deceased,
            vaccinated: None,
        }
    }

    /// SIRDV initial state
    pub fn sirdv(
        susceptible: f64,
        infected: f64,
        recovered: f64,
        deceased: f64,
        vaccinated: f64,
    ) -> Self {
        Self {
            susceptible,
            infected,
            recovered,
            deceased,
            vaccinated: Some(vaccinated),
        }
    }

    /// Variant implied by the presence of a vaccinated count
    pub fn variant(&self) -> ModelVariant {
        if self.vaccinated.is_some() {
            ModelVariant::Sirdv
        } else {
            ModelVariant::Sird
        }
    }

    /// Sum of all compartments
    pub fn total(&self) -> f64 {
        self.susceptible
            + self.infected
            + self.recovered
            + self.deceased
            + self.vaccinated.unwrap_or(0.0)
    }
}

/// One simulated step's compartment values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub deceased: f64,
    pub vaccinated: Option<f64>,
}

impl CompartmentState {
    /// Value of a single compartment; `None` for V under the SIRD variant
    pub fn value(&self, compartment: Compartment) -> Option<f64> {
        match compartment {
            Compartment::Susceptible => Some(self.susceptible),
            Compartment::Infected => Some(self.infected),
            Compartment::Recovered => Some(self.recovered),
            Compartment::Deceased => Some(self.deceased),
            Compartment::Vaccinated => self.vaccinated,
        }
    }

    /// Sum of all compartments
    pub fn total(&self) -> f64 {
        self.susceptible
            + self.infected
            + self.recovered
            + self.deceased
            + self.vaccinated.unwrap_or(0.0)
    }
}

impl From<&InitialState> for CompartmentState {
    fn from(initial: &InitialState) -> Self {
        Self {
            susceptible: initial.susceptible,
            infected: initial.infected,
            recovered: initial.recovered,
            deceased: initial.deceased,
            vaccinated: initial.vaccinated,
        }
    }
}

/// A timestamped univariate series, used for resampling and evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from aligned timestamps and values
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(EpiError::DimensionMismatch {
                context: "time series".to_string(),
                expected: timestamps.len(),
                actual: values.len(),
            });
        }
        if timestamps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EpiError::InvalidParameter(
                "timestamps must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { timestamps, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over (timestamp, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn variant_from_rate_count() {
        assert_eq!(ModelVariant::from_rate_count(3).unwrap(), ModelVariant::Sird);
        assert_eq!(ModelVariant::from_rate_count(4).unwrap(), ModelVariant::Sirdv);
        assert!(ModelVariant::from_rate_count(2).is_err());
        assert!(ModelVariant::from_rate_count(5).is_err());
    }

    #[test]
    fn scenario_counts() {
        assert_eq!(ModelVariant::Sird.scenario_count(), 27);
        assert_eq!(ModelVariant::Sirdv.scenario_count(), 81);
    }

    #[test]
    fn rate_series_rejects_unsorted_index() {
        let result = RateSeries::new(
            Frequency::Daily,
            vec![ts(2), ts(1)],
            vec![vec![0.0; 2], vec![0.0; 2], vec![0.0; 2]],
        );
        assert!(matches!(result, Err(EpiError::InvalidParameter(_))));
    }

    #[test]
    fn rate_series_rejects_ragged_columns() {
        let result = RateSeries::new(
            Frequency::Daily,
            vec![ts(1), ts(2)],
            vec![vec![0.0; 2], vec![0.0; 1], vec![0.0; 2]],
        );
        assert!(matches!(result, Err(EpiError::DimensionMismatch { .. })));
    }
}
