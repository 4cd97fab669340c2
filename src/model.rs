//! Orchestration facade tying the pipeline together
//!
//! [`EpidemicModel`] walks the standard workflow: fit the rate forecaster,
//! forecast confidence-banded rates, run the scenario ensemble, and collapse
//! it into central-tendency series. Each stage validates that the previous
//! one has run.

use crate::aggregate::{aggregate, AggregatedResult, CentralTendency};
use crate::data::{InitialState, RateSeries, TimeSeries};
use crate::ensemble::{run_ensemble, EnsembleConfig, EnsembleResult};
use crate::error::{EpiError, Result};
use crate::forecast::{FittedRateForecaster, RateForecast, RateForecaster};
use crate::scenario::enumerate_scenarios;
use chrono::{DateTime, Utc};

/// Per-scenario reproduction number forecast with summary series
#[derive(Debug, Clone)]
pub struct ReproductionForecast {
    /// Scenario labels, in scenario-index order
    pub labels: Vec<String>,
    /// R0(t) per scenario over the horizon
    pub scenarios: Vec<Vec<f64>>,
    /// Arithmetic mean across scenarios per step
    pub mean: Vec<f64>,
    /// Median across scenarios per step
    pub median: Vec<f64>,
}

/// End-to-end epidemic forecasting model
#[derive(Debug)]
pub struct EpidemicModel {
    rate_series: RateSeries,
    forecaster: RateForecaster,
    config: EnsembleConfig,
    fitted: Option<FittedRateForecaster>,
    forecast: Option<RateForecast>,
    ensemble: Option<EnsembleResult>,
}

impl EpidemicModel {
    pub fn new(rate_series: RateSeries, config: EnsembleConfig) -> Self {
        Self {
            rate_series,
            forecaster: RateForecaster::new(),
            config,
            fitted: None,
            forecast: None,
            ensemble: None,
        }
    }

    /// Fit the VAR rate forecaster. Refitting replaces the prior model and
    /// invalidates any existing forecast and ensemble.
    pub fn fit(&mut self) -> Result<()> {
        self.fitted = Some(self.forecaster.fit(&self.rate_series)?);
        self.forecast = None;
        self.ensemble = None;
        Ok(())
    }

    /// Forecast rates with confidence bands over `horizon` steps
    pub fn forecast(&mut self, horizon: usize, confidence_level: f64) -> Result<&RateForecast> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| EpiError::ModelState("fit() must be called before forecast()".to_string()))?;
        let forecast = fitted.forecast(horizon, confidence_level)?;
        self.ensemble = None;
        Ok(&*self.forecast.insert(forecast))
    }

    /// Run the scenario ensemble from the current forecast
    pub fn run_simulations(
        &mut self,
        initial: &InitialState,
        population: &[f64],
    ) -> Result<&EnsembleResult> {
        let forecast = self.forecast.as_ref().ok_or_else(|| {
            EpiError::ModelState("forecast() must be called before run_simulations()".to_string())
        })?;
        let ensemble = run_ensemble(forecast, initial, population, &self.config)?;
        Ok(&*self.ensemble.insert(ensemble))
    }

    /// Collapse the ensemble into central-tendency series, consuming it
    pub fn aggregate(&mut self, methods: &[CentralTendency]) -> Result<AggregatedResult> {
        let ensemble = self.ensemble.take().ok_or_else(|| {
            EpiError::ModelState("run_simulations() must be called before aggregate()".to_string())
        })?;
        aggregate(ensemble, methods)
    }

    /// Timestamps for the current forecast horizon, continuing the rate
    /// series index at its frequency
    pub fn forecast_timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        let forecast = self.forecast.as_ref().ok_or_else(|| {
            EpiError::ModelState("forecast() must be called before forecast_timestamps()".to_string())
        })?;
        let last = *self
            .rate_series
            .timestamps()
            .last()
            .ok_or_else(|| EpiError::InvalidParameter("empty rate series".to_string()))?;
        self.rate_series
            .frequency()
            .future_timestamps(last, forecast.horizon())
    }

    /// Historical basic reproduction number R0(t) = alpha / (beta + gamma)
    pub fn reproduction_number(&self) -> TimeSeries {
        self.rate_series.reproduction_number()
    }

    /// Reproduction number forecast across every scenario, with mean and
    /// median summaries per step
    pub fn forecast_reproduction_number(&self) -> Result<ReproductionForecast> {
        let forecast = self.forecast.as_ref().ok_or_else(|| {
            EpiError::ModelState(
                "forecast() must be called before forecast_reproduction_number()".to_string(),
            )
        })?;
        let horizon = forecast.horizon();
        let scenarios = enumerate_scenarios(forecast.variant().rate_count())?;

        let mut labels = Vec::with_capacity(scenarios.len());
        let mut series = Vec::with_capacity(scenarios.len());
        for scenario in &scenarios {
            let alpha = forecast.band(0, scenario.level(0));
            let beta = forecast.band(1, scenario.level(1));
            let gamma = forecast.band(2, scenario.level(2));
            let r0: Vec<f64> = (0..horizon)
                .map(|t| alpha[t] / (beta[t] + gamma[t]))
                .collect();
            labels.push(scenario.label());
            series.push(r0);
        }

        let mut mean = Vec::with_capacity(horizon);
        let mut median = Vec::with_capacity(horizon);
        for t in 0..horizon {
            let mut cell: Vec<f64> = series.iter().map(|s| s[t]).collect();
            mean.push(cell.iter().sum::<f64>() / cell.len() as f64);
            cell.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = cell.len() / 2;
            median.push(if cell.len() % 2 == 0 {
                (cell[mid - 1] + cell[mid]) / 2.0
            } else {
                cell[mid]
            });
        }

        Ok(ReproductionForecast {
            labels,
            scenarios: series,
            mean,
            median,
        })
    }

    /// The fitted forecaster, if `fit()` has run
    pub fn fitted(&self) -> Option<&FittedRateForecaster> {
        self.fitted.as_ref()
    }

    /// The current ensemble, if `run_simulations()` has run
    pub fn ensemble(&self) -> Option<&EnsembleResult> {
        self.ensemble.as_ref()
    }
}
