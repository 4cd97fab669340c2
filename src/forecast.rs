//! Vector autoregression forecasting of logit-transformed rates
//!
//! The forecaster fits a VAR(p) with intercept by ordinary least squares on
//! the logit-rate columns, then forecasts point values with confidence bands
//! from the moving-average representation of the forecast-error covariance.
//! Bands are mapped back to rate space through the logistic function, which
//! is monotone and therefore preserves lower <= point <= upper.

use crate::data::{ModelVariant, RateSeries};
use crate::error::{EpiError, Result};
use crate::frequency::Frequency;
use crate::scenario::{Level, Scenario};
use crate::simulation::ScenarioRates;
use crate::transform::logistic;
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Variance below which a logit column is treated as constant
const SINGULAR_VARIANCE_THRESHOLD: f64 = 1e-10;

/// Untrained rate forecaster
#[derive(Debug, Clone, Default)]
pub struct RateForecaster {
    /// Override of the frequency's default maximum lag order
    max_lag: Option<usize>,
}

impl RateForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the lag order below the frequency default
    pub fn with_max_lag(max_lag: usize) -> Self {
        Self {
            max_lag: Some(max_lag),
        }
    }

    /// Fit a VAR model to the logit-rate series.
    ///
    /// Fails with [`EpiError::InsufficientData`] when the series is shorter
    /// than the frequency's minimum observation count, and with
    /// [`EpiError::SingularCovariance`] when any logit column is
    /// near-constant (a saturated rate, typically a data-conditioning
    /// problem upstream).
    pub fn fit(&self, series: &RateSeries) -> Result<FittedRateForecaster> {
        let n = series.len();
        let variant = series.variant();
        let k = variant.rate_count();
        let profile = series.frequency().profile();

        if n < profile.min_observations {
            return Err(EpiError::InsufficientData {
                observed: n,
                required: profile.min_observations,
                frequency: series.frequency().name(),
            });
        }

        for (rate_index, name) in variant.rate_names().iter().enumerate() {
            let column = series.logit_column(rate_index);
            let mean = column.iter().sum::<f64>() / n as f64;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            if variance < SINGULAR_VARIANCE_THRESHOLD {
                return Err(EpiError::SingularCovariance {
                    rate: name.to_string(),
                });
            }
        }

        let lag = self.select_lag(series.frequency(), n, k);
        let rows = n - lag;
        let params = 1 + k * lag;

        // Design matrix: [1, y_{t-1}', ..., y_{t-p}'] per regression row
        let mut design = DMatrix::zeros(rows, params);
        let mut targets = DMatrix::zeros(rows, k);
        for row in 0..rows {
            let t = row + lag;
            design[(row, 0)] = 1.0;
            for j in 1..=lag {
                for col in 0..k {
                    design[(row, 1 + (j - 1) * k + col)] = series.logit_column(col)[t - j];
                }
            }
            for col in 0..k {
                targets[(row, col)] = series.logit_column(col)[t];
            }
        }

        let svd = design.clone().svd(true, true);
        let beta = svd.solve(&targets, 1e-12).map_err(|_| EpiError::SingularCovariance {
            rate: "joint".to_string(),
        })?;

        let residuals = &targets - &design * &beta;
        let dof = rows.saturating_sub(params).max(1) as f64;
        let sigma = residuals.transpose() * &residuals / dof;

        // Split the stacked coefficient matrix into intercept and per-lag blocks,
        // arranged so that y_t = c + sum_j A_j y_{t-j}
        let intercept = DVector::from_fn(k, |col, _| beta[(0, col)]);
        let coefficients: Vec<DMatrix<f64>> = (1..=lag)
            .map(|j| {
                DMatrix::from_fn(k, k, |row, col| beta[(1 + (j - 1) * k + col, row)])
            })
            .collect();

        // Last p observations, oldest first, seed the forecast recursion
        let history: Vec<DVector<f64>> = (n - lag..n)
            .map(|t| DVector::from_fn(k, |col, _| series.logit_column(col)[t]))
            .collect();

        debug!(
            lag,
            observations = n,
            variant = ?variant,
            "fitted VAR rate forecaster"
        );

        Ok(FittedRateForecaster {
            variant,
            frequency: series.frequency(),
            lag,
            intercept,
            coefficients,
            sigma,
            history,
            observations: n,
        })
    }

    /// Lag order: min(frequency default, max(1, (n - 20) / 6)), additionally
    /// capped so the regression keeps more rows than parameters
    fn select_lag(&self, frequency: Frequency, n: usize, k: usize) -> usize {
        let default_max = self
            .max_lag
            .unwrap_or(frequency.profile().default_max_lag)
            .max(1);
        let data_driven = ((n.saturating_sub(20)) / 6).max(1);
        let mut lag = default_max.min(data_driven);
        while lag > 1 && n - lag < 1 + k * lag + 1 {
            lag -= 1;
        }
        lag
    }
}

/// Fitted VAR model, read-only after fitting.
///
/// Not safe for concurrent refitting; forecast calls are pure and repeated
/// calls on an unmodified model return identical output.
#[derive(Debug, Clone)]
pub struct FittedRateForecaster {
    variant: ModelVariant,
    frequency: Frequency,
    lag: usize,
    intercept: DVector<f64>,
    /// A_1..A_p, each k x k
    coefficients: Vec<DMatrix<f64>>,
    /// Residual covariance
    sigma: DMatrix<f64>,
    /// Last p observations, oldest first
    history: Vec<DVector<f64>>,
    observations: usize,
}

impl FittedRateForecaster {
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Selected autoregressive order
    pub fn lag_order(&self) -> usize {
        self.lag
    }

    /// Observation count the model was fitted on
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Forecast `horizon` steps ahead with confidence bands at
    /// `confidence_level` (e.g. 0.95), inverse-transformed to rate space
    pub fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<RateForecast> {
        if horizon < 1 {
            return Err(EpiError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        if confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(EpiError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {}",
                confidence_level
            )));
        }

        let k = self.variant.rate_count();
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| EpiError::InvalidParameter(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);

        // Point forecasts by iterating the VAR recursion
        let mut extended = self.history.clone();
        let mut points: Vec<DVector<f64>> = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let mut next = self.intercept.clone();
            for (j, a) in self.coefficients.iter().enumerate() {
                next += a * &extended[extended.len() - 1 - j];
            }
            extended.push(next.clone());
            points.push(next);
        }

        // MA-representation coefficients and cumulative forecast-error covariance
        let mut phis: Vec<DMatrix<f64>> = vec![DMatrix::identity(k, k)];
        for i in 1..horizon {
            let mut phi = DMatrix::zeros(k, k);
            for j in 1..=i.min(self.lag) {
                phi += &phis[i - j] * &self.coefficients[j - 1];
            }
            phis.push(phi);
        }

        let mut lower = vec![Vec::with_capacity(horizon); k];
        let mut point = vec![Vec::with_capacity(horizon); k];
        let mut upper = vec![Vec::with_capacity(horizon); k];
        let mut covariance = DMatrix::zeros(k, k);
        for (t, forecast_logits) in points.iter().enumerate() {
            covariance += &phis[t] * &self.sigma * phis[t].transpose();
            for rate in 0..k {
                let se = covariance[(rate, rate)].max(0.0).sqrt();
                let mid = forecast_logits[rate];
                lower[rate].push(logistic(mid - z * se));
                point[rate].push(logistic(mid));
                upper[rate].push(logistic(mid + z * se));
            }
        }

        RateForecast::from_bands(self.variant, self.frequency, lower, point, upper)
    }
}

/// Confidence-banded rate forecast over a fixed horizon, in rate space
#[derive(Debug, Clone, PartialEq)]
pub struct RateForecast {
    variant: ModelVariant,
    frequency: Frequency,
    /// [rate][step] bands
    lower: Vec<Vec<f64>>,
    point: Vec<Vec<f64>>,
    upper: Vec<Vec<f64>>,
}

impl RateForecast {
    /// Assemble a forecast from per-rate band series.
    ///
    /// Bands must be aligned per rate and ordered lower <= point <= upper at
    /// every step.
    pub fn from_bands(
        variant: ModelVariant,
        frequency: Frequency,
        lower: Vec<Vec<f64>>,
        point: Vec<Vec<f64>>,
        upper: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let k = variant.rate_count();
        for (name, bands) in [("lower", &lower), ("point", &point), ("upper", &upper)] {
            if bands.len() != k {
                return Err(EpiError::DimensionMismatch {
                    context: format!("{} band rate count", name),
                    expected: k,
                    actual: bands.len(),
                });
            }
        }
        let horizon = point.first().map(Vec::len).unwrap_or(0);
        if horizon == 0 {
            return Err(EpiError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        for rate in 0..k {
            for (name, bands) in [("lower", &lower), ("point", &point), ("upper", &upper)] {
                if bands[rate].len() != horizon {
                    return Err(EpiError::DimensionMismatch {
                        context: format!("{} band for rate {}", name, variant.rate_names()[rate]),
                        expected: horizon,
                        actual: bands[rate].len(),
                    });
                }
            }
            for t in 0..horizon {
                if !(lower[rate][t] <= point[rate][t] && point[rate][t] <= upper[rate][t]) {
                    return Err(EpiError::InvalidParameter(format!(
                        "band ordering violated for rate {} at step {}",
                        variant.rate_names()[rate],
                        t
                    )));
                }
            }
        }
        Ok(Self {
            variant,
            frequency,
            lower,
            point,
            upper,
        })
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Number of forecast steps
    pub fn horizon(&self) -> usize {
        self.point[0].len()
    }

    /// Band series for one rate
    pub fn band(&self, rate_index: usize, level: Level) -> &[f64] {
        match level {
            Level::Lower => &self.lower[rate_index],
            Level::Point => &self.point[rate_index],
            Level::Upper => &self.upper[rate_index],
        }
    }

    /// Rate series selected by one scenario, ready for simulation
    pub fn scenario_rates(&self, scenario: &Scenario) -> Result<ScenarioRates> {
        let k = self.variant.rate_count();
        if scenario.levels().len() != k {
            return Err(EpiError::DimensionMismatch {
                context: format!("scenario '{}'", scenario.label()),
                expected: k,
                actual: scenario.levels().len(),
            });
        }
        let columns = (0..k)
            .map(|rate| self.band(rate, scenario.level(rate)).to_vec())
            .collect();
        Ok(ScenarioRates::new(scenario.label(), columns))
    }
}
