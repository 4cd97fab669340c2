//! Reporting frequencies and their fitting parameters
//!
//! Each supported reporting cadence maps to a row of fixed constants via
//! [`Frequency::profile`]. New cadences are added as table rows, not as new
//! types.

use crate::error::{EpiError, Result};
use chrono::{DateTime, Datelike, Duration, Months, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Reporting cadence of a time-indexed series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    BusinessDay,
    Weekly,
    Monthly,
    Annual,
}

/// Frequency-specific constants used by the rate forecaster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyProfile {
    /// Reporting periods per calendar year
    pub periods_per_year: f64,
    /// Recovery lag in reporting periods. Fractional and never rounded:
    /// rounding 14/365 to 0 at annual frequency collapses the recovery rate
    /// to a constant and makes the VAR covariance singular.
    pub recovery_lag: f64,
    /// Default maximum VAR lag order
    pub default_max_lag: usize,
    /// Minimum observation count required for fitting
    pub min_observations: usize,
}

impl Frequency {
    /// All supported frequencies, coarsest last
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::BusinessDay,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Annual,
    ];

    /// Parse a frequency code or friendly name, case-insensitively
    pub fn parse(code: &str) -> Result<Self> {
        match code.to_lowercase().as_str() {
            "d" | "daily" => Ok(Frequency::Daily),
            "b" | "business" | "business-day" | "business_day" => Ok(Frequency::BusinessDay),
            "w" | "weekly" => Ok(Frequency::Weekly),
            "m" | "me" | "monthly" => Ok(Frequency::Monthly),
            "y" | "ye" | "a" | "annual" | "yearly" => Ok(Frequency::Annual),
            _ => Err(EpiError::UnknownFrequency(code.to_string())),
        }
    }

    /// Canonical short code
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::BusinessDay => "B",
            Frequency::Weekly => "W",
            Frequency::Monthly => "ME",
            Frequency::Annual => "YE",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::BusinessDay => "business-day",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Annual => "annual",
        }
    }

    /// Constants for this frequency. Pure table lookup.
    pub fn profile(&self) -> FrequencyProfile {
        match self {
            Frequency::Daily => FrequencyProfile {
                periods_per_year: 365.25,
                recovery_lag: 14.0,
                default_max_lag: 14,
                min_observations: 30,
            },
            Frequency::BusinessDay => FrequencyProfile {
                periods_per_year: 252.0,
                recovery_lag: 10.0,
                default_max_lag: 10,
                min_observations: 60,
            },
            Frequency::Weekly => FrequencyProfile {
                periods_per_year: 52.18,
                recovery_lag: 14.0 / 7.0,
                default_max_lag: 8,
                min_observations: 26,
            },
            Frequency::Monthly => FrequencyProfile {
                periods_per_year: 12.0,
                recovery_lag: 14.0 / 30.0,
                default_max_lag: 6,
                min_observations: 24,
            },
            Frequency::Annual => FrequencyProfile {
                periods_per_year: 1.0,
                recovery_lag: 14.0 / 365.0,
                default_max_lag: 3,
                min_observations: 10,
            },
        }
    }

    /// Next reporting timestamp after `ts`
    pub fn advance(&self, ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let next = match self {
            Frequency::Daily => Some(ts + Duration::days(1)),
            Frequency::BusinessDay => {
                // Skip to the next weekday
                let mut next = ts + Duration::days(1);
                while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
                    next += Duration::days(1);
                }
                Some(next)
            }
            Frequency::Weekly => Some(ts + Duration::weeks(1)),
            Frequency::Monthly => ts.checked_add_months(Months::new(1)),
            Frequency::Annual => ts.checked_add_months(Months::new(12)),
        };
        next.ok_or_else(|| {
            EpiError::InvalidParameter(format!("timestamp overflow advancing {} from {}", self.name(), ts))
        })
    }

    /// Generate `horizon` future timestamps after `last`
    pub fn future_timestamps(&self, last: DateTime<Utc>, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let mut timestamps = Vec::with_capacity(horizon);
        let mut current = last;
        for _ in 0..horizon {
            current = self.advance(current)?;
            timestamps.push(current);
        }
        Ok(timestamps)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
