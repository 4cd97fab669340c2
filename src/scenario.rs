//! Confidence-level scenario enumeration
//!
//! Each forecasted rate can follow its lower band, point forecast, or upper
//! band. One simulation scenario picks a level per rate, so k rates give 3^k
//! scenarios. The order is lexicographic by rate index with
//! Lower < Point < Upper, so scenario indices are reproducible across calls.

use crate::error::{EpiError, Result};
use serde::{Deserialize, Serialize};

/// Confidence-band selector for one forecasted rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Lower,
    Point,
    Upper,
}

impl Level {
    /// All levels in enumeration order
    pub const ALL: [Level; 3] = [Level::Lower, Level::Point, Level::Upper];

    /// Name used in scenario labels
    pub fn name(&self) -> &'static str {
        match self {
            Level::Lower => "lower",
            Level::Point => "point",
            Level::Upper => "upper",
        }
    }
}

/// One selection of confidence levels, ordered by rate index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scenario {
    levels: Vec<Level>,
}

impl Scenario {
    /// Level chosen for the rate at `rate_index`
    pub fn level(&self, rate_index: usize) -> Level {
        self.levels[rate_index]
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Pipe-separated label, e.g. `"lower|point|upper"`
    pub fn label(&self) -> String {
        self.levels
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Enumerate all 3^k scenarios for `k` forecasted rates, in fixed
/// lexicographic order
pub fn enumerate_scenarios(k: usize) -> Result<Vec<Scenario>> {
    if k < 1 {
        return Err(EpiError::InvalidParameter(
            "scenario enumeration requires at least one rate".to_string(),
        ));
    }
    let count = 3usize.pow(k as u32);
    let mut scenarios = Vec::with_capacity(count);
    for index in 0..count {
        let mut levels = vec![Level::Point; k];
        let mut remainder = index;
        // Base-3 digits, most significant digit first so rate 0 varies slowest
        for slot in (0..k).rev() {
            levels[slot] = Level::ALL[remainder % 3];
            remainder /= 3;
        }
        scenarios.push(Scenario { levels });
    }
    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_scenarios_are_extremes() {
        let scenarios = enumerate_scenarios(3).unwrap();
        assert_eq!(scenarios[0].label(), "lower|lower|lower");
        assert_eq!(scenarios[26].label(), "upper|upper|upper");
        assert_eq!(scenarios[13].label(), "point|point|point");
    }

    #[test]
    fn zero_rates_is_an_error() {
        assert!(enumerate_scenarios(0).is_err());
    }
}
