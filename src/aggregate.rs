//! Ensemble aggregation into central-tendency series
//!
//! Collapses the scenario axis of an ensemble, per compartment and per time
//! step, with one or more central-tendency methods. Geometric and harmonic
//! means require strictly positive cells; a degenerate cell falls back to the
//! arithmetic mean and is recorded as a warning instead of failing the run.

use crate::data::Compartment;
use crate::ensemble::EnsembleResult;
use crate::error::{EpiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Statistic summarizing the scenario ensemble into one series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CentralTendency {
    Mean,
    Median,
    GeometricMean,
    HarmonicMean,
}

impl CentralTendency {
    /// All methods in canonical order
    pub const ALL: [CentralTendency; 4] = [
        CentralTendency::Mean,
        CentralTendency::Median,
        CentralTendency::GeometricMean,
        CentralTendency::HarmonicMean,
    ];

    /// Short name matching result column labels
    pub fn name(&self) -> &'static str {
        match self {
            CentralTendency::Mean => "mean",
            CentralTendency::Median => "median",
            CentralTendency::GeometricMean => "gmean",
            CentralTendency::HarmonicMean => "hmean",
        }
    }
}

/// A (time, compartment, method) cell where the geometric or harmonic mean
/// was undefined and the arithmetic mean was substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateCell {
    pub compartment: Compartment,
    pub time_index: usize,
    pub method: CentralTendency,
}

/// Central-tendency series per compartment, with the raw ensemble retained
/// for uncertainty bands
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    horizon: usize,
    series: BTreeMap<Compartment, BTreeMap<CentralTendency, Vec<f64>>>,
    warnings: Vec<DegenerateCell>,
    ensemble: EnsembleResult,
}

impl AggregatedResult {
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Aggregated series for one compartment and method
    pub fn series(&self, compartment: Compartment, method: CentralTendency) -> Option<&[f64]> {
        self.series
            .get(&compartment)
            .and_then(|methods| methods.get(&method))
            .map(Vec::as_slice)
    }

    /// Degenerate-cell substitutions recorded during aggregation
    pub fn warnings(&self) -> &[DegenerateCell] {
        &self.warnings
    }

    /// The raw ensemble the aggregation was computed from
    pub fn ensemble(&self) -> &EnsembleResult {
        &self.ensemble
    }

    /// Per-step (min, max) across surviving scenarios, as an uncertainty band
    pub fn envelope(&self, compartment: Compartment) -> Option<(Vec<f64>, Vec<f64>)> {
        let matrix = self.ensemble.compartment_matrix(compartment);
        if matrix.is_empty() {
            return None;
        }
        let horizon = self.horizon;
        let mut min = vec![f64::INFINITY; horizon];
        let mut max = vec![f64::NEG_INFINITY; horizon];
        for (_, series) in &matrix {
            for (t, &value) in series.iter().enumerate() {
                min[t] = min[t].min(value);
                max[t] = max[t].max(value);
            }
        }
        Some((min, max))
    }
}

/// Collapse an ensemble into central-tendency series per compartment.
///
/// Failed scenarios are skipped; the surviving subset is aggregated.
pub fn aggregate(ensemble: EnsembleResult, methods: &[CentralTendency]) -> Result<AggregatedResult> {
    if methods.is_empty() {
        return Err(EpiError::InvalidParameter(
            "at least one central-tendency method is required".to_string(),
        ));
    }
    if ensemble.success_count() == 0 {
        return Err(EpiError::EmptyEnsemble {
            failed: ensemble.failures().len(),
        });
    }

    let horizon = ensemble.horizon();
    let mut series: BTreeMap<Compartment, BTreeMap<CentralTendency, Vec<f64>>> = BTreeMap::new();
    let mut warnings = Vec::new();

    for &compartment in ensemble.variant().compartments() {
        let matrix = ensemble.compartment_matrix(compartment);
        let mut per_method: BTreeMap<CentralTendency, Vec<f64>> = BTreeMap::new();
        for &method in methods {
            let mut collapsed = Vec::with_capacity(horizon);
            for t in 0..horizon {
                let cell: Vec<f64> = matrix.iter().map(|(_, s)| s[t]).collect();
                let value = match collapse_cell(&cell, method) {
                    Some(v) => v,
                    None => {
                        warn!(
                            compartment = compartment.code(),
                            time_index = t,
                            method = method.name(),
                            "degenerate cell, substituting arithmetic mean"
                        );
                        warnings.push(DegenerateCell {
                            compartment,
                            time_index: t,
                            method,
                        });
                        arithmetic_mean(&cell)
                    }
                };
                collapsed.push(value);
            }
            per_method.insert(method, collapsed);
        }
        series.insert(compartment, per_method);
    }

    Ok(AggregatedResult {
        horizon,
        series,
        warnings,
        ensemble,
    })
}

/// Collapse one cell; `None` when the method is undefined for these values
fn collapse_cell(values: &[f64], method: CentralTendency) -> Option<f64> {
    match method {
        CentralTendency::Mean => Some(arithmetic_mean(values)),
        CentralTendency::Median => Some(median(values)),
        CentralTendency::GeometricMean => {
            if values.iter().any(|&v| v <= 0.0) {
                None
            } else {
                let log_mean = values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64;
                Some(log_mean.exp())
            }
        }
        CentralTendency::HarmonicMean => {
            if values.iter().any(|&v| v <= 0.0) {
                None
            } else {
                Some(values.len() as f64 / values.iter().map(|v| 1.0 / v).sum::<f64>())
            }
        }
    }
}

fn arithmetic_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_count_is_midpoint() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn geometric_mean_of_positive_values() {
        let v = collapse_cell(&[2.0, 8.0], CentralTendency::GeometricMean).unwrap();
        assert!((v - 4.0).abs() < 1e-12);
    }

    #[test]
    fn nonpositive_cell_is_degenerate_for_gmean_and_hmean() {
        assert!(collapse_cell(&[1.0, 0.0], CentralTendency::GeometricMean).is_none());
        assert!(collapse_cell(&[1.0, -2.0], CentralTendency::HarmonicMean).is_none());
        assert!(collapse_cell(&[1.0, 0.0], CentralTendency::Mean).is_some());
    }
}
