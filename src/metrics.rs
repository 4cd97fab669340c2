//! Metrics for evaluating forecast performance against held-out data

use crate::data::TimeSeries;
use crate::error::{EpiError, Result};
use serde::{Deserialize, Serialize};

/// Forecast accuracy report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (percent)
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error (percent)
    pub smape: f64,
    /// Number of aligned points evaluated
    pub n_points: usize,
    /// Points with zero ground truth, excluded from MAPE
    pub excluded_points: usize,
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Evaluation ({} points):", self.n_points)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}% ({} zero-truth points excluded)", self.mape, self.excluded_points)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

/// Evaluate a forecast series against ground truth, aligned by timestamp.
///
/// Only timestamps present in both series are compared; an empty
/// intersection is an [`EpiError::Alignment`]. Points where the truth is
/// zero are excluded from MAPE and counted, rather than propagating NaN.
pub fn evaluate(forecast: &TimeSeries, truth: &TimeSeries) -> Result<EvaluationReport> {
    let mut pairs: Vec<(f64, f64)> = Vec::new();
    let mut truth_iter = truth.iter().peekable();
    // Both indices are strictly increasing, so a merge walk aligns them
    for (ts, predicted) in forecast.iter() {
        while truth_iter.peek().is_some_and(|(t, _)| *t < ts) {
            truth_iter.next();
        }
        if let Some(&(t, actual)) = truth_iter.peek() {
            if t == ts {
                pairs.push((predicted, actual));
                truth_iter.next();
            }
        }
    }

    if pairs.is_empty() {
        return Err(EpiError::Alignment(
            "forecast and ground-truth indices do not overlap".to_string(),
        ));
    }

    let n = pairs.len() as f64;
    let mae = pairs.iter().map(|(p, a)| (a - p).abs()).sum::<f64>() / n;
    let rmse = (pairs.iter().map(|(p, a)| (a - p).powi(2)).sum::<f64>() / n).sqrt();

    let nonzero: Vec<&(f64, f64)> = pairs.iter().filter(|(_, a)| *a != 0.0).collect();
    let excluded_points = pairs.len() - nonzero.len();
    let mape = if nonzero.is_empty() {
        0.0
    } else {
        nonzero
            .iter()
            .map(|(p, a)| ((a - p).abs() / a.abs()) * 100.0)
            .sum::<f64>()
            / nonzero.len() as f64
    };

    let smape = pairs
        .iter()
        .map(|(p, a)| {
            let denominator = a.abs() + p.abs();
            if denominator == 0.0 {
                0.0
            } else {
                200.0 * (a - p).abs() / denominator
            }
        })
        .sum::<f64>()
        / n;

    Ok(EvaluationReport {
        mae,
        rmse,
        mape,
        smape,
        n_points: pairs.len(),
        excluded_points,
    })
}
