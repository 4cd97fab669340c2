//! Logit and logistic transforms for rate series

use crate::error::{EpiError, Result};

/// Logit transform: ln(p / (1 - p)), defined on the open interval (0, 1)
pub fn logit(p: f64) -> Result<f64> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return Err(EpiError::InvalidRate(p));
    }
    Ok((p / (1.0 - p)).ln())
}

/// Logit with the input clamped into [eps, 1 - eps] first
pub fn logit_clamped(p: f64, eps: f64) -> Result<f64> {
    if !p.is_finite() {
        return Err(EpiError::InvalidRate(p));
    }
    logit(p.clamp(eps, 1.0 - eps))
}

/// Logistic function: 1 / (1 + e^-x), the inverse of [`logit`]
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
