//! Frequency resampling with role-appropriate aggregation
//!
//! Coarsens a timestamped series from a finer to a coarser reporting
//! frequency. The fold function depends on what the series represents: sum
//! for cumulative counts, mean for rates, last-in-bucket for point-in-time
//! state, max/min as overrides. Equal source and target frequencies return
//! the input unchanged for every role, never a pass-through resample.
//! Confidence bands must be resampled by separate calls per band.

use crate::data::TimeSeries;
use crate::error::{EpiError, Result};
use crate::frequency::Frequency;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// What the series represents, which decides the fold function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationRole {
    /// Cumulative counts: sum over the bucket
    Sum,
    /// Rates and fractions: average over the bucket
    Mean,
    /// Point-in-time state: last value in the bucket
    Last,
    /// Peak override
    Max,
    /// Trough override
    Min,
}

impl AggregationRole {
    pub const ALL: [AggregationRole; 5] = [
        AggregationRole::Sum,
        AggregationRole::Mean,
        AggregationRole::Last,
        AggregationRole::Max,
        AggregationRole::Min,
    ];
}

/// Bucket identity of a timestamp at the target frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketKey {
    Year(i32),
    Month(i32, u32),
    IsoWeek(i32, u32),
}

fn bucket_key(ts: DateTime<Utc>, target: Frequency) -> Option<BucketKey> {
    match target {
        Frequency::Annual => Some(BucketKey::Year(ts.year())),
        Frequency::Monthly => Some(BucketKey::Month(ts.year(), ts.month())),
        Frequency::Weekly => {
            let week = ts.iso_week();
            Some(BucketKey::IsoWeek(week.year(), week.week()))
        }
        Frequency::Daily | Frequency::BusinessDay => None,
    }
}

/// Resample a series from `source` to `target` frequency.
///
/// Only coarsening is supported; `source == target` is an identity for every
/// role. Bucket timestamps are the last source timestamp in each bucket.
pub fn resample(
    series: &TimeSeries,
    source: Frequency,
    target: Frequency,
    role: AggregationRole,
) -> Result<TimeSeries> {
    if source == target {
        return Ok(series.clone());
    }
    if source.profile().periods_per_year <= target.profile().periods_per_year {
        return Err(EpiError::InvalidParameter(format!(
            "cannot resample from {} to finer or equal-rate frequency {}",
            source, target
        )));
    }
    if bucket_key(Utc::now(), target).is_none() {
        return Err(EpiError::InvalidParameter(format!(
            "unsupported resampling target frequency {}",
            target
        )));
    }
    if series.is_empty() {
        return Err(EpiError::InvalidParameter(
            "cannot resample an empty series".to_string(),
        ));
    }

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    let mut bucket: Vec<f64> = Vec::new();
    let mut bucket_end: Option<DateTime<Utc>> = None;
    let mut current_key: Option<BucketKey> = None;

    for (ts, value) in series.iter() {
        let key = bucket_key(ts, target);
        if key != current_key {
            if let (Some(_), Some(end)) = (current_key, bucket_end) {
                timestamps.push(end);
                values.push(fold_bucket(&bucket, role));
                bucket.clear();
            }
            current_key = key;
        }
        bucket_end = Some(ts);
        bucket.push(value);
    }
    if let Some(end) = bucket_end {
        timestamps.push(end);
        values.push(fold_bucket(&bucket, role));
    }

    TimeSeries::new(timestamps, values)
}

fn fold_bucket(values: &[f64], role: AggregationRole) -> f64 {
    match role {
        AggregationRole::Sum => values.iter().sum(),
        AggregationRole::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregationRole::Last => values.last().copied().unwrap_or(f64::NAN),
        AggregationRole::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationRole::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
    }
}
