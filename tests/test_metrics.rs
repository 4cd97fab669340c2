use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use epiforecast::{evaluate, EpiError, TimeSeries};

fn daily(start_day: u32, values: Vec<f64>) -> TimeSeries {
    let first = Utc.with_ymd_and_hms(2023, 1, start_day, 0, 0, 0).unwrap();
    let timestamps: Vec<DateTime<Utc>> = (0..values.len())
        .map(|i| first + Duration::days(i as i64))
        .collect();
    TimeSeries::new(timestamps, values).unwrap()
}

#[test]
fn known_error_values() {
    let truth = daily(1, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    let forecast = daily(1, vec![12.0, 18.0, 33.0, 37.0, 52.0]);

    let report = evaluate(&forecast, &truth).unwrap();

    assert_eq!(report.n_points, 5);
    assert_eq!(report.excluded_points, 0);
    // Absolute errors are 2, 2, 3, 3, 2
    assert_relative_eq!(report.mae, 2.4, max_relative = 1e-9);
    assert_relative_eq!(report.rmse, 6.0_f64.sqrt(), max_relative = 1e-9);
    assert!(report.mape > 0.0 && report.mape < 15.0);
    assert!(report.smape > 0.0 && report.smape < 15.0);
}

#[test]
fn perfect_forecast_scores_zero() {
    let truth = daily(1, vec![5.0, 6.0, 7.0]);
    let report = evaluate(&truth, &truth).unwrap();

    assert_relative_eq!(report.mae, 0.0);
    assert_relative_eq!(report.rmse, 0.0);
    assert_relative_eq!(report.mape, 0.0);
    assert_relative_eq!(report.smape, 0.0);
}

#[test]
fn zero_truth_points_are_excluded_from_mape() {
    let truth = daily(1, vec![0.0, 10.0, 20.0]);
    let forecast = daily(1, vec![1.0, 11.0, 22.0]);

    let report = evaluate(&forecast, &truth).unwrap();

    assert_eq!(report.n_points, 3);
    assert_eq!(report.excluded_points, 1);
    // MAPE over the two non-zero points: (10% + 10%) / 2
    assert_relative_eq!(report.mape, 10.0, max_relative = 1e-9);
    assert!(report.mape.is_finite());
}

#[test]
fn all_zero_truth_yields_zero_mape_not_nan() {
    let truth = daily(1, vec![0.0, 0.0]);
    let forecast = daily(1, vec![1.0, 2.0]);

    let report = evaluate(&forecast, &truth).unwrap();
    assert_eq!(report.excluded_points, 2);
    assert_relative_eq!(report.mape, 0.0);
    // SMAPE stays defined: both-zero cells contribute zero
    assert!(report.smape.is_finite());
}

#[test]
fn disjoint_indices_are_an_alignment_error() {
    let truth = daily(1, vec![1.0, 2.0, 3.0]);
    let forecast = daily(10, vec![1.0, 2.0, 3.0]);

    let result = evaluate(&forecast, &truth);
    assert!(matches!(result, Err(EpiError::Alignment(_))));
}

#[test]
fn only_the_timestamp_intersection_is_compared() {
    let truth = daily(1, vec![10.0, 20.0, 30.0, 40.0]); // Jan 1..4
    let forecast = daily(3, vec![31.0, 41.0, 99.0]); // Jan 3..5

    let report = evaluate(&forecast, &truth).unwrap();

    // Overlap is Jan 3 and Jan 4
    assert_eq!(report.n_points, 2);
    assert_relative_eq!(report.mae, 1.0, max_relative = 1e-9);
}

#[test]
fn report_displays_all_metrics() {
    let truth = daily(1, vec![10.0, 20.0]);
    let forecast = daily(1, vec![11.0, 19.0]);

    let rendered = evaluate(&forecast, &truth).unwrap().to_string();
    for token in ["MAE", "RMSE", "MAPE", "SMAPE"] {
        assert!(rendered.contains(token), "missing {}", token);
    }
}
