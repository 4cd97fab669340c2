use approx::assert_relative_eq;
use epiforecast::{
    aggregate, run_ensemble, CentralTendency, Compartment, EnsembleConfig, EpiError, Frequency,
    InitialState, ModelVariant, RateForecast,
};

fn forecast_from_levels(
    horizon: usize,
    lower: &[f64],
    point: &[f64],
    upper: &[f64],
) -> RateForecast {
    let expand = |values: &[f64]| -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v; horizon]).collect()
    };
    RateForecast::from_bands(
        ModelVariant::Sird,
        Frequency::Annual,
        expand(lower),
        expand(point),
        expand(upper),
    )
    .unwrap()
}

fn run(
    forecast: &RateForecast,
    initial: &InitialState,
) -> epiforecast::EnsembleResult {
    let population = vec![initial.total(); forecast.horizon()];
    run_ensemble(forecast, initial, &population, &EnsembleConfig::default()).unwrap()
}

#[test]
fn identical_scenarios_collapse_to_the_same_series_for_every_method() {
    // All three bands equal, so all 27 trajectories are identical and every
    // central tendency agrees
    let horizon = 6;
    let rates = [0.4, 0.1, 0.02];
    let forecast = forecast_from_levels(horizon, &rates, &rates, &rates);
    let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);
    let ensemble = run(&forecast, &initial);
    let reference = ensemble.trajectories()[0]
        .as_ref()
        .unwrap()
        .compartment_series(Compartment::Infected)
        .unwrap();

    let result = aggregate(ensemble, &CentralTendency::ALL).unwrap();

    assert!(result.warnings().is_empty());
    for method in CentralTendency::ALL {
        let series = result.series(Compartment::Infected, method).unwrap();
        assert_eq!(series.len(), horizon);
        for (a, b) in series.iter().zip(reference.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-9);
        }
    }
}

#[test]
fn mean_lies_within_the_scenario_envelope() {
    let horizon = 5;
    let forecast = forecast_from_levels(
        horizon,
        &[0.3, 0.08, 0.01],
        &[0.4, 0.10, 0.02],
        &[0.5, 0.12, 0.03],
    );
    let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);
    let result = aggregate(run(&forecast, &initial), &[CentralTendency::Mean]).unwrap();

    let mean = result.series(Compartment::Infected, CentralTendency::Mean).unwrap().to_vec();
    let (min, max) = result.envelope(Compartment::Infected).unwrap();
    for t in 0..horizon {
        assert!(min[t] <= mean[t] && mean[t] <= max[t]);
    }
}

#[test]
fn aggregation_orders_geometric_below_arithmetic_mean() {
    // AM-GM-HM inequality on strictly positive, non-identical cells
    let horizon = 5;
    let forecast = forecast_from_levels(
        horizon,
        &[0.3, 0.08, 0.01],
        &[0.4, 0.10, 0.02],
        &[0.5, 0.12, 0.03],
    );
    let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);
    let result = aggregate(run(&forecast, &initial), &CentralTendency::ALL).unwrap();
    assert!(result.warnings().is_empty());

    let mean = result.series(Compartment::Infected, CentralTendency::Mean).unwrap();
    let gmean = result.series(Compartment::Infected, CentralTendency::GeometricMean).unwrap();
    let hmean = result.series(Compartment::Infected, CentralTendency::HarmonicMean).unwrap();
    for t in 0..horizon {
        assert!(hmean[t] <= gmean[t] + 1e-9);
        assert!(gmean[t] <= mean[t] + 1e-9);
    }
}

#[test]
fn nonpositive_cells_fall_back_to_mean_with_warnings() {
    // Zero initial infections keep I at zero everywhere, which is degenerate
    // for the geometric and harmonic means
    let horizon = 4;
    let rates = [0.4, 0.1, 0.02];
    let forecast = forecast_from_levels(horizon, &rates, &rates, &rates);
    let initial = InitialState::sird(990_000.0, 0.0, 9_000.0, 1_000.0);
    let result = aggregate(
        run(&forecast, &initial),
        &[CentralTendency::GeometricMean, CentralTendency::HarmonicMean],
    )
    .unwrap();

    // One warning per degenerate (time, method) cell of the I compartment
    assert_eq!(result.warnings().len(), 2 * horizon);
    assert!(result
        .warnings()
        .iter()
        .all(|w| w.compartment == Compartment::Infected));

    // The fallback is the arithmetic mean: all-zero cells aggregate to zero
    let gmean = result.series(Compartment::Infected, CentralTendency::GeometricMean).unwrap();
    assert!(gmean.iter().all(|&v| v == 0.0));

    // Unaffected compartments still aggregate with the requested method
    let susceptible = result
        .series(Compartment::Susceptible, CentralTendency::GeometricMean)
        .unwrap();
    assert!(susceptible.iter().all(|&v| v > 0.0));
}

#[test]
fn requesting_no_methods_is_rejected() {
    let horizon = 3;
    let rates = [0.4, 0.1, 0.02];
    let forecast = forecast_from_levels(horizon, &rates, &rates, &rates);
    let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);

    let result = aggregate(run(&forecast, &initial), &[]);
    assert!(matches!(result, Err(EpiError::InvalidParameter(_))));
}

#[test]
fn unrequested_methods_are_absent() {
    let horizon = 3;
    let rates = [0.4, 0.1, 0.02];
    let forecast = forecast_from_levels(horizon, &rates, &rates, &rates);
    let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);
    let result = aggregate(run(&forecast, &initial), &[CentralTendency::Mean]).unwrap();

    assert!(result.series(Compartment::Infected, CentralTendency::Mean).is_some());
    assert!(result.series(Compartment::Infected, CentralTendency::Median).is_none());
}

#[test]
fn aggregated_result_retains_the_raw_ensemble() {
    let horizon = 3;
    let rates = [0.4, 0.1, 0.02];
    let forecast = forecast_from_levels(horizon, &rates, &rates, &rates);
    let initial = InitialState::sird(990_000.0, 9_000.0, 800.0, 200.0);
    let result = aggregate(run(&forecast, &initial), &[CentralTendency::Mean]).unwrap();

    assert_eq!(result.ensemble().success_count(), 27);
    assert_eq!(result.horizon(), horizon);
}
