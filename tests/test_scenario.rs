use epiforecast::{enumerate_scenarios, Level};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

#[test]
fn three_rates_give_27_distinct_scenarios() {
    let scenarios = enumerate_scenarios(3).unwrap();
    assert_eq!(scenarios.len(), 27);

    let distinct: HashSet<_> = scenarios.iter().map(|s| s.label()).collect();
    assert_eq!(distinct.len(), 27);
}

#[test]
fn four_rates_give_81_distinct_scenarios() {
    let scenarios = enumerate_scenarios(4).unwrap();
    assert_eq!(scenarios.len(), 81);

    let distinct: HashSet<_> = scenarios.iter().map(|s| s.label()).collect();
    assert_eq!(distinct.len(), 81);
}

#[test]
fn order_is_reproducible_across_calls() {
    let first = enumerate_scenarios(3).unwrap();
    let second = enumerate_scenarios(3).unwrap();
    assert_eq!(first, second);

    let first4 = enumerate_scenarios(4).unwrap();
    let second4 = enumerate_scenarios(4).unwrap();
    assert_eq!(first4, second4);
}

#[test]
fn order_is_lexicographic_by_rate_index() {
    let scenarios = enumerate_scenarios(3).unwrap();

    assert_eq!(scenarios[0].label(), "lower|lower|lower");
    assert_eq!(scenarios[1].label(), "lower|lower|point");
    assert_eq!(scenarios[2].label(), "lower|lower|upper");
    assert_eq!(scenarios[3].label(), "lower|point|lower");
    // Rate 0 varies slowest: the first 9 scenarios all hold alpha at lower
    for scenario in &scenarios[..9] {
        assert_eq!(scenario.level(0), Level::Lower);
    }
    assert_eq!(scenarios[26].label(), "upper|upper|upper");
}

#[test]
fn zero_rates_is_rejected() {
    assert!(enumerate_scenarios(0).is_err());
}

#[test]
fn scenario_exposes_per_rate_levels() {
    let scenarios = enumerate_scenarios(3).unwrap();
    // Index 5 in base 3 is 012: lower|point|upper
    let scenario = &scenarios[5];
    assert_eq!(scenario.level(0), Level::Lower);
    assert_eq!(scenario.level(1), Level::Point);
    assert_eq!(scenario.level(2), Level::Upper);
    assert_eq!(scenario.levels().len(), 3);
}
