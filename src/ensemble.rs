//! Scenario ensemble execution
//!
//! Runs one deterministic simulation per enumerated scenario. Scenario tasks
//! are pure and independent, so they fan out over a rayon pool; results are
//! collected in scenario-index order regardless of completion order. A
//! failing scenario becomes a failure record instead of discarding the rest
//! of the ensemble.

use crate::data::{Compartment, InitialState, ModelVariant};
use crate::error::{EpiError, Result};
use crate::forecast::RateForecast;
use crate::scenario::{enumerate_scenarios, Scenario};
use crate::simulation::{simulate, SimulationConfig, Trajectory};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Options for one ensemble run
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsembleConfig {
    /// Worker count: `None` for one worker per available core, `Some(1)` for
    /// sequential execution
    pub parallelism: Option<usize>,
    pub simulation: SimulationConfig,
}

/// Record of a single scenario that failed to simulate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFailure {
    pub scenario_index: usize,
    pub scenario: Scenario,
    pub error: String,
}

/// Ensemble of per-scenario trajectories, indexed by scenario
#[derive(Debug, Clone)]
pub struct EnsembleResult {
    variant: ModelVariant,
    horizon: usize,
    scenarios: Vec<Scenario>,
    /// One slot per scenario; `None` where that scenario failed
    trajectories: Vec<Option<Trajectory>>,
    failures: Vec<ScenarioFailure>,
}

impl EnsembleResult {
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// All enumerated scenarios, in index order
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Per-scenario trajectory slots, `None` where the scenario failed
    pub fn trajectories(&self) -> &[Option<Trajectory>] {
        &self.trajectories
    }

    pub fn failures(&self) -> &[ScenarioFailure] {
        &self.failures
    }

    /// Number of scenarios that simulated successfully
    pub fn success_count(&self) -> usize {
        self.trajectories.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fail-fast accessor: the ensemble itself when every scenario
    /// succeeded, [`EpiError::PartialEnsemble`] otherwise
    pub fn into_complete(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(EpiError::PartialEnsemble {
                failed: self.failures.len(),
                total: self.scenarios.len(),
            })
        }
    }

    /// Matrix of one compartment over the surviving scenarios:
    /// (scenario index, horizon series) pairs
    pub fn compartment_matrix(&self, compartment: Compartment) -> Vec<(usize, Vec<f64>)> {
        self.trajectories
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_ref()
                    .and_then(|t| t.compartment_series(compartment))
                    .map(|series| (index, series))
            })
            .collect()
    }
}

/// Run the scenario ensemble for a forecast.
///
/// Every enumerated scenario is simulated once; partial failures are
/// recorded, and only an ensemble with zero surviving scenarios is an error.
pub fn run_ensemble(
    forecast: &RateForecast,
    initial: &InitialState,
    population: &[f64],
    config: &EnsembleConfig,
) -> Result<EnsembleResult> {
    let variant = forecast.variant();
    if initial.variant() != variant {
        return Err(EpiError::InvalidParameter(format!(
            "initial state variant {:?} does not match forecast variant {:?}",
            initial.variant(),
            variant
        )));
    }
    let scenarios = enumerate_scenarios(variant.rate_count())?;
    let horizon = forecast.horizon();

    let run_one = |(index, scenario): (usize, &Scenario)| {
        forecast
            .scenario_rates(scenario)
            .and_then(|rates| simulate(variant, &rates, initial, population, &config.simulation))
            .map_err(|error| ScenarioFailure {
                scenario_index: index,
                scenario: scenario.clone(),
                error: error.to_string(),
            })
    };

    let workers = config.parallelism.unwrap_or_else(num_cpus::get).max(1);
    let outcomes: Vec<std::result::Result<Trajectory, ScenarioFailure>> = if workers == 1 {
        scenarios.iter().enumerate().map(run_one).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EpiError::InvalidParameter(format!("thread pool: {}", e)))?;
        pool.install(|| scenarios.par_iter().enumerate().map(run_one).collect())
    };

    let mut trajectories = Vec::with_capacity(scenarios.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(trajectory) => trajectories.push(Some(trajectory)),
            Err(failure) => {
                warn!(
                    scenario = %failure.scenario,
                    error = %failure.error,
                    "scenario simulation failed"
                );
                trajectories.push(None);
                failures.push(failure);
            }
        }
    }

    let successes = trajectories.iter().filter(|t| t.is_some()).count();
    if successes == 0 {
        return Err(EpiError::EmptyEnsemble {
            failed: failures.len(),
        });
    }
    debug!(
        scenarios = scenarios.len(),
        successes,
        failures = failures.len(),
        workers,
        "ensemble run complete"
    );

    Ok(EnsembleResult {
        variant,
        horizon,
        scenarios,
        trajectories,
        failures,
    })
}
