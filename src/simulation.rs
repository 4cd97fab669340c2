//! Deterministic compartmental simulation for one scenario
//!
//! Iterates the discrete SIRD/SIRDV update equations over the forecast
//! horizon using the rate series selected by a single scenario. The update
//! flows are conservative: what leaves one compartment enters another, so the
//! compartment sum tracks the initial total.

use crate::data::{Compartment, CompartmentState, InitialState, ModelVariant};
use crate::error::{EpiError, Result};
use serde::{Deserialize, Serialize};

/// Policy for compartment values that would go negative in low-confidence
/// scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// Floor the compartment at zero and record a diagnostic
    #[default]
    ClampToZero,
    /// Fail the scenario with [`EpiError::NegativeCompartment`]
    RejectScenario,
}

/// Simulation options, shared by every scenario of a run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub clamp_policy: ClampPolicy,
}

/// Rate series selected by one scenario: k columns over the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRates {
    label: String,
    columns: Vec<Vec<f64>>,
}

impl ScenarioRates {
    pub fn new(label: String, columns: Vec<Vec<f64>>) -> Self {
        Self { label, columns }
    }

    /// Scenario label, carried into error context
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rate_count(&self) -> usize {
        self.columns.len()
    }

    /// Horizon implied by the rate columns
    pub fn horizon(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    fn column(&self, rate_index: usize) -> &[f64] {
        &self.columns[rate_index]
    }
}

/// A cell floored to zero by [`ClampPolicy::ClampToZero`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampedCell {
    pub step: usize,
    pub compartment: Compartment,
}

/// Simulated compartment series for one scenario: H+1 states including the
/// initial one, plus clamp diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    states: Vec<CompartmentState>,
    clamped_cells: Vec<ClampedCell>,
}

impl Trajectory {
    /// All states, index 0 being the initial state
    pub fn states(&self) -> &[CompartmentState] {
        &self.states
    }

    /// Simulated states over the horizon (initial state excluded)
    pub fn horizon_states(&self) -> &[CompartmentState] {
        &self.states[1..]
    }

    /// Number of simulated steps
    pub fn horizon(&self) -> usize {
        self.states.len() - 1
    }

    /// Whether any compartment was floor-clamped
    pub fn was_clamped(&self) -> bool {
        !self.clamped_cells.is_empty()
    }

    pub fn clamped_cells(&self) -> &[ClampedCell] {
        &self.clamped_cells
    }

    /// One compartment's series over the horizon; `None` for V under SIRD
    pub fn compartment_series(&self, compartment: Compartment) -> Option<Vec<f64>> {
        self.horizon_states()
            .iter()
            .map(|s| s.value(compartment))
            .collect()
    }
}

/// Simulate one scenario's epidemic trajectory.
///
/// `rates` must span exactly the horizon and `population` carries N(t) for
/// each step; both are validated up front with
/// [`EpiError::DimensionMismatch`].
pub fn simulate(
    variant: ModelVariant,
    rates: &ScenarioRates,
    initial: &InitialState,
    population: &[f64],
    config: &SimulationConfig,
) -> Result<Trajectory> {
    if rates.rate_count() != variant.rate_count() {
        return Err(EpiError::DimensionMismatch {
            context: format!("rate columns for scenario '{}'", rates.label()),
            expected: variant.rate_count(),
            actual: rates.rate_count(),
        });
    }
    if initial.variant() != variant {
        return Err(EpiError::InvalidParameter(format!(
            "initial state variant {:?} does not match model variant {:?}",
            initial.variant(),
            variant
        )));
    }
    let horizon = rates.horizon();
    if horizon == 0 {
        return Err(EpiError::InvalidParameter(
            "simulation horizon must be at least 1".to_string(),
        ));
    }
    if population.len() != horizon {
        return Err(EpiError::DimensionMismatch {
            context: format!("population series for scenario '{}'", rates.label()),
            expected: horizon,
            actual: population.len(),
        });
    }

    let alphas = rates.column(0);
    let betas = rates.column(1);
    let gammas = rates.column(2);
    let deltas = match variant {
        ModelVariant::Sird => None,
        ModelVariant::Sirdv => Some(rates.column(3)),
    };

    let mut states = Vec::with_capacity(horizon + 1);
    let mut clamped_cells = Vec::new();
    let mut current = CompartmentState::from(initial);
    states.push(current);

    for t in 0..horizon {
        let n = population[t];
        if n <= 0.0 {
            return Err(EpiError::InvalidParameter(format!(
                "population must be positive, got {} at step {}",
                n, t
            )));
        }

        let new_infections = current.infected * alphas[t] * current.susceptible / n;
        let recoveries = betas[t] * current.infected;
        let deaths = gammas[t] * current.infected;
        let vaccinations = deltas.map(|d| d[t] * current.susceptible);

        let mut next = CompartmentState {
            susceptible: current.susceptible - new_infections - vaccinations.unwrap_or(0.0),
            infected: current.infected + new_infections - recoveries - deaths,
            recovered: current.recovered + recoveries,
            deceased: current.deceased + deaths,
            vaccinated: match (current.vaccinated, vaccinations) {
                (Some(v), Some(flow)) => Some(v + flow),
                _ => None,
            },
        };

        apply_clamp_policy(&mut next, variant, t, rates.label(), config, &mut clamped_cells)?;

        if !next.total().is_finite() {
            return Err(EpiError::NumericalOverflow {
                step: t,
                scenario: rates.label().to_string(),
            });
        }

        states.push(next);
        current = next;
    }

    Ok(Trajectory {
        states,
        clamped_cells,
    })
}

fn apply_clamp_policy(
    state: &mut CompartmentState,
    variant: ModelVariant,
    step: usize,
    scenario: &str,
    config: &SimulationConfig,
    clamped_cells: &mut Vec<ClampedCell>,
) -> Result<()> {
    for &compartment in variant.compartments() {
        let value = match state.value(compartment) {
            Some(v) => v,
            None => continue,
        };
        if value >= 0.0 {
            continue;
        }
        match config.clamp_policy {
            ClampPolicy::RejectScenario => {
                return Err(EpiError::NegativeCompartment {
                    compartment: compartment.code(),
                    step,
                    scenario: scenario.to_string(),
                });
            }
            ClampPolicy::ClampToZero => {
                match compartment {
                    Compartment::Susceptible => state.susceptible = 0.0,
                    Compartment::Infected => state.infected = 0.0,
                    Compartment::Recovered => state.recovered = 0.0,
                    Compartment::Deceased => state.deceased = 0.0,
                    Compartment::Vaccinated => state.vaccinated = Some(0.0),
                }
                clamped_cells.push(ClampedCell { step, compartment });
            }
        }
    }
    Ok(())
}
