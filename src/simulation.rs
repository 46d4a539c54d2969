//! Functionality for evaluating a scenario.
use crate::dataset::ProfileDataset;
use crate::dispatch::{Allocations, allocate};
use crate::outcome::{RateTable, ScenarioOutcome, summarize};
use crate::parameters::ScenarioParameters;
use anyhow::Result;
use log::info;

/// The result of evaluating a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The allocated hourly profiles
    pub profiles: ProfileDataset,
    /// Cost and emissions of the allocated profiles
    pub outcome: ScenarioOutcome,
}

/// Evaluate a scenario.
///
/// # Arguments
///
/// * `profiles` - Demand and generation shapes
/// * `parameters` - Economic and technical assumptions
/// * `allocations` - Fraction of each source's shape which is built
pub fn evaluate(
    profiles: &ProfileDataset,
    parameters: &ScenarioParameters,
    allocations: &Allocations,
) -> Result<Evaluation> {
    let allocated = allocate(allocations, profiles)?;
    let outcome = summarize(&allocated, &RateTable::new(parameters));

    info!("Total cost: ${:.0}", outcome.cost.value());
    info!("Annual emissions: {:.0} t", outcome.co2.value());
    match outcome.levelised_cost() {
        Some(lcoe) => info!("Levelised cost: ${:.2}/MWh", lcoe.value()),
        None => info!("Levelised cost: n/a (no energy consumed)"),
    }
    if let Some(intensity) = outcome.co2_intensity() {
        info!("Emissions intensity: {intensity:.1} g/kWh");
    }
    info!(
        "Unmet demand in {} of {} hours",
        outcome.unmet_hours,
        allocated.len()
    );

    Ok(Evaluation {
        profiles: allocated,
        outcome,
    })
}
