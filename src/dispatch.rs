//! Code for allocating generation to meet demand.
//!
//! Every hour, the output of the non-dispatchable sources is taken as given. Any remaining demand
//! is met by the single active dispatchable source, up to what it has available, and whatever is
//! still left over is unmet.
use crate::dataset::{ProfileDataset, ProfileSeries};
use crate::source::{EnergySource, SourceMap};
use crate::units::Dimensionless;
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use thiserror::Error;

/// The fraction of each source's generation shape which is built
pub type Allocations = SourceMap<Dimensionless>;

/// An allocation the dispatch model cannot handle
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// More than one dispatchable source has a non-zero allocation
    #[error(
        "Unsupported allocation: at most one dispatchable source may be allocated, but found {}",
        .0.iter().join(", ")
    )]
    UnsupportedAllocation(Vec<EnergySource>),
}

/// The dispatchable source with a non-zero allocation, if any
fn active_dispatchable(allocations: &Allocations) -> Result<Option<EnergySource>, DispatchError> {
    let active = EnergySource::dispatchable()
        .filter(|source| allocations[*source] > Dimensionless(0.0))
        .collect_vec();

    match active.as_slice() {
        [] => Ok(None),
        [source] => Ok(Some(*source)),
        _ => Err(DispatchError::UnsupportedAllocation(active)),
    }
}

/// Attribute excess non-dispatchable generation in one hour to the sources which produced it.
///
/// If the combined output of the non-dispatchable sources exceeds demand, each source is assigned
/// a share of the excess proportional to its output. Dispatchable sources are never in excess.
///
/// # Returns
///
/// The excess attributed to each source.
pub fn attribute_excess(demand: f64, generated: &SourceMap<f64>) -> SourceMap<f64> {
    let total: f64 = EnergySource::non_dispatchable()
        .map(|source| generated[source])
        .sum();
    let excess = total - demand;

    generated.map(|source, value| {
        if source.is_dispatchable() || excess <= 0.0 {
            0.0
        } else {
            value * excess / total
        }
    })
}

/// Allocate generation to meet demand in every hour of a profile dataset.
///
/// # Arguments
///
/// * `allocations` - Fraction of each source's shape which is built
/// * `profiles` - Demand and the generation shape of every source
///
/// # Returns
///
/// A new dataset with the same index in which each source series is the allocated generation,
/// `supply` is the total generation and `unmet` is demand which could not be met.
pub fn allocate(
    allocations: &Allocations,
    profiles: &ProfileDataset,
) -> Result<ProfileDataset, DispatchError> {
    let dispatchable = active_dispatchable(allocations)?;
    let scaled = SourceMap::from_fn(|source| {
        let fraction = allocations[source].value();
        profiles
            .source(source)
            .iter()
            .map(|value| value * fraction)
            .collect_vec()
    });

    let demand = profiles.series(ProfileSeries::Demand);
    let mut unmet = Vec::with_capacity(demand.len());
    let mut supply = Vec::with_capacity(demand.len());
    let mut dispatched = Vec::with_capacity(demand.len());
    for (hour, demand) in demand.iter().enumerate() {
        let generated: f64 = EnergySource::non_dispatchable()
            .map(|source| scaled[source][hour])
            .sum();
        let needed = (demand - generated).max(0.0);
        let available = dispatchable.map_or(0.0, |source| scaled[source][hour]);
        let used = available.min(needed);

        unmet.push(needed - used);
        supply.push(generated + used);
        dispatched.push(used);
    }

    debug!(
        "Allocated generation over {} hours (dispatchable source: {}, unmet: {:.1})",
        profiles.len(),
        dispatchable.map_or("none".to_string(), |source| source.to_string()),
        unmet.iter().sum::<f64>()
    );

    let mut series = IndexMap::new();
    series.insert(ProfileSeries::Demand, demand.to_vec());
    series.insert(ProfileSeries::Unmet, unmet);
    series.insert(ProfileSeries::Supply, supply);
    for (source, values) in scaled.iter() {
        let values = if Some(source) == dispatchable {
            std::mem::take(&mut dispatched)
        } else {
            values.clone()
        };
        series.insert(ProfileSeries::Source(source), values);
    }

    Ok(profiles.with_series(series))
}
