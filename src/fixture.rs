//! Fixtures for tests
use crate::dataset::{ProfileDataset, ProfileSeries};
use crate::parameters::ScenarioParameters;
use crate::source::{EnergySource, SourceMap};
use crate::units::Dimensionless;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use rstest::fixture;
use strum::IntoEnumIterator;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The first timestamp of test datasets
pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Build a dataset from a demand series and the shapes of some sources.
///
/// Sources which are not listed have a shape of zero.
pub fn dataset(demand: &[f64], shapes: &[(EnergySource, Vec<f64>)]) -> ProfileDataset {
    let index = (0..demand.len())
        .map(|hour| start_time() + TimeDelta::hours(hour as i64))
        .collect();

    let mut series = IndexMap::new();
    series.insert(ProfileSeries::Demand, demand.to_vec());
    series.insert(ProfileSeries::Unmet, demand.to_vec());
    series.insert(ProfileSeries::Supply, vec![0.0; demand.len()]);
    for source in EnergySource::iter() {
        let shape = shapes
            .iter()
            .find(|(s, _)| *s == source)
            .map_or_else(|| vec![0.0; demand.len()], |(_, shape)| shape.clone());
        series.insert(ProfileSeries::Source(source), shape);
    }

    ProfileDataset::new(index, "MW".into(), series).unwrap()
}

/// A dataset with constant demand where every source has the same constant shape
pub fn flat_dataset(hours: usize, demand: f64, shape: f64) -> ProfileDataset {
    let shapes: Vec<_> = EnergySource::iter()
        .map(|source| (source, vec![shape; hours]))
        .collect();
    dataset(&vec![demand; hours], &shapes)
}

/// Allocations with the listed fractions and zero for every other source
pub fn allocations(fractions: &[(EnergySource, f64)]) -> SourceMap<Dimensionless> {
    SourceMap::from_fn(|source| {
        let fraction = fractions
            .iter()
            .find(|(s, _)| *s == source)
            .map_or(0.0, |(_, fraction)| *fraction);
        Dimensionless(fraction)
    })
}

#[fixture]
pub fn parameters() -> ScenarioParameters {
    ScenarioParameters::default()
}
