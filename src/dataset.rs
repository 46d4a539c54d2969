//! Hourly supply and demand profiles.
use crate::source::EnergySource;
use anyhow::{Context, Result, bail, ensure};
use chrono::{NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;
use strum::IntoEnumIterator;

/// The number of hourly samples in one representative week
pub const HOURS_PER_WEEK: usize = 168;

/// A named series in a [`ProfileDataset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSeries {
    /// Power demanded
    Demand,
    /// Demand not met by any source
    Unmet,
    /// Total power supplied by all sources
    Supply,
    /// Power generated by a single source
    Source(EnergySource),
}

impl ProfileSeries {
    /// Iterate over every series in the order used for output files
    pub fn all() -> impl Iterator<Item = ProfileSeries> {
        [Self::Demand, Self::Unmet, Self::Supply]
            .into_iter()
            .chain(EnergySource::iter().map(Self::Source))
    }
}

impl fmt::Display for ProfileSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demand => write!(f, "demand"),
            Self::Unmet => write!(f, "unmet"),
            Self::Supply => write!(f, "supply"),
            Self::Source(source) => write!(f, "{source}"),
        }
    }
}

/// A set of hourly time series sharing one time index.
///
/// The dataset is validated when constructed: the index is strictly increasing in steps of one
/// hour, every [`ProfileSeries`] is present and all values are finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDataset {
    index: Vec<NaiveDateTime>,
    units: String,
    series: IndexMap<ProfileSeries, Vec<f64>>,
}

impl ProfileDataset {
    /// Create a new validated dataset
    pub fn new(
        index: Vec<NaiveDateTime>,
        units: String,
        mut series: IndexMap<ProfileSeries, Vec<f64>>,
    ) -> Result<Self> {
        check_index(&index)?;

        let mut ordered = IndexMap::with_capacity(series.len());
        for name in ProfileSeries::all() {
            let values = series
                .shift_remove(&name)
                .with_context(|| format!("Missing series: {name}"))?;
            ensure!(
                values.len() == index.len(),
                "Series {name} has {} values but the time index has {}",
                values.len(),
                index.len()
            );
            ensure!(
                values.iter().all(|value| value.is_finite() && *value >= 0.0),
                "Series {name} contains negative or non-finite values"
            );
            ordered.insert(name, values);
        }

        Ok(Self {
            index,
            units,
            series: ordered,
        })
    }

    /// Create a dataset sharing this dataset's time index and units.
    ///
    /// The series must already satisfy the invariants checked by [`ProfileDataset::new`].
    pub(crate) fn with_series(&self, series: IndexMap<ProfileSeries, Vec<f64>>) -> Self {
        debug_assert!(
            ProfileSeries::all().all(|name| series.get(&name).map(Vec::len) == Some(self.len()))
        );

        Self {
            index: self.index.clone(),
            units: self.units.clone(),
            series,
        }
    }

    /// The number of hourly samples
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the dataset contains no samples
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The time index
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// The units of the series values
    pub fn units(&self) -> &str {
        &self.units
    }

    /// The values of a series
    pub fn series(&self, name: ProfileSeries) -> &[f64] {
        &self.series[&name]
    }

    /// The generation of a single source
    pub fn source(&self, source: EnergySource) -> &[f64] {
        self.series(ProfileSeries::Source(source))
    }

    /// Iterate over all series in output order
    pub fn iter(&self) -> impl Iterator<Item = (ProfileSeries, &[f64])> {
        self.series
            .iter()
            .map(|(name, values)| (*name, values.as_slice()))
    }

    /// A new dataset containing `len` samples starting at `start`
    pub fn window(&self, start: usize, len: usize) -> Result<Self> {
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.len())
            .with_context(|| {
                format!(
                    "Window of {len} hours starting at hour {start} exceeds dataset of {} hours",
                    self.len()
                )
            })?;

        Ok(Self {
            index: self.index[start..end].to_vec(),
            units: self.units.clone(),
            series: self
                .series
                .iter()
                .map(|(name, values)| (*name, values[start..end].to_vec()))
                .collect(),
        })
    }

    /// The week with the given (zero-based) index
    pub fn week(&self, week: usize) -> Result<Self> {
        let start = week
            .checked_mul(HOURS_PER_WEEK)
            .context("Week index is too large")?;
        self.window(start, HOURS_PER_WEEK)
            .with_context(|| format!("Invalid week index: {week}"))
    }
}

/// Check that the time index is strictly increasing in steps of one hour
fn check_index(index: &[NaiveDateTime]) -> Result<()> {
    let step = TimeDelta::hours(1);
    if let Some((prev, next)) = index
        .iter()
        .tuple_windows()
        .find(|(prev, next)| **next - **prev != step)
    {
        ensure!(next > prev, "Time index must be strictly increasing ({next} follows {prev})");
        bail!("Time index must have an hourly cadence ({next} follows {prev})");
    }

    Ok(())
}
