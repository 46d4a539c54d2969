//! Energy sources and maps keyed by them.
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::ops::{Index, IndexMut};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// A source of electricity.
///
/// The declaration order is significant: it is the order in which sources appear in profile
/// datasets, output files and encoded slider states.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum EnergySource {
    /// Solar photovoltaics
    #[string = "solar"]
    Solar,
    /// Onshore and offshore wind
    #[string = "wind"]
    Wind,
    /// Run-of-river and reservoir hydro
    #[string = "hydro"]
    Hydro,
    /// Nuclear fission
    #[string = "nuclear"]
    Nuclear,
    /// Natural gas
    #[string = "ng"]
    NaturalGas,
    /// Coal
    #[string = "coal"]
    Coal,
    /// Battery storage
    #[string = "battery"]
    Battery,
    /// Hydrogen storage
    #[string = "h2"]
    Hydrogen,
}

/// How the output of a source can be controlled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchCategory {
    /// Output follows the weather or runs as baseload
    NonDispatchable,
    /// Output can be ramped up and down to follow demand
    Dispatchable,
    /// Stored energy that is discharged on demand
    Storage,
}

impl EnergySource {
    /// The dispatch category of this source.
    ///
    /// This is intrinsic to the technology and cannot be configured.
    pub fn category(self) -> DispatchCategory {
        match self {
            Self::NaturalGas => DispatchCategory::Dispatchable,
            Self::Battery | Self::Hydrogen => DispatchCategory::Storage,
            _ => DispatchCategory::NonDispatchable,
        }
    }

    /// Whether output can be dispatched to follow demand (storage included)
    pub fn is_dispatchable(self) -> bool {
        self.category() != DispatchCategory::NonDispatchable
    }

    /// Whether this is a storage technology
    pub fn is_storage(self) -> bool {
        self.category() == DispatchCategory::Storage
    }

    /// Iterate over the sources whose output cannot be dispatched
    pub fn non_dispatchable() -> impl Iterator<Item = EnergySource> {
        Self::iter().filter(|source| !source.is_dispatchable())
    }

    /// Iterate over the dispatchable sources (storage included)
    pub fn dispatchable() -> impl Iterator<Item = EnergySource> {
        Self::iter().filter(|source| source.is_dispatchable())
    }
}

/// A map containing exactly one value for every [`EnergySource`], in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<EnergySource, T>")]
pub struct SourceMap<T>(IndexMap<EnergySource, T>);

impl<T> SourceMap<T> {
    /// Create a new map by calling `f` for every source
    pub fn from_fn<F: FnMut(EnergySource) -> T>(mut f: F) -> Self {
        Self(EnergySource::iter().map(|source| (source, f(source))).collect())
    }

    /// Iterate over sources and values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (EnergySource, &T)> {
        self.0.iter().map(|(source, value)| (*source, value))
    }

    /// Iterate over values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }

    /// Create a new map by transforming every value
    pub fn map<U, F: FnMut(EnergySource, &T) -> U>(&self, mut f: F) -> SourceMap<U> {
        SourceMap(
            self.0
                .iter()
                .map(|(source, value)| (*source, f(*source, value)))
                .collect(),
        )
    }
}

impl<T: Default> Default for SourceMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<EnergySource> for SourceMap<T> {
    type Output = T;

    fn index(&self, source: EnergySource) -> &T {
        &self.0[&source]
    }
}

impl<T> IndexMut<EnergySource> for SourceMap<T> {
    fn index_mut(&mut self, source: EnergySource) -> &mut T {
        &mut self.0[&source]
    }
}

impl<T> TryFrom<IndexMap<EnergySource, T>> for SourceMap<T> {
    type Error = anyhow::Error;

    fn try_from(mut map: IndexMap<EnergySource, T>) -> Result<Self> {
        let missing = EnergySource::iter()
            .filter(|source| !map.contains_key(source))
            .collect_vec();
        ensure!(
            missing.is_empty(),
            "Missing entries for energy sources: {}",
            missing.iter().join(", ")
        );

        // Put entries into declaration order
        map.sort_unstable_keys();
        Ok(Self(map))
    }
}

impl<T: Serialize> Serialize for SourceMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
