//! Defines the `ScenarioFile` struct, which represents the contents of `scenario.toml`.
use super::{input_err_msg, read_toml};
use crate::dispatch::Allocations;
use crate::presets::PresetOption;
use crate::source::{EnergySource, SourceMap};
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::path::Path;

const SCENARIO_FILE_NAME: &str = "scenario.toml";

/// Read allocations, treating sources which aren't listed as unallocated
fn deserialise_allocations<'de, D>(deserialiser: D) -> Result<Allocations, D::Error>
where
    D: Deserializer<'de>,
{
    let fractions = IndexMap::<EnergySource, f64>::deserialize(deserialiser)?;
    for (source, fraction) in &fractions {
        if !(0.0..=1.0).contains(fraction) {
            Err(serde::de::Error::custom(format!(
                "Allocation for {source} must be between 0 and 1"
            )))?;
        }
    }

    Ok(SourceMap::from_fn(|source| {
        Dimensionless(fractions.get(&source).copied().unwrap_or(0.0))
    }))
}

/// Represents the contents of the scenario file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ScenarioFile {
    /// Fraction of each source's generation shape which is built
    #[serde(deserialize_with = "deserialise_allocations")]
    pub allocations: Allocations,
    /// A state string to restore slider positions from
    pub state: Option<String>,
    /// A preset to restore slider positions from
    pub preset: Option<PresetOption>,
    /// Index of the week of the profile dataset to evaluate (the first week if omitted)
    pub week: Option<usize>,
}

impl ScenarioFile {
    /// Read the scenario file from the specified model directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ScenarioFile> {
        let file_path = model_dir.as_ref().join(SCENARIO_FILE_NAME);
        let scenario: ScenarioFile = read_toml(&file_path)?;
        scenario
            .validate()
            .with_context(|| input_err_msg(&file_path))?;

        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.state.is_none() || self.preset.is_none(),
            "Only one of state and preset may be given"
        );

        Ok(())
    }

    /// The state string to restore, if any
    pub fn state_string(&self) -> Option<&str> {
        self.state
            .as_deref()
            .or_else(|| self.preset.map(PresetOption::state_string))
    }
}
