//! Common routines for handling input data.
use crate::dataset::{HOURS_PER_WEEK, ProfileDataset};
use crate::parameters::ScenarioParameters;
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod profiles;
use profiles::read_profiles;
pub mod scenario;
use scenario::ScenarioFile;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(vec.into_iter())
}

fn read_csv_internal<'a, T: DeserializeOwned + 'a>(file_path: &'a Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Check whether an iterator contains values that are sorted and unique
pub fn is_sorted_and_unique<T, I>(iter: I) -> bool
where
    T: PartialOrd + Clone,
    I: IntoIterator<Item = T>,
{
    let mut iter = iter.into_iter();
    let Some(mut prev) = iter.next() else {
        return true;
    };

    for value in iter {
        if value <= prev {
            return false;
        }
        prev = value;
    }

    true
}

/// Everything needed to evaluate a scenario, as read from a model directory
#[derive(Debug)]
pub struct Model {
    /// The scenario file
    pub scenario: ScenarioFile,
    /// Parameters the slider state is applied on top of
    pub parameters: ScenarioParameters,
    /// The hourly profiles for the representative period
    pub profiles: ProfileDataset,
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let scenario = ScenarioFile::from_path(model_dir)?;
    let parameters = ScenarioParameters::from_path(model_dir)?;
    let profiles = read_profiles(model_dir)?;

    // Outcomes are annualised from a single week of profiles
    let week = scenario.week.unwrap_or_else(|| {
        if profiles.len() > HOURS_PER_WEEK {
            warn!(
                "Profiles cover {} hours but no week was given: using the first week",
                profiles.len()
            );
        }
        0
    });
    let profiles = profiles.week(week)?;

    Ok(Model {
        scenario,
        parameters,
        profiles,
    })
}
