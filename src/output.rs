//! The module responsible for writing output data to disk.
use crate::dataset::{ProfileDataset, ProfileSeries};
use crate::simulation::Evaluation;
use crate::source::EnergySource;
use crate::units::{Energy, Mass, Money, MoneyPerEnergy, Power};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "gridx_results";

/// The output file name for allocated profiles
const PROFILES_FILE_NAME: &str = "profiles.csv";

/// The output file name for the per-source outcome
const OUTCOME_FILE_NAME: &str = "outcome.csv";

/// The output file name for the scenario totals
const SUMMARY_FILE_NAME: &str = "summary.toml";

/// Format used for timestamps in output files
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Get the default output directory for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory.
///
/// An existing directory containing files is only reused if `allow_overwrite` is true.
///
/// # Returns
///
/// Whether an existing directory with files in it will be overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        let is_empty = fs::read_dir(output_dir)?.next().is_none();
        if is_empty {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use the --overwrite option to \
             overwrite it."
        );
        fs::remove_dir_all(output_dir)?;
        fs::create_dir_all(output_dir)?;
        return Ok(true);
    }

    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Write allocated profiles to a CSV file with one row per hour
pub fn write_profiles(output_path: &Path, profiles: &ProfileDataset) -> Result<()> {
    let file_path = output_path.join(PROFILES_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;

    let header = ["datehour".to_string()]
        .into_iter()
        .chain(ProfileSeries::all().map(|series| series.to_string()));
    writer.write_record(header)?;

    for (hour, timestamp) in profiles.index().iter().enumerate() {
        let row = [timestamp.format(DATETIME_FORMAT).to_string()]
            .into_iter()
            .chain(ProfileSeries::all().map(|series| profiles.series(series)[hour].to_string()));
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Represents a row in the outcome CSV file
#[derive(Serialize, Debug, PartialEq)]
struct OutcomeRow {
    source: EnergySource,
    capacity: Power,
    energy: Energy,
    consumed: Energy,
    fixed_cost: Money,
    variable_cost: Money,
    co2: Mass,
    cost_per_energy: Option<MoneyPerEnergy>,
}

/// Scenario totals, as written to the summary file
#[derive(Serialize, Debug, PartialEq)]
struct Summary<'a> {
    /// Cost of the scenario ($)
    cost: Money,
    /// Annual emissions (t)
    co2: Mass,
    /// Annual energy consumed (MWh)
    energy: Energy,
    /// Annual energy generated, including excess (MWh)
    generated: Energy,
    /// Annual unmet demand (MWh)
    unmet_energy: Energy,
    /// Number of hours with unmet demand
    unmet_hours: usize,
    /// Levelised cost ($/MWh)
    #[serde(skip_serializing_if = "Option::is_none")]
    levelised_cost: Option<f64>,
    /// Emissions intensity (g/kWh)
    #[serde(skip_serializing_if = "Option::is_none")]
    co2_intensity: Option<f64>,
    /// State string for the slider positions evaluated
    state: &'a str,
}

/// Write the results of evaluating a scenario to the output folder.
///
/// # Arguments
///
/// * `output_path` - The folder to write to
/// * `evaluation` - The evaluated scenario
/// * `state` - The state string of the slider positions evaluated
pub fn write_results(output_path: &Path, evaluation: &Evaluation, state: &str) -> Result<()> {
    write_profiles(output_path, &evaluation.profiles)?;

    let outcome = &evaluation.outcome;
    let file_path = output_path.join(OUTCOME_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for (source, source_outcome) in outcome.breakdown.iter() {
        writer.serialize(OutcomeRow {
            source,
            capacity: source_outcome.capacity,
            energy: source_outcome.energy,
            consumed: source_outcome.consumed,
            fixed_cost: source_outcome.fixed_cost,
            variable_cost: source_outcome.variable_cost,
            co2: source_outcome.co2,
            cost_per_energy: source_outcome.cost_per_energy(),
        })?;
    }
    writer.flush()?;

    let summary = Summary {
        cost: outcome.cost,
        co2: outcome.co2,
        energy: outcome.energy,
        generated: outcome.generated,
        unmet_energy: outcome.unmet_energy,
        unmet_hours: outcome.unmet_hours,
        levelised_cost: outcome.levelised_cost().map(|lcoe| lcoe.value()),
        co2_intensity: outcome.co2_intensity(),
        state,
    };
    let file_path = output_path.join(SUMMARY_FILE_NAME);
    fs::write(&file_path, toml::to_string(&summary)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{allocations, dataset, parameters};
    use crate::parameters::ScenarioParameters;
    use crate::simulation::evaluate;
    use itertools::Itertools;
    use rstest::rstest;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_create_output_directory_new() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // An empty folder can be reused
        assert!(!create_output_directory(&output_dir, false).unwrap());
    }

    #[test]
    fn test_create_output_directory_overwrite() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("old.csv")).unwrap();

        assert!(create_output_directory(dir.path(), false).is_err());
        assert!(create_output_directory(dir.path(), true).unwrap());
        assert!(!dir.path().join("old.csv").exists());
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("my_model");
        fs::create_dir(&model_dir).unwrap();
        assert_eq!(
            get_output_dir(&model_dir).unwrap(),
            PathBuf::from(OUTPUT_DIRECTORY_ROOT).join("my_model")
        );
    }

    #[test]
    fn test_write_profiles() {
        let dir = tempdir().unwrap();
        let profiles = dataset(&[10.0, 20.0], &[(EnergySource::Wind, vec![1.5, 2.5])]);
        write_profiles(dir.path(), &profiles).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(PROFILES_FILE_NAME)).unwrap();
        let header = reader.headers().unwrap().iter().map(String::from).collect_vec();
        assert_eq!(
            header,
            [
                "datehour", "demand", "unmet", "supply", "solar", "wind", "hydro", "nuclear", "ng",
                "coal", "battery", "h2"
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().try_collect().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "2018-01-01T00:00:00");
        assert_eq!(&rows[1][1], "20");
        assert_eq!(&rows[1][5], "2.5");
    }

    #[rstest]
    fn test_write_results(parameters: ScenarioParameters) {
        let dir = tempdir().unwrap();
        let profiles = dataset(&[10.0, 20.0], &[(EnergySource::Wind, vec![15.0, 15.0])]);
        let evaluation = evaluate(
            &profiles,
            &parameters,
            &allocations(&[(EnergySource::Wind, 1.0)]),
        )
        .unwrap();
        write_results(dir.path(), &evaluation, "AiA=").unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(OUTCOME_FILE_NAME)).unwrap();
        let column = reader
            .headers()
            .unwrap()
            .iter()
            .position(|header| header == "cost_per_energy")
            .unwrap();
        let records: Vec<_> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 8);
        for record in &records {
            // Only wind supplied any energy
            assert_eq!(record[column].is_empty(), &record[0] != "wind");
        }

        let summary: toml::Table =
            toml::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(summary["unmet_hours"].as_integer(), Some(1));
        assert_eq!(summary["state"].as_str(), Some("AiA="));
        assert!(summary.contains_key("levelised_cost"));
    }
}
