//! Code for reading hourly demand and generation profiles from a CSV file.
use super::{input_err_msg, read_csv};
use crate::dataset::{ProfileDataset, ProfileSeries};
use crate::source::EnergySource;
use anyhow::{Context, Result, anyhow, bail, ensure};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use log::warn;
use std::path::Path;
use strum::IntoEnumIterator;
use unicase::UniCase;

const PROFILES_FILE_NAME: &str = "profiles.csv";

/// The units assumed for profile values
const PROFILE_UNITS: &str = "MW";

/// The name of the timestamp column
const DATEHOUR_COLUMN: &str = "datehour";

/// A row of the profiles file, keyed by column header
type ProfileRow = IndexMap<String, String>;

/// What a column of the profiles file contains
#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    DateHour,
    Series(ProfileSeries),
}

/// Identify a column from its header.
///
/// Headers may carry a parenthesised annotation, e.g. `demand (MWh)` or
/// `solar (capacity = 1000)`, which is ignored. Matching is case-insensitive.
fn parse_header(header: &str) -> Result<Column> {
    let name = header.split('(').next().unwrap_or(header).trim();
    let name = UniCase::new(name);
    if name == UniCase::new(DATEHOUR_COLUMN) {
        return Ok(Column::DateHour);
    }
    if name == UniCase::new("demand") {
        return Ok(Column::Series(ProfileSeries::Demand));
    }

    let source: EnergySource = name
        .parse()
        .map_err(|_| anyhow!("Unrecognised column: {header}"))?;

    Ok(Column::Series(ProfileSeries::Source(source)))
}

/// Parse a timestamp.
///
/// Two formats are accepted: `YYYYMMDDHH`, where `HH` is an hour-ending field from 1 to 24, and
/// `YYYY-MM-DDTHH:MM:SS`. In both cases the returned time is the start of the hour.
fn parse_datehour(value: &str) -> Result<NaiveDateTime> {
    if value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(&value[..8], "%Y%m%d")
            .with_context(|| format!("Invalid date in {value}"))?;
        let hour: i64 = value[8..].parse()?;
        ensure!(
            (1..=24).contains(&hour),
            "Hour must be between 1 and 24 in {value}"
        );

        return Ok(date.and_time(chrono::NaiveTime::MIN) + TimeDelta::hours(hour - 1));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("Invalid timestamp: {value}"))
}

/// Parse a profile value
fn parse_value(value: &str) -> Result<f64> {
    value
        .parse()
        .with_context(|| format!("Invalid profile value: {value}"))
}

/// Read the profiles file from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A [`ProfileDataset`] in which unmet demand equals demand and supply is zero.
pub fn read_profiles(model_dir: &Path) -> Result<ProfileDataset> {
    let file_path = model_dir.join(PROFILES_FILE_NAME);
    let rows = read_csv::<ProfileRow>(&file_path)?;
    read_profiles_from_iter(rows).with_context(|| input_err_msg(&file_path))
}

/// Build a [`ProfileDataset`] from the rows of a profiles file
fn read_profiles_from_iter<I>(iter: I) -> Result<ProfileDataset>
where
    I: Iterator<Item = ProfileRow>,
{
    let mut index = Vec::new();
    let mut series: IndexMap<ProfileSeries, Vec<f64>> = IndexMap::new();
    for (row_number, row) in iter.enumerate() {
        let mut datehour = None;
        for (header, value) in &row {
            match parse_header(header)? {
                Column::DateHour => datehour = Some(parse_datehour(value)?),
                Column::Series(name) => series
                    .entry(name)
                    .or_default()
                    .push(parse_value(value).with_context(|| format!("In column {header}"))?),
            }
        }

        let Some(datehour) = datehour else {
            bail!("Missing {DATEHOUR_COLUMN} column in row {}", row_number + 1);
        };
        index.push(datehour);
    }

    let demand = series
        .get(&ProfileSeries::Demand)
        .context("Missing demand column")?
        .clone();
    for source in EnergySource::iter() {
        series
            .entry(ProfileSeries::Source(source))
            .or_insert_with(|| {
                warn!("No profile given for {source}: it will generate nothing");
                vec![0.0; demand.len()]
            });
    }
    series.insert(ProfileSeries::Supply, vec![0.0; demand.len()]);
    series.insert(ProfileSeries::Unmet, demand);

    ProfileDataset::new(index, PROFILE_UNITS.into(), series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, start_time};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[rstest]
    #[case("datehour", Column::DateHour)]
    #[case("DEMAND (MWh)", Column::Series(ProfileSeries::Demand))]
    #[case("solar (capacity = 1000)", Column::Series(ProfileSeries::Source(EnergySource::Solar)))]
    #[case(" H2 ", Column::Series(ProfileSeries::Source(EnergySource::Hydrogen)))]
    fn test_parse_header(#[case] header: &str, #[case] expected: Column) {
        assert_eq!(parse_header(header).unwrap(), expected);
    }

    #[test]
    fn test_parse_header_unknown() {
        assert_error!(parse_header("oil"), "Unrecognised column: oil");
    }

    #[rstest]
    #[case("2018010101", 0)]
    #[case("2018010124", 23)]
    #[case("2018010201", 24)]
    #[case("2018-01-01T05:00:00", 5)]
    fn test_parse_datehour(#[case] value: &str, #[case] hours_after_start: i64) {
        assert_eq!(
            parse_datehour(value).unwrap(),
            start_time() + TimeDelta::hours(hours_after_start)
        );
    }

    #[rstest]
    #[case("2018010100")]
    #[case("2018010125")]
    #[case("2018133101")]
    #[case("yesterday")]
    fn test_parse_datehour_invalid(#[case] value: &str) {
        assert!(parse_datehour(value).is_err());
    }

    #[test]
    fn test_read_profiles() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(PROFILES_FILE_NAME)).unwrap();
            writeln!(
                file,
                "DATEHOUR,DEMAND (MWh),SOLAR (capacity = 1000),WIND (capacity = 1000)
2018010101,900,0,250
2018010102,850,0,300
2018010103,800,10.5,280"
            )
            .unwrap();
        }

        let dataset = read_profiles(dir.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.index()[0], start_time());
        assert_eq!(dataset.units(), "MW");
        assert_eq!(dataset.series(ProfileSeries::Demand), [900.0, 850.0, 800.0]);
        assert_eq!(dataset.series(ProfileSeries::Unmet), [900.0, 850.0, 800.0]);
        assert_eq!(dataset.series(ProfileSeries::Supply), [0.0; 3]);
        assert_approx_eq!(f64, dataset.source(EnergySource::Solar)[2], 10.5);
        assert_eq!(dataset.source(EnergySource::Nuclear), [0.0; 3]);
    }

    #[test]
    fn test_read_profiles_missing_hour() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(PROFILES_FILE_NAME)).unwrap();
            writeln!(file, "datehour,demand\n2018010101,900\n2018010103,800").unwrap();
        }

        let err = read_profiles(dir.path()).unwrap_err();
        assert_eq!(
            err.chain().nth(1).unwrap().to_string(),
            "Time index must have an hourly cadence (2018-01-01 02:00:00 follows 2018-01-01 00:00:00)"
        );
    }

    #[test]
    fn test_read_profiles_missing_demand() {
        let rows = vec![ProfileRow::from([
            ("datehour".to_string(), "2018010101".to_string()),
            ("solar".to_string(), "1".to_string()),
        ])];
        assert_error!(
            read_profiles_from_iter(rows.into_iter()),
            "Missing demand column"
        );
    }
}
