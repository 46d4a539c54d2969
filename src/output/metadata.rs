//! Code for writing run metadata to file
use anyhow::{Context, Result};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get the git commit the program was built from, if known
fn get_git_hash() -> String {
    match (built_info::GIT_COMMIT_HASH_SHORT, built_info::GIT_DIRTY) {
        (None, _) => "unknown".into(),
        (Some(hash), Some(true)) => format!("{hash}-dirty"),
        (Some(hash), _) => hash.into(),
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

/// Information about the scenario which was evaluated
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model directory
    model_path: &'a Path,
    /// State string of the slider positions evaluated (empty for the defaults)
    state: &'a str,
    /// The date and time at which the run started
    datetime: String,
}

/// Information about the build of the program
#[derive(Serialize)]
struct ProgramMetadata {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    is_debug: bool,
    rustc_version: &'static str,
    build_time_utc: &'static str,
    git_commit_hash: String,
}

impl ProgramMetadata {
    fn new() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the machine the program is running on, from [`PlatformInfo`]
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow::anyhow!("{err}"))
            .context("Unable to determine platform info")?;

        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata about the run to the output folder in TOML format.
///
/// # Arguments
///
/// * `output_path` - The folder to write to
/// * `model_path` - The model directory which was run
/// * `state` - The state string of the slider positions evaluated
pub fn write_metadata(output_path: &Path, model_path: &Path, state: &str) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            model_path,
            state,
            datetime: Local::now().to_rfc2822(),
        },
        program: ProgramMetadata::new(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_metadata() {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), Path::new("demos/simple"), "AiA=").unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let metadata: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(metadata["run"]["state"].as_str(), Some("AiA="));
        assert_eq!(metadata["program"]["name"].as_str(), Some("gridx"));
    }
}
