//! Integration tests for the `run` command.
use gridx::cli::{RunOpts, handle_run_command};
use gridx::log::is_logger_initialised;
use gridx::settings::Settings;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("GRIDX_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();
    assert!(is_logger_initialised());

    for file_name in [
        "profiles.csv",
        "outcome.csv",
        "summary.toml",
        "metadata.toml",
        "gridx_info.log",
        "gridx_error.log",
    ] {
        assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
    }

    // One row per hour of the evaluated week, plus a header
    let profiles = std::fs::read_to_string(output_dir.join("profiles.csv")).unwrap();
    assert_eq!(profiles.lines().count(), 169);

    // Second time will fail because the output folder isn't empty
    assert!(handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).is_err());

    // ...and with a new folder because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir.path().join("more_results")),
        overwrite: false,
    };
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
