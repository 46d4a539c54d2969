//! Integration tests for the `demo run` command.
use gridx::cli::RunOpts;
use gridx::cli::demo::handle_demo_run_command;
use gridx::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `demo run` command.
#[test]
fn test_handle_demo_run_command() {
    unsafe { std::env::set_var("GRIDX_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: false,
    };
    handle_demo_run_command("simple", &opts, Some(Settings::default())).unwrap();

    let summary: toml::Table =
        toml::from_str(&std::fs::read_to_string(tempdir.path().join("summary.toml")).unwrap())
            .unwrap();
    let cost = summary["cost"].as_float().unwrap();
    assert!(cost > 0.0);

    // The demo restores the "re" preset, which differs from the defaults
    assert_eq!(
        summary["state"].as_str(),
        Some(gridx::presets::PresetOption::Renewables.state_string())
    );
}
