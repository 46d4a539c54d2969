//! Common functionality for gridx, an engine for exploring electricity grid decarbonisation
//! scenarios.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod codec;
pub mod dataset;
pub mod dispatch;
pub mod finance;
pub mod input;
pub mod log;
pub mod outcome;
pub mod output;
pub mod parameters;
pub mod presets;
pub mod session;
pub mod settings;
pub mod simulation;
pub mod sliders;
pub mod source;
pub mod tick;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the folder program settings are read from.
///
/// Falls back to the current directory on platforms without a configuration folder.
pub fn get_gridx_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::new();
    };
    dir.push("gridx");

    dir
}
