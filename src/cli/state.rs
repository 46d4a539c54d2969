//! CLI commands for inspecting state strings.
use crate::codec::StateCodec;
use crate::parameters::ScenarioParameters;
use crate::presets::PresetOption;
use crate::session::Session;
use crate::sliders::SliderBoard;
use anyhow::{Result, anyhow};
use clap::Subcommand;
use itertools::Itertools;
use std::path::PathBuf;
use strum::IntoEnumIterator;

/// Subcommands for state strings
#[derive(Subcommand)]
pub enum StateSubcommands {
    /// Print the state string for the default slider positions
    Default,
    /// Print the state string of a bundled preset
    Preset {
        /// The name of the preset
        name: String,
    },
    /// Print the slider positions held in a state string
    Decode {
        /// The state string
        state: String,
        /// A model directory whose parameters the sliders start from
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

impl StateSubcommands {
    /// Execute the supplied state subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Default => handle_default_command()?,
            Self::Preset { name } => handle_preset_command(&name)?,
            Self::Decode { state, model_dir } => {
                let parameters = match model_dir {
                    Some(model_dir) => ScenarioParameters::from_path(model_dir)?,
                    None => ScenarioParameters::default(),
                };
                for line in describe_state(&state, &parameters)? {
                    println!("{line}");
                }
            }
        }

        Ok(())
    }
}

/// Handle the `default` command
fn handle_default_command() -> Result<()> {
    let session = Session::new(ScenarioParameters::default())?;
    println!("{}", session.encode_state());

    Ok(())
}

/// Handle the `preset` command
fn handle_preset_command(name: &str) -> Result<()> {
    let preset: PresetOption = name.parse().map_err(|_| {
        anyhow!(
            "Unknown preset: {name}. Valid presets are: {}",
            PresetOption::iter().join(", ")
        )
    })?;
    println!("{}", preset.state_string());

    Ok(())
}

/// Describe the slider positions in a state string which differ from the defaults
fn describe_state(state: &str, parameters: &ScenarioParameters) -> Result<Vec<String>> {
    let mut board = SliderBoard::new(parameters)?;
    let decoded = StateCodec::default().decode(state, &board)?;
    board.load(decoded.kind, &decoded.ticks)?;

    let mut lines = vec![format!(
        "Version {} state with {} ticks ({:?})",
        decoded.version,
        decoded.ticks.len(),
        decoded.kind
    )];
    for ((slider, tick), default) in board
        .sliders()
        .iter()
        .zip(board.ticks())
        .zip(board.default_ticks())
    {
        if tick != default {
            lines.push(format!(
                "{} = {} (tick {tick}, default {default})",
                slider.id(),
                slider.value(*tick)
            ));
        }
    }

    Ok(lines)
}
