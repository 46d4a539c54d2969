//! The command line interface for gridx.
use crate::dispatch::allocate;
use crate::input::{Model, load_model};
use crate::log;
use crate::output::{create_output_directory, get_output_dir, write_metadata, write_results};
use crate::session::Session;
use crate::settings::Settings;
use crate::simulation::evaluate;
use ::log::{info, warn};
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod demo;
use demo::DemoSubcommands;
pub mod settings;
use settings::SettingsSubcommands;
pub mod state;
use state::StateSubcommands;

/// The command line interface for gridx.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Evaluate the scenario in a model directory.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage the bundled demo models.
    Demo {
        /// The available subcommands for managing demo models.
        #[command(subcommand)]
        subcommand: DemoSubcommands,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Inspect state strings.
    State {
        /// The available subcommands for state strings.
        #[command(subcommand)]
        subcommand: StateSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Demo { subcommand } => subcommand.execute(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::State { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start gridx
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ gridx --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Create a session with slider positions restored from the scenario file.
///
/// # Returns
///
/// The session and whether a state string was given and successfully restored.
fn restore_session(model: &Model) -> Result<(Session, bool)> {
    let mut session = Session::new(model.parameters.clone())?;
    let restored = match model.scenario.state_string() {
        Some(state) => session.restore(state),
        None => false,
    };

    Ok((session, restored))
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(model_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let (session, restored) = restore_session(&model)?;
    if model.scenario.state_string().is_some() && !restored {
        warn!("Using default slider positions");
    }

    let evaluation = evaluate(
        &model.profiles,
        session.parameters(),
        &model.scenario.allocations,
    )?;

    let state = session.state_string();
    write_metadata(output_path, model_path, &state).context("Failed to save metadata.")?;
    write_results(output_path, &evaluation, &state).context("Failed to save results.")?;
    info!("Evaluation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Log files are only written by the run command
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    let model = load_model(model_path).context("Failed to validate model.")?;
    let (_, restored) = restore_session(&model)?;
    ensure!(
        model.scenario.state_string().is_none() || restored,
        "Failed to validate model: the scenario's state string cannot be restored"
    );
    allocate(&model.scenario.allocations, &model.profiles)
        .context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}
