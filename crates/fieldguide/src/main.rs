//! Fieldguide CLI - take or pick a photo and identify the bird in it.
//!
//! Classification runs on-device. The result is a label plus a confidence
//! tier; below the lowest tier no label is named at all.
//!
//! # Usage
//!
//! ```bash
//! # Take a photo with the camera and classify it
//! fieldguide capture
//!
//! # Choose a photo from the gallery, or name one directly
//! fieldguide pick
//! fieldguide pick ~/Pictures/heron.jpg
//!
//! # Install a classifier
//! fieldguide models install model.onnx labels.txt
//!
//! # Guided menu
//! fieldguide
//! ```

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use fieldguide_core::Config;

mod cli;
mod logging;

/// Fieldguide - on-device bird identification from a single photo.
#[derive(Parser, Debug)]
#[command(name = "fieldguide")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "FIELDGUIDE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Take a photo and identify what is in it
    Capture(cli::capture::CaptureArgs),

    /// Choose a photo from the gallery (or by path) and identify it
    Pick(cli::pick::PickArgs),

    /// Manage the classifier model
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    /// Inspect or reset the camera permission
    Permission(cli::permission::PermissionArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings use eprintln.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `fieldguide config path`."
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Fieldguide v{}", fieldguide_core::VERSION);

    match cli.command {
        Some(Commands::Capture(args)) => cli::capture::execute(args, &config).await,
        Some(Commands::Pick(args)) => cli::pick::execute(args, &config).await,
        Some(Commands::Models(args)) => cli::models::execute(args, &config),
        Some(Commands::Config(args)) => cli::config::execute(args, cli.config.as_deref()),
        Some(Commands::Permission(args)) => cli::permission::execute(args),
        None if console::Term::stderr().is_term() => cli::interactive::run(&config).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, fieldguide_core::ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
