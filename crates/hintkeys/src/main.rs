//! Binary entrypoint for hintkeys.
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use config::resolve_config_path;
use hintkeys_engine::{action::ActionRegistry, builtin::Builtins, finder::FinderRegistry};
use tracing::{debug, error};
use win_ops::WinOps;

#[cfg(windows)]
mod app;
mod check;
mod error;

pub use error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "hintkeys", about = "Keyboard hints for clicking anything on screen", version)]
/// Command-line interface for the `hintkeys` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load the configuration, print the resolved bindings, then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.hintkeys.json)
        path: Option<PathBuf>,

        /// Print the bindings as JSON
        #[arg(long)]
        dump: bool,
    },
}

/// Register every plugin source compiled into the binary and resolve the
/// binding table against `config`.
pub fn assemble(config: &config::Config, ops: Arc<dyn WinOps>) -> (ActionRegistry, FinderRegistry) {
    let builtins = Builtins::new(ops);
    hintkeys_engine::assemble(&[&builtins], config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let spec = logging::init(&cli.log);
    debug!(filter = %spec, "logging_initialized");

    if let Some(Command::Check { path, dump }) = &cli.command {
        let explicit = path.as_deref().or(cli.config.as_deref());
        let resolved = resolve_config_path(explicit);
        return match check::run(&resolved, *dump) {
            Ok(out) => {
                print!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let config_path = resolve_config_path(cli.config.as_deref());
    match serve(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "hintkeys_failed");
            eprintln!("hintkeys: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn serve(config_path: &Path) -> Result<()> {
    app::run(&config::load_or_default(config_path))
}

#[cfg(not(windows))]
fn serve(_config_path: &Path) -> Result<()> {
    Err(Error::Unsupported)
}
