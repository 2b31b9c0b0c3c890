//! `ezhost`: command-line front-end for the e-z.host file hosting API.
mod cli;
mod commands;
mod config;
mod logging;
mod render;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ezhost_engine::{EngineHandle, JsonHistoryFile, Session};
use ezhost_logging::{ezhost_debug, ezhost_info, level_for_verbosity};

use cli::Cli;
use config::AppConfig;
use logging::LogDestination;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match &cli.global.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, level_for_verbosity(cli.global.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err, &mut io::stderr());
            ExitCode::FAILURE
        }
    }
}

/// Prints the failure once; the log copy stays below the terminal's default level.
fn report_failure<W: Write>(err: &anyhow::Error, out: &mut W) {
    ezhost_info!("Command failed: {:#}", err);
    let _ = writeln!(out, "Error: {err:#}");
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_args(&cli.global)?;
    if cli.command.needs_api_key() {
        config.require_api_key()?;
    }
    ezhost_debug!(
        "Using api={} history={:?}",
        config.api.base_url,
        config.history_path
    );

    let engine = EngineHandle::new(config.api.clone())?;
    let history = JsonHistoryFile::new(config.history_path.clone());
    let mut session = Session::new(engine, history);

    let stdin = io::stdin();
    let stderr = io::stderr();
    let command =
        commands::resolve_confirmation(cli.command, &mut stdin.lock(), &mut stderr.lock())?;

    let stdout = io::stdout();
    commands::execute(command, &mut session, &mut stdout.lock(), &mut stderr.lock())
}
