//! `foodscan` command-line entry point.

mod cli;
mod commands;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::Level;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_contribute, run_init_config, run_installation_id, run_live, run_lookup, run_scan,
    run_symbologies,
};
use foodscan_cli::logging::{LogConfig, LogFormat, init_logging};
use foodscan_cli::settings::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command; `Ok(false)` means nothing to show.
fn run(cli: &Cli) -> Result<bool> {
    // init-config must work before any settings file exists.
    let mut settings = if matches!(cli.command, Command::InitConfig { .. }) {
        Settings::default()
    } else {
        Settings::load(cli.config.as_deref())?
    };
    if let Some(base_url) = &cli.base_url {
        settings.lookup = settings.lookup.with_base_url(base_url.as_str());
    }

    match &cli.command {
        Command::Lookup { barcode } => run_lookup(&settings, barcode, cli.json),
        Command::Scan { image } => run_scan(&settings, image, cli.json),
        Command::Live(args) => run_live(&settings, args, cli.json),
        Command::Contribute(args) => run_contribute(&settings, args, cli.json).map(|()| true),
        Command::Symbologies => run_symbologies(&settings, cli.json).map(|()| true),
        Command::InstallationId => run_installation_id(&settings).map(|()| true),
        Command::InitConfig { force } => {
            run_init_config(&settings, cli.config.as_deref(), *force).map(|()| true)
        }
    }
}

/// File logs carry timestamps and targets; terminal logs stay terse.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = cli
        .log_level
        .map(level_from_arg)
        .or_else(|| cli.verbosity.tracing_level())
        .unwrap_or(Level::ERROR);
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let to_file = cli.log_file.is_some();
    let ansi = !to_file
        && match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stderr().is_terminal(),
        };
    LogConfig::default()
        .with_level(level)
        .with_format(format)
        .with_timestamps(to_file)
        .with_target(to_file)
        .with_ansi(ansi)
        .with_log_file(cli.log_file.clone())
}

fn level_from_arg(arg: LogLevelArg) -> Level {
    match arg {
        LogLevelArg::Error => Level::ERROR,
        LogLevelArg::Warn => Level::WARN,
        LogLevelArg::Info => Level::INFO,
        LogLevelArg::Debug => Level::DEBUG,
        LogLevelArg::Trace => Level::TRACE,
    }
}
