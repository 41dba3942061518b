//! Relational schema normalizer CLI.

use clap::{ColorChoice, Parser};
use relnorm_cli::logging::{LogConfig, LogFormat, init_logging};
use relnorm_core::NormalizeError;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, LogFormatArg, LogLevelArg};
use crate::commands::run_normalize;
use crate::summary::print_summary;

/// Exit status for failures caused by the input.
const EXIT_USER_ERROR: i32 = 1;
/// Exit status for internal invariant failures (EX_SOFTWARE).
const EXIT_INTERNAL_ERROR: i32 = 70;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_USER_ERROR);
    }
    let code = match run_normalize(&cli) {
        Ok(run) => {
            print_summary(&run);
            0
        }
        Err(error) => {
            let code = exit_code(&error);
            if code == EXIT_INTERNAL_ERROR {
                eprintln!("internal error (please report): {error:#}");
            } else {
                eprintln!("error: {error:#}");
            }
            code
        }
    };
    std::process::exit(code);
}

/// Exit status for a failed run, looking through any added context.
fn exit_code(error: &anyhow::Error) -> i32 {
    let internal = error
        .downcast_ref::<NormalizeError>()
        .is_some_and(NormalizeError::is_internal);
    if internal {
        EXIT_INTERNAL_ERROR
    } else {
        EXIT_USER_ERROR
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level_filter(level_filter)
        .with_format(format)
        .with_timestamps(cli.log_timestamps)
        .with_log_file(cli.log_file.clone());
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
