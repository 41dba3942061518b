//! CLI argument definitions for the relational schema normalizer.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use relnorm_core::DEFAULT_JOIN_SEARCH_LIMIT;

#[derive(Parser)]
#[command(
    name = "relnorm",
    version,
    about = "Relational schema normalizer - decompose relations into 1NF through 5NF",
    long_about = "Decompose the relations of a schema file into a target normal form.\n\n\
                  Stages run in order (1NF, 2NF, 3NF, BCNF, 4NF, 5NF) up to the target.\n\
                  4NF and 5NF may ask for extra multivalued dependencies and sample tuples."
)]
pub struct Cli {
    /// Schema file describing the relations to normalize.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target normal form: 1NF, 2NF, 3NF, BCNF, 4NF or 5NF (prompted for when absent).
    #[arg(long = "form", short = 'f', value_name = "FORM")]
    pub form: Option<String>,

    /// File the normalized schema is written to.
    #[arg(
        long = "output",
        short = 'o',
        value_name = "PATH",
        default_value = "normalized_schema.txt"
    )]
    pub output: PathBuf,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormatArg,

    /// CSV file with sample tuples for the first relation of the schema.
    ///
    /// The header row names the relation's attributes in any order.
    #[arg(long = "samples", value_name = "CSV")]
    pub samples: Option<PathBuf>,

    /// Never prompt; take the form from --form and skip interactive input.
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,

    /// Largest relation (in attributes) searched for join dependencies.
    #[arg(
        long = "max-join-attributes",
        value_name = "N",
        default_value_t = DEFAULT_JOIN_SEARCH_LIMIT
    )]
    pub max_join_attributes: usize,

    /// Normalize and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps")]
    pub log_timestamps: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Text,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
