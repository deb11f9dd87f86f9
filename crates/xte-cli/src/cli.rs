//! CLI argument definitions for the XTE converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "xte-converter",
    version,
    about = "Convert TISS monitoring files between XTE/XML and tabular CSV",
    long_about = "Convert ANS/TISS monitoring payloads in both directions.\n\n\
                  `import` flattens XTE/XML documents into one consolidated CSV\n\
                  (one row per procedure); `export` rebuilds schema-ordered\n\
                  XTE/XML documents from such a CSV, one per origin file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Flatten XTE/XML files into one consolidated CSV.
    Import(ImportArgs),

    /// Rebuild XTE/XML documents from a flat CSV.
    Export(ExportArgs),

    /// List the accepted flat columns and their XML tags.
    Columns,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// XTE/XML input files, processed in order.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Path of the consolidated CSV to write.
    #[arg(
        long = "output",
        value_name = "CSV",
        default_value = "consolidated.csv"
    )]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Flat CSV input (`;`-separated, `Origin Name` column mandatory).
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Directory for the generated files (default: <CSV dir>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
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
