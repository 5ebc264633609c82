//! Command-line argument definitions and parsing

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application
#[derive(Parser, Debug)]
#[command(
    name = "yasak",
    version,
    about = "Yet Another YAML Swiss Army Knife",
    long_about = "yasak locates values in YAML files. Given a go-patch path it prints the \
                  line, column and trailing comment of the addressed value.",
    disable_version_flag = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Activate debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Don't report an error when the path does not lead to a value
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Display version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate a value in a YAML file
    ///
    /// Prints the line, column and trailing comment of the value at the
    /// given go-patch path. Nothing is printed when an optional key is absent.
    Locate(LocateArgs),
}

/// Arguments for the locate command
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// YAML file to search
    #[arg(value_name = "YAML_FILE")]
    pub file: PathBuf,

    /// go-patch path of the value to locate, e.g. /instance_groups/name=web/jobs
    #[arg(short, long, value_name = "PATH")]
    pub path: String,

    /// Output format
    #[arg(long, value_enum, default_value = "tab")]
    pub format: OutputFormat,

    /// Pretty print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Output formats for the locate command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Line, column and comment separated by tabs
    Tab,
    /// JSON object
    Json,
}

impl From<OutputFormat> for yasak::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Tab => Self::Tab,
            OutputFormat::Json => Self::Json,
        }
    }
}
