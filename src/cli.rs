use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect warning filters the way a test run would install them
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Filter spec matched literally, e.g. "ignore::DeprecationWarning" (repeatable)
    #[arg(short = 'W', long = "pythonwarnings", value_name = "SPEC", global = true)]
    pub warnings: Vec<String>,

    /// TOML file with a [warnings] table
    #[arg(short, long, env = "WARNING_CAPTURE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve all filters and list them in the order they are checked
    Filters,
    /// List known warning categories
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
