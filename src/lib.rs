//! Per-test warning capture with configurable filters.
//!
//! A test body runs inside a [`WarningScope`] opened by
//! [`WarningCapture::around`]. Warnings it emits are filtered by rules parsed
//! from `action:message:category:module:lineno` specs, and the survivors are
//! handed to a [`ReportSink`] together with the test's location.

pub mod capture;
pub mod category;
pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod session;
pub mod warning;

pub use capture::{
    CaptureError, FilterOrigin, REPORT_CODE, ReportEntry, ReportSink, ResolvedFilter, TestItem,
    WarningCapture, WarningReport,
};
pub use category::{Category, CategoryError, CategoryRegistry};
pub use cli::{Cli, ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{ConfigError, WarningsConfig, load_config};
pub use filter::{
    Action, EscalatedWarning, FilterRule, FilterSpecError, FilterState, WarningScope,
};
pub use session::TestSession;
pub use warning::{CapturedWarning, Warning, format_warning};

use anyhow::Context;
use display::{
    format_categories_json, format_categories_text, format_filters_json, format_filters_text,
    precedence_order,
};

fn init_logger(verbose: u8) {
    let mut log_builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => log_builder.filter_level(log::LevelFilter::Info),
        1 => log_builder.filter_level(log::LevelFilter::Debug),
        _ => log_builder.filter_level(log::LevelFilter::Trace),
    };
    let _ = log_builder.try_init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logger(cli.verbose);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let config = load_config(cli.config.as_deref()).context("warnings config unavailable")?;
    if let Some(path) = &cli.config {
        log::debug!(
            "loaded {} filter(s) from {}",
            config.filterwarnings.lines().len(),
            path.display()
        );
    }
    let capture = WarningCapture::from_config(cli.warnings.clone(), &config)?;

    match &cli.command {
        Commands::Filters => {
            let resolved = capture.resolve_filters()?;
            let baseline = FilterRule::catch_all(Action::Once, capture.registry());
            let rows = precedence_order(&resolved, &baseline);
            match cli.format {
                OutputFormat::Text => print!("{}", format_filters_text(&rows)),
                OutputFormat::Json => println!("{}", format_filters_json(&rows)?),
            }
        }
        Commands::Categories => match cli.format {
            OutputFormat::Text => print!("{}", format_categories_text(capture.registry())),
            OutputFormat::Json => {
                println!("{}", format_categories_json(capture.registry())?)
            }
        },
    }

    Ok(())
}
