//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ReportFormat, View};

/// MedalReport - medal distribution reports by event prestige
///
/// Loads a spreadsheet of medal counts per game, buckets every game by
/// its prestige score and reports category proportions, total medal
/// comparisons and a focus-country drill-down.
///
/// Examples:
///   medalreport --input medals.xlsx
///   medalreport --input medals.xlsx --focus IND --format json -o report.json
///   medalreport --input medals.csv --view comparison,drilldown
///   medalreport --input medals.xlsx --dry-run
///   medalreport --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Spreadsheet (xlsx, xls, ods) or CSV file with medal counts
    ///
    /// Can also be set via MEDALREPORT_INPUT or [source] path in .medalreport.toml.
    #[arg(short, long, value_name = "FILE", env = "MEDALREPORT_INPUT")]
    pub input: Option<PathBuf>,

    /// Workbook sheet to read (defaults to the first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Country given the drill-down view
    #[arg(short, long, value_name = "CODE", env = "MEDALREPORT_FOCUS")]
    pub focus: Option<String>,

    /// Aggregate group column compared alongside countries
    #[arg(long, value_name = "COLUMN")]
    pub group: Option<String>,

    /// Tracked country columns (comma-separated)
    ///
    /// Example: --countries PK,IND,CN
    #[arg(long, value_name = "CODES", value_delimiter = ',')]
    pub countries: Option<Vec<String>>,

    /// Views to include (comma-separated)
    ///
    /// Values: proportions, comparison, drilldown. Default: all three.
    #[arg(long, value_name = "VIEWS", value_delimiter = ',')]
    pub view: Option<Vec<View>>,

    /// Leave text bar charts out of Markdown reports
    #[arg(long)]
    pub no_charts: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .medalreport.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and summarize the data without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .medalreport.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        if let Some(ref focus) = self.focus {
            if focus.trim().is_empty() {
                return Err("Focus country must not be empty".to_string());
            }
        }

        if let Some(ref countries) = self.countries {
            if countries.iter().any(|c| c.trim().is_empty()) {
                return Err("Country codes must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
