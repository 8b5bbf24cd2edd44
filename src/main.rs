//! MedalReport - medal distribution reports by event prestige
//!
//! A CLI tool that loads medal counts per game from a spreadsheet,
//! buckets games by prestige score and writes a Markdown or JSON report
//! with three views: category proportions, total comparison and a
//! focus-country drill-down.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (arguments, config, unreadable data source, write failure)

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, ReportFormat, View, CONFIG_FILE_NAME};
use loader::{DataLoader, LoadConfig};
use models::{MedalTable, PrestigeCategory, Report, ReportMetadata};
use report::RenderOptions;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("MedalReport v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_report(args) {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .medalreport.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the data source, countries, focus country and views.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the data source, run the selected views and write the report.
fn run_report(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let input = config.source.path.clone().with_context(|| {
        format!(
            "No data source given. Pass --input or set [source] path in {}",
            CONFIG_FILE_NAME
        )
    })?;

    // Step 1: Load the medal table
    println!("📥 Loading data: {}", input.display());
    let loader = DataLoader::new(LoadConfig::from(&config)).with_progress(!args.quiet);
    let table = loader
        .load(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    println!("✅ Data loaded successfully! Total games: {}", table.len());

    if args.dry_run {
        return handle_dry_run(&table);
    }

    if table.is_empty() {
        warn!("Data source has no games; every total will be zero");
    }

    // Step 2: Run the selected views
    let views = &config.report.views;
    let entities = &config.entities;

    let proportions = if views.contains(&View::Proportions) {
        info!("Computing medal proportions by prestige");
        Some(analysis::category_proportions(&table, &entities.countries)?)
    } else {
        None
    };

    let comparison = if views.contains(&View::Comparison) {
        info!("Computing total medal comparison");
        Some(analysis::compare_totals(
            &table,
            &entities.focus,
            &entities.group,
            &entities.effective_peers(),
        )?)
    } else {
        None
    };

    let drilldown = if views.contains(&View::Drilldown) {
        info!("Computing {} drill-down", entities.focus);
        Some(analysis::drill_down(&table, &entities.focus)?)
    } else {
        None
    };

    // Step 3: Build and save the report
    println!("\n📝 Generating report...");

    let metadata = ReportMetadata {
        source: input.display().to_string(),
        sheet: table.sheet.clone(),
        generated_at: Utc::now(),
        total_games: table.len(),
        uncategorized_games: table.uncategorized_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let report = Report {
        metadata,
        proportions,
        comparison,
        drilldown,
    };

    let output = match config.report.format {
        ReportFormat::Json => report::generate_json_report(&report)?,
        ReportFormat::Markdown => {
            report::generate_markdown_report(&report, &RenderOptions::from(&config.report))
        }
    };

    let output_path = config.report.output_path();
    report::write_report(&output, &output_path)?;

    // Print summary
    println!("\n📊 Report Summary:");
    println!("   Games: {}", report.metadata.total_games);
    if report.metadata.uncategorized_games > 0 {
        println!(
            "   Uncategorized games: {}",
            report.metadata.uncategorized_games
        );
    }
    if let Some(leader) = report.comparison.as_ref().and_then(|c| c.leader()) {
        println!(
            "   Highest total: {} ({} medals)",
            leader.entity,
            report::format_count(leader.total)
        );
    }
    if let Some(ref drilldown) = report.drilldown {
        let counts = &drilldown.category_counts;
        println!(
            "   {} medal-winning games: {} (Low: {} | Medium: {} | High: {})",
            drilldown.country,
            drilldown.len(),
            counts.low,
            counts.medium,
            counts.high
        );
    }
    println!("\n✅ Report saved to: {}", output_path.display());

    Ok(())
}

/// Handle --dry-run: summarize the loaded table and exit.
fn handle_dry_run(table: &MedalTable) -> Result<()> {
    println!("\n🔍 Dry run: summarizing data (no report written)...\n");

    let grouped = analysis::group_by_category(&table.records);
    for category in PrestigeCategory::ALL {
        let (lower, upper) = category.bounds();
        println!(
            "   {} {:<6} [{}, {}): {} games",
            category.glyph(),
            category,
            lower,
            upper,
            grouped.get(&category).map_or(0, Vec::len)
        );
    }

    let uncategorized = table.uncategorized_count();
    if uncategorized > 0 {
        println!("     Uncategorized: {} games", uncategorized);
    }

    println!("\n   Medal columns: {}", table.columns.join(", "));
    println!("\n✅ Dry run complete. No report was written.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
