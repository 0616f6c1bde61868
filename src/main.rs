// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

// Use library instead of local modules
use sme_analytics::{export_all, load_config, logging, source_from_config, validate, Config};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = load_config()?;

    match args.get(1).map(String::as_str) {
        Some("summary") => {
            logging::init(&config.logging.filter)?;
            run_summary(&config)?;
        }
        Some("validate") => {
            logging::init(&config.logging.filter)?;
            if !run_validate(&config)? {
                std::process::exit(1);
            }
        }
        Some("export") => {
            logging::init(&config.logging.filter)?;
            let dir = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("export"));
            run_export(&config, &dir)?;
        }
        None | Some("ui") => run_ui_mode(&config)?,
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: sme-analytics [ui | summary | validate | export <dir>]");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn run_summary(config: &Config) -> Result<()> {
    let source = source_from_config(config)?;
    let data = source.load()?;

    println!("📊 SME Analytics & Market Prediction");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Source: {}\n", source.name());

    for tile in data.kpis.tiles() {
        println!("  {:<36} {:>14}   {}", tile.label, tile.value, tile.delta);
    }

    let change = data.price_change()?;
    println!("\n📈 Forecast ({} points): {}%", data.forecast.len(), change);

    let branch_total: f64 = sme_analytics::branch_total(&data.branches);
    println!("🏦 Branch disbursement: {} M across {} entries", branch_total, data.branches.len());

    if let (Some(first), Some(last)) = (
        data.monthly_series.entries.first(),
        data.monthly_series.entries.last(),
    ) {
        println!(
            "🗓️  Monthly series: {} → {} ({} months, total {})",
            first.month_label,
            last.month_label,
            data.monthly_series.len(),
            data.monthly_series.total()
        );
    }

    println!("👥 Status matrix total: {}", data.status_matrix.total());

    for warning in data.insights.warnings() {
        println!("⚠️  {}", warning.message);
    }

    Ok(())
}

/// Print the validation report; returns false when a critical check failed
fn run_validate(config: &Config) -> Result<bool> {
    let source = source_from_config(config)?;
    let data = source.load()?;
    let report = validate(&data);

    println!("✅ Data contract validation ({})", source.name());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for check in &report.checks {
        let mark = if check.passed { "✓" } else { "✗" };
        println!("  {} {:<24} {}", mark, check.rule, check.message);
    }
    println!("\n{}", report.summary());

    Ok(!report.has_critical())
}

fn run_export(config: &Config, dir: &Path) -> Result<()> {
    let source = source_from_config(config)?;
    let data = source.load()?;

    println!("💾 Exporting dashboard data to {}", dir.display());
    let files = export_all(&data, dir)
        .with_context(|| format!("Export to {} failed", dir.display()))?;
    for file in files {
        println!("  ✓ {}", file.display());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    logging::init_to_file(&config.logging.filter, Path::new("sme-analytics.log"))?;

    println!("🖥️  Loading SME Analytics dashboard...\n");

    let source = source_from_config(config)?;
    let data = source.load()?;
    tracing::info!(source = source.name(), "dashboard loaded");

    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(source, data);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin sme-server --features server");
    std::process::exit(1);
}
