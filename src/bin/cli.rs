//! Countyscope CLI
//!
//! Command-line access to the joined county dataset without starting the server:
//! - Print the join summary
//! - List counties
//! - Write GeoJSON or CSV/XLSX exports
//! - Generate a config file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use geojson::GeoJson;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use countyscope::config::{generate_default_config, Config};
use countyscope::export::{self, ExportFormat, ExportKind, ExportTable};
use countyscope::map::feature_collection;
use countyscope::pipeline::{Dataset, DatasetLoader, Metric};
use countyscope::selection::{DashboardSelection, Selection};

#[derive(Parser)]
#[command(name = "countyscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Minnesota county income and unemployment explorer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for summary and counties (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show record count, value ranges and dropped counties
    Summary,

    /// List the joined counties with their figures
    Counties,

    /// Write the joined boundaries as GeoJSON
    Geojson {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export selected counties as CSV or XLSX
    Export {
        /// Columns: median_income, unemployment_rate, both
        #[arg(short, long, default_value = "both")]
        kind: ExportKind,
        /// File type: csv, xlsx
        #[arg(short = 't', long = "type", default_value = "csv")]
        file_type: ExportFormat,
        /// Counties for the income column, comma-separated (default: all)
        #[arg(long, value_delimiter = ',')]
        income: Option<Vec<String>>,
        /// Counties for the unemployment column, comma-separated (default: all)
        #[arg(long, value_delimiter = ',')]
        unemployment: Option<Vec<String>>,
        /// Output file (default: configured file stem in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default config file
    Config {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays clean for piping
    tracing_subscriber::registry()
        .with(countyscope::logging::env_filter("warn"))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default(),
    };

    match cli.command {
        Commands::Config { output } => {
            write_output(output.as_deref(), generate_default_config().as_bytes())?;
        }

        Commands::Summary => {
            let dataset = load(&config)?;
            if cli.format == "json" {
                let summary = serde_json::json!({
                    "records": dataset.len(),
                    "source_crs": dataset.source_crs().to_string(),
                    "median_income_range": dataset.range(Metric::MedianIncome),
                    "unemployment_rate_range": dataset.range(Metric::UnemploymentRate),
                    "report": dataset.report(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&dataset);
            }
        }

        Commands::Counties => {
            let dataset = load(&config)?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(dataset.records())?);
            } else {
                println!("{:<22} {:>14} {:>18}", "County", "Median Income", "Unemployment Rate");
                println!("{}", "-".repeat(56));
                for record in dataset.records() {
                    println!(
                        "{:<22} {:>14} {:>18}",
                        record.display_name,
                        format_value(record.median_income),
                        format_value(record.unemployment_rate)
                    );
                }
            }
        }

        Commands::Geojson { output } => {
            let dataset = load(&config)?;
            let geojson = GeoJson::FeatureCollection(feature_collection(&dataset)).to_string();
            write_output(output.as_deref(), geojson.as_bytes())?;
        }

        Commands::Export {
            kind,
            file_type,
            income,
            unemployment,
            output,
        } => {
            let dataset = load(&config)?;
            let options = dataset.counties();
            let selection = DashboardSelection {
                income: select(income, &options)?,
                unemployment: select(unemployment, &options)?,
            };

            let table = ExportTable::build(&dataset, kind, &selection);
            let file = export::render(
                &table,
                file_type,
                &config.export.file_stem,
                &config.export.sheet_name,
            )?;

            let path = output.unwrap_or_else(|| PathBuf::from(&file.file_name));
            std::fs::write(&path, &file.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} rows to {}", table.rows.len(), path.display());
        }
    }

    Ok(())
}

fn load(config: &Config) -> Result<Dataset> {
    DatasetLoader::new(config.data.clone())
        .load()
        .context("Failed to load county data")
}

/// Resolve a `--income`/`--unemployment` list; unknown names are an error here
fn select(requested: Option<Vec<String>>, options: &[String]) -> Result<Selection> {
    let Some(requested) = requested else {
        return Ok(Selection::all(options));
    };

    let unknown: Vec<&String> = requested
        .iter()
        .filter(|c| !options.contains(c))
        .collect();
    if !unknown.is_empty() {
        bail!(
            "Unknown counties: {}",
            unknown
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(Selection::from_iter(requested))
}

fn print_summary(dataset: &Dataset) {
    let report = dataset.report();

    println!("Countyscope v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Counties joined: {}", dataset.len());
    println!("Boundary CRS:    {}", dataset.source_crs());
    for metric in Metric::all() {
        match dataset.range(*metric) {
            Some((lo, hi)) => println!("{}: {} to {}", metric.label(), lo, hi),
            None => println!("{}: no values", metric.label()),
        }
    }

    if report.is_clean() {
        return;
    }

    println!();
    println!("Dropped while joining:");
    let sections = [
        ("Income only", &report.income_only),
        ("Unemployment only", &report.unemployment_only),
        ("Invalid geometry", &report.invalid_geometries),
        ("Boundary without statistics", &report.boundaries_without_stats),
        ("Statistics without boundary", &report.stats_without_boundary),
        ("Duplicate keys", &report.duplicate_keys),
    ];
    for (label, keys) in sections {
        if !keys.is_empty() {
            println!("  {}: {}", label, keys.join(", "));
        }
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(bytes)?;
        }
    }
    Ok(())
}
