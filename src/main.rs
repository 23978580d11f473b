//! RBI Engine CLI
//!
//! Runs calculations against a JSON dataset of equipment records and
//! extracted inspection data.
//!
//! # Usage
//!
//! ```bash
//! # Single calculation at Level 4 (falls back as the data requires)
//! rbi-engine calculate --data data/sample_equipment.json --equipment V-101
//!
//! # Every equipment item in the dataset at Level 2
//! rbi-engine batch --data data/sample_equipment.json --level 2
//!
//! # Explain a fallback
//! rbi-engine report --data data/sample_equipment.json --equipment V-103
//!
//! # Check a config file
//! rbi-engine validate-config --config rbi_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `RBI_CONFIG`: Path to the TOML config when `--config` is not given; an
//!   unreadable or invalid file logs a warning and the search continues
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use rbi_engine::{
    EquipmentDataProvider, ExtractedDataProvider, FallbackReporter, InMemoryProvider, RBIConfig,
    RBICalculationEngine, RBILevel,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rbi-engine")]
#[command(about = "Risk-Based Inspection interval calculation with level fallback")]
#[command(version)]
struct CliArgs {
    /// Path to the RBI config TOML (default: $RBI_CONFIG, ./rbi_config.toml, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the next inspection date for one equipment item
    Calculate {
        /// JSON dataset: {"equipment": [...], "extracted": [...]}
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        equipment: String,
        /// Requested RBI level (1-4)
        #[arg(long, default_value = "4", value_parser = clap::value_parser!(u8).range(1..=4))]
        level: u8,
    },

    /// Calculate several equipment items (all in the dataset if none given)
    Batch {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        equipment: Vec<String>,
        #[arg(long, default_value = "4", value_parser = clap::value_parser!(u8).range(1..=4))]
        level: u8,
    },

    /// Show level capability and data quality for one equipment item
    Summary {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        equipment: String,
    },

    /// Calculate and explain any fallback
    Report {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        equipment: String,
        #[arg(long, default_value = "4", value_parser = clap::value_parser!(u8).range(1..=4))]
        level: u8,
    },

    /// Validate the config and exit
    ValidateConfig,

    /// Print the effective config as TOML
    PrintConfig,
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<RBIConfig> {
    match path {
        Some(p) => RBIConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(RBIConfig::load()),
    }
}

fn build_engine(config: RBIConfig, data: &Path) -> Result<(RBICalculationEngine, Arc<InMemoryProvider>)> {
    let provider = Arc::new(
        InMemoryProvider::load_json(data)
            .with_context(|| format!("Failed to load dataset {}", data.display()))?,
    );
    let engine = RBICalculationEngine::new(config, provider.clone(), provider.clone())
        .context("Invalid RBI configuration")?;
    Ok((engine, provider))
}

fn level(n: u8) -> Result<RBILevel> {
    RBILevel::from_u8(n).with_context(|| format!("Invalid RBI level {n}, expected 1-4"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Calculate {
            data,
            equipment,
            level: n,
        } => {
            let (engine, _) = build_engine(config, &data)?;
            let result = engine
                .calculate_next_inspection_date(&equipment, level(n)?)
                .with_context(|| format!("Calculation failed for {equipment}"))?;
            print_json(&result)
        }

        Command::Batch {
            data,
            equipment,
            level: n,
        } => {
            let (engine, provider) = build_engine(config, &data)?;
            let ids = if equipment.is_empty() {
                provider.equipment_ids().to_vec()
            } else {
                equipment
            };
            info!(count = ids.len(), "Running batch");
            let entries = engine.calculate_batch(ids.as_slice(), level(n)?);
            print_json(&entries)
        }

        Command::Summary { data, equipment } => {
            let (engine, _) = build_engine(config, &data)?;
            let summary = engine
                .get_calculation_summary(&equipment)
                .with_context(|| format!("Summary failed for {equipment}"))?;
            print_json(&summary)
        }

        Command::Report {
            data,
            equipment,
            level: n,
        } => {
            let (engine, provider) = build_engine(config, &data)?;
            let equipment_data = EquipmentDataProvider::get(provider.as_ref(), &equipment)
                .with_context(|| format!("Equipment {equipment} not in dataset"))?;
            let extracted = ExtractedDataProvider::get(provider.as_ref(), &equipment)?;
            let result = engine
                .calculate_for(&equipment_data, &extracted, level(n)?, chrono::Utc::now())
                .with_context(|| format!("Calculation failed for {equipment}"))?;
            let report = FallbackReporter::new(engine.config())
                .generate_report(&equipment_data, &extracted, &result);
            print_json(&report)
        }

        Command::ValidateConfig => {
            config.validate().context("Config validation failed")?;
            println!("Config OK");
            Ok(())
        }

        Command::PrintConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
