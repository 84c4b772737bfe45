mod cli;
mod config;
mod db;
mod error;
mod logic;
mod models;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use db::Database;
use error::{CropCareError, Result};
use logic::{CostEstimator, RecommendationDeriver};
use models::{CostOutcome, Recommendation, SnapshotFile, TreatmentCost};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = if matches!(cli.command, Commands::Init) {
        match Config::setup_interactive(cli.config.as_ref()) {
            Ok((c, _)) => c,
            Err(e) => {
                eprintln!("Setup failed: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match Config::load(cli.config.as_ref()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                eprintln!("Run `cropcare init` or copy config/config.yaml.example to config/config.yaml");
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = run(&cli, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let db_path = config.db_path(cli.data_dir.as_ref())?;
    let db = Database::open(&db_path)?;

    match &cli.command {
        Commands::Init => {
            let counts = db.table_counts()?;
            println!("Knowledge base ready at {}", db.path().display());
            println!(
                "  {} crop tiers, {} diseases, {} medicines",
                counts.crops, counts.diseases, counts.medicines
            );
        }
        Commands::Check => check(&db, config)?,
        Commands::Recommend { input, json } => {
            let snapshot = read_snapshot(input)?;
            let kb = db.load_knowledge_base()?;
            let recommendation = RecommendationDeriver::new().derive(&snapshot.inputs(), &kb);
            if *json {
                println!("{}", serde_json::to_string_pretty(&recommendation)?);
            } else {
                print_recommendation(&recommendation);
            }
        }
        Commands::Estimate { input, json } => {
            let snapshot = read_snapshot(input)?;
            let kb = db.load_knowledge_base()?;
            let catalog = db.load_price_catalog()?;
            let outcome = CostEstimator::new(&config.pricing).estimate(
                snapshot.detection.as_ref(),
                &snapshot.farm,
                &kb,
                &catalog,
            );
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_estimate(&outcome, &config.pricing.currency_symbol);
            }
        }
        Commands::Diseases => {
            for entry in db.get_disease_entries()? {
                if entry.aliases.is_empty() {
                    println!("{}", entry.disease_name);
                } else {
                    println!("{} (also: {})", entry.disease_name, entry.aliases.join(", "));
                }
            }
        }
        Commands::Medicines { grouped } => {
            let symbol = &config.pricing.currency_symbol;
            if *grouped {
                let kb = db.load_knowledge_base()?;
                let catalog = db.load_price_catalog()?;
                for (disease, medicines) in catalog.medicines_by_disease(&kb) {
                    println!("{}", disease);
                    for m in medicines.into_iter().filter(|m| m.available) {
                        println!(
                            "  [{}] {} ({}) {}{:.2}/{}",
                            m.id.unwrap_or_default(),
                            m.medicine_name,
                            m.brand_name.as_deref().unwrap_or("Generic"),
                            symbol,
                            m.unit_price,
                            m.unit
                        );
                    }
                }
            } else {
                for m in db.available_medicines()? {
                    println!(
                        "[{}] {} ({}) {}{:.2}/{}",
                        m.id.unwrap_or_default(),
                        m.medicine_name,
                        m.brand_name.as_deref().unwrap_or("Generic"),
                        symbol,
                        m.unit_price,
                        m.unit
                    );
                }
            }
        }
        Commands::SetPrice {
            id,
            price,
            brand,
            unavailable,
        } => {
            db.update_medicine_price(*id, *price, brand.as_deref(), !unavailable)?;
            println!("Updated medicine {}", id);
        }
    }

    Ok(())
}

fn check(db: &Database, config: &Config) -> Result<()> {
    let counts = db.table_counts()?;
    println!("Database: {}", db.path().display());
    println!("  Crop tiers:  {}", counts.crops);
    println!("  Diseases:    {} ({} aliases)", counts.diseases, counts.aliases);
    println!("  Medicines:   {}", counts.medicines);
    println!();

    let kb = db.load_knowledge_base()?;
    let catalog = db.load_price_catalog()?;
    if kb.is_empty() || catalog.is_empty() {
        println!("Warning: knowledge base is empty, advice will be generic");
        println!();
    } else {
        println!("Known diseases: {}", db.list_disease_names()?.join(", "));
        println!();
    }

    let p = &config.pricing;
    println!("Cost rates");
    println!(
        "  Equipment:   {}{} + {}{}/acre",
        p.currency_symbol, p.equipment_base, p.currency_symbol, p.equipment_per_acre
    );
    println!("  Labor:       {}{}/acre", p.currency_symbol, p.labor_per_acre);
    println!();

    // Entries whose rate text never parsed cost nothing for medicine
    let unparsed: Vec<_> = kb
        .diseases
        .iter()
        .filter(|d| d.dosage_spec.is_none())
        .collect();
    if !unparsed.is_empty() {
        println!("Dosages without a structured form:");
        for d in unparsed {
            println!("  {}: {}", d.disease_name, d.dosage);
        }
        println!();
    }

    println!("Rules");
    for (id, name) in RecommendationDeriver::new().list_rules() {
        println!("  {:<18} {}", id, name);
    }

    Ok(())
}

/// Snapshot files are JSON when the extension says so, YAML otherwise.
fn read_snapshot(path: &Path) -> Result<SnapshotFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CropCareError::InvalidData(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let snapshot = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(snapshot)
}

fn print_recommendation(rec: &Recommendation) {
    println!("Crop:       {}", rec.crop_suggestion);
    println!(
        "Water:      {} ({})",
        rec.water_advice.description(),
        rec.water_advice
    );

    if !rec.has_disease() {
        println!("Disease:    {}", rec.disease_detected);
        return;
    }

    println!(
        "Disease:    {} ({}, {:.1}% confidence)",
        rec.disease_detected,
        rec.severity,
        rec.confidence * 100.0
    );
    println!("Medicine:   {}", rec.medicine_suggestion);
    println!("Secondary:  {}", rec.medicine_secondary);
    println!("Dosage:     {}", rec.dosage);

    println!("Prevention:");
    for step in rec.preventive_steps() {
        println!("  - {}", step);
    }
    println!("Timeline:");
    for step in rec.timeline_steps() {
        println!("  - {}", step);
    }
}

fn print_estimate(outcome: &CostOutcome, symbol: &str) {
    if !outcome.has_data() {
        println!("{}", outcome.message().unwrap_or_default());
        return;
    }
    let Some(estimate) = outcome.estimate() else {
        return;
    };

    println!(
        "Disease:    {} ({}, confidence {})",
        estimate.disease.name, estimate.disease.severity, estimate.disease.confidence
    );
    println!(
        "Farm:       {} acres, {}",
        estimate.farm.size, estimate.farm.location
    );
    println!();

    println!("Primary treatment");
    print_treatment(&estimate.primary, symbol);

    if let Some(alternative) = &estimate.alternative {
        println!();
        println!("Alternative treatment");
        print_treatment(alternative, symbol);
    }

    println!();
    println!("Timeline:   {}", estimate.timeline);
    println!("Prevention: {}", estimate.preventive_measures);
}

fn print_treatment(cost: &TreatmentCost, symbol: &str) {
    println!("  {} ({})", cost.medicine, cost.brand);
    println!(
        "  Dosage {}, {:.3} {} needed at {}{:.2}/{}",
        cost.dosage, cost.quantity_needed, cost.quantity_unit, symbol, cost.unit_price, cost.unit
    );
    println!("  Medicine:    {}{}", symbol, cost.medicine_cost);
    println!("  Equipment:   {}{}", symbol, cost.equipment_cost);
    println!("  Labor:       {}{}", symbol, cost.application_cost);
    println!(
        "  Total:       {}{} - {}{}",
        symbol, cost.total_min, symbol, cost.total_max
    );
    if cost.is_incomplete() {
        let reason = if cost.dosage_parse_failed {
            "dosage could not be read"
        } else {
            "no catalog price"
        };
        println!("  Warning: {}, medicine cost excluded", reason);
    }
}
