use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cropcare",
    version,
    about = "Farm treatment recommendations and cost estimates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run interactive setup and seed the knowledge base
    Init,
    /// Validate config and report knowledge base contents
    Check,
    /// Derive crop, water and treatment advice for a farm snapshot
    Recommend {
        /// Snapshot file (YAML or JSON) with farm, iot and detection sections
        #[arg(short, long)]
        input: PathBuf,

        /// Print JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Estimate treatment cost for the detected disease
    Estimate {
        /// Snapshot file (YAML or JSON) with farm and detection sections
        #[arg(short, long)]
        input: PathBuf,

        /// Print JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// List known diseases and their aliases
    Diseases,
    /// List available medicines in the price catalog
    Medicines {
        /// Group medicines by the disease they treat
        #[arg(long)]
        grouped: bool,
    },
    /// Update a medicine's catalog price
    SetPrice {
        /// Catalog row id
        id: i64,

        /// New unit price
        #[arg(long)]
        price: f64,

        /// Brand name
        #[arg(long)]
        brand: Option<String>,

        /// Mark the medicine as unavailable
        #[arg(long)]
        unavailable: bool,
    },
}
