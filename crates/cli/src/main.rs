//! Bloom CLI - Database migrations and delivery zone management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! bloom-cli migrate
//!
//! # Import a store's zones from a YAML file (replaces existing zones)
//! bloom-cli zones import zones/voronezh.yaml
//!
//! # Check stored polygons for swapped axes
//! bloom-cli zones audit --store 1
//!
//! # Swap the axes of one stored polygon
//! bloom-cli zones swap-axes 7
//!
//! # Quote delivery against a zone file without a database
//! bloom-cli quote --file zones/voronezh.yaml --lat 51.66 --lng 39.20 --subtotal 2000
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `zones` - Import, audit and repair delivery zones
//! - `quote` - Offline delivery quote

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use bloom_core::{DeliveryZoneId, StoreId};

mod commands;

#[derive(Parser)]
#[command(name = "bloom-cli")]
#[command(author, version, about = "Bloom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Manage delivery zones
    Zones {
        #[command(subcommand)]
        action: ZonesAction,
    },
    /// Quote delivery against a zone file, without a database
    Quote {
        /// Zone file (YAML)
        #[arg(short, long)]
        file: PathBuf,

        /// Delivery latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Delivery longitude
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Cart subtotal
        #[arg(long, allow_negative_numbers = true)]
        subtotal: Decimal,
    },
}

#[derive(Subcommand)]
enum ZonesAction {
    /// Replace a store's zones with those in a YAML file
    Import {
        /// Zone file (YAML)
        file: PathBuf,
    },
    /// Report malformed zones and zones whose axes look swapped
    Audit {
        /// Only audit this store
        #[arg(short, long)]
        store: Option<i32>,
    },
    /// Swap latitude and longitude of every vertex of a stored zone
    SwapAxes {
        /// Zone ID
        zone_id: i32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Zones { action } => match action {
            ZonesAction::Import { file } => commands::zones::import(&file).await?,
            ZonesAction::Audit { store } => {
                commands::zones::audit(store.map(StoreId::new)).await?;
            }
            ZonesAction::SwapAxes { zone_id } => {
                commands::zones::swap_axes(DeliveryZoneId::new(zone_id)).await?;
            }
        },
        Commands::Quote {
            file,
            lat,
            lng,
            subtotal,
        } => commands::quote::offline(&file, lat, lng, subtotal)?,
    }
    Ok(())
}
