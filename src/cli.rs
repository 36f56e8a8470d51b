//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use crate::domain::entities::{FreightClass, VehicleClass};

#[derive(Parser)]
#[command(name = "freight-quote")]
#[command(version)]
#[command(about = "Freight rate quotes, lane market estimates and carrier verification")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote a load described by a JSON rate request
    Quote {
        /// Path to the request JSON file ("-" reads stdin)
        request: PathBuf,

        /// Use this user's stored cost settings
        #[arg(long, short = 'u')]
        user: Option<String>,

        /// Use a stored vehicle profile
        #[arg(long)]
        vehicle: Option<String>,

        /// Vehicle class when no stored vehicle is given (semi, box_truck, ...)
        #[arg(long, value_parser = parse_snake::<VehicleClass>)]
        class: Option<VehicleClass>,
    },

    /// Estimate the market rate band for a lane
    Market {
        /// Origin state code
        #[arg(long)]
        from: String,

        /// Destination state code
        #[arg(long)]
        to: String,

        /// Loaded miles
        #[arg(long)]
        miles: f64,

        #[arg(long, value_parser = parse_snake::<VehicleClass>, default_value = "semi")]
        class: VehicleClass,

        #[arg(long, value_parser = parse_snake::<FreightClass>, default_value = "dry_van")]
        freight: FreightClass,

        /// Pickup date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Compare this total trip rate against the estimate
        #[arg(long)]
        rate: Option<f64>,
    },

    /// Verify a carrier or broker by DOT number, MC number or name
    Verify {
        /// e.g. "DOT 1234567", "MC-123456" or a company name
        query: String,
    },

    /// Record a regional fuel price in the local cache
    Fuel {
        /// State code
        state: String,

        /// Price per gallon
        price: f64,

        /// Gasoline instead of diesel
        #[arg(long)]
        gasoline: bool,
    },

    /// Settings store and configuration
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the settings and config file locations
    Path,
}

/// Parses a snake_case enum name the same way the JSON inputs spell it.
fn parse_snake<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| format!("unknown value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enum_spellings() {
        assert_eq!(parse_snake::<VehicleClass>("Box-Truck"), Ok(VehicleClass::BoxTruck));
        assert_eq!(parse_snake::<FreightClass>("hazmat"), Ok(FreightClass::Hazmat));
        assert!(parse_snake::<VehicleClass>("hovercraft").is_err());
    }

    #[test]
    fn parses_market_command() {
        let cli = Cli::try_parse_from([
            "freight-quote", "market", "--from", "TX", "--to", "IL", "--miles", "1000",
        ])
        .unwrap();
        match cli.command {
            Commands::Market {
                from,
                class,
                freight,
                rate,
                ..
            } => {
                assert_eq!(from, "TX");
                assert_eq!(class, VehicleClass::Semi);
                assert_eq!(freight, FreightClass::DryVan);
                assert!(rate.is_none());
            }
            _ => panic!("expected market command"),
        }
    }
}
