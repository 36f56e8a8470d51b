//! Command handlers behind the CLI.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::cli::{Cli, Commands, SettingsAction};
use crate::domain::entities::{parse_date, FuelType, RateRequest};
use crate::domain::market::{
    compare_to_market, estimate_market, MarketComparison, MarketEstimate, MarketQuery,
};
use crate::domain::quote::{resolve_vehicle, QuoteEngine, QuoteInput};
use crate::domain::risk::verify_carrier;
use crate::infra::fmcsa::{FmcsaClient, FmcsaError};
use crate::infra::fuel_cache::{FuelCacheError, FuelPriceCache};
use crate::util::config::{ConfigError, EngineConfig};
use crate::util::persistence::{PersistError, SettingsStore};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("settings store: {0}")]
    Persist(#[from] PersistError),
    #[error("carrier registry: {0}")]
    Fmcsa(#[from] FmcsaError),
    #[error("fuel cache: {0}")]
    FuelCache(#[from] FuelCacheError),
    #[error("failed to read {path}: {source}")]
    ReadInput { path: String, source: io::Error },
    #[error("invalid rate request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = EngineConfig::load()?;

    match cli.command {
        Commands::Quote {
            request,
            user,
            vehicle,
            class,
        } => {
            let request = read_request(&request)?;
            let store = open_store(&config)?;
            let engine = QuoteEngine::new(FuelPriceCache::persistent(config.fuel_cache_ttl()));

            let quote = match user {
                Some(user) => {
                    engine
                        .quote_for_user(
                            &user,
                            vehicle.as_deref(),
                            class,
                            request,
                            &store,
                            &store,
                        )
                        .await
                }
                None => {
                    engine
                        .quote(QuoteInput {
                            request,
                            vehicle: resolve_vehicle(vehicle.as_deref(), class, &store),
                            ..QuoteInput::default()
                        })
                        .await
                }
            };
            eprintln!(
                "[quote] {} -> ${:.0} ({:?} vs market)",
                quote.id, quote.rate.recommended_rate, quote.comparison.position
            );
            print_json(&quote, cli.pretty)
        }
        Commands::Market {
            from,
            to,
            miles,
            class,
            freight,
            date,
            rate,
        } => {
            let pickup_date = match date.as_deref() {
                Some(raw) => parse_date(Some(raw)),
                None => Some(time::OffsetDateTime::now_utc().date()),
            };
            let estimate = estimate_market(&MarketQuery {
                origin_state: from,
                destination_state: to,
                total_miles: miles,
                vehicle_class: class,
                freight_class: freight,
                pickup_date,
                season: None,
            });
            match rate {
                Some(rate) => {
                    #[derive(Serialize)]
                    struct WithComparison<'a> {
                        estimate: &'a MarketEstimate,
                        comparison: MarketComparison,
                    }
                    let comparison = compare_to_market(rate, miles, &estimate);
                    print_json(
                        &WithComparison {
                            estimate: &estimate,
                            comparison,
                        },
                        cli.pretty,
                    )
                }
                None => print_json(&estimate, cli.pretty),
            }
        }
        Commands::Verify { query } => {
            let web_key = config.fmcsa_web_key.clone().unwrap_or_default();
            let client = FmcsaClient::with_base_url(&config.fmcsa_base_url, web_key)?;
            let verification = verify_carrier(&query, &client).await;
            print_json(&verification, cli.pretty)
        }
        Commands::Fuel {
            state,
            price,
            gasoline,
        } => {
            let fuel = if gasoline {
                FuelType::Gasoline
            } else {
                FuelType::Diesel
            };
            let cache = FuelPriceCache::persistent(config.fuel_cache_ttl());
            cache.record(&state, fuel, price).await?;
            if let Some(path) = cache.path() {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Settings {
            action: SettingsAction::Path,
        } => {
            let store = open_store(&config)?;
            println!("settings: {}", store.path().display());
            println!("config:   {}", EngineConfig::config_path()?.display());
            Ok(())
        }
    }
}

fn open_store(config: &EngineConfig) -> Result<SettingsStore, PersistError> {
    match &config.settings_path {
        Some(path) => SettingsStore::open(path),
        None => SettingsStore::open_default(),
    }
}

fn read_request(path: &Path) -> Result<RateRequest, AppError> {
    let read_error = |source| AppError::ReadInput {
        path: path.display().to_string(),
        source,
    };
    let content = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(read_error)?;
        buffer
    } else {
        fs::read_to_string(path).map_err(read_error)?
    };
    Ok(serde_json::from_str(&content)?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), AppError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
