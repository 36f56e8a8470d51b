//! Interfaces to the collaborators the engine consumes but does not own.

use std::future::Future;

use thiserror::Error;

use super::entities::{CostSettings, FuelType, VehicleProfile};
use super::risk::{CarrierMatch, RegistryRecord};

/// Per-user cost configuration. `None` means "use every default".
pub trait CostSettingsProvider {
    fn cost_settings(&self, user_id: &str) -> Option<CostSettings>;
}

pub trait VehicleRegistry {
    fn vehicle(&self, vehicle_id: &str) -> Option<VehicleProfile>;
}

/// Regional fuel prices. Implementations return only non-expired values.
pub trait FuelPriceSource {
    fn cached_price(
        &self,
        state: &str,
        fuel: FuelType,
    ) -> impl Future<Output = Option<f64>> + Send;
}

/// A source with nothing cached; every lookup misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFuelPrices;

impl FuelPriceSource for NoFuelPrices {
    async fn cached_price(&self, _state: &str, _fuel: FuelType) -> Option<f64> {
        None
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("no registry record for {0}")]
    NotFound(String),
    #[error("registry unavailable: {0}")]
    Unavailable(String),
    #[error("malformed registry response: {0}")]
    Malformed(String),
}

/// Counterparty registry (FMCSA-style). The MC and DOT lookups return the
/// full record: identity, authority, insurance and safety data.
pub trait CarrierRegistry {
    fn lookup_dot(
        &self,
        dot_number: &str,
    ) -> impl Future<Output = Result<RegistryRecord, RegistryError>> + Send;

    fn lookup_mc(
        &self,
        mc_number: &str,
    ) -> impl Future<Output = Result<RegistryRecord, RegistryError>> + Send;

    fn search_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<CarrierMatch>, RegistryError>> + Send;
}
