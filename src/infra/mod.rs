//! Adapters to the outside world: the carrier registry over HTTP and the
//! on-disk fuel price cache.

pub mod fmcsa;
pub mod fuel_cache;

pub use fmcsa::{FmcsaClient, FmcsaError};
pub use fuel_cache::{FuelCacheError, FuelPriceCache, DEFAULT_FUEL_CACHE_TTL};
