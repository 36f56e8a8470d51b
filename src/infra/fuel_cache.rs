//! Regional fuel prices with a TTL, mirrored to a JSON file in the local
//! data directory so prices survive restarts.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::entities::FuelType;
use crate::domain::ports::FuelPriceSource;
use crate::util::version::DATA_DIR_NAME;

const CACHE_FILENAME: &str = "fuel_prices.json";

/// Regional averages are published a few times a day.
pub const DEFAULT_FUEL_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Error)]
pub enum FuelCacheError {
    #[error("fuel price must be a positive number, got {0}")]
    InvalidPrice(f64),
    #[error("state code is empty")]
    MissingState,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPriceEntry {
    pub state: String,
    pub fuel: FuelType,
    /// USD per gallon.
    pub price: f64,
    /// Unix timestamp (seconds).
    pub cached_at: u64,
}

impl FuelPriceEntry {
    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<FuelPriceEntry>,
}

type CacheKey = (String, FuelType);

impl CacheFile {
    fn snapshot(entries: &HashMap<CacheKey, FuelPriceEntry>) -> Self {
        let mut entries: Vec<FuelPriceEntry> = entries.values().cloned().collect();
        entries.sort_by(|a, b| (&a.state, a.fuel).cmp(&(&b.state, b.fuel)));
        Self { entries }
    }
}

#[derive(Clone)]
pub struct FuelPriceCache {
    entries: Arc<Mutex<HashMap<CacheKey, FuelPriceEntry>>>,
    write_lock: Arc<Mutex<()>>,
    path: Option<PathBuf>,
    ttl: Duration,
}

impl FuelPriceCache {
    /// Memory-only cache.
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            write_lock: Arc::new(Mutex::new(())),
            path: None,
            ttl,
        }
    }

    /// Cache backed by the default file in the local data directory.
    pub fn persistent(ttl: Duration) -> Self {
        Self::at_path(default_cache_path(), ttl)
    }

    pub fn at_path(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let entries = load_entries(&path)
            .into_iter()
            .map(|entry| ((entry.state.clone(), entry.fuel), entry))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(entries)),
            write_lock: Arc::new(Mutex::new(())),
            path: Some(path),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn record(&self, state: &str, fuel: FuelType, price: f64) -> Result<(), FuelCacheError> {
        self.record_at(state, fuel, price, SystemTime::now()).await
    }

    /// Stores a price observed at `observed_at`, replacing any older entry
    /// for the same state and fuel.
    pub async fn record_at(
        &self,
        state: &str,
        fuel: FuelType,
        price: f64,
        observed_at: SystemTime,
    ) -> Result<(), FuelCacheError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(FuelCacheError::InvalidPrice(price));
        }
        let state = normalize_state(state).ok_or(FuelCacheError::MissingState)?;
        let cached_at = observed_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut entries = self.entries.lock().await;
        entries.insert(
            (state.clone(), fuel),
            FuelPriceEntry {
                state: state.clone(),
                fuel,
                price,
                cached_at,
            },
        );
        eprintln!("[fuel-cache] Stored {} {state} at ${price:.3}", fuel.as_str());
        let file = CacheFile::snapshot(&entries);
        let _write = self.write_lock.lock().await;
        drop(entries);
        self.save(file).await
    }

    /// Fresh entry for the state and fuel, if any.
    pub async fn get(&self, state: &str, fuel: FuelType) -> Option<FuelPriceEntry> {
        let state = normalize_state(state)?;
        let entries = self.entries.lock().await;
        let entry = entries.get(&(state, fuel))?;
        if entry.is_expired(self.ttl) {
            eprintln!(
                "[fuel-cache] {} {} expired (age: {})",
                entry.fuel.as_str(),
                entry.state,
                entry.age_string()
            );
            return None;
        }
        Some(entry.clone())
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize, FuelCacheError> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        let removed = before - entries.len();
        if removed > 0 {
            eprintln!("[fuel-cache] Purged {removed} expired price(s)");
            let file = CacheFile::snapshot(&entries);
            let _write = self.write_lock.lock().await;
            drop(entries);
            self.save(file).await?;
        }
        Ok(removed)
    }

    /// Callers hold `write_lock` so snapshots reach the disk in the order
    /// they were taken.
    async fn save(&self, file: CacheFile) -> Result<(), FuelCacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(&file)?).await?;
        Ok(())
    }
}

impl FuelPriceSource for FuelPriceCache {
    async fn cached_price(&self, state: &str, fuel: FuelType) -> Option<f64> {
        self.get(state, fuel).await.map(|entry| entry.price)
    }
}

fn normalize_state(state: &str) -> Option<String> {
    let trimmed = state.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_ascii_uppercase())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn default_cache_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
        .join(CACHE_FILENAME)
}

fn load_entries(path: &Path) -> Vec<FuelPriceEntry> {
    if !path.exists() {
        eprintln!("[fuel-cache] No fuel price cache at {}", path.display());
        return Vec::new();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<CacheFile>(&content) {
            Ok(file) => {
                eprintln!(
                    "[fuel-cache] Loaded {} price(s) from {}",
                    file.entries.len(),
                    path.display()
                );
                file.entries
            }
            Err(e) => {
                eprintln!("[fuel-cache] Failed to parse fuel price cache: {e}");
                Vec::new()
            }
        },
        Err(e) => {
            eprintln!("[fuel-cache] Failed to read fuel price cache: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_only_fresh_prices() {
        let cache = FuelPriceCache::in_memory(Duration::from_secs(60 * 60));
        cache.record("tx", FuelType::Diesel, 3.89).await.unwrap();
        cache
            .record_at(
                "IL",
                FuelType::Diesel,
                4.10,
                SystemTime::now() - Duration::from_secs(2 * 60 * 60),
            )
            .await
            .unwrap();

        assert_eq!(cache.cached_price("TX", FuelType::Diesel).await, Some(3.89));
        assert_eq!(cache.cached_price("TX", FuelType::Gasoline).await, None);
        assert_eq!(cache.cached_price("IL", FuelType::Diesel).await, None);

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prices_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CACHE_FILENAME);

        let cache = FuelPriceCache::at_path(&path, DEFAULT_FUEL_CACHE_TTL);
        cache.record("oh", FuelType::Diesel, 3.71).await.unwrap();
        cache.record("CA", FuelType::Gasoline, 4.95).await.unwrap();
        drop(cache);

        let reopened = FuelPriceCache::at_path(&path, DEFAULT_FUEL_CACHE_TTL);
        assert_eq!(reopened.cached_price("OH", FuelType::Diesel).await, Some(3.71));
        assert_eq!(reopened.cached_price("CA", FuelType::Gasoline).await, Some(4.95));

        let file: CacheFile =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        let states: Vec<&str> = file.entries.iter().map(|e| e.state.as_str()).collect();
        assert_eq!(states, ["CA", "OH"]);
    }

    #[tokio::test]
    async fn rejects_bad_input() {
        let cache = FuelPriceCache::in_memory(DEFAULT_FUEL_CACHE_TTL);
        assert!(matches!(
            cache.record("TX", FuelType::Diesel, 0.0).await,
            Err(FuelCacheError::InvalidPrice(_))
        ));
        assert!(matches!(
            cache.record("  ", FuelType::Diesel, 3.0).await,
            Err(FuelCacheError::MissingState)
        ));
    }

    #[test]
    fn age_string_units() {
        let entry = FuelPriceEntry {
            state: "OH".into(),
            fuel: FuelType::Diesel,
            price: 3.7,
            cached_at: unix_now() - 2 * 3600,
        };
        assert_eq!(entry.age_string(), "2h");
        assert!(entry.is_expired(Duration::from_secs(3600)));
        assert!(!entry.is_expired(DEFAULT_FUEL_CACHE_TTL));
    }
}
