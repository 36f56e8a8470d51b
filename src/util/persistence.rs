use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::domain::entities::{CostSettings, VehicleProfile};
use crate::domain::ports::{CostSettingsProvider, VehicleRegistry};
use crate::util::config::{APP_DIR, APP_ORG, APP_QUALIFIER};

const SETTINGS_FILE: &str = "settings.json";

pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_DIR)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    users: BTreeMap<String, CostSettings>,
    #[serde(default)]
    vehicles: BTreeMap<String, VehicleProfile>,
}

/// Per-user cost settings and vehicle profiles kept in one JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    data: StoreData,
}

impl SettingsStore {
    pub fn open_default() -> Result<Self, PersistError> {
        let path = default_settings_path().ok_or(PersistError::StorageUnavailable)?;
        Self::open(path)
    }

    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        let data = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            StoreData::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_cost_settings(&mut self, user_id: &str, settings: CostSettings) {
        self.data.users.insert(user_id.to_string(), settings);
    }

    pub fn upsert_vehicle(&mut self, vehicle_id: &str, mut vehicle: VehicleProfile) {
        vehicle.id = Some(vehicle_id.to_string());
        self.data.vehicles.insert(vehicle_id.to_string(), vehicle);
    }

    pub fn remove_vehicle(&mut self, vehicle_id: &str) -> Option<VehicleProfile> {
        self.data.vehicles.remove(vehicle_id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleProfile> {
        self.data.vehicles.values()
    }

    pub fn save(&self) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CostSettingsProvider for SettingsStore {
    fn cost_settings(&self, user_id: &str) -> Option<CostSettings> {
        self.data.users.get(user_id).cloned()
    }
}

impl VehicleRegistry for SettingsStore {
    fn vehicle(&self, vehicle_id: &str) -> Option<VehicleProfile> {
        self.data.vehicles.get(vehicle_id).cloned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
