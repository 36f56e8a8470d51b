pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name used under the platform data and config directories.
pub const DATA_DIR_NAME: &str = "freight-rate-engine";

pub fn version_label() -> String {
    format!("v{APP_VERSION}")
}

pub fn user_agent() -> String {
    format!("{}/{}", DATA_DIR_NAME, version_label())
}
