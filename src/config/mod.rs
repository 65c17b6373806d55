mod defaults;
pub mod loader;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use loader::{config_dir, config_path, data_dir, load, load_from};

use crate::coordinator::AccentPolicy;

/// Overlay identifiers making up the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Prepended to every accent name to form its overlay id.
    pub accent_prefix: String,
    /// Accent names in picker order, without the trailing black/white slot.
    pub accents: Vec<String>,
    /// Accent used on light backgrounds.
    pub black_accent: String,
    /// Accent used on dark backgrounds.
    pub white_accent: String,
    /// Dark theme bundle. The first entry is the marker.
    pub dark_bundle: Vec<String>,
    /// Black theme bundle. The first entry is the marker.
    pub black_bundle: Vec<String>,
    /// Legacy dark overlay unloaded whenever a dark or black theme is requested.
    pub stock_dark: String,
    /// Comma-separated clock styles. Index 0 is the stock clock.
    pub clocks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstratumConfig {
    /// Package whose overlays are scanned.
    pub target: String,
    /// Metadata key declared by third-party engine overlays.
    pub metadata_key: String,
    /// Overlay id prefixes that are never reported.
    pub allowlist: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub accent_policy: AccentPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Overlay state simulated in a local TOML file.
    #[default]
    StateFile,
    /// `cmd overlay` on the device itself.
    Device,
    /// `cmd overlay` through `adb shell`.
    Adb,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// State file for the `state-file` backend. Defaults to the data directory.
    pub state_file: Option<PathBuf>,
    /// Device serial for the `adb` backend.
    pub serial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub substratum: SubstratumConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    /// Settings file. Defaults to `settings.toml` in the config directory.
    #[serde(default)]
    pub settings_file: Option<PathBuf>,
}
