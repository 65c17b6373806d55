use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "overlay-themer";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Directory for logs and the simulated device state.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(|| PathBuf::from("."), |p| p.join(CONFIG_DIR))
}

pub fn load() -> color_eyre::Result<AppConfig> {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            debug!("No config directory found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

pub fn load_from(path: &Path) -> color_eyre::Result<AppConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use tempfile::{NamedTempFile, tempdir};

    use super::*;
    use crate::config::BackendKind;
    use crate::coordinator::AccentPolicy;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.catalog.accents.len(), 19);
        assert_eq!(config.catalog.dark_bundle.len(), 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"
[coordinator]
accent_policy = "strict"

[backend]
kind = "adb"
serial = "emulator-5554"

[catalog]
accent_prefix = "org.accents."
"#,
        )
        .unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.coordinator.accent_policy, AccentPolicy::Strict);
        assert_eq!(config.backend.kind, BackendKind::Adb);
        assert_eq!(config.backend.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(config.catalog.accent_prefix, "org.accents.");
        assert_eq!(config.catalog.black_accent, "black");
        assert_eq!(config.substratum.metadata_key, "Substratum_Version");
    }
}
