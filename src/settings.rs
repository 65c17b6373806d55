//! User-scoped settings the coordinator reads its selections from.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{OverlayError, Result};
use crate::overlay::UserId;

pub const ACCENT_PICKER: &str = "accent_picker";
pub const CLOCK_STYLE: &str = "clock_style";
pub const DARK_THEME: &str = "dark_theme";
pub const BLACK_THEME: &str = "black_theme";

/// A per-user key/value settings store.
///
/// Reads never fail: a missing or unreadable value yields the default.
pub trait SettingsStore {
    fn int_for_user(&self, key: &str, default: i64, user: UserId) -> i64;

    fn bool_for_user(&self, key: &str, default: bool, user: UserId) -> bool;

    fn put_int_for_user(&mut self, key: &str, value: i64, user: UserId) -> Result<()>;

    fn put_bool_for_user(&mut self, key: &str, value: bool, user: UserId) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

type UserSettings = BTreeMap<String, SettingValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// Keyed by user id.
    #[serde(default)]
    pub users: BTreeMap<String, UserSettings>,
}

impl SettingsFile {
    fn get(&self, key: &str, user: UserId) -> Option<&SettingValue> {
        self.users.get(&user.get().to_string())?.get(key)
    }

    fn put(&mut self, key: &str, value: SettingValue, user: UserId) {
        self.users
            .entry(user.get().to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn int(&self, key: &str, default: i64, user: UserId) -> i64 {
        match self.get(key, user) {
            Some(SettingValue::Int(value)) => *value,
            Some(SettingValue::Bool(value)) => i64::from(*value),
            None => default,
        }
    }

    fn bool(&self, key: &str, default: bool, user: UserId) -> bool {
        match self.get(key, user) {
            Some(SettingValue::Bool(value)) => *value,
            Some(SettingValue::Int(value)) => *value != 0,
            None => default,
        }
    }
}

/// Settings held in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    file: SettingsFile,
}

impl SettingsStore for MemorySettings {
    fn int_for_user(&self, key: &str, default: i64, user: UserId) -> i64 {
        self.file.int(key, default, user)
    }

    fn bool_for_user(&self, key: &str, default: bool, user: UserId) -> bool {
        self.file.bool(key, default, user)
    }

    fn put_int_for_user(&mut self, key: &str, value: i64, user: UserId) -> Result<()> {
        self.file.put(key, SettingValue::Int(value), user);
        Ok(())
    }

    fn put_bool_for_user(&mut self, key: &str, value: bool, user: UserId) -> Result<()> {
        self.file.put(key, SettingValue::Bool(value), user);
        Ok(())
    }
}

/// Settings persisted as TOML, one table per user.
///
/// ```toml
/// [users.0]
/// accent_picker = 6
/// dark_theme = true
/// ```
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<SettingsFile> {
        if !self.path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|err| OverlayError::Parse(err.to_string()))
    }

    /// Read for a getter, falling back to empty settings on failure.
    fn read_or_default(&self) -> SettingsFile {
        self.read().unwrap_or_else(|err| {
            warn!(path = %self.path.display(), %err, "Can't read settings, using defaults");
            SettingsFile::default()
        })
    }

    fn update(&self, key: &str, value: SettingValue, user: UserId) -> Result<()> {
        let mut file = self.read()?;
        file.put(key, value, user);
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let content =
            toml::to_string_pretty(&file).map_err(|err| OverlayError::Parse(err.to_string()))?;
        fs::write(&self.path, content)?;
        debug!(key, %user, path = %self.path.display(), "Saved setting");
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn int_for_user(&self, key: &str, default: i64, user: UserId) -> i64 {
        self.read_or_default().int(key, default, user)
    }

    fn bool_for_user(&self, key: &str, default: bool, user: UserId) -> bool {
        self.read_or_default().bool(key, default, user)
    }

    fn put_int_for_user(&mut self, key: &str, value: i64, user: UserId) -> Result<()> {
        self.update(key, SettingValue::Int(value), user)
    }

    fn put_bool_for_user(&mut self, key: &str, value: bool, user: UserId) -> Result<()> {
        self.update(key, SettingValue::Bool(value), user)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let store = MemorySettings::default();
        assert_eq!(store.int_for_user(ACCENT_PICKER, 0, UserId::SYSTEM), 0);
        assert!(store.bool_for_user(DARK_THEME, true, UserId::SYSTEM));
    }

    #[test]
    fn test_values_are_per_user() {
        let mut store = MemorySettings::default();
        store.put_int_for_user(ACCENT_PICKER, 4, UserId::new(10)).unwrap();
        assert_eq!(store.int_for_user(ACCENT_PICKER, 0, UserId::new(10)), 4);
        assert_eq!(store.int_for_user(ACCENT_PICKER, 0, UserId::SYSTEM), 0);
    }

    #[test]
    fn test_toml_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut store = TomlSettingsStore::new(&path);
        store.put_int_for_user(ACCENT_PICKER, 7, UserId::SYSTEM).unwrap();
        store.put_bool_for_user(BLACK_THEME, true, UserId::CURRENT).unwrap();

        let reopened = TomlSettingsStore::new(&path);
        assert_eq!(reopened.int_for_user(ACCENT_PICKER, 0, UserId::SYSTEM), 7);
        assert!(reopened.bool_for_user(BLACK_THEME, false, UserId::CURRENT));
        assert!(!reopened.bool_for_user(BLACK_THEME, false, UserId::SYSTEM));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("accent_picker = 7"));
    }

    #[test]
    fn test_unreadable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "users = 12").unwrap();
        let store = TomlSettingsStore::new(&path);
        assert_eq!(store.int_for_user(CLOCK_STYLE, 3, UserId::SYSTEM), 3);
    }
}
