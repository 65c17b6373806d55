//! Overlay manager simulated by a TOML file on disk.
//!
//! The file is read on every call and rewritten after every mutation, so
//! concurrent processes see each other's changes at call granularity.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OverlayError, Result};
use crate::gateway::{Metadata, OverlayGateway, PackageMetadataSource};
use crate::overlay::{OverlayId, OverlayInfo, UserId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceState {
    /// User that `UserId::CURRENT` resolves to.
    #[serde(default)]
    pub current_user: i32,
    #[serde(default)]
    pub overlays: Vec<OverlayRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRecord {
    pub id: OverlayId,
    #[serde(default = "default_target")]
    pub target: String,
    /// Users the overlay is enabled for.
    #[serde(default)]
    pub enabled_users: BTreeSet<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn default_target() -> String {
    "android".to_string()
}

impl DeviceState {
    fn resolve(&self, user: UserId) -> i32 {
        if user == UserId::CURRENT {
            self.current_user
        } else {
            user.get()
        }
    }

    fn info(&self, record: &OverlayRecord, user: UserId) -> OverlayInfo {
        OverlayInfo::new(
            record.id.clone(),
            record.target.clone(),
            record.enabled_users.contains(&self.resolve(user)),
        )
    }
}

#[derive(Debug, Clone)]
pub struct StateFileGateway {
    path: PathBuf,
}

impl StateFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current device state. A missing file is an empty device.
    pub fn load(&self) -> Result<DeviceState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "State file not found, assuming no overlays");
            return Ok(DeviceState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|err| OverlayError::Parse(err.to_string()))
    }

    pub fn save(&self, state: &DeviceState) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let content =
            toml::to_string_pretty(state).map_err(|err| OverlayError::Parse(err.to_string()))?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl OverlayGateway for StateFileGateway {
    fn set_enabled(&self, id: &OverlayId, enabled: bool, user: UserId) -> Result<()> {
        let mut state = self.load()?;
        let resolved = state.resolve(user);
        let Some(record) = state.overlays.iter_mut().find(|r| &r.id == id) else {
            debug!(%id, "Overlay not installed, ignoring toggle");
            return Ok(());
        };
        let changed = if enabled {
            record.enabled_users.insert(resolved)
        } else {
            record.enabled_users.remove(&resolved)
        };
        if changed {
            self.save(&state)?;
        }
        Ok(())
    }

    fn overlay_info(&self, id: &OverlayId, user: UserId) -> Result<Option<OverlayInfo>> {
        let state = self.load()?;
        Ok(state
            .overlays
            .iter()
            .find(|r| &r.id == id)
            .map(|r| state.info(r, user)))
    }

    fn overlays_for_target(&self, target: &str, user: UserId) -> Result<Vec<OverlayInfo>> {
        let state = self.load()?;
        Ok(state
            .overlays
            .iter()
            .filter(|r| r.target == target)
            .map(|r| state.info(r, user))
            .collect())
    }
}

impl PackageMetadataSource for StateFileGateway {
    fn package_metadata(&self, package: &OverlayId) -> Result<Option<Metadata>> {
        let state = self.load()?;
        state
            .overlays
            .into_iter()
            .find(|r| &r.id == package)
            .map(|r| r.metadata)
            .ok_or_else(|| OverlayError::Lookup {
                package: package.to_string(),
                reason: "package not installed".to_string(),
            })
    }
}
