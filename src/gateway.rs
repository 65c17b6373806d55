//! Access to the overlay manager.
//!
//! Every call goes straight to the backing service. Implementations must not
//! cache overlay state: the coordinator relies on each query being fresh.

pub mod device;
pub mod state_file;

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::Result;
use crate::overlay::{OverlayId, OverlayInfo, UserId};

pub use device::DeviceGateway;
pub use state_file::StateFileGateway;

/// Package metadata as a flat key/value map.
pub type Metadata = BTreeMap<String, String>;

/// The overlay manager service.
///
/// All operations act on a single overlay and may fail independently.
pub trait OverlayGateway: Send + Sync {
    /// Enable or disable one overlay for a user.
    fn set_enabled(&self, id: &OverlayId, enabled: bool, user: UserId) -> Result<()>;

    /// Look up one overlay. `Ok(None)` means the overlay is not installed.
    fn overlay_info(&self, id: &OverlayId, user: UserId) -> Result<Option<OverlayInfo>>;

    /// List every overlay targeting the given package.
    fn overlays_for_target(&self, target: &str, user: UserId) -> Result<Vec<OverlayInfo>>;
}

/// Read access to installed package metadata.
pub trait PackageMetadataSource: Send + Sync {
    /// Metadata of a package. `Ok(None)` means the package declares none.
    fn package_metadata(&self, package: &OverlayId) -> Result<Option<Metadata>>;
}

/// Whether an overlay is currently enabled for the user.
///
/// Missing overlays and failed lookups both read as disabled.
pub fn is_overlay_enabled(gateway: &dyn OverlayGateway, id: &OverlayId, user: UserId) -> bool {
    match gateway.overlay_info(id, user) {
        Ok(info) => info.is_some_and(|info| info.enabled),
        Err(err) => {
            warn!(%id, %user, %err, "Can't query overlay state");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory gateway that records every mutation.

    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use super::*;
    use crate::error::OverlayError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SetCall {
        pub id: OverlayId,
        pub enabled: bool,
        pub user: UserId,
    }

    #[derive(Default)]
    pub struct MockGateway {
        overlays: Mutex<BTreeMap<OverlayId, OverlayInfo>>,
        calls: Mutex<Vec<SetCall>>,
        failing: Mutex<HashSet<OverlayId>>,
        metadata: Mutex<BTreeMap<OverlayId, Option<Metadata>>>,
        broken_metadata: Mutex<HashSet<OverlayId>>,
        list_fails: Mutex<bool>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register an overlay targeting `android`.
        pub fn with(self, id: &str, enabled: bool) -> Self {
            self.with_target(id, "android", enabled)
        }

        pub fn with_target(self, id: &str, target: &str, enabled: bool) -> Self {
            self.overlays
                .lock()
                .unwrap()
                .insert(OverlayId::from(id), OverlayInfo::new(id, target, enabled));
            self
        }

        pub fn with_metadata(self, id: &str, entries: &[(&str, &str)]) -> Self {
            let map = entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            self.metadata
                .lock()
                .unwrap()
                .insert(OverlayId::from(id), Some(map));
            self
        }

        pub fn with_broken_metadata(self, id: &str) -> Self {
            self.broken_metadata
                .lock()
                .unwrap()
                .insert(OverlayId::from(id));
            self
        }

        pub fn failing_on(self, id: &str) -> Self {
            self.failing.lock().unwrap().insert(OverlayId::from(id));
            self
        }

        pub fn failing_list(self) -> Self {
            *self.list_fails.lock().unwrap() = true;
            self
        }

        pub fn calls(&self) -> Vec<SetCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        pub fn is_enabled(&self, id: &str) -> bool {
            self.overlays
                .lock()
                .unwrap()
                .get(&OverlayId::from(id))
                .is_some_and(|info| info.enabled)
        }
    }

    impl OverlayGateway for MockGateway {
        fn set_enabled(&self, id: &OverlayId, enabled: bool, user: UserId) -> Result<()> {
            self.calls.lock().unwrap().push(SetCall {
                id: id.clone(),
                enabled,
                user,
            });
            if self.failing.lock().unwrap().contains(id) {
                return Err(OverlayError::Remote(format!("binder died while toggling {id}")));
            }
            let mut overlays = self.overlays.lock().unwrap();
            overlays
                .entry(id.clone())
                .or_insert_with(|| OverlayInfo::new(id.clone(), "android", false))
                .enabled = enabled;
            Ok(())
        }

        fn overlay_info(&self, id: &OverlayId, _user: UserId) -> Result<Option<OverlayInfo>> {
            Ok(self.overlays.lock().unwrap().get(id).cloned())
        }

        fn overlays_for_target(&self, target: &str, _user: UserId) -> Result<Vec<OverlayInfo>> {
            if *self.list_fails.lock().unwrap() {
                return Err(OverlayError::Remote("service unavailable".to_string()));
            }
            Ok(self
                .overlays
                .lock()
                .unwrap()
                .values()
                .filter(|info| info.target == target)
                .cloned()
                .collect())
        }
    }

    impl PackageMetadataSource for MockGateway {
        fn package_metadata(&self, package: &OverlayId) -> Result<Option<Metadata>> {
            if self.broken_metadata.lock().unwrap().contains(package) {
                return Err(OverlayError::Lookup {
                    package: package.to_string(),
                    reason: "package uninstalled".to_string(),
                });
            }
            Ok(self
                .metadata
                .lock()
                .unwrap()
                .get(package)
                .cloned()
                .flatten())
        }
    }
}
