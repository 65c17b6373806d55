//! Detection of third-party overlay engines.
//!
//! Overlays installed by Substratum-style engines declare a version key in
//! their package metadata. When one of them targets the framework, the
//! built-in theme switching should stay out of the way.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SubstratumConfig;
use crate::gateway::{OverlayGateway, PackageMetadataSource};
use crate::overlay::{OverlayId, UserId};

pub struct SubstratumDetector {
    gateway: Arc<dyn OverlayGateway>,
    packages: Arc<dyn PackageMetadataSource>,
    config: SubstratumConfig,
}

impl SubstratumDetector {
    pub fn new(
        gateway: Arc<dyn OverlayGateway>,
        packages: Arc<dyn PackageMetadataSource>,
        config: SubstratumConfig,
    ) -> Self {
        Self {
            gateway,
            packages,
            config,
        }
    }

    /// Whether any non-allowlisted overlay on the target carries engine
    /// metadata. Never fails: an unreadable overlay list reads as inactive.
    pub fn is_third_party_overlay_engine_active(&self, user: UserId) -> bool {
        let overlays = match self.gateway.overlays_for_target(&self.config.target, user) {
            Ok(overlays) => overlays,
            Err(err) => {
                warn!(package = %self.config.target, %user, %err, "Can't list overlays");
                return false;
            }
        };

        let found = overlays
            .iter()
            .filter(|overlay| !self.is_allowlisted(&overlay.id))
            .find(|overlay| self.has_engine_metadata(&overlay.id));

        match found {
            Some(overlay) => {
                info!(id = %overlay.id, "Third-party overlay engine detected");
                true
            }
            None => false,
        }
    }

    fn is_allowlisted(&self, id: &OverlayId) -> bool {
        self.config
            .allowlist
            .iter()
            .any(|prefix| id.as_str().starts_with(prefix.as_str()))
    }

    fn has_engine_metadata(&self, id: &OverlayId) -> bool {
        match self.packages.package_metadata(id) {
            Ok(metadata) => metadata.is_some_and(|m| m.contains_key(&self.config.metadata_key)),
            Err(err) => {
                debug!(%id, %err, "Skipping package");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;

    fn detector(gateway: MockGateway) -> SubstratumDetector {
        let gateway = Arc::new(gateway);
        SubstratumDetector::new(gateway.clone(), gateway, SubstratumConfig::default())
    }

    #[test]
    fn test_detects_engine_overlay() {
        let gateway = MockGateway::new()
            .with("com.accents.blue", true)
            .with("projekt.overlay.android", false)
            .with_metadata("projekt.overlay.android", &[("Substratum_Version", "1020")]);
        assert!(detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));
    }

    #[test]
    fn test_ignores_other_targets() {
        let gateway = MockGateway::new()
            .with_target("projekt.overlay.settings", "com.android.settings", true)
            .with_metadata("projekt.overlay.settings", &[("Substratum_Version", "1020")]);
        assert!(!detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));
    }

    #[test]
    fn test_allowlisted_prefix_is_skipped() {
        let gateway = MockGateway::new()
            .with("android.auto_generated_rro_vendor__", true)
            .with_metadata(
                "android.auto_generated_rro_vendor__",
                &[("Substratum_Version", "1")],
            );
        assert!(!detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));
    }

    #[test]
    fn test_metadata_without_key_does_not_match() {
        let gateway = MockGateway::new()
            .with("com.example.overlay", true)
            .with_metadata("com.example.overlay", &[("other", "1")]);
        assert!(!detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));
    }

    #[test]
    fn test_failed_lookup_keeps_scanning() {
        let gateway = MockGateway::new()
            .with("a.broken.overlay", true)
            .with_broken_metadata("a.broken.overlay")
            .with("z.engine.overlay", true)
            .with_metadata("z.engine.overlay", &[("Substratum_Version", "1")]);
        assert!(detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));

        let gateway = MockGateway::new()
            .with("a.broken.overlay", true)
            .with_broken_metadata("a.broken.overlay")
            .with("z.plain.overlay", true);
        assert!(!detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));
    }

    #[test]
    fn test_listing_failure_reads_inactive() {
        let gateway = MockGateway::new()
            .with("z.engine.overlay", true)
            .with_metadata("z.engine.overlay", &[("Substratum_Version", "1")])
            .failing_list();
        assert!(!detector(gateway).is_third_party_overlay_engine_active(UserId::SYSTEM));
    }
}
