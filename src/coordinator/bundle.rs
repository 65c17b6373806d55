use tracing::{debug, info};

use crate::catalog::FamilyKind;
use crate::coordinator::Coordinator;
use crate::overlay::UserId;
use crate::report::BatchReport;

impl Coordinator {
    /// Switch the dark and black theme bundles.
    ///
    /// The black/white accent is repaired first, then the legacy dark overlay
    /// is unloaded if any theme is wanted. A bundle is only rewritten when its
    /// marker disagrees with the request. A bundle left half-toggled by an
    /// earlier failure is not healed if its marker already matches.
    pub fn set_dark_and_black_theme(
        &self,
        want_dark: bool,
        want_black: bool,
        user: UserId,
    ) -> BatchReport {
        let _accents = self.locks.lock(FamilyKind::Accents);
        let _dark = self.locks.lock(FamilyKind::DarkBundle);
        let _black = self.locks.lock(FamilyKind::BlackBundle);

        let mut report = self.repair_black_white_accent(user);

        if want_dark || want_black {
            self.toggle(self.catalog.stock_dark(), false, user, &mut report);
        }

        for (kind, wanted) in [
            (FamilyKind::DarkBundle, want_dark),
            (FamilyKind::BlackBundle, want_black),
        ] {
            if self.marker_enabled(kind, user) == wanted {
                debug!(family = %kind, wanted, "Bundle already converged");
                continue;
            }
            self.toggle_all(self.catalog.family(kind).members(), wanted, user, &mut report);
            info!(family = %kind, enabled = wanted, %user, "Switched theme bundle");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::coordinator::AccentPolicy;
    use crate::coordinator::test_support::*;
    use crate::overlay::{OverlayId, UserId};

    #[test]
    fn test_enabling_dark_from_light() {
        let gateway = Arc::new(light_device());
        let coordinator = coordinator(&gateway, AccentPolicy::Lenient);

        let report = coordinator.set_dark_and_black_theme(true, false, UserId::SYSTEM);

        let calls = gateway.calls();
        assert!(report.is_success());
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0].id, OverlayId::from(STOCK_DARK));
        assert!(!calls[0].enabled);
        let dark: Vec<_> = calls[1..].iter().map(|c| c.id.as_str()).collect();
        assert_eq!(dark, DARK.to_vec());
        assert!(calls[1..].iter().all(|c| c.enabled));
        assert!(calls.iter().all(|c| !BLACK.contains(&c.id.as_str())));
    }

    #[test]
    fn test_repeated_request_skips_converged_bundle() {
        let gateway = Arc::new(light_device());
        let coordinator = coordinator(&gateway, AccentPolicy::Lenient);

        coordinator.set_dark_and_black_theme(true, false, UserId::SYSTEM);
        gateway.clear_calls();
        coordinator.set_dark_and_black_theme(true, false, UserId::SYSTEM);

        let calls = gateway.calls();
        assert!(calls.iter().all(|c| !DARK.contains(&c.id.as_str())));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, OverlayId::from(STOCK_DARK));
    }

    #[test]
    fn test_light_request_keeps_stock_dark_alone() {
        let gateway = Arc::new(light_device());
        let coordinator = coordinator(&gateway, AccentPolicy::Lenient);

        let report = coordinator.set_dark_and_black_theme(false, false, UserId::SYSTEM);

        assert!(report.is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_switching_dark_to_black() {
        let gateway = Arc::new(
            DARK.iter()
                .fold(light_device(), |gateway, id| gateway.with(id, true)),
        );
        let coordinator = coordinator(&gateway, AccentPolicy::Lenient);

        coordinator.set_dark_and_black_theme(false, true, UserId::SYSTEM);

        assert!(DARK.iter().all(|id| !gateway.is_enabled(id)));
        assert!(BLACK.iter().all(|id| gateway.is_enabled(id)));
        assert_eq!(gateway.calls().len(), 11);
    }

    #[test]
    fn test_accent_repaired_before_bundles() {
        let gateway = Arc::new(light_device().with("com.accents.white", true));
        let coordinator = coordinator(&gateway, AccentPolicy::Lenient);

        coordinator.set_dark_and_black_theme(true, false, UserId::SYSTEM);

        let calls = gateway.calls();
        assert_eq!(calls[0].id.as_str(), "com.accents.white");
        assert!(!calls[0].enabled);
        assert_eq!(calls[1].id.as_str(), "com.accents.black");
        assert!(calls[1].enabled);
        assert_eq!(calls.len(), 8);
    }

    #[test]
    fn test_failed_member_does_not_stop_bundle() {
        let gateway = Arc::new(light_device().failing_on(DARK[2]));
        let coordinator = coordinator(&gateway, AccentPolicy::Lenient);

        let report = coordinator.set_dark_and_black_theme(true, false, UserId::SYSTEM);

        assert_eq!(report.failures().count(), 1);
        assert!(gateway.is_enabled(DARK[4]));
        assert!(!gateway.is_enabled(DARK[2]));

        // Marker is enabled now, so the stale member is left alone.
        gateway.clear_calls();
        coordinator.set_dark_and_black_theme(true, false, UserId::SYSTEM);
        assert!(gateway.calls().iter().all(|c| c.id.as_str() != DARK[2]));
    }
}
