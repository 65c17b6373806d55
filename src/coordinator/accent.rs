use tracing::{debug, info, warn};

use crate::catalog::FamilyKind;
use crate::coordinator::{AccentPolicy, Coordinator};
use crate::error::{OverlayError, Result};
use crate::overlay::{OverlayId, UserId};
use crate::report::BatchReport;
use crate::settings::{self, SettingsStore};

impl Coordinator {
    /// Switch to accent `selection`, or back to stock when it is 0.
    ///
    /// Selection `n` enables the `n - 1`th accent. An out-of-range selection
    /// is rejected before any overlay is touched.
    pub fn apply_accent(&self, selection: i64, user: UserId) -> Result<BatchReport> {
        let family = self.catalog.family(FamilyKind::Accents);
        let in_range = usize::try_from(selection).is_ok_and(|s| s <= family.len());
        if !in_range {
            let err = OverlayError::OutOfBounds {
                family: FamilyKind::Accents,
                index: selection,
                len: family.len(),
            };
            warn!(selection, %user, %err, "Can't change accent");
            return Err(err);
        }

        if selection == 0 {
            return Ok(self.unload_accents(user));
        }

        let _guard = self.locks.lock(FamilyKind::Accents);
        let target = family.get(selection - 1)?;
        let mut report = BatchReport::new();

        if self.policy == AccentPolicy::Strict {
            let siblings = family
                .members()
                .iter()
                .chain(self.unslotted_black_white_accent())
                .filter(|id| *id != target);
            self.toggle_all(siblings, false, user, &mut report);
        }
        self.toggle(target, true, user, &mut report);

        info!(selection, accent = %target, %user, "Applied accent");
        Ok(report)
    }

    /// Disable every accent.
    pub fn unload_accents(&self, user: UserId) -> BatchReport {
        let _guard = self.locks.lock(FamilyKind::Accents);
        let mut report = BatchReport::new();
        self.toggle_all(
            self.catalog.family(FamilyKind::Accents).members(),
            false,
            user,
            &mut report,
        );
        info!(%user, failed = report.failures().count(), "Unloaded accents");
        report
    }

    /// Apply the accent stored in the user's settings (stock when unset).
    pub fn update_accents(&self, store: &dyn SettingsStore, user: UserId) -> Result<BatchReport> {
        let selection = store.int_for_user(settings::ACCENT_PICKER, 0, user);
        debug!(selection, %user, "Read accent setting");
        self.apply_accent(selection, user)
    }

    /// Swap the black and white accents when the enabled one no longer fits
    /// the current background.
    ///
    /// Nothing is enabled when neither variant is active.
    pub fn reconcile_black_white_accent(&self, user: UserId) -> BatchReport {
        let _guard = self.locks.lock(FamilyKind::Accents);
        self.repair_black_white_accent(user)
    }

    /// The black or white accent that did not get the last family slot.
    fn unslotted_black_white_accent(&self) -> Option<&OverlayId> {
        let slot = self.catalog.family(FamilyKind::Accents).members().last()?;
        if slot == self.catalog.black_accent() {
            Some(self.catalog.white_accent())
        } else if slot == self.catalog.white_accent() {
            Some(self.catalog.black_accent())
        } else {
            None
        }
    }

    /// Callers must hold the accent lock.
    pub(super) fn repair_black_white_accent(&self, user: UserId) -> BatchReport {
        let mut report = BatchReport::new();
        let black = self.catalog.black_accent();
        let white = self.catalog.white_accent();

        let (wrong, right) = if self.can_use_black_accent(user) {
            (white, black)
        } else {
            (black, white)
        };

        if self.is_enabled(wrong, user) {
            info!(from = %wrong, to = %right, %user, "Swapping accent to match background");
            self.toggle(wrong, false, user, &mut report);
            self.toggle(right, true, user, &mut report);
        }
        report
    }
}
