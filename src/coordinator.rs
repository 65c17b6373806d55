//! Decides which overlays to toggle so that theme selections never conflict.
//!
//! The coordinator keeps no overlay state of its own. Every decision is made
//! on state queried from the gateway right before acting, and every toggle is
//! attempted independently: one failing overlay never stops its siblings.

mod accent;
mod bundle;
mod clock;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Catalog, FamilyKind};
use crate::config::CatalogConfig;
use crate::gateway::{OverlayGateway, is_overlay_enabled};
use crate::overlay::{OverlayId, UserId};
use crate::report::BatchReport;
use crate::settings::{self, SettingsStore};

pub use clock::STOCK_CLOCK_SLOTS;

/// How an accent selection treats the other accents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentPolicy {
    /// Only enable the requested accent; the overlay manager resolves conflicts.
    #[default]
    Lenient,
    /// Disable every other accent before enabling the requested one.
    Strict,
}

/// Theme bundle state observed through the bundle markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ThemeState {
    pub dark_enabled: bool,
    pub black_enabled: bool,
}

impl ThemeState {
    /// Black accents are only readable on a light background.
    pub const fn can_use_black_accent(&self) -> bool {
        !self.dark_enabled && !self.black_enabled
    }
}

/// Outcome of converging a whole user configuration.
#[derive(Debug, Default, Serialize)]
pub struct ApplyReport {
    pub toggles: BatchReport,
    /// Selections that were rejected without touching any overlay.
    pub rejected: Vec<String>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty() && self.toggles.is_success()
    }
}

/// One mutex per family, held for the duration of each logical operation.
///
/// Operations spanning several families lock accents, then the dark bundle,
/// then the black bundle.
#[derive(Debug, Default)]
struct FamilyLocks {
    accents: Mutex<()>,
    dark: Mutex<()>,
    black: Mutex<()>,
    clocks: Mutex<()>,
}

impl FamilyLocks {
    fn lock(&self, kind: FamilyKind) -> MutexGuard<'_, ()> {
        let mutex = match kind {
            FamilyKind::Accents => &self.accents,
            FamilyKind::DarkBundle => &self.dark,
            FamilyKind::BlackBundle => &self.black,
            FamilyKind::Clocks => &self.clocks,
        };
        // The guarded data is `()`, a panic elsewhere cannot leave it inconsistent.
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Coordinator {
    gateway: Arc<dyn OverlayGateway>,
    catalog: Catalog,
    policy: AccentPolicy,
    locks: FamilyLocks,
}

impl Coordinator {
    pub fn new(gateway: Arc<dyn OverlayGateway>, catalog: Catalog, policy: AccentPolicy) -> Self {
        Self {
            gateway,
            catalog,
            policy,
            locks: FamilyLocks::default(),
        }
    }

    /// Create a coordinator whose catalog is snapshotted for `user` now.
    pub fn build(
        gateway: Arc<dyn OverlayGateway>,
        config: &CatalogConfig,
        policy: AccentPolicy,
        user: UserId,
    ) -> Self {
        let catalog = Catalog::snapshot(gateway.as_ref(), user, config);
        Self::new(gateway, catalog, policy)
    }

    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn theme_state(&self, user: UserId) -> ThemeState {
        ThemeState {
            dark_enabled: self.marker_enabled(FamilyKind::DarkBundle, user),
            black_enabled: self.marker_enabled(FamilyKind::BlackBundle, user),
        }
    }

    pub fn is_using_dark_theme(&self, user: UserId) -> bool {
        self.marker_enabled(FamilyKind::DarkBundle, user)
    }

    pub fn is_using_black_theme(&self, user: UserId) -> bool {
        self.marker_enabled(FamilyKind::BlackBundle, user)
    }

    pub fn can_use_black_accent(&self, user: UserId) -> bool {
        self.theme_state(user).can_use_black_accent()
    }

    /// Members of a family that are currently enabled.
    pub fn enabled_members(&self, kind: FamilyKind, user: UserId) -> Vec<OverlayId> {
        self.catalog
            .family(kind)
            .occupied()
            .filter(|id| self.is_enabled(id, user))
            .cloned()
            .collect()
    }

    /// Converge every overlay family to the user's stored settings.
    ///
    /// Runs the theme, then the clocks, then the accent. The accent slot for
    /// black and white is fixed by the catalog snapshot, so a final repair
    /// swaps it when the theme step changed the background.
    pub fn apply_settings(&self, store: &dyn SettingsStore, user: UserId) -> ApplyReport {
        let mut report = ApplyReport::default();

        let want_dark = store.bool_for_user(settings::DARK_THEME, false, user);
        let want_black = store.bool_for_user(settings::BLACK_THEME, false, user);
        report
            .toggles
            .extend(self.set_dark_and_black_theme(want_dark, want_black, user));

        report.toggles.extend(self.unload_clocks(user));
        let clock = store.int_for_user(settings::CLOCK_STYLE, 0, user);
        match self.apply_clock(clock, user) {
            Ok(toggles) => report.toggles.extend(toggles),
            Err(err) => report.rejected.push(err.to_string()),
        }

        match self.update_accents(store, user) {
            Ok(toggles) => report.toggles.extend(toggles),
            Err(err) => report.rejected.push(err.to_string()),
        }
        report
            .toggles
            .extend(self.reconcile_black_white_accent(user));

        report
    }

    fn is_enabled(&self, id: &OverlayId, user: UserId) -> bool {
        is_overlay_enabled(self.gateway.as_ref(), id, user)
    }

    fn marker_enabled(&self, kind: FamilyKind, user: UserId) -> bool {
        self.catalog
            .family(kind)
            .marker()
            .is_some_and(|marker| self.is_enabled(marker, user))
    }

    /// Toggle one overlay, logging and recording the outcome.
    fn toggle(&self, id: &OverlayId, enabled: bool, user: UserId, report: &mut BatchReport) {
        match self.gateway.set_enabled(id, enabled, user) {
            Ok(()) => {
                debug!(%id, enabled, %user, "Toggled overlay");
                report.record(id, enabled, None);
            }
            Err(err) => {
                warn!(%id, enabled, %user, %err, "Can't change overlay");
                report.record(id, enabled, Some(err.to_string()));
            }
        }
    }

    /// Set every member of a family, skipping none on failure.
    fn toggle_all<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a OverlayId>,
        enabled: bool,
        user: UserId,
        report: &mut BatchReport,
    ) {
        for id in ids {
            self.toggle(id, enabled, user, report);
        }
    }
}
