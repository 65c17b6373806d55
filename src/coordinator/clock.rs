use tracing::{debug, info, warn};

use crate::catalog::FamilyKind;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::overlay::UserId;
use crate::report::BatchReport;

/// Clock selections up to this value are built into the status bar and need
/// no overlay.
pub const STOCK_CLOCK_SLOTS: i64 = 4;

impl Coordinator {
    /// Enable the clock overlay at `selection`.
    ///
    /// Expects `unload_clocks` to have run first; stock selections do nothing.
    pub fn apply_clock(&self, selection: i64, user: UserId) -> Result<BatchReport> {
        let mut report = BatchReport::new();
        if selection <= STOCK_CLOCK_SLOTS {
            debug!(selection, "Stock clock selected, nothing to enable");
            return Ok(report);
        }

        let _guard = self.locks.lock(FamilyKind::Clocks);
        let clock = self
            .catalog
            .identifier_at(FamilyKind::Clocks, selection)
            .inspect_err(|err| warn!(selection, %user, %err, "Can't change clock"))?;
        self.toggle(clock, true, user, &mut report);
        info!(selection, %clock, %user, "Applied clock");
        Ok(report)
    }

    /// Disable every clock overlay except the stock entry at index 0.
    /// Vacant slots are skipped.
    pub fn unload_clocks(&self, user: UserId) -> BatchReport {
        let _guard = self.locks.lock(FamilyKind::Clocks);
        let mut report = BatchReport::new();
        let clocks = self.catalog.family(FamilyKind::Clocks).members();
        let overlays = clocks.iter().skip(1).filter(|id| !id.is_empty());
        self.toggle_all(overlays, false, user, &mut report);
        report
    }
}
