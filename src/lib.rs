//! Conflict-free switching of accent, theme and clock overlays.
//!
//! The [`Coordinator`] turns a desired selection into the enable/disable calls
//! an [`OverlayGateway`] has to perform so that overlays of one family never
//! stack up, and the [`SubstratumDetector`] tells whether a third-party
//! overlay engine is managing the framework instead.

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod overlay;
pub mod report;
pub mod search;
pub mod settings;
pub mod substratum;

pub use catalog::{Catalog, FamilyKind, OverlayFamily};
pub use coordinator::{AccentPolicy, ApplyReport, Coordinator, ThemeState};
pub use error::OverlayError;
pub use gateway::{OverlayGateway, PackageMetadataSource};
pub use overlay::{OverlayId, OverlayInfo, UserId};
pub use report::{BatchReport, ToggleOutcome};
pub use substratum::SubstratumDetector;
