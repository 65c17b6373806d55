//! Overlay error types

use thiserror::Error;

use crate::catalog::FamilyKind;

/// Errors raised while talking to the overlay manager or resolving selections.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// The overlay service could not be reached or rejected the call
    #[error("Overlay service call failed: {0}")]
    Remote(String),

    /// A selection does not name a member of its family
    #[error("Selection {index} is out of bounds for {family} ({len} entries)")]
    OutOfBounds {
        family: FamilyKind,
        index: i64,
        len: usize,
    },

    /// A selection points at a vacant position of its family
    #[error("Selection {index} is an empty slot in {family}")]
    EmptySlot { family: FamilyKind, index: i64 },

    /// Package metadata could not be read
    #[error("Package lookup failed for {package}: {reason}")]
    Lookup { package: String, reason: String },

    /// Backing file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file or command output could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;
