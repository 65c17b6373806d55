use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a single overlay package (e.g. `com.accents.blue`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id marks a vacant position in a family.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OverlayId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// User the overlay state applies to.
///
/// The overlay manager keeps overlay state per user. Negative values are
/// pseudo users resolved by the service itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// The device owner.
    pub const SYSTEM: Self = Self(0);
    /// Whichever user is currently in the foreground.
    pub const CURRENT: Self = Self(-2);

    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CURRENT => write!(f, "current"),
            Self(id) => write!(f, "{id}"),
        }
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("current") {
            return Ok(Self::CURRENT);
        }
        s.parse().map(Self)
    }
}

/// Snapshot of one overlay as reported by the overlay manager.
///
/// Never cached: always fetched again before a decision is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayInfo {
    pub id: OverlayId,
    pub target: String,
    pub enabled: bool,
}

impl OverlayInfo {
    pub fn new(id: impl Into<OverlayId>, target: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            enabled,
        }
    }
}
