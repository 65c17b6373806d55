//! Known overlays grouped into families of mutually exclusive choices.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::{OverlayError, Result};
use crate::gateway::{OverlayGateway, is_overlay_enabled};
use crate::overlay::{OverlayId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyKind {
    Accents,
    DarkBundle,
    BlackBundle,
    Clocks,
}

impl FamilyKind {
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Accents => "accents",
            Self::DarkBundle => "dark theme bundle",
            Self::BlackBundle => "black theme bundle",
            Self::Clocks => "clocks",
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ordered overlays for one visual dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayFamily {
    kind: FamilyKind,
    members: Vec<OverlayId>,
}

impl OverlayFamily {
    pub const fn new(kind: FamilyKind, members: Vec<OverlayId>) -> Self {
        Self { kind, members }
    }

    pub fn members(&self) -> &[OverlayId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members that name an overlay, skipping vacant positions.
    pub fn occupied(&self) -> impl Iterator<Item = &OverlayId> {
        self.members.iter().filter(|id| !id.is_empty())
    }

    /// Member at `index`, failing when the index falls outside the family or
    /// lands on a vacant position.
    pub fn get(&self, index: i64) -> Result<&OverlayId> {
        let id = usize::try_from(index)
            .ok()
            .and_then(|i| self.members.get(i))
            .ok_or(OverlayError::OutOfBounds {
                family: self.kind,
                index,
                len: self.members.len(),
            })?;
        if id.is_empty() {
            return Err(OverlayError::EmptySlot {
                family: self.kind,
                index,
            });
        }
        Ok(id)
    }

    /// The member standing in for the whole bundle's state.
    pub fn marker(&self) -> Option<&OverlayId> {
        self.members.first()
    }
}

/// Snapshot of every overlay family.
///
/// The last accent slot is either the black or the white accent, decided once
/// when the snapshot is built. It does not follow later theme changes.
#[derive(Debug, Clone)]
pub struct Catalog {
    accents: OverlayFamily,
    dark: OverlayFamily,
    black: OverlayFamily,
    clocks: OverlayFamily,
    black_accent: OverlayId,
    white_accent: OverlayId,
    stock_dark: OverlayId,
}

impl Catalog {
    /// Build the catalog, resolving the black/white accent slot from the
    /// theme state currently reported by the gateway.
    pub fn snapshot(gateway: &dyn OverlayGateway, user: UserId, config: &CatalogConfig) -> Self {
        let marker_enabled = |bundle: &[String]| {
            bundle
                .first()
                .is_some_and(|id| is_overlay_enabled(gateway, &OverlayId::from(id.as_str()), user))
        };
        let black_usable =
            !marker_enabled(&config.dark_bundle) && !marker_enabled(&config.black_bundle);
        debug!(%user, black_usable, "Building overlay catalog");
        Self::from_config(config, black_usable)
    }

    pub fn from_config(config: &CatalogConfig, black_accent_usable: bool) -> Self {
        let accent = |name: &str| OverlayId::new(format!("{}{}", config.accent_prefix, name));
        let ids = |names: &[String]| -> Vec<OverlayId> {
            names.iter().map(|n| OverlayId::from(n.as_str())).collect()
        };

        let black_accent = accent(&config.black_accent);
        let white_accent = accent(&config.white_accent);

        let mut accents: Vec<OverlayId> = config.accents.iter().map(|n| accent(n)).collect();
        accents.push(if black_accent_usable {
            black_accent.clone()
        } else {
            white_accent.clone()
        });

        Self {
            accents: OverlayFamily::new(FamilyKind::Accents, accents),
            dark: OverlayFamily::new(FamilyKind::DarkBundle, ids(&config.dark_bundle)),
            black: OverlayFamily::new(FamilyKind::BlackBundle, ids(&config.black_bundle)),
            clocks: OverlayFamily::new(FamilyKind::Clocks, parse_clocks(&config.clocks)),
            black_accent,
            white_accent,
            stock_dark: OverlayId::from(config.stock_dark.as_str()),
        }
    }

    pub const fn family(&self, kind: FamilyKind) -> &OverlayFamily {
        match kind {
            FamilyKind::Accents => &self.accents,
            FamilyKind::DarkBundle => &self.dark,
            FamilyKind::BlackBundle => &self.black,
            FamilyKind::Clocks => &self.clocks,
        }
    }

    pub fn identifier_at(&self, kind: FamilyKind, index: i64) -> Result<&OverlayId> {
        self.family(kind).get(index)
    }

    pub const fn black_accent(&self) -> &OverlayId {
        &self.black_accent
    }

    pub const fn white_accent(&self) -> &OverlayId {
        &self.white_accent
    }

    pub const fn stock_dark(&self) -> &OverlayId {
        &self.stock_dark
    }
}

/// Split the comma-separated clock resource into overlay ids.
///
/// Positions are significant, so interior empty entries are kept as vacant
/// slots. Trailing empty entries are dropped.
pub fn parse_clocks(list: &str) -> Vec<OverlayId> {
    let mut clocks: Vec<OverlayId> =
        list.split(',').map(str::trim).map(OverlayId::from).collect();
    while clocks.last().is_some_and(OverlayId::is_empty) {
        clocks.pop();
    }
    clocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = Catalog::from_config(&CatalogConfig::default(), true);
        assert_eq!(catalog.family(FamilyKind::Accents).len(), 20);
        assert_eq!(catalog.family(FamilyKind::DarkBundle).len(), 5);
        assert_eq!(catalog.family(FamilyKind::BlackBundle).len(), 5);
        assert_eq!(
            catalog.identifier_at(FamilyKind::Accents, 0).unwrap().as_str(),
            "com.accents.red"
        );
        assert_eq!(
            catalog
                .family(FamilyKind::DarkBundle)
                .marker()
                .map(OverlayId::as_str),
            Some("com.android.system.theme.dark")
        );
    }

    #[test]
    fn test_identifier_out_of_bounds() {
        let catalog = Catalog::from_config(&CatalogConfig::default(), true);
        assert!(matches!(
            catalog.identifier_at(FamilyKind::Accents, 20),
            Err(OverlayError::OutOfBounds {
                family: FamilyKind::Accents,
                index: 20,
                len: 20
            })
        ));
        assert!(catalog.identifier_at(FamilyKind::Clocks, -1).is_err());
    }

    #[test]
    fn test_snapshot_on_light_theme_uses_black_accent() {
        let gateway = MockGateway::new().with("com.android.system.theme.dark", false);
        let catalog = Catalog::snapshot(&gateway, UserId::SYSTEM, &CatalogConfig::default());
        assert_eq!(
            catalog.identifier_at(FamilyKind::Accents, 19).unwrap().as_str(),
            "com.accents.black"
        );
    }

    #[test]
    fn test_snapshot_on_dark_theme_uses_white_accent() {
        let gateway = MockGateway::new().with("com.android.system.theme.blackaf", true);
        let catalog = Catalog::snapshot(&gateway, UserId::SYSTEM, &CatalogConfig::default());
        assert_eq!(
            catalog.identifier_at(FamilyKind::Accents, 19).unwrap().as_str(),
            "com.accents.white"
        );
    }

    #[test]
    fn test_snapshot_is_stable_after_theme_change() {
        let gateway = MockGateway::new().with("com.android.system.theme.dark", false);
        let catalog = Catalog::snapshot(&gateway, UserId::SYSTEM, &CatalogConfig::default());
        gateway
            .set_enabled(
                &OverlayId::from("com.android.system.theme.dark"),
                true,
                UserId::SYSTEM,
            )
            .unwrap();
        assert_eq!(
            catalog.identifier_at(FamilyKind::Accents, 19).unwrap().as_str(),
            "com.accents.black"
        );
    }

    #[test]
    fn test_parse_clocks_keeps_positions() {
        let clocks = parse_clocks("default, bubble,,com.clock.a ,");
        let names: Vec<_> = clocks.iter().map(OverlayId::as_str).collect();
        assert_eq!(names, vec!["default", "bubble", "", "com.clock.a"]);
        assert!(parse_clocks("").is_empty());
        assert!(parse_clocks(" , ,").is_empty());
    }

    #[test]
    fn test_vacant_clock_slot_does_not_shift_indices() {
        let config = CatalogConfig {
            clocks: "s0,s1,s2,s3,s4,,six".to_string(),
            ..CatalogConfig::default()
        };
        let catalog = Catalog::from_config(&config, true);

        assert_eq!(catalog.identifier_at(FamilyKind::Clocks, 6).unwrap().as_str(), "six");
        assert!(matches!(
            catalog.identifier_at(FamilyKind::Clocks, 5),
            Err(OverlayError::EmptySlot {
                family: FamilyKind::Clocks,
                index: 5
            })
        ));
        assert_eq!(catalog.family(FamilyKind::Clocks).occupied().count(), 6);
    }
}
