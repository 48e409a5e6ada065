#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Design rule types for gang (alleyway) design recommendation.
//!
//! A [`DesignRule`] is one row of the decision matrix mapping site
//! conditions to a recommended design module. A [`DesignRequest`] describes
//! a surveyed gang, and a [`Resolution`] is the rule chosen for it together
//! with how strictly it matched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Activity tags that mark a gang as carrying pedestrian or vehicle
/// through-traffic.
pub const THROUGH_TRAFFIC_ACTIVITIES: &[&str] = &["orang", "kendaraan", "pedestrian", "vehicle"];

/// Existing surface of the gang.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Surface {
    /// Concrete or other rigid paving ("beton").
    #[serde(alias = "beton")]
    #[strum(to_string = "rigid_paved", serialize = "beton")]
    RigidPaved,
    /// Asphalt ("aspal").
    #[serde(alias = "aspal")]
    #[strum(to_string = "asphalt", serialize = "aspal")]
    Asphalt,
    /// Bare earth ("tanah").
    #[serde(alias = "tanah")]
    #[strum(to_string = "unpaved_earth", serialize = "tanah")]
    UnpavedEarth,
}

impl Surface {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::RigidPaved, Self::Asphalt, Self::UnpavedEarth]
    }
}

/// One row of the design decision matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRule {
    /// Gang width in meters. Matched as an exact value, not a range.
    pub width: f64,
    /// Existing surface.
    pub surface: Surface,
    /// Whether the gang already has drainage.
    pub drainage: bool,
    /// Whether the location's risk score is 3-5.
    pub high_flood_risk: bool,
    /// Whether the gang carries pedestrian or vehicle through-traffic.
    pub activity_flag: bool,
    /// Recommended design module id.
    pub design_module: u32,
}

/// A surveyed gang to recommend a design module for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    /// Gang width in meters.
    pub width: f64,
    /// Existing surface.
    pub surface: Surface,
    /// Whether the gang already has drainage.
    pub drainage: bool,
    /// High flood risk flag, if known. When unset, risk is not matched.
    #[serde(default)]
    pub high_flood_risk: Option<bool>,
    /// Free-text activity tags (e.g. `"sosial"`, `"kendaraan"`).
    #[serde(default)]
    pub activities: BTreeSet<String>,
}

impl DesignRequest {
    /// Whether any activity tag denotes pedestrian or vehicle
    /// through-traffic.
    ///
    /// Tags are compared trimmed and lowercased.
    #[must_use]
    pub fn activity_flag(&self) -> bool {
        self.activities.iter().any(|tag| {
            let tag = tag.trim().to_lowercase();
            THROUGH_TRAFFIC_ACTIVITIES.contains(&tag.as_str())
        })
    }
}

/// How a rule was matched to a request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchKind {
    /// Every supplied condition matched.
    Exact,
    /// Matched with the activity condition ignored.
    ActivityRelaxed,
    /// Matched with activity and flood risk ignored.
    RiskRelaxed,
    /// Matched surface and drainage at the nearest available width.
    NearestWidth,
    /// Nothing matched; the first rule of the table was returned.
    FirstRow,
}

impl MatchKind {
    /// Whether this is an [`MatchKind::Exact`] match.
    #[must_use]
    pub const fn is_exact(self) -> bool {
        matches!(self, Self::Exact)
    }
}

/// The rule selected for a [`DesignRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The matched rule.
    pub rule: DesignRule,
    /// Which matching tier produced the rule.
    pub match_kind: MatchKind,
    /// One line per matching tier attempted, describing what was relaxed.
    pub diagnostics: Vec<String>,
}

impl Resolution {
    /// The recommended design module id.
    #[must_use]
    pub const fn design_module(&self) -> u32 {
        self.rule.design_module
    }
}

/// Catalog entry describing a design module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignModule {
    /// Module id referenced by [`DesignRule::design_module`].
    pub id: u32,
    /// Short name.
    pub name: String,
    /// Intervention category (e.g. "Resapan", "Drainase").
    pub category: String,
    /// Description shown alongside the recommendation.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(activities: &[&str]) -> DesignRequest {
        DesignRequest {
            width: 1.5,
            surface: Surface::RigidPaved,
            drainage: true,
            high_flood_risk: None,
            activities: activities.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn surface_parses_english_and_indonesian_names() {
        assert_eq!("rigid_paved".parse::<Surface>(), Ok(Surface::RigidPaved));
        assert_eq!("Beton".parse::<Surface>(), Ok(Surface::RigidPaved));
        assert_eq!("ASPAL".parse::<Surface>(), Ok(Surface::Asphalt));
        assert_eq!("tanah".parse::<Surface>(), Ok(Surface::UnpavedEarth));
        assert!("gravel".parse::<Surface>().is_err());
    }

    #[test]
    fn surface_displays_canonical_name() {
        assert_eq!(Surface::RigidPaved.to_string(), "rigid_paved");
        assert_eq!(Surface::UnpavedEarth.as_ref(), "unpaved_earth");
    }

    #[test]
    fn surface_deserializes_aliases() {
        let surface: Surface = serde_json::from_str("\"aspal\"").unwrap();
        assert_eq!(surface, Surface::Asphalt);
    }

    #[test]
    fn through_traffic_tags_set_activity_flag() {
        assert!(request(&["sosial", "Kendaraan "]).activity_flag());
        assert!(request(&["orang"]).activity_flag());
        assert!(!request(&["sosial", "anak", "komersial"]).activity_flag());
        assert!(!request(&[]).activity_flag());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: DesignRequest =
            serde_json::from_str(r#"{ "width": 2.0, "surface": "tanah", "drainage": false }"#)
                .unwrap();

        assert_eq!(req.surface, Surface::UnpavedEarth);
        assert_eq!(req.high_flood_risk, None);
        assert!(req.activities.is_empty());
    }

    #[test]
    fn match_kind_names() {
        assert_eq!(MatchKind::NearestWidth.to_string(), "nearest_width");
        assert!(MatchKind::Exact.is_exact());
        assert!(!MatchKind::FirstRow.is_exact());
    }
}
