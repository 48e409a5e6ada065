#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Location flood-risk record types.
//!
//! A location is a kelurahan (the smallest administrative subdivision)
//! carrying a historical flood-risk score from 1 to 5. Records are read
//! from `GeoJSON` property bags; geometry is never consulted.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Property names used to pull the display name and risk score out of a
/// raw property bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFieldMapping {
    /// Property holding the kelurahan display name.
    #[serde(default = "default_name_field")]
    pub name: String,
    /// Property holding the numeric flood-risk score.
    #[serde(default = "default_score_field")]
    pub score: String,
}

fn default_name_field() -> String {
    "kelurahan".to_string()
}

fn default_score_field() -> String {
    "Score".to_string()
}

impl Default for LocationFieldMapping {
    fn default() -> Self {
        Self {
            name: default_name_field(),
            score: default_score_field(),
        }
    }
}

/// A single location with its flood-risk score.
///
/// `properties` holds every property other than the name and score,
/// untouched, for report renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Display name exactly as it appeared in the source data.
    pub name: String,
    /// Raw risk score, expected in 1-5.
    pub score: Option<f64>,
    /// Remaining properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl LocationRecord {
    /// Returns the score rounded to a whole risk level.
    ///
    /// Halves round to the nearest even level. Returns `None` when the
    /// score is absent or not finite.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded_score(&self) -> Option<i64> {
        self.score
            .filter(|s| s.is_finite())
            .map(|s| s.round_ties_even() as i64)
    }

    /// Returns the risk category for the rounded score.
    #[must_use]
    pub fn category(&self) -> Option<RiskCategory> {
        self.rounded_score().and_then(RiskCategory::from_score)
    }
}

/// Flood-risk category derived from a whole risk score.
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
pub enum RiskCategory {
    /// Scores 1-2 ("Rendah").
    Low,
    /// Score 3 ("Sedang").
    Moderate,
    /// Score 4 ("Tinggi").
    High,
    /// Score 5 and above ("Sangat Tinggi").
    VeryHigh,
}

impl RiskCategory {
    /// Classifies a whole risk score.
    ///
    /// Returns `None` for scores below 1. Scores above 5 are clamped into
    /// [`RiskCategory::VeryHigh`].
    #[must_use]
    pub const fn from_score(score: i64) -> Option<Self> {
        match score {
            i64::MIN..=0 => None,
            1 | 2 => Some(Self::Low),
            3 => Some(Self::Moderate),
            4 => Some(Self::High),
            _ => Some(Self::VeryHigh),
        }
    }

    /// Returns the Indonesian label shown to residents.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Rendah",
            Self::Moderate => "Sedang",
            Self::High => "Tinggi",
            Self::VeryHigh => "Sangat Tinggi",
        }
    }
}

/// Whether a whole risk score counts as high flood risk for design rule
/// matching (scores 3-5).
#[must_use]
pub const fn is_high_flood_risk(score: i64) -> bool {
    score >= 3
}

/// Result of looking up a location's flood risk by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLookup {
    /// The name as the caller asked for it.
    pub query: String,
    /// The matched record's display name.
    pub kelurahan: String,
    /// Rounded risk score.
    pub score: Option<i64>,
    /// Category for `score`.
    pub category: Option<RiskCategory>,
    /// Remaining properties of the matched record.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl RiskLookup {
    /// Builds a lookup result for `record` matched by `query`.
    #[must_use]
    pub fn new(query: &str, record: &LocationRecord) -> Self {
        Self {
            query: query.to_string(),
            kelurahan: record.name.clone(),
            score: record.rounded_score(),
            category: record.category(),
            properties: record.properties.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: Option<f64>) -> LocationRecord {
        LocationRecord {
            name: "Duren Sawit".to_string(),
            score,
            properties: serde_json::Map::new(),
        }
    }

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(record(Some(2.5)).rounded_score(), Some(2));
        assert_eq!(record(Some(3.5)).rounded_score(), Some(4));
        assert_eq!(record(Some(3.4)).rounded_score(), Some(3));
    }

    #[test]
    fn missing_or_nan_score_has_no_level() {
        assert_eq!(record(None).rounded_score(), None);
        assert_eq!(record(Some(f64::NAN)).rounded_score(), None);
        assert_eq!(record(None).category(), None);
    }

    #[test]
    fn classifies_scores() {
        assert_eq!(RiskCategory::from_score(0), None);
        assert_eq!(RiskCategory::from_score(1), Some(RiskCategory::Low));
        assert_eq!(RiskCategory::from_score(2), Some(RiskCategory::Low));
        assert_eq!(RiskCategory::from_score(3), Some(RiskCategory::Moderate));
        assert_eq!(RiskCategory::from_score(4), Some(RiskCategory::High));
        assert_eq!(RiskCategory::from_score(5), Some(RiskCategory::VeryHigh));
        assert_eq!(RiskCategory::from_score(9), Some(RiskCategory::VeryHigh));
    }

    #[test]
    fn category_labels_and_names() {
        assert_eq!(RiskCategory::VeryHigh.label(), "Sangat Tinggi");
        assert_eq!(RiskCategory::VeryHigh.to_string(), "very_high");
        assert_eq!("moderate".parse::<RiskCategory>(), Ok(RiskCategory::Moderate));
    }

    #[test]
    fn high_flood_risk_convention() {
        assert!(!is_high_flood_risk(1));
        assert!(!is_high_flood_risk(2));
        assert!(is_high_flood_risk(3));
        assert!(is_high_flood_risk(5));
    }

    #[test]
    fn default_field_mapping_matches_dataset() {
        let fields = LocationFieldMapping::default();
        assert_eq!(fields.name, "kelurahan");
        assert_eq!(fields.score, "Score");
    }

    #[test]
    fn risk_lookup_carries_record_details() {
        let mut rec = record(Some(4.2));
        rec.properties
            .insert("kecamatan".to_string(), serde_json::json!("Duren Sawit"));

        let lookup = RiskLookup::new("duren  sawit", &rec);

        assert_eq!(lookup.query, "duren  sawit");
        assert_eq!(lookup.kelurahan, "Duren Sawit");
        assert_eq!(lookup.score, Some(4));
        assert_eq!(lookup.category, Some(RiskCategory::High));
        assert_eq!(lookup.properties.len(), 1);
    }
}
