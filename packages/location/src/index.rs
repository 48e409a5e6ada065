//! Name-indexed lookup table over location records.

use std::collections::BTreeMap;

use bedah_gang_location_models::{LocationFieldMapping, LocationRecord};
use serde_json::Value;

use crate::LocationError;
use crate::normalize::normalize_name;

/// Deduplicated location records keyed by normalized name.
///
/// When several records normalize to the same key the first one in input
/// order is kept and the rest are dropped.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    by_name: BTreeMap<String, LocationRecord>,
    /// Original display names, sorted case-insensitively.
    names: Vec<String>,
    /// Number of input elements, before skipping and deduplication.
    feature_count: usize,
}

impl LocationIndex {
    /// Builds an index from a JSON array of property bags.
    ///
    /// Each element is either a `GeoJSON` feature (its `properties` object is
    /// used) or a bare property object. Elements whose name field is absent,
    /// `null`, or blank are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidInput`] if `records` is not an array,
    /// if any element is not an object, or if a name field holds a
    /// non-string value. No partial index is returned.
    pub fn build(records: &Value, fields: &LocationFieldMapping) -> Result<Self, LocationError> {
        let items = records.as_array().ok_or_else(|| {
            LocationError::invalid_input(format!(
                "expected an array of location records, got {}",
                json_kind(records)
            ))
        })?;

        let mut by_name = BTreeMap::new();
        let mut names = Vec::new();
        let mut skipped = 0_usize;
        let mut duplicates = 0_usize;

        for (position, item) in items.iter().enumerate() {
            let Some(record) = parse_record(position, item, fields)? else {
                skipped += 1;
                continue;
            };

            let key = normalize_name(&record.name);
            if by_name.contains_key(&key) {
                log::debug!(
                    "Dropping duplicate location '{}' at position {position}",
                    record.name
                );
                duplicates += 1;
                continue;
            }

            names.push(record.name.clone());
            by_name.insert(key, record);
        }

        names.sort_by_cached_key(|name| name.to_lowercase());

        log::debug!(
            "Built location index: {} locations, {skipped} without a name, {duplicates} duplicates",
            by_name.len()
        );

        Ok(Self {
            by_name,
            names,
            feature_count: items.len(),
        })
    }

    /// Looks up a location by name, ignoring case and extra whitespace.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&LocationRecord> {
        self.by_name.get(&normalize_name(name))
    }

    /// Returns display names whose normalized form contains the normalized
    /// query.
    ///
    /// `None` or a blank query returns every name.
    #[must_use]
    pub fn search(&self, query: Option<&str>) -> Vec<String> {
        let needle = query.map(normalize_name).unwrap_or_default();
        if needle.is_empty() {
            return self.names.clone();
        }

        self.names
            .iter()
            .filter(|name| normalize_name(name).contains(&needle))
            .cloned()
            .collect()
    }

    /// All display names, sorted case-insensitively.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of distinct locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Number of input records the index was built from, including
    /// nameless and duplicate ones.
    #[must_use]
    pub const fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Whether the index holds no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Extracts a [`LocationRecord`] from one input element.
///
/// Returns `Ok(None)` when the element has no usable name.
fn parse_record(
    position: usize,
    item: &Value,
    fields: &LocationFieldMapping,
) -> Result<Option<LocationRecord>, LocationError> {
    let object = item.as_object().ok_or_else(|| {
        LocationError::invalid_input(format!(
            "record {position} is {}, expected an object",
            json_kind(item)
        ))
    })?;

    let props = match object.get("properties") {
        Some(Value::Object(props)) => props,
        _ => object,
    };

    let name = match props.get(&fields.name) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(name)) if name.trim().is_empty() => return Ok(None),
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(LocationError::invalid_input(format!(
                "record {position} has a non-string '{}' field ({})",
                fields.name,
                json_kind(other)
            )));
        }
    };

    let score = props
        .get(&fields.score)
        .and_then(|value| coerce_score(&name, value));

    let properties = props
        .iter()
        .filter(|(key, _)| **key != fields.name && **key != fields.score)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Some(LocationRecord {
        name,
        score,
        properties,
    }))
}

/// Reads a risk score from a number or a numeric string.
fn coerce_score(name: &str, value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| {
            log::warn!("Ignoring non-numeric risk score {s:?} for location '{name}'");
            None
        }),
        other => {
            log::warn!(
                "Ignoring {} risk score for location '{name}'",
                json_kind(other)
            );
            None
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(name: &Value, score: &Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "kelurahan": name, "Score": score, "kecamatan": "X" },
        })
    }

    fn build(records: &Value) -> LocationIndex {
        LocationIndex::build(records, &LocationFieldMapping::default()).unwrap()
    }

    #[test]
    fn first_duplicate_wins() {
        let index = build(&json!([
            feature(&json!("Duren Sawit"), &json!(4)),
            feature(&json!("  DUREN   sawit "), &json!(1)),
            feature(&json!("Cakung"), &json!(2)),
        ]));

        assert_eq!(index.len(), 2);
        assert_eq!(index.feature_count(), 3);
        let record = index.lookup("duren sawit").unwrap();
        assert_eq!(record.name, "Duren Sawit");
        assert_eq!(record.score, Some(4.0));
    }

    #[test]
    fn names_sorted_case_insensitively() {
        let index = build(&json!([
            feature(&json!("cakung"), &json!(2)),
            feature(&json!("Bidara Cina"), &json!(3)),
            feature(&json!("Ancol"), &json!(5)),
        ]));

        assert_eq!(index.names(), ["Ancol", "Bidara Cina", "cakung"]);
    }

    #[test]
    fn lookup_ignores_case_and_spacing() {
        let index = build(&json!([feature(&json!("Kebon Jeruk"), &json!(3))]));

        assert!(index.lookup("KEBON JERUK").is_some());
        assert!(index.lookup("  kebon\tjeruk ").is_some());
        assert!(index.lookup("Kebon").is_none());
    }

    #[test]
    fn skips_records_without_name() {
        let index = build(&json!([
            feature(&json!(null), &json!(3)),
            feature(&json!("   "), &json!(3)),
            json!({ "type": "Feature", "properties": { "Score": 2 } }),
            feature(&json!("Ancol"), &json!(5)),
        ]));

        assert_eq!(index.len(), 1);
        assert_eq!(index.feature_count(), 4);
        assert_eq!(index.names(), ["Ancol"]);
    }

    #[test]
    fn rejects_non_array_input() {
        let err = LocationIndex::build(
            &json!({ "features": [] }),
            &LocationFieldMapping::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LocationError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_non_object_element() {
        let err = LocationIndex::build(
            &json!([feature(&json!("Ancol"), &json!(5)), 42]),
            &LocationFieldMapping::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LocationError::InvalidInput { .. }));
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn rejects_non_string_name() {
        let err = LocationIndex::build(
            &json!([feature(&json!(17), &json!(5))]),
            &LocationFieldMapping::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LocationError::InvalidInput { .. }));
    }

    #[test]
    fn accepts_bare_property_bags() {
        let index = build(&json!([{ "kelurahan": "Ancol", "Score": "4.0" }]));

        assert_eq!(index.lookup("ancol").unwrap().score, Some(4.0));
    }

    #[test]
    fn uncoercible_score_is_absent() {
        let index = build(&json!([
            feature(&json!("Ancol"), &json!("tinggi")),
            feature(&json!("Cakung"), &json!([1])),
        ]));

        assert_eq!(index.lookup("ancol").unwrap().score, None);
        assert_eq!(index.lookup("cakung").unwrap().score, None);
    }

    #[test]
    fn residual_properties_exclude_name_and_score() {
        let index = build(&json!([feature(&json!("Ancol"), &json!(5))]));

        let record = index.lookup("Ancol").unwrap();
        assert_eq!(record.properties.len(), 1);
        assert_eq!(record.properties["kecamatan"], json!("X"));
    }

    #[test]
    fn custom_field_mapping() {
        let fields = LocationFieldMapping {
            name: "NAMOBJ".to_string(),
            score: "risk".to_string(),
        };
        let index = LocationIndex::build(
            &json!([{ "properties": { "NAMOBJ": "Pluit", "risk": 5 } }]),
            &fields,
        )
        .unwrap();

        assert_eq!(index.lookup("pluit").unwrap().score, Some(5.0));
    }

    #[test]
    fn search_filters_by_substring() {
        let index = build(&json!([
            feature(&json!("Duren Sawit"), &json!(4)),
            feature(&json!("Pondok Kelapa"), &json!(2)),
            feature(&json!("Kelapa Gading Barat"), &json!(5)),
        ]));

        assert_eq!(
            index.search(Some("  KELAPA ")),
            ["Kelapa Gading Barat", "Pondok Kelapa"]
        );
        assert!(index.search(Some("menteng")).is_empty());
    }

    #[test]
    fn blank_search_returns_everything() {
        let index = build(&json!([
            feature(&json!("Duren Sawit"), &json!(4)),
            feature(&json!("Ancol"), &json!(5)),
        ]));

        assert_eq!(index.search(None), index.names());
        assert_eq!(index.search(Some("")), index.names());
        assert_eq!(index.search(Some("   ")), index.names());
    }
}
