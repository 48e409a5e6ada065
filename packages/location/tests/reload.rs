//! Reload behaviour of [`LocationRepository`].

use std::path::Path;

use bedah_gang_location::{LocationError, LocationRepository};
use bedah_gang_location_models::{LocationFieldMapping, RiskCategory};

fn write_locations(path: &Path, entries: &[(&str, f64)]) {
    let features: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, score)| {
            serde_json::json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [106.9, -6.2] },
                "properties": { "kelurahan": name, "Score": score, "kota": "Jakarta Timur" },
            })
        })
        .collect();
    let data = serde_json::json!({ "type": "FeatureCollection", "features": features });
    std::fs::write(path, data.to_string()).unwrap();
}

#[test]
fn looks_up_risk_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flood.geojson");
    write_locations(&path, &[("Duren Sawit", 4.4), ("Cakung Barat", 2.0)]);

    let repo = LocationRepository::open(&path, LocationFieldMapping::default()).unwrap();

    let risk = repo.lookup_risk("  duren SAWIT").unwrap();
    assert_eq!(risk.kelurahan, "Duren Sawit");
    assert_eq!(risk.score, Some(4));
    assert_eq!(risk.category, Some(RiskCategory::High));
    assert_eq!(risk.properties["kota"], "Jakarta Timur");

    assert!(repo.lookup_risk("Menteng").is_none());
    assert_eq!(repo.search(Some("barat")), ["Cakung Barat"]);
}

#[test]
fn reload_swaps_in_new_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flood.geojson");
    write_locations(&path, &[("Ancol", 5.0)]);

    let repo = LocationRepository::open(&path, LocationFieldMapping::default()).unwrap();
    let before = repo.index();

    write_locations(&path, &[("Ancol", 3.0), ("Pluit", 5.0)]);
    let count = repo.reload().unwrap();

    assert_eq!(count, 2);
    assert_eq!(repo.index().len(), 2);
    assert_eq!(repo.lookup_risk("ancol").unwrap().score, Some(3));
    // A snapshot taken before the reload is unaffected.
    assert_eq!(before.len(), 1);
    assert_eq!(before.lookup("ancol").unwrap().score, Some(5.0));
}

#[test]
fn failed_reload_keeps_previous_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flood.geojson");
    write_locations(&path, &[("Ancol", 5.0), ("Pluit", 5.0)]);

    let repo = LocationRepository::open(&path, LocationFieldMapping::default()).unwrap();

    std::fs::write(&path, r#"{ "features": [ { "properties": { "kelurahan": 12 } } ] }"#).unwrap();
    let err = repo.reload().unwrap_err();

    assert!(matches!(err, LocationError::InvalidInput { .. }));
    assert_eq!(repo.index().len(), 2);
    assert!(repo.lookup_risk("pluit").is_some());

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(repo.reload(), Err(LocationError::Io(_))));
    assert_eq!(repo.index().len(), 2);
}
