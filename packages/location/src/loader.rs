//! Loads a [`LocationIndex`] from a `GeoJSON` `FeatureCollection` file.

use std::path::Path;

use bedah_gang_location_models::LocationFieldMapping;

use crate::{LocationError, LocationIndex};

/// Reads a `GeoJSON` file and builds a location index from its features.
///
/// # Errors
///
/// Returns [`LocationError::Io`] if the file cannot be read,
/// [`LocationError::Json`] if it is not valid JSON, and
/// [`LocationError::InvalidInput`] if it has no `features` array or the
/// features are malformed.
pub fn load_geojson(
    path: &Path,
    fields: &LocationFieldMapping,
) -> Result<LocationIndex, LocationError> {
    log::info!("Loading locations from {}", path.display());

    let text = std::fs::read_to_string(path)?;
    let data: serde_json::Value = serde_json::from_str(&text)?;

    let features = data.get("features").ok_or_else(|| {
        LocationError::invalid_input(format!(
            "{} has no 'features' member",
            path.display()
        ))
    })?;
    if !features.is_array() {
        return Err(LocationError::invalid_input(format!(
            "'features' in {} must be a list",
            path.display()
        )));
    }

    let index = LocationIndex::build(features, fields)?;
    log::info!(
        "Loaded {} locations from {}",
        index.len(),
        path.display()
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_feature_collection() {
        let file = write_temp(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "geometry": null,
                      "properties": { "kelurahan": "Ancol", "Score": 5 } },
                    { "type": "Feature", "geometry": null,
                      "properties": { "kelurahan": "Cakung", "Score": 2 } }
                ]
            }"#,
        );

        let index = load_geojson(file.path(), &LocationFieldMapping::default()).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("ancol").unwrap().score, Some(5.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_geojson(
            &dir.path().join("nope.geojson"),
            &LocationFieldMapping::default(),
        )
        .unwrap_err();

        assert!(matches!(err, LocationError::Io(_)));
    }

    #[test]
    fn features_must_be_a_list() {
        let file = write_temp(r#"{ "type": "FeatureCollection", "features": {} }"#);

        let err = load_geojson(file.path(), &LocationFieldMapping::default()).unwrap_err();

        assert!(matches!(err, LocationError::InvalidInput { .. }));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let file = write_temp("{ not json");

        let err = load_geojson(file.path(), &LocationFieldMapping::default()).unwrap_err();

        assert!(matches!(err, LocationError::Json(_)));
    }
}
