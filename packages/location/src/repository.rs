//! Reloadable location repository.
//!
//! Owns the loaded [`LocationIndex`] for the lifetime of the service.
//! A reload re-reads the source file and swaps the whole index; if the
//! reload fails the previous index keeps serving.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bedah_gang_location_models::{LocationFieldMapping, RiskLookup};
use bedah_gang_snapshot::Snapshot;

use crate::loader::load_geojson;
use crate::{LocationError, LocationIndex};

/// A location index loaded from a `GeoJSON` file.
#[derive(Debug)]
pub struct LocationRepository {
    path: PathBuf,
    fields: LocationFieldMapping,
    index: Snapshot<LocationIndex>,
}

impl LocationRepository {
    /// Loads the index from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the file cannot be loaded.
    pub fn open(path: &Path, fields: LocationFieldMapping) -> Result<Self, LocationError> {
        let index = load_geojson(path, &fields)?;
        Ok(Self {
            path: path.to_path_buf(),
            fields,
            index: Snapshot::new(index),
        })
    }

    /// Source file the index is loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current index.
    #[must_use]
    pub fn index(&self) -> Arc<LocationIndex> {
        self.index.load()
    }

    /// Looks up the flood risk of a location by name.
    #[must_use]
    pub fn lookup_risk(&self, name: &str) -> Option<RiskLookup> {
        let index = self.index();
        index.lookup(name).map(|record| RiskLookup::new(name, record))
    }

    /// Searches location names; see [`LocationIndex::search`].
    #[must_use]
    pub fn search(&self, query: Option<&str>) -> Vec<String> {
        self.index().search(query)
    }

    /// Re-reads the source file and replaces the index.
    ///
    /// Returns the number of locations in the new index.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the file cannot be loaded. The previous
    /// index is kept in that case.
    pub fn reload(&self) -> Result<usize, LocationError> {
        match self
            .index
            .try_refresh(|| load_geojson(&self.path, &self.fields))
        {
            Ok(index) => {
                log::info!("Reloaded {} locations", index.len());
                Ok(index.len())
            }
            Err(e) => {
                log::warn!(
                    "Failed to reload locations from {}, keeping previous index: {e}",
                    self.path.display()
                );
                Err(e)
            }
        }
    }
}
