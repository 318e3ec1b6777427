use std::fs;
use std::io;
use std::path::Path;

use schema::{FullDatabase, PriorSnapshot, SpeciesIndex};
use tracing::{debug, warn};

use crate::errors::{PriorSnapshotError, SnapshotError, SnapshotResult};
use crate::literal::parse_exported;

fn read_input(path: &Path, role: &'static str) -> SnapshotResult<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SnapshotError::MissingInput {
            role,
            path: path.to_path_buf(),
        },
        _ => SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Load the full learnset database from its JSON file.
pub fn load_full_database(path: &Path) -> SnapshotResult<FullDatabase> {
    let content = read_input(path, "learnset database")?;
    let database: FullDatabase =
        serde_json::from_str(&content).map_err(|source| SnapshotError::Database {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), species = database.len(), "loaded learnset database");
    Ok(database)
}

/// Load species metadata from its RON file: a map of species id to `(name, num)`.
pub fn load_species_index(path: &Path) -> SnapshotResult<SpeciesIndex> {
    let content = read_input(path, "species data")?;
    let index: SpeciesIndex =
        ron::from_str(&content).map_err(|source| SnapshotError::SpeciesData {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), species = index.len(), "loaded species data");
    Ok(index)
}

/// A prior snapshot and the name its literal was exported under.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorExport {
    pub name: String,
    pub records: PriorSnapshot,
}

/// Load the previously generated snapshot. A missing file is an empty snapshot.
///
/// A snapshot exported under a name other than `export_name` is still used;
/// the mismatch is logged.
pub fn load_prior_snapshot(path: &Path, export_name: &str) -> SnapshotResult<PriorSnapshot> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no prior snapshot, starting empty");
            return Ok(PriorSnapshot::new());
        }
        Err(source) => {
            return Err(SnapshotError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let prior = parse_prior_export(&content).map_err(|source| SnapshotError::PriorSnapshot {
        path: path.to_path_buf(),
        source,
    })?;
    if prior.name != export_name {
        warn!(
            path = %path.display(),
            found = %prior.name,
            expected = export_name,
            "prior snapshot is exported under a different name"
        );
    }
    Ok(prior.records)
}

/// Read snapshot records out of an exported literal.
pub fn parse_prior_export(content: &str) -> Result<PriorExport, PriorSnapshotError> {
    let literal = parse_exported(content)?;
    Ok(PriorExport {
        name: literal.name,
        records: serde_json::from_value(literal.value)?,
    })
}
