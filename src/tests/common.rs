use std::fs;
use std::path::PathBuf;

use schema::{FullDatabase, LearnsetRecord, PriorSnapshot, SpeciesIndex, SpeciesMeta};

use crate::config::SnapshotConfig;

/// A builder for learnset maps, usable for both the full database and a prior snapshot.
///
/// # Example
/// ```
/// let database = LearnsetsBuilder::new()
///     .species("pikachu", &[("thunderbolt", &["7M", "6M"])])
///     .build();
/// ```
#[derive(Default)]
pub struct LearnsetsBuilder {
    records: FullDatabase,
}

impl LearnsetsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a species with the given moves and entries.
    pub fn species(mut self, id: &str, moves: &[(&str, &[&str])]) -> Self {
        let moves = moves
            .iter()
            .map(|(move_id, entries)| (move_id.to_string(), entries.iter().copied()));
        self.records
            .insert(id.to_string(), LearnsetRecord::from_entries(moves));
        self
    }

    /// Adds a species record that carries no learnset at all.
    pub fn bare_species(mut self, id: &str) -> Self {
        self.records.insert(id.to_string(), LearnsetRecord::default());
        self
    }

    pub fn build(self) -> FullDatabase {
        self.records
    }

    pub fn build_prior(self) -> PriorSnapshot {
        self.records
    }

    /// Renders the records as the JSON database file.
    pub fn to_json(&self) -> String {
        match serde_json::to_string_pretty(&self.records) {
            Ok(json) => json,
            Err(err) => panic!("Failed to encode test database: {}", err),
        }
    }
}

/// Species metadata used across the scenario tests.
pub fn test_species_index() -> SpeciesIndex {
    [
        ("missingno", "MissingNo.", 0),
        ("syclant", "Syclant", -1),
        ("bulbasaur", "Bulbasaur", 1),
        ("charmander", "Charmander", 4),
        ("pikachu", "Pikachu", 25),
        ("x", "Species X", 150),
        ("y", "Species Y", 151),
    ]
    .into_iter()
    .map(|(id, name, num)| (id.to_string(), SpeciesMeta::new(name, num)))
    .collect()
}

/// Renders species metadata as the RON file the loader reads.
pub fn species_index_ron(index: &SpeciesIndex) -> String {
    let entries: Vec<String> = index
        .iter()
        .map(|(id, meta)| format!("    {:?}: (name: {:?}, num: {}),", id, meta.name, meta.num))
        .collect();
    format!("{{\n{}\n}}\n", entries.join("\n"))
}

/// A temporary directory laid out like a data checkout.
pub struct TestWorkspace {
    pub dir: tempfile::TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        match tempfile::tempdir() {
            Ok(dir) => Self { dir },
            Err(err) => panic!("Failed to create temp dir: {}", err),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Err(err) = fs::write(&path, contents) {
            panic!("Failed to write {}: {}", path.display(), err);
        }
        path
    }

    pub fn read(&self, name: &str) -> String {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => contents,
            Err(err) => panic!("Failed to read {}: {}", name, err),
        }
    }

    /// Writes the database and species files and returns a config pointing at them.
    pub fn setup(&self, database: &LearnsetsBuilder) -> SnapshotConfig {
        self.write("learnsets.json", &database.to_json());
        self.write("species.ron", &species_index_ron(&test_species_index()));
        self.config()
    }

    pub fn config(&self) -> SnapshotConfig {
        SnapshotConfig {
            database: self.path("learnsets.json"),
            species: self.path("species.ron"),
            prior: self.path("learnsets-g7.js"),
            ..SnapshotConfig::default()
        }
    }
}
