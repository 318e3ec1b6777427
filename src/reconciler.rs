//! Snapshot reconciliation.
//!
//! Builds a fresh generation-filtered snapshot from the full learnset database
//! and the previous snapshot. Prior entries survive only while the database
//! still backs them; entries for the target generation that the prior snapshot
//! lacks are appended; every list ends up canonical and sorted, with at most
//! one level-up entry per level.
//!
//! The retention rule differs by method. A level-up entry is backed by any
//! level-up entry at the same numeric level (suffix and generation are not
//! compared, so `7L005q` is backed by `7L5`). Every other entry needs an exact
//! string match.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schema::{
    display_name, FullDatabase, LearnEntry, Learnset, PriorSnapshot, RawLearnset, Snapshot,
    SpeciesIndex,
};
use serde_json::Value;

use crate::errors::{SnapshotError, SnapshotResult};

/// Non-fatal findings reported while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// In the database but not (or without a learnset) in the prior snapshot.
    NewEntry { species: String, name: String },
    /// In the prior snapshot but gone from the database. Dropped.
    RemovedEntry { species: String, name: String },
    /// In the database but without species metadata.
    MissingSpeciesData { species: String },
    /// An entry string that does not follow the learn-entry grammar. Dropped.
    MalformedEntry {
        species: String,
        move_id: String,
        entry: String,
        reason: String,
    },
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingSpeciesData { .. } | Diagnostic::MalformedEntry { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NewEntry { species, name } => write!(f, "NEW ENTRY: {} ({})", name, species),
            Diagnostic::RemovedEntry { species, name } => {
                write!(f, "REMOVED ENTRY: {} ({})", name, species)
            }
            Diagnostic::MissingSpeciesData { species } => {
                write!(f, "{} has a learnset but no species data", species)
            }
            Diagnostic::MalformedEntry {
                species,
                move_id,
                entry,
                reason,
            } => write!(
                f,
                "{}: dropping malformed entry {:?} for {}: {}",
                species, entry, move_id, reason
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub snapshot: Snapshot,
    pub diagnostics: Vec<Diagnostic>,
}

/// An entry string paired with its parse, when it has one.
struct Candidate<'s> {
    raw: &'s str,
    entry: Option<LearnEntry>,
}

impl<'s> Candidate<'s> {
    fn parse(raw: &'s str) -> Self {
        Self {
            raw,
            entry: raw.parse().ok(),
        }
    }
}

/// Whether `entry` (written as `raw`) is backed by one of `targets`.
fn is_still_valid<'t>(
    entry: &LearnEntry,
    raw: &str,
    mut targets: impl Iterator<Item = (&'t str, Option<&'t LearnEntry>)>,
) -> bool {
    if entry.is_level_up() {
        targets.any(|(_, target)| target.is_some_and(|target| target.same_level(entry)))
    } else {
        targets.any(|(target_raw, _)| target_raw == raw)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list with non-string items",
        Value::Object(_) => "an object",
    }
}

/// Validate that a move's entries are a list of strings.
fn entry_list<'v>(species: &str, move_id: &str, value: &'v Value) -> SnapshotResult<Vec<&'v str>> {
    let invalid = || SnapshotError::StructuralValidity {
        species: species.to_string(),
        move_id: move_id.to_string(),
        found: describe(value),
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().ok_or_else(invalid))
        .collect()
}

pub struct Reconciler<'a> {
    database: &'a FullDatabase,
    species: &'a SpeciesIndex,
    generation: u8,
    special_species: &'a [String],
}

impl<'a> Reconciler<'a> {
    pub fn new(database: &'a FullDatabase, species: &'a SpeciesIndex, generation: u8) -> Self {
        Self {
            database,
            species,
            generation,
            special_species: &[],
        }
    }

    /// Ids expected to lack species metadata (no integrity warning for them).
    pub fn with_special_species(mut self, special_species: &'a [String]) -> Self {
        self.special_species = special_species;
        self
    }

    pub fn reconcile(&self, prior: &PriorSnapshot) -> SnapshotResult<Reconciliation> {
        let mut diagnostics = Vec::new();
        let empty = RawLearnset::new();

        for species in self.database.keys() {
            let has_prior = prior
                .get(species)
                .is_some_and(|record| record.learnset.is_some());
            if has_prior {
                continue;
            }
            diagnostics.push(Diagnostic::NewEntry {
                species: species.clone(),
                name: display_name(self.species, species).to_string(),
            });
            let is_special = self.special_species.iter().any(|id| id == species);
            if !self.species.contains_key(species) && !is_special {
                diagnostics.push(Diagnostic::MissingSpeciesData {
                    species: species.clone(),
                });
            }
        }

        // Prior species plus the ones synthesized above, each visited once.
        let species_ids: BTreeSet<&String> = prior.keys().chain(self.database.keys()).collect();

        let mut snapshot = Snapshot::new();
        for species in species_ids {
            let Some(record) = self.database.get(species) else {
                diagnostics.push(Diagnostic::RemovedEntry {
                    species: species.clone(),
                    name: display_name(self.species, species).to_string(),
                });
                continue;
            };
            let full = record.learnset.as_ref().unwrap_or(&empty);
            let previous = prior
                .get(species)
                .and_then(|record| record.learnset.as_ref())
                .unwrap_or(&empty);
            let learnset = self.reconcile_species(species, previous, full, &mut diagnostics)?;
            snapshot.insert(species.clone(), learnset);
        }

        Ok(Reconciliation {
            snapshot,
            diagnostics,
        })
    }

    fn reconcile_species(
        &self,
        species: &str,
        previous: &RawLearnset,
        full: &RawLearnset,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> SnapshotResult<Learnset> {
        let malformed = |move_id: &str, entry: &str, reason: String| Diagnostic::MalformedEntry {
            species: species.to_string(),
            move_id: move_id.to_string(),
            entry: entry.to_string(),
            reason,
        };

        // Prior entries still backed by the database.
        let mut kept: BTreeMap<&str, Vec<LearnEntry>> = BTreeMap::new();
        for (move_id, value) in previous {
            let entries = entry_list(species, move_id, value)?;
            let targets: Vec<Candidate> = match full.get(move_id) {
                Some(value) => entry_list(species, move_id, value)?
                    .into_iter()
                    .map(Candidate::parse)
                    .collect(),
                None => Vec::new(),
            };

            let mut retained = Vec::new();
            for raw in entries {
                match raw.parse::<LearnEntry>() {
                    Ok(entry) => {
                        let backing = targets.iter().map(|t| (t.raw, t.entry.as_ref()));
                        if is_still_valid(&entry, raw, backing) {
                            retained.push(entry);
                        }
                    }
                    Err(err) => diagnostics.push(malformed(move_id.as_str(), raw, err.to_string())),
                }
            }
            kept.insert(move_id.as_str(), retained);
        }

        // Merge in target-generation entries the kept set does not already cover.
        let mut learnset = Learnset::new();
        for (move_id, value) in full {
            let mut merged: Vec<(String, LearnEntry)> = kept
                .remove(move_id.as_str())
                .unwrap_or_default()
                .into_iter()
                .map(|entry| (entry.canonical(), entry))
                .collect();

            for raw in entry_list(species, move_id, value)? {
                let entry = match raw.parse::<LearnEntry>() {
                    Ok(entry) => entry,
                    Err(err) => {
                        diagnostics.push(malformed(move_id.as_str(), raw, err.to_string()));
                        continue;
                    }
                };
                if entry.generation != self.generation {
                    continue;
                }
                let present = merged.iter().map(|(canonical, e)| (canonical.as_str(), Some(e)));
                if !is_still_valid(&entry, raw, present) {
                    merged.push((entry.canonical(), entry));
                }
            }

            learnset.insert(move_id.clone(), finish(merged, self.generation));
        }

        // Moves the database no longer lists: nothing can back them, so their
        // lists are empty, but the move key is kept.
        for (move_id, entries) in kept {
            let merged = entries
                .into_iter()
                .map(|entry| (entry.canonical(), entry))
                .collect();
            learnset.insert(move_id.to_string(), finish(merged, self.generation));
        }

        Ok(learnset)
    }
}

/// Sort a move's entries and keep one level-up entry per level.
///
/// When several level-up entries share a level, a target-generation entry wins
/// over other generations, then the first in canonical order.
fn finish(mut merged: Vec<(String, LearnEntry)>, generation: u8) -> Vec<String> {
    merged.sort_by(|a, b| {
        (a.1.generation != generation, &a.0).cmp(&(b.1.generation != generation, &b.0))
    });
    let mut levels = BTreeSet::new();
    merged.retain(|(_, entry)| !entry.is_level_up() || levels.insert(entry.level));

    merged.sort_by(|a, b| a.0.cmp(&b.0));
    merged.dedup_by(|a, b| a.0 == b.0);
    merged.into_iter().map(|(canonical, _)| canonical).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::{LearnsetRecord, SpeciesMeta};
    use serde_json::json;

    fn index() -> SpeciesIndex {
        SpeciesIndex::from([
            ("bulbasaur".to_string(), SpeciesMeta::new("Bulbasaur", 1)),
            ("pikachu".to_string(), SpeciesMeta::new("Pikachu", 25)),
        ])
    }

    fn database(entries: &[(&str, Value)]) -> FullDatabase {
        entries
            .iter()
            .map(|(species, learnset)| {
                let record: LearnsetRecord =
                    serde_json::from_value(json!({ "learnset": learnset })).unwrap();
                (species.to_string(), record)
            })
            .collect()
    }

    #[test]
    fn test_is_still_valid_level_up_ignores_suffix() {
        let entry: LearnEntry = "7L005q".parse().unwrap();
        let target: LearnEntry = "7L5".parse().unwrap();
        assert!(is_still_valid(&entry, "7L005q", [("7L5", Some(&target))].into_iter()));
    }

    #[test]
    fn test_is_still_valid_other_methods_need_exact_string() {
        let entry: LearnEntry = "7S0".parse().unwrap();
        let other: LearnEntry = "7S1".parse().unwrap();
        assert!(!is_still_valid(&entry, "7S0", [("7S1", Some(&other))].into_iter()));
        assert!(is_still_valid(&entry, "7S0", [("7S0", None)].into_iter()));
    }

    #[test]
    fn test_drops_entries_no_longer_backed() {
        let db = database(&[("pikachu", json!({"thunderbolt": ["7M"], "surf": ["6M"]}))]);
        let prior = database(&[("pikachu", json!({"thunderbolt": ["7M", "7T"], "surf": ["7M"]}))]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        let pikachu = &result.snapshot["pikachu"];
        assert_eq!(pikachu["thunderbolt"], vec!["7M"]);
        assert_eq!(pikachu["surf"], Vec::<String>::new());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_prior_move_missing_from_database_stays_empty() {
        let db = database(&[("pikachu", json!({"thunderbolt": ["7M"]}))]);
        let prior = database(&[("pikachu", json!({"thunderbolt": ["7M"], "volttackle": ["7E"]}))]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["pikachu"]["volttackle"], Vec::<String>::new());
    }

    #[test]
    fn test_kept_entries_are_canonicalized() {
        let db = database(&[("pikachu", json!({"growl": ["6L5"]}))]);
        let prior = database(&[("pikachu", json!({"growl": ["7L5q"]}))]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["pikachu"]["growl"], vec!["7L005q"]);
    }

    #[test]
    fn test_canonical_duplicates_collapse() {
        let db = database(&[("pikachu", json!({"growl": ["7L9"], "protect": ["7M"]}))]);
        let prior = database(&[(
            "pikachu",
            json!({"growl": ["7L9", "7L009"], "protect": ["7M", "7M"]}),
        )]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["pikachu"]["growl"], vec!["7L009"]);
        assert_eq!(result.snapshot["pikachu"]["protect"], vec!["7M"]);
    }

    #[test]
    fn test_one_level_up_entry_per_level() {
        let db = database(&[("pikachu", json!({"growl": ["7L5"]}))]);
        let prior = database(&[("pikachu", json!({"growl": ["7L005", "7L5q", "6L5"]}))]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["pikachu"]["growl"], vec!["7L005"]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_shared_level_prefers_target_generation() {
        let db = database(&[("pikachu", json!({"growl": ["6L5", "7L5"], "tackle": ["7L1", "7M"]}))]);
        let prior = database(&[(
            "pikachu",
            json!({"growl": ["6L005", "7L5q"], "tackle": ["7L1", "7L1b", "7M"]}),
        )]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["pikachu"]["growl"], vec!["7L005q"]);
        assert_eq!(result.snapshot["pikachu"]["tackle"], vec!["7L001", "7M"]);
    }

    #[test]
    fn test_appends_new_generation_entries_sorted() {
        let db = database(&[(
            "pikachu",
            json!({"thunderbolt": ["7T", "7M", "7L29", "6M"]}),
        )]);
        let prior = database(&[("pikachu", json!({"thunderbolt": ["7M"]}))]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(
            result.snapshot["pikachu"]["thunderbolt"],
            vec!["7L029", "7M", "7T"]
        );
    }

    #[test]
    fn test_species_without_learnset_in_database_is_kept_empty() {
        let db: FullDatabase =
            serde_json::from_value(json!({"missingno": {}})).unwrap();
        let specials = vec!["missingno".to_string()];
        let result = Reconciler::new(&db, &index(), 7)
            .with_special_species(&specials)
            .reconcile(&PriorSnapshot::new())
            .unwrap();
        assert_eq!(result.snapshot["missingno"], Learnset::new());
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::NewEntry {
                species: "missingno".to_string(),
                name: "missingno".to_string(),
            }]
        );
    }

    #[test]
    fn test_prior_record_without_learnset_counts_as_new() {
        let db = database(&[("bulbasaur", json!({"tackle": ["7L1"]}))]);
        let prior: PriorSnapshot = serde_json::from_value(json!({"bulbasaur": {}})).unwrap();
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["bulbasaur"]["tackle"], vec!["7L001"]);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::NewEntry {
                species: "bulbasaur".to_string(),
                name: "Bulbasaur".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_species_gets_integrity_warning() {
        let db = database(&[("syclant", json!({}))]);
        let result = Reconciler::new(&db, &index(), 7)
            .reconcile(&PriorSnapshot::new())
            .unwrap();
        assert_eq!(
            result.diagnostics,
            vec![
                Diagnostic::NewEntry {
                    species: "syclant".to_string(),
                    name: "syclant".to_string(),
                },
                Diagnostic::MissingSpeciesData {
                    species: "syclant".to_string(),
                },
            ]
        );
        assert!(result.diagnostics[1].is_warning());
    }

    #[test]
    fn test_malformed_entries_are_dropped_and_reported() {
        let db = database(&[("pikachu", json!({"growl": ["7L5", "7Lx"]}))]);
        let prior = database(&[("pikachu", json!({"growl": ["?"]}))]);
        let result = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap();
        assert_eq!(result.snapshot["pikachu"]["growl"], vec!["7L005"]);
        let malformed: Vec<&str> = result
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::MalformedEntry { entry, .. } => Some(entry.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(malformed, vec!["?", "7Lx"]);
    }

    #[test]
    fn test_non_list_in_database_is_structural_error() {
        let db = database(&[("pikachu", json!({"growl": "7L5"}))]);
        let err = Reconciler::new(&db, &index(), 7)
            .reconcile(&PriorSnapshot::new())
            .unwrap_err();
        match err {
            SnapshotError::StructuralValidity {
                species,
                move_id,
                found,
            } => {
                assert_eq!(species, "pikachu");
                assert_eq!(move_id, "growl");
                assert_eq!(found, "a string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_string_item_in_prior_is_structural_error() {
        let db = database(&[("pikachu", json!({"growl": ["7L5"]}))]);
        let prior = database(&[("pikachu", json!({"growl": ["7L5", 5]}))]);
        let err = Reconciler::new(&db, &index(), 7).reconcile(&prior).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::StructuralValidity { found: "a list with non-string items", .. }
        ));
    }

    #[test]
    fn test_display_lines() {
        let new = Diagnostic::NewEntry {
            species: "pikachu".to_string(),
            name: "Pikachu".to_string(),
        };
        assert_eq!(new.to_string(), "NEW ENTRY: Pikachu (pikachu)");
        assert!(!new.is_warning());
    }
}
