use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub type SpeciesId = String;
pub type MoveId = String;

/// Move id -> entry list, exactly as read. Lists are validated by the reconciler.
pub type RawLearnset = BTreeMap<MoveId, Value>;

/// One species record in either the full database or a prior snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnsetRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learnset: Option<RawLearnset>,
}

pub type FullDatabase = BTreeMap<SpeciesId, LearnsetRecord>;
pub type PriorSnapshot = BTreeMap<SpeciesId, LearnsetRecord>;

/// Move id -> sorted canonical entries.
pub type Learnset = BTreeMap<MoveId, Vec<String>>;
pub type Snapshot = BTreeMap<SpeciesId, Learnset>;

impl LearnsetRecord {
    pub fn new(learnset: RawLearnset) -> Self {
        Self {
            learnset: Some(learnset),
        }
    }

    /// Build a record from already well-formed entry lists.
    pub fn from_entries<M, E, S>(moves: M) -> Self
    where
        M: IntoIterator<Item = (S, E)>,
        E: IntoIterator,
        E::Item: Into<String>,
        S: Into<MoveId>,
    {
        let learnset = moves
            .into_iter()
            .map(|(move_id, entries)| {
                let entries: Vec<Value> = entries
                    .into_iter()
                    .map(|entry| Value::String(entry.into()))
                    .collect();
                (move_id.into(), Value::Array(entries))
            })
            .collect();
        Self::new(learnset)
    }
}
