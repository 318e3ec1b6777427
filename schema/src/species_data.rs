use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SpeciesId;

/// Per-species metadata consulted for diagnostics and emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesMeta {
    pub name: String,
    pub num: i32, // dex index; non-positive for special and custom entries
}

pub type SpeciesIndex = BTreeMap<SpeciesId, SpeciesMeta>;

impl SpeciesMeta {
    pub fn new(name: impl Into<String>, num: i32) -> Self {
        Self {
            name: name.into(),
            num,
        }
    }
}

/// Display name for a species, falling back to its id when no metadata exists.
pub fn display_name<'a>(index: &'a SpeciesIndex, species: &'a str) -> &'a str {
    index
        .get(species)
        .map(|meta| meta.name.as_str())
        .unwrap_or(species)
}

/// Dex index used for ordering. Species without metadata sort as index 0.
pub fn dex_index(index: &SpeciesIndex, species: &str) -> i32 {
    index.get(species).map(|meta| meta.num).unwrap_or(0)
}
