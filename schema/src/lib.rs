// Learnset Snapshot Schema - Shared type definitions
// This crate contains the learn-entry grammar and the record types shared by
// the snapshot library, its binary, and its tests.

// Re-export the main types
pub use learn_entry::*;
pub use learnset_data::*;
pub use species_data::*;

pub mod learn_entry;
pub mod learnset_data;
pub mod species_data;
