// In: src/lib.rs

//! Learnset Snapshot
//!
//! Regenerates a generation-filtered learnset snapshot from the full learnset
//! database. The previous snapshot is reconciled against the database rather
//! than rebuilt from scratch, so entries curated by hand survive as long as
//! the database still backs them.

// --- MODULE DECLARATIONS ---
pub mod config;
pub mod database;
pub mod errors;
pub mod literal;
pub mod pipeline;
pub mod reconciler;
pub mod serializer;
pub mod staleness;
pub mod writer;

#[cfg(test)]
mod tests;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    // Learn-entry grammar
    canonicalize,
    EntryParseError,
    LearnEntry,
    LearnMethod,
    // Records
    FullDatabase,
    Learnset,
    LearnsetRecord,
    PriorSnapshot,
    RawLearnset,
    Snapshot,
    SpeciesIndex,
    SpeciesMeta,
};

// --- From this crate's modules (`src/`) ---
pub use config::{ConfigError, SnapshotConfig, DEFAULT_GENERATION};
pub use pipeline::{run, RunOptions, RunOutcome};
pub use reconciler::{Diagnostic, Reconciler, Reconciliation};
pub use serializer::render_snapshot;
pub use staleness::{decide, is_stale, FileStamp, GateDecision, InputStamps};

// Crate-specific error and result types.
pub use errors::{PriorSnapshotError, SnapshotError, SnapshotResult};
