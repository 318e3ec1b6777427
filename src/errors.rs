use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::literal::LiteralError;

/// Main error type for a snapshot run. Every variant is fatal: the run stops
/// and the output file is left as it was.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A required input file does not exist
    #[error("missing {role} file: {}", path.display())]
    MissingInput { role: &'static str, path: PathBuf },

    /// File metadata could not be read for a reason other than not-found
    #[error("could not stat {}: {source}", path.display())]
    StatFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A learnset entry list is not a list of strings
    #[error("{species}: entries for move '{move_id}' must be a list of strings, found {found}")]
    StructuralValidity {
        species: String,
        move_id: String,
        found: &'static str,
    },

    /// An input file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The full learnset database is not valid JSON of the expected shape
    #[error("malformed learnset database {}: {source}", path.display())]
    Database {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The species metadata file is not valid RON of the expected shape
    #[error("malformed species data {}: {source}", path.display())]
    SpeciesData {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The prior snapshot could not be read back
    #[error("malformed prior snapshot {}: {source}", path.display())]
    PriorSnapshot {
        path: PathBuf,
        #[source]
        source: PriorSnapshotError,
    },

    /// The new snapshot could not be rendered
    #[error("failed to render snapshot: {0}")]
    Render(#[from] serde_json::Error),

    /// Writing the output failed; the file may be truncated
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons a prior snapshot file cannot be turned into records
#[derive(Debug, thiserror::Error)]
pub enum PriorSnapshotError {
    /// The file is not a well-formed exported literal
    #[error(transparent)]
    Syntax(#[from] LiteralError),
    /// The literal does not have the `{species: {learnset: {...}}}` shape
    #[error("unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Type alias for Results using SnapshotError
pub type SnapshotResult<T> = Result<T, SnapshotError>;
