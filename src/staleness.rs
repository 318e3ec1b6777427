//! Staleness gate.
//!
//! Regeneration is skipped when the output is at least as new as everything it
//! is derived from. The decision itself is a pure function over modification
//! times so it can be checked without touching disk; [`probe_inputs`] is the
//! thin filesystem layer that collects those times.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::{SnapshotError, SnapshotResult};

/// Modification time of a file that may not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStamp {
    Present(SystemTime),
    Absent,
}

impl FileStamp {
    pub fn time(self) -> Option<SystemTime> {
        match self {
            FileStamp::Present(time) => Some(time),
            FileStamp::Absent => None,
        }
    }
}

/// Modification times of the output and everything it depends on.
/// The database is required, so it is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputStamps {
    pub output: FileStamp,
    pub script: FileStamp,
    pub database: SystemTime,
    pub prior: FileStamp,
    pub species: FileStamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Run,
    Cached,
}

impl GateDecision {
    pub fn status_line(self) -> &'static str {
        match self {
            GateDecision::Run => "snapshot is stale, will run",
            GateDecision::Cached => "snapshot is up to date, skipped",
        }
    }
}

/// True when the output must be regenerated.
///
/// A missing output or a missing prior snapshot always forces a run. Otherwise
/// the output is stale when any present dependency is newer than it.
pub fn is_stale(stamps: &InputStamps) -> bool {
    let (FileStamp::Present(output), FileStamp::Present(prior)) = (stamps.output, stamps.prior)
    else {
        return true;
    };

    let dependencies = [
        stamps.script.time(),
        Some(stamps.database),
        Some(prior),
        stamps.species.time(),
    ];
    dependencies.into_iter().flatten().any(|time| output < time)
}

pub fn decide(stamps: &InputStamps) -> GateDecision {
    if is_stale(stamps) {
        GateDecision::Run
    } else {
        GateDecision::Cached
    }
}

/// Paths whose modification times feed the gate.
#[derive(Debug, Clone)]
pub struct GatePaths<'a> {
    pub output: &'a Path,
    pub script: Option<&'a Path>,
    pub database: &'a Path,
    pub prior: &'a Path,
    pub species: &'a Path,
}

fn stat(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

fn optional_stamp(path: &Path) -> SnapshotResult<FileStamp> {
    match stat(path) {
        Ok(time) => Ok(FileStamp::Present(time)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FileStamp::Absent),
        Err(source) => Err(SnapshotError::StatFailure {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn required_stamp(path: &Path, role: &'static str) -> SnapshotResult<SystemTime> {
    match optional_stamp(path)? {
        FileStamp::Present(time) => Ok(time),
        FileStamp::Absent => Err(SnapshotError::MissingInput {
            role,
            path: PathBuf::from(path),
        }),
    }
}

/// Collect modification times for the gate.
///
/// Fails with `MissingInput` when the database or species data is absent, and
/// with `StatFailure` when any stat fails for a reason other than not-found.
/// An unreadable script stamp is ignored.
pub fn probe_inputs(paths: &GatePaths<'_>) -> SnapshotResult<InputStamps> {
    let database = required_stamp(paths.database, "learnset database")?;
    let species = FileStamp::Present(required_stamp(paths.species, "species data")?);
    let prior = optional_stamp(paths.prior)?;
    let output = optional_stamp(paths.output)?;
    let script = paths
        .script
        .and_then(|path| stat(path).ok())
        .map_or(FileStamp::Absent, FileStamp::Present);

    Ok(InputStamps {
        output,
        script,
        database,
        prior,
        species,
    })
}
