use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::SnapshotConfig;
use crate::database::{load_full_database, load_prior_snapshot, load_species_index};
use crate::errors::SnapshotResult;
use crate::reconciler::{Diagnostic, Reconciler};
use crate::serializer::render_snapshot;
use crate::staleness::{decide, probe_inputs, GateDecision, GatePaths};
use crate::writer::write_snapshot;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Regenerate even when the output looks up to date.
    pub force: bool,
    /// The running program. A newer program invalidates the output.
    pub script: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Done { species: usize, diagnostics: usize },
    Cached,
}

impl RunOutcome {
    pub fn status_line(&self) -> &'static str {
        match self {
            RunOutcome::Done { .. } => "DONE",
            RunOutcome::Cached => "CACHED",
        }
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    if diagnostic.is_warning() {
        warn!("{}", diagnostic);
    } else {
        info!("{}", diagnostic);
    }
}

/// Regenerate the snapshot described by `config`.
///
/// Nothing is opened for writing until the whole snapshot has been rendered in
/// memory, so any failure before that point leaves the output untouched.
pub async fn run(config: &SnapshotConfig, options: &RunOptions) -> SnapshotResult<RunOutcome> {
    config.validate()?;
    let output = config.output_path();

    let stamps = probe_inputs(&GatePaths {
        output,
        script: options.script.as_deref(),
        database: &config.database,
        prior: &config.prior,
        species: &config.species,
    })?;
    let decision = if options.force {
        GateDecision::Run
    } else {
        decide(&stamps)
    };
    info!(output = %output.display(), force = options.force, "{}", decision.status_line());
    if decision == GateDecision::Cached {
        return Ok(RunOutcome::Cached);
    }

    let database = load_full_database(&config.database)?;
    let species = load_species_index(&config.species)?;
    let prior = load_prior_snapshot(&config.prior, &config.export_name)?;

    let reconciliation = Reconciler::new(&database, &species, config.generation)
        .with_special_species(&config.special_species)
        .reconcile(&prior)?;
    reconciliation.diagnostics.iter().for_each(log_diagnostic);

    let rendered = render_snapshot(&reconciliation.snapshot, &species, &config.export_name)?;
    write_snapshot(output, &rendered).await?;

    info!(
        output = %output.display(),
        generation = config.generation,
        species = reconciliation.snapshot.len(),
        "snapshot regenerated"
    );
    Ok(RunOutcome::Done {
        species: reconciliation.snapshot.len(),
        diagnostics: reconciliation.diagnostics.len(),
    })
}
