use crate::core::io::traits::MoleculeSource;
use crate::core::models::molecule::MoleculeGraph;
use crate::engine::config::{ConfigError, ScaffoldConfig};
use crate::engine::error::EngineError;
use crate::engine::metrics::Capabilities;
use crate::engine::output::OutputChannels;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{JobContext, run_job};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-channel outcome counts of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub successes: usize,
    pub similarity_failures: usize,
    pub generation_failures: usize,
    pub total: usize,
}

/// Generates scaffold-constrained conformers for every target molecule.
///
/// Each target runs the full pipeline independently and ends in exactly one outcome,
/// which is delivered to its channel tagged with the target's input index. Per-molecule
/// failures never stop the run; only invalid inputs (checked before any molecule is
/// processed) and sink failures return an error.
#[instrument(skip_all, name = "conformer_from_scaffold_workflow")]
pub fn run(
    targets: &[MoleculeGraph],
    scaffolds: &[MoleculeGraph],
    config: &ScaffoldConfig,
    capabilities: Capabilities<'_>,
    channels: &OutputChannels,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError> {
    validate_scaffolds(scaffolds)?;

    reporter.report(Progress::PhaseStart {
        name: "Conformer Generation",
    });
    info!(
        targets = targets.len(),
        scaffolds = scaffolds.len(),
        mode = %config.matching.mode,
        "Starting scaffold-constrained conformer generation."
    );
    reporter.report(Progress::TaskStart {
        total_steps: targets.len() as u64,
    });

    let before = channels.counts();

    let process = |(input_index, target): (usize, &MoleculeGraph)| -> Result<(), EngineError> {
        let ctx = JobContext {
            target,
            scaffolds,
            config,
            capabilities,
        };
        let outcome = run_job(input_index, &ctx);
        let channel = outcome.channel();
        let count = channels.deliver(&outcome, target)?;
        debug!(input_index, %channel, count, "Delivered outcome for '{}'.", target.name());
        reporter.report(Progress::MoleculeFinished {
            input_index,
            channel,
        });
        reporter.report(Progress::TaskIncrement);
        Ok(())
    };

    let iterator = targets.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = targets.par_iter().enumerate();

    iterator.try_for_each(process)?;

    channels.flush()?;
    reporter.report(Progress::TaskFinish);

    let after = channels.counts();
    let summary = RunSummary {
        successes: after.successes - before.successes,
        similarity_failures: after.similarity_failures - before.similarity_failures,
        generation_failures: after.generation_failures - before.generation_failures,
        total: targets.len(),
    };
    info!(
        successes = summary.successes,
        similarity_failures = summary.similarity_failures,
        generation_failures = summary.generation_failures,
        "Conformer generation complete."
    );
    reporter.report(Progress::PhaseFinish);

    Ok(summary)
}

/// Loads targets and scaffolds from their sources, then runs the workflow.
pub fn run_from_sources<T, S>(
    targets: &T,
    scaffolds: &S,
    config: &ScaffoldConfig,
    capabilities: Capabilities<'_>,
    channels: &OutputChannels,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError>
where
    T: MoleculeSource + ?Sized,
    S: MoleculeSource + ?Sized,
{
    let scaffolds = scaffolds.molecules()?;
    validate_scaffolds(&scaffolds)?;
    let targets = targets.molecules()?;
    run(&targets, &scaffolds, config, capabilities, channels, reporter)
}

fn validate_scaffolds(scaffolds: &[MoleculeGraph]) -> Result<(), EngineError> {
    if scaffolds.is_empty() {
        return Err(ConfigError::NoScaffolds.into());
    }
    if let Some((index, scaffold)) = scaffolds
        .iter()
        .enumerate()
        .find(|(_, s)| !s.has_complete_geometry())
    {
        return Err(EngineError::ScaffoldWithoutGeometry {
            index,
            name: scaffold.name().to_string(),
        });
    }
    Ok(())
}
