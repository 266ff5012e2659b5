use super::config::ScaffoldConfig;
use super::metrics::Capabilities;
use super::tasks;
use crate::core::models::conformer::ConformerEnsemble;
use crate::core::models::correspondence::MatchResult;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::outcome::{GenerationFailureReason, JobOutcome, OutcomeKind, ScaffoldChoice};
use tracing::debug;

/// Everything one molecule's pipeline run reads. Shared read-only across workers.
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    pub target: &'a MoleculeGraph,
    pub scaffolds: &'a [MoleculeGraph],
    pub config: &'a ScaffoldConfig,
    pub capabilities: Capabilities<'a>,
}

/// Per-molecule pipeline state.
///
/// Each non-terminal state carries exactly the data the next stage needs, so a stage can
/// only run once its inputs exist.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Pending,
    ScaffoldSelection,
    SubstructureMatch {
        scaffold: ScaffoldChoice,
    },
    ConformerGeneration {
        scaffold: ScaffoldChoice,
        matches: MatchResult,
    },
    Curation {
        scaffold: ScaffoldChoice,
        ensemble: ConformerEnsemble,
    },
    Finished(OutcomeKind),
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ScaffoldSelection => "scaffold-selection",
            Self::SubstructureMatch { .. } => "substructure-match",
            Self::ConformerGeneration { .. } => "conformer-generation",
            Self::Curation { .. } => "curation",
            Self::Finished(_) => "finished",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Runs the stage this state stands for and returns the following state.
    ///
    /// A terminal state steps to itself.
    pub fn step(self, ctx: &JobContext<'_>) -> JobState {
        match self {
            Self::Pending => Self::ScaffoldSelection,

            Self::ScaffoldSelection => {
                match tasks::scaffold_selection::run(
                    ctx.target,
                    ctx.scaffolds,
                    ctx.capabilities.similarity,
                    &ctx.config.selection,
                ) {
                    Ok(scaffold) => Self::SubstructureMatch { scaffold },
                    Err(failure) => Self::Finished(OutcomeKind::SimilarityFailure {
                        best_score: failure.best_score,
                    }),
                }
            }

            Self::SubstructureMatch { scaffold } => {
                let Some(scaffold_graph) = ctx.scaffolds.get(scaffold.index) else {
                    return Self::Finished(OutcomeKind::SimilarityFailure { best_score: None });
                };
                let matching = &ctx.config.matching;
                let matches = tasks::substructure_match::run(
                    ctx.target,
                    scaffold_graph,
                    ctx.capabilities.atom_compare,
                    ctx.capabilities.bond_compare,
                    matching.min_size,
                    matching.mode,
                );
                if matches.is_empty() {
                    Self::Finished(OutcomeKind::GenerationFailure {
                        scaffold,
                        reason: GenerationFailureReason::NoCommonSubstructure,
                    })
                } else {
                    Self::ConformerGeneration { scaffold, matches }
                }
            }

            Self::ConformerGeneration { scaffold, matches } => {
                let Some(scaffold_graph) = ctx.scaffolds.get(scaffold.index) else {
                    return Self::Finished(OutcomeKind::SimilarityFailure { best_score: None });
                };
                match tasks::conformer_generation::run(
                    ctx.target,
                    scaffold_graph,
                    &matches,
                    &ctx.config.generation,
                ) {
                    Ok(ensemble) => Self::Curation { scaffold, ensemble },
                    Err(reason) => Self::Finished(OutcomeKind::GenerationFailure { scaffold, reason }),
                }
            }

            Self::Curation { scaffold, ensemble } => {
                let ensemble = tasks::ensemble_curation::run(
                    ctx.target,
                    ensemble,
                    ctx.capabilities.equivalence,
                    ctx.capabilities.ranking,
                    &ctx.config.curation,
                );
                Self::Finished(OutcomeKind::Success { scaffold, ensemble })
            }

            finished @ Self::Finished(_) => finished,
        }
    }
}

/// Drives one molecule from `Pending` to its terminal outcome.
pub fn run_job(input_index: usize, ctx: &JobContext<'_>) -> JobOutcome {
    let mut state = JobState::Pending;
    loop {
        if let JobState::Finished(kind) = state {
            return JobOutcome { input_index, kind };
        }
        debug!(input_index, state = state.name(), "Advancing job.");
        state = state.step(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::BondOrder;
    use crate::engine::config::ScaffoldConfigBuilder;
    use crate::engine::metrics::comparison::{AtomComparison, BondComparison};
    use nalgebra::Point3;

    fn ethanol(with_positions: bool) -> MoleculeGraph {
        let coords = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.52, 0.0, 0.0),
            Point3::new(2.0, 1.34, 0.0),
        ];
        let mut mol = MoleculeGraph::new("ethanol");
        for (element, position) in ["C", "C", "O"].into_iter().zip(coords) {
            let atom = Atom::new(element);
            mol.add_atom(if with_positions { atom.at(position) } else { atom });
        }
        mol.add_bond(0, 1, BondOrder::Single).unwrap();
        mol.add_bond(1, 2, BondOrder::Single).unwrap();
        mol
    }

    fn config(min_size: usize) -> ScaffoldConfig {
        ScaffoldConfigBuilder::new()
            .atom_comparison(AtomComparison::Element)
            .bond_comparison(BondComparison::BondOrder)
            .min_size(min_size)
            .build()
            .unwrap()
    }

    fn no_similarity(_: &MoleculeGraph, _: &MoleculeGraph) -> f64 {
        f64::NAN
    }

    #[test]
    fn states_advance_in_pipeline_order() {
        let target = ethanol(false);
        let scaffolds = vec![ethanol(true)];
        let config = config(3);
        let similarity = no_similarity;
        let ctx = JobContext {
            target: &target,
            scaffolds: &scaffolds,
            config: &config,
            capabilities: Capabilities::standard(&config, &similarity),
        };

        let mut names = Vec::new();
        let mut state = JobState::Pending;
        while !state.is_terminal() {
            names.push(state.name());
            state = state.step(&ctx);
        }
        assert_eq!(
            names,
            vec![
                "pending",
                "scaffold-selection",
                "substructure-match",
                "conformer-generation",
                "curation"
            ]
        );
        assert!(matches!(state, JobState::Finished(OutcomeKind::Success { .. })));
        assert_eq!(state.clone().step(&ctx), state);
    }

    #[test]
    fn empty_match_finishes_as_generation_failure() {
        let target = ethanol(false);
        let scaffolds = vec![ethanol(true)];
        let config = config(4);
        let similarity = no_similarity;
        let ctx = JobContext {
            target: &target,
            scaffolds: &scaffolds,
            config: &config,
            capabilities: Capabilities::standard(&config, &similarity),
        };

        let outcome = run_job(3, &ctx);
        assert_eq!(outcome.input_index, 3);
        assert_eq!(
            outcome.kind,
            OutcomeKind::GenerationFailure {
                scaffold: ScaffoldChoice {
                    index: 0,
                    score: None
                },
                reason: GenerationFailureReason::NoCommonSubstructure,
            }
        );
    }

    #[test]
    fn unscorable_scaffolds_finish_as_similarity_failure() {
        let target = ethanol(false);
        let scaffolds = vec![ethanol(true), ethanol(true)];
        let config = config(3);
        let similarity = no_similarity;
        let ctx = JobContext {
            target: &target,
            scaffolds: &scaffolds,
            config: &config,
            capabilities: Capabilities::standard(&config, &similarity),
        };

        let outcome = run_job(0, &ctx);
        assert_eq!(
            outcome.kind,
            OutcomeKind::SimilarityFailure { best_score: None }
        );
    }
}
