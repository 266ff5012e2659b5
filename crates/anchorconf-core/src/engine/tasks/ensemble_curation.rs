use crate::core::models::conformer::{ConformerCandidate, ConformerEnsemble};
use crate::core::models::molecule::MoleculeGraph;
use crate::engine::config::CurationConfig;
use crate::engine::metrics::{EquivalenceComparator, RankingScorer};
use tracing::{debug, instrument};

/// Post-processes a generated ensemble.
///
/// With `unique_only`, conformers equivalent to an earlier one are dropped. Unless
/// `keep_full_ensemble` is set, only the lowest-scoring survivor is kept (ties go to the
/// earliest). The output never grows and keeps the input order.
#[instrument(skip_all, name = "ensemble_curation_task", fields(size = ensemble.len()))]
pub fn run<Q, R>(
    molecule: &MoleculeGraph,
    ensemble: ConformerEnsemble,
    equivalence: &Q,
    ranking: &R,
    config: &CurationConfig,
) -> ConformerEnsemble
where
    Q: EquivalenceComparator + ?Sized,
    R: RankingScorer + ?Sized,
{
    let mut members = ensemble.into_members();

    if config.unique_only {
        let mut unique: Vec<ConformerCandidate> = Vec::with_capacity(members.len());
        for candidate in members {
            if !unique
                .iter()
                .any(|kept| equivalence.are_equivalent(molecule, kept, &candidate))
            {
                unique.push(candidate);
            }
        }
        debug!(remaining = unique.len(), "Removed equivalent conformers.");
        members = unique;
    }

    if !config.keep_full_ensemble && members.len() > 1 {
        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in members.iter().enumerate() {
            let score = ranking.score(molecule, candidate);
            if score.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, current)| score < current) {
                best = Some((index, score));
            }
        }
        let index = best.map_or(0, |(index, _)| index);
        debug!(index, "Kept the best-ranked conformer.");
        members = vec![members.swap_remove(index)];
    }

    members.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::correspondence::Correspondence;
    use nalgebra::Point3;

    fn candidate(x: f64) -> ConformerCandidate {
        ConformerCandidate::new(vec![Point3::new(x, 0.0, 0.0)], Correspondence::default())
    }

    fn ensemble(xs: &[f64]) -> ConformerEnsemble {
        xs.iter().map(|&x| candidate(x)).collect()
    }

    fn xs(ensemble: &ConformerEnsemble) -> Vec<f64> {
        ensemble.iter().map(|c| c.positions[0].x).collect()
    }

    fn same_x(_: &MoleculeGraph, a: &ConformerCandidate, b: &ConformerCandidate) -> bool {
        a.positions[0].x == b.positions[0].x
    }

    fn by_distance_from_two(_: &MoleculeGraph, c: &ConformerCandidate) -> f64 {
        (c.positions[0].x - 2.0).abs()
    }

    fn config(unique_only: bool, keep_full_ensemble: bool) -> CurationConfig {
        CurationConfig {
            unique_only,
            keep_full_ensemble,
        }
    }

    #[test]
    fn unique_only_keeps_first_occurrence_in_order() {
        let mol = MoleculeGraph::new("m");
        let result = run(
            &mol,
            ensemble(&[3.0, 1.0, 3.0, 2.0, 1.0]),
            &same_x,
            &by_distance_from_two,
            &config(true, true),
        );
        assert_eq!(xs(&result), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn single_best_is_selected_when_full_ensemble_is_not_kept() {
        let mol = MoleculeGraph::new("m");
        let result = run(
            &mol,
            ensemble(&[0.0, 2.5, 1.5, 4.0]),
            &same_x,
            &by_distance_from_two,
            &config(false, false),
        );
        assert_eq!(xs(&result), vec![2.5]);
    }

    #[test]
    fn ranking_ties_go_to_the_earliest() {
        let mol = MoleculeGraph::new("m");
        let result = run(
            &mol,
            ensemble(&[0.0, 1.0, 3.0]),
            &same_x,
            &by_distance_from_two,
            &config(false, false),
        );
        assert_eq!(xs(&result), vec![1.0]);
    }

    #[test]
    fn full_ensemble_without_uniqueness_is_untouched() {
        let mol = MoleculeGraph::new("m");
        let input = ensemble(&[1.0, 1.0, 5.0]);
        let result = run(
            &mol,
            input.clone(),
            &same_x,
            &by_distance_from_two,
            &config(false, true),
        );
        assert_eq!(result, input);
    }

    #[test]
    fn empty_and_singleton_ensembles_pass_through() {
        let mol = MoleculeGraph::new("m");
        let empty = run(
            &mol,
            ConformerEnsemble::new(),
            &same_x,
            &by_distance_from_two,
            &config(true, false),
        );
        assert!(empty.is_empty());

        let single = run(
            &mol,
            ensemble(&[7.0]),
            &same_x,
            &by_distance_from_two,
            &config(true, false),
        );
        assert_eq!(xs(&single), vec![7.0]);
    }

    #[test]
    fn curation_never_grows_the_ensemble() {
        let mol = MoleculeGraph::new("m");
        for (unique, full) in [(false, false), (false, true), (true, false), (true, true)] {
            let input = ensemble(&[1.0, 2.0, 2.0, 3.0]);
            let result = run(&mol, input.clone(), &same_x, &by_distance_from_two, &config(unique, full));
            assert!(result.len() <= input.len());
            assert!(!result.is_empty());
        }
    }
}
