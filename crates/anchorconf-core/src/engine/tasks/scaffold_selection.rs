use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::outcome::ScaffoldChoice;
use crate::engine::config::SelectionConfig;
use crate::engine::metrics::SimilarityMetric;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// No scaffold candidate was similar enough to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityFailure {
    /// Best score among the candidates, if any produced a comparable value.
    pub best_score: Option<f64>,
}

/// Picks the scaffold most similar to `target`.
///
/// A lone candidate is taken without scoring when no threshold is configured. Otherwise
/// every candidate is scored and the best one (per the configured direction) is taken;
/// ties go to the earliest candidate and NaN scores are ignored. The choice fails when no
/// candidate produced a score or the best score does not meet the threshold.
///
/// The function is pure: identical inputs always give the identical choice.
#[instrument(skip_all, name = "scaffold_selection_task")]
pub fn run<M>(
    target: &MoleculeGraph,
    candidates: &[MoleculeGraph],
    metric: &M,
    config: &SelectionConfig,
) -> Result<ScaffoldChoice, SimilarityFailure>
where
    M: SimilarityMetric + ?Sized,
{
    if candidates.len() == 1 && config.threshold.is_none() {
        debug!("Single scaffold and no threshold; selecting it without scoring.");
        return Ok(ScaffoldChoice {
            index: 0,
            score: None,
        });
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = metric.similarity(target, candidate);
        debug!(index, score, "Scored scaffold '{}'.", candidate.name());
        if score.is_nan() {
            continue;
        }
        let improves = match best {
            None => true,
            Some((_, current)) => config.direction.compare(score, current) == Ordering::Greater,
        };
        if improves {
            best = Some((index, score));
        }
    }

    let Some((index, score)) = best else {
        return Err(SimilarityFailure { best_score: None });
    };

    match config.threshold {
        Some(threshold) if !config.direction.meets(score, threshold) => {
            debug!(score, threshold, "Best scaffold is below the similarity threshold.");
            Err(SimilarityFailure {
                best_score: Some(score),
            })
        }
        _ => Ok(ScaffoldChoice {
            index,
            score: Some(score),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ScoreDirection;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn named(names: &[&str]) -> Vec<MoleculeGraph> {
        names.iter().map(|n| MoleculeGraph::new(n)).collect()
    }

    fn score_by_name(target: &MoleculeGraph, candidate: &MoleculeGraph) -> f64 {
        let _ = target;
        match candidate.name() {
            "a" => 0.5,
            "b" => 0.85,
            "c" => 0.7,
            "d" => 0.85,
            _ => f64::NAN,
        }
    }

    fn config(threshold: Option<f64>, direction: ScoreDirection) -> SelectionConfig {
        SelectionConfig {
            threshold,
            direction,
        }
    }

    #[test]
    fn single_scaffold_without_threshold_is_selected_unscored() {
        let calls = AtomicUsize::new(0);
        let metric = |_: &MoleculeGraph, _: &MoleculeGraph| {
            calls.fetch_add(1, AtomicOrdering::SeqCst);
            0.0
        };
        let choice = run(
            &MoleculeGraph::new("t"),
            &named(&["only"]),
            &metric,
            &config(None, ScoreDirection::HigherIsBetter),
        )
        .unwrap();
        assert_eq!(choice, ScaffoldChoice { index: 0, score: None });
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn single_scaffold_with_threshold_is_scored() {
        let result = run(
            &MoleculeGraph::new("t"),
            &named(&["a"]),
            &score_by_name,
            &config(Some(0.6), ScoreDirection::HigherIsBetter),
        );
        assert_eq!(result, Err(SimilarityFailure { best_score: Some(0.5) }));
    }

    #[test]
    fn best_candidate_is_selected_and_ties_go_to_the_earliest() {
        let choice = run(
            &MoleculeGraph::new("t"),
            &named(&["a", "b", "c", "d"]),
            &score_by_name,
            &config(None, ScoreDirection::HigherIsBetter),
        )
        .unwrap();
        assert_eq!(choice.index, 1);
        assert_eq!(choice.score, Some(0.85));
    }

    #[test]
    fn below_threshold_is_a_similarity_failure() {
        let result = run(
            &MoleculeGraph::new("t"),
            &named(&["a", "b", "c"]),
            &score_by_name,
            &config(Some(0.9), ScoreDirection::HigherIsBetter),
        );
        assert_eq!(result, Err(SimilarityFailure { best_score: Some(0.85) }));
    }

    #[test]
    fn lower_is_better_direction_inverts_selection_and_threshold() {
        let choice = run(
            &MoleculeGraph::new("t"),
            &named(&["b", "a", "c"]),
            &score_by_name,
            &config(Some(0.6), ScoreDirection::LowerIsBetter),
        )
        .unwrap();
        assert_eq!(choice.index, 1);

        let result = run(
            &MoleculeGraph::new("t"),
            &named(&["b", "c"]),
            &score_by_name,
            &config(Some(0.6), ScoreDirection::LowerIsBetter),
        );
        assert_eq!(result, Err(SimilarityFailure { best_score: Some(0.7) }));
    }

    #[test]
    fn nan_scores_are_ignored() {
        let choice = run(
            &MoleculeGraph::new("t"),
            &named(&["unknown", "c"]),
            &score_by_name,
            &config(None, ScoreDirection::HigherIsBetter),
        )
        .unwrap();
        assert_eq!(choice.index, 1);

        let result = run(
            &MoleculeGraph::new("t"),
            &named(&["unknown", "other"]),
            &score_by_name,
            &config(None, ScoreDirection::HigherIsBetter),
        );
        assert_eq!(result, Err(SimilarityFailure { best_score: None }));
    }

    #[test]
    fn selection_is_idempotent() {
        let candidates = named(&["a", "b", "c"]);
        let target = MoleculeGraph::new("t");
        let cfg = config(Some(0.5), ScoreDirection::HigherIsBetter);
        let first = run(&target, &candidates, &score_by_name, &cfg);
        let second = run(&target, &candidates, &score_by_name, &cfg);
        assert_eq!(first, second);
    }
}
