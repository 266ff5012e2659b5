use super::conformer::ConformerEnsemble;
use std::fmt;

/// The scaffold picked for a target molecule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaffoldChoice {
    /// Index of the scaffold in the candidate list.
    pub index: usize,
    /// Similarity score, absent when a lone scaffold was selected without scoring.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationFailureReason {
    /// No common substructure reached the minimum size.
    NoCommonSubstructure,
    /// Every correspondence failed to yield a valid geometry.
    NoValidGeometry,
}

impl fmt::Display for GenerationFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCommonSubstructure => write!(f, "no-common-substructure"),
            Self::NoValidGeometry => write!(f, "no-valid-geometry"),
        }
    }
}

/// The three disjoint destinations a molecule's outcome can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeChannel {
    Success,
    SimilarityFailure,
    GenerationFailure,
}

impl fmt::Display for OutcomeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::SimilarityFailure => write!(f, "similarity-failure"),
            Self::GenerationFailure => write!(f, "generation-failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeKind {
    Success {
        scaffold: ScaffoldChoice,
        ensemble: ConformerEnsemble,
    },
    SimilarityFailure {
        /// Best score seen, if any candidate produced a usable one.
        best_score: Option<f64>,
    },
    GenerationFailure {
        scaffold: ScaffoldChoice,
        reason: GenerationFailureReason,
    },
}

/// The terminal result of one molecule's pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    /// Position of the molecule in the input sequence.
    pub input_index: usize,
    pub kind: OutcomeKind,
}

impl JobOutcome {
    pub fn channel(&self) -> OutcomeChannel {
        match self.kind {
            OutcomeKind::Success { .. } => OutcomeChannel::Success,
            OutcomeKind::SimilarityFailure { .. } => OutcomeChannel::SimilarityFailure,
            OutcomeKind::GenerationFailure { .. } => OutcomeChannel::GenerationFailure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.kind, OutcomeKind::Success { .. })
    }

    pub fn ensemble(&self) -> Option<&ConformerEnsemble> {
        match &self.kind {
            OutcomeKind::Success { ensemble, .. } => Some(ensemble),
            _ => None,
        }
    }

    pub fn scaffold(&self) -> Option<ScaffoldChoice> {
        match self.kind {
            OutcomeKind::Success { scaffold, .. } | OutcomeKind::GenerationFailure { scaffold, .. } => {
                Some(scaffold)
            }
            OutcomeKind::SimilarityFailure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_route_to_their_channel() {
        let choice = ScaffoldChoice {
            index: 1,
            score: Some(0.7),
        };
        let success = JobOutcome {
            input_index: 0,
            kind: OutcomeKind::Success {
                scaffold: choice,
                ensemble: ConformerEnsemble::new(),
            },
        };
        let similarity = JobOutcome {
            input_index: 1,
            kind: OutcomeKind::SimilarityFailure { best_score: None },
        };
        let generation = JobOutcome {
            input_index: 2,
            kind: OutcomeKind::GenerationFailure {
                scaffold: choice,
                reason: GenerationFailureReason::NoValidGeometry,
            },
        };

        assert_eq!(success.channel(), OutcomeChannel::Success);
        assert_eq!(similarity.channel(), OutcomeChannel::SimilarityFailure);
        assert_eq!(generation.channel(), OutcomeChannel::GenerationFailure);
        assert!(success.is_success());
        assert!(success.ensemble().is_some());
        assert!(generation.ensemble().is_none());
        assert_eq!(similarity.scaffold(), None);
        assert_eq!(generation.scaffold(), Some(choice));
    }

    #[test]
    fn reasons_and_channels_have_kebab_case_names() {
        assert_eq!(
            GenerationFailureReason::NoCommonSubstructure.to_string(),
            "no-common-substructure"
        );
        assert_eq!(OutcomeChannel::SimilarityFailure.to_string(), "similarity-failure");
    }
}
