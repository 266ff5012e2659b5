use crate::core::models::correspondence::SearchMode;
use crate::engine::metrics::comparison::{AtomComparison, BondComparison};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
    #[error("Contradictory options: {0}")]
    Contradiction(String),
    #[error("No scaffold candidates were supplied")]
    NoScaffolds,
}

/// Whether larger or smaller similarity scores indicate a better scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScoreDirection {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl ScoreDirection {
    /// Orders two scores so that the better one compares as greater.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::HigherIsBetter => a.total_cmp(&b),
            Self::LowerIsBetter => b.total_cmp(&a),
        }
    }

    /// Whether `score` is at least as good as `threshold`.
    pub fn meets(self, score: f64, threshold: f64) -> bool {
        match self {
            Self::HigherIsBetter => score >= threshold,
            Self::LowerIsBetter => score <= threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub atom_comparison: AtomComparison,
    pub bond_comparison: BondComparison,
    pub min_size: usize,
    pub mode: SearchMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Minimum acceptable score; `None` disables the similarity requirement.
    pub threshold: Option<f64>,
    pub direction: ScoreDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Generate one conformer per correspondence instead of only for the first.
    pub find_all: bool,
    pub max_attempts: usize,
    pub seed: u64,
    /// Largest accepted deviation from an ideal bond length, in Angstroms.
    pub bond_tolerance: f64,
    /// Fraction of the van der Waals contact distance non-bonded atoms must keep.
    pub steric_scale: f64,
    pub relaxation_steps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurationConfig {
    pub unique_only: bool,
    pub keep_full_ensemble: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldConfig {
    pub matching: MatchConfig,
    pub selection: SelectionConfig,
    pub generation: GenerationConfig,
    pub curation: CurationConfig,
}

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_BOND_TOLERANCE: f64 = 0.25;
pub const DEFAULT_STERIC_SCALE: f64 = 0.6;
pub const DEFAULT_RELAXATION_STEPS: usize = 200;

#[derive(Default)]
pub struct ScaffoldConfigBuilder {
    atom_comparison: Option<AtomComparison>,
    bond_comparison: Option<BondComparison>,
    min_size: Option<usize>,
    mode: Option<SearchMode>,
    threshold: Option<f64>,
    direction: Option<ScoreDirection>,
    find_all: Option<bool>,
    max_attempts: Option<usize>,
    seed: Option<u64>,
    bond_tolerance: Option<f64>,
    steric_scale: Option<f64>,
    relaxation_steps: Option<usize>,
    unique_only: Option<bool>,
    keep_full_ensemble: Option<bool>,
}

impl ScaffoldConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_comparison(mut self, comparison: AtomComparison) -> Self {
        self.atom_comparison = Some(comparison);
        self
    }
    pub fn bond_comparison(mut self, comparison: BondComparison) -> Self {
        self.bond_comparison = Some(comparison);
        self
    }
    pub fn min_size(mut self, size: usize) -> Self {
        self.min_size = Some(size);
        self
    }
    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
    pub fn score_direction(mut self, direction: ScoreDirection) -> Self {
        self.direction = Some(direction);
        self
    }
    pub fn find_all(mut self, enabled: bool) -> Self {
        self.find_all = Some(enabled);
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn bond_tolerance(mut self, tolerance: f64) -> Self {
        self.bond_tolerance = Some(tolerance);
        self
    }
    pub fn steric_scale(mut self, scale: f64) -> Self {
        self.steric_scale = Some(scale);
        self
    }
    pub fn relaxation_steps(mut self, steps: usize) -> Self {
        self.relaxation_steps = Some(steps);
        self
    }
    pub fn unique_only(mut self, enabled: bool) -> Self {
        self.unique_only = Some(enabled);
        self
    }
    pub fn keep_full_ensemble(mut self, enabled: bool) -> Self {
        self.keep_full_ensemble = Some(enabled);
        self
    }

    pub fn build(self) -> Result<ScaffoldConfig, ConfigError> {
        let find_all = self.find_all.unwrap_or(false);
        let mode = match (self.mode, find_all) {
            (Some(SearchMode::LargestOnly), true) => {
                return Err(ConfigError::Contradiction(
                    "find-all requires the all-at-max-size search mode".to_string(),
                ));
            }
            (Some(mode), _) => mode,
            (None, true) => SearchMode::AllAtMaxSize,
            (None, false) => SearchMode::LargestOnly,
        };

        let min_size = self
            .min_size
            .ok_or(ConfigError::MissingParameter("min_size"))?;
        if min_size == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "min_size",
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(threshold) = self.threshold {
            if !threshold.is_finite() {
                return Err(ConfigError::InvalidValue {
                    parameter: "similarity_threshold",
                    reason: format!("must be a finite number, got {}", threshold),
                });
            }
        }

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        let bond_tolerance = self.bond_tolerance.unwrap_or(DEFAULT_BOND_TOLERANCE);
        require_positive("bond_tolerance", bond_tolerance)?;
        let steric_scale = self.steric_scale.unwrap_or(DEFAULT_STERIC_SCALE);
        require_positive("steric_scale", steric_scale)?;

        let unique_only = self.unique_only.unwrap_or(false);
        let keep_full_ensemble = self.keep_full_ensemble.unwrap_or(false);
        if !find_all && (unique_only || keep_full_ensemble) {
            warn!(
                unique_only,
                keep_full_ensemble,
                "Ensemble options have no effect without find-all: at most one conformer is generated."
            );
        }

        Ok(ScaffoldConfig {
            matching: MatchConfig {
                atom_comparison: self
                    .atom_comparison
                    .ok_or(ConfigError::MissingParameter("atom_comparison"))?,
                bond_comparison: self
                    .bond_comparison
                    .ok_or(ConfigError::MissingParameter("bond_comparison"))?,
                min_size,
                mode,
            },
            selection: SelectionConfig {
                threshold: self.threshold,
                direction: self.direction.unwrap_or_default(),
            },
            generation: GenerationConfig {
                find_all,
                max_attempts,
                seed: self.seed.unwrap_or(DEFAULT_SEED),
                bond_tolerance,
                steric_scale,
                relaxation_steps: self.relaxation_steps.unwrap_or(DEFAULT_RELAXATION_STEPS),
            },
            curation: CurationConfig {
                unique_only,
                keep_full_ensemble,
            },
        })
    }
}

fn require_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ScaffoldConfigBuilder {
        ScaffoldConfigBuilder::new()
            .atom_comparison(AtomComparison::Element)
            .bond_comparison(BondComparison::BondOrder)
            .min_size(3)
    }

    #[test]
    fn build_applies_defaults() {
        let config = base().build().unwrap();
        assert_eq!(config.matching.mode, SearchMode::LargestOnly);
        assert_eq!(config.selection.threshold, None);
        assert_eq!(config.selection.direction, ScoreDirection::HigherIsBetter);
        assert_eq!(config.generation.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.generation.bond_tolerance, DEFAULT_BOND_TOLERANCE);
        assert!(!config.curation.unique_only);
        assert!(!config.curation.keep_full_ensemble);
    }

    #[test]
    fn find_all_selects_all_at_max_size_mode() {
        let config = base().find_all(true).build().unwrap();
        assert_eq!(config.matching.mode, SearchMode::AllAtMaxSize);
        assert!(config.generation.find_all);
    }

    #[test]
    fn build_fails_when_required_parameters_are_missing() {
        let err = ScaffoldConfigBuilder::new()
            .bond_comparison(BondComparison::Any)
            .min_size(2)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("atom_comparison"));

        let err = ScaffoldConfigBuilder::new()
            .atom_comparison(AtomComparison::Any)
            .bond_comparison(BondComparison::Any)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("min_size"));
    }

    #[test]
    fn zero_min_size_is_rejected() {
        let err = base().min_size(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { parameter: "min_size", .. }));
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let err = base().similarity_threshold(f64::NAN).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                parameter: "similarity_threshold",
                ..
            }
        ));
    }

    #[test]
    fn find_all_with_largest_only_is_contradictory() {
        let err = base()
            .find_all(true)
            .search_mode(SearchMode::LargestOnly)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Contradiction(_)));
    }

    #[test]
    fn non_positive_tolerances_are_rejected() {
        assert!(base().bond_tolerance(0.0).build().is_err());
        assert!(base().steric_scale(-1.0).build().is_err());
        assert!(base().max_attempts(0).build().is_err());
    }

    #[test]
    fn score_direction_orders_and_thresholds() {
        assert_eq!(ScoreDirection::HigherIsBetter.compare(0.9, 0.5), Ordering::Greater);
        assert_eq!(ScoreDirection::LowerIsBetter.compare(0.9, 0.5), Ordering::Less);
        assert!(ScoreDirection::HigherIsBetter.meets(0.9, 0.9));
        assert!(!ScoreDirection::HigherIsBetter.meets(0.85, 0.9));
        assert!(ScoreDirection::LowerIsBetter.meets(0.2, 0.3));
    }
}
