use crate::cli::{
    AtomCompareArg, BondCompareArg, DirectionArg, GenerateArgs, MetricArg, SolutionTypeArg,
};
use crate::error::{CliError, Result};
use anchorconf::core::models::correspondence::SearchMode;
use anchorconf::engine::config::{ScaffoldConfig, ScaffoldConfigBuilder, ScoreDirection};
use anchorconf::engine::metrics::comparison::{AtomComparison, BondComparison};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_MIN_SIZE: usize = 3;

impl From<AtomCompareArg> for AtomComparison {
    fn from(arg: AtomCompareArg) -> Self {
        match arg {
            AtomCompareArg::Any => Self::Any,
            AtomCompareArg::Element => Self::Element,
            AtomCompareArg::AtomType => Self::AtomType,
        }
    }
}

impl From<BondCompareArg> for BondComparison {
    fn from(arg: BondCompareArg) -> Self {
        match arg {
            BondCompareArg::Any => Self::Any,
            BondCompareArg::BondOrder => Self::BondOrder,
            BondCompareArg::BondOrderWithRingness => Self::BondOrderWithRingness,
        }
    }
}

impl From<SolutionTypeArg> for SearchMode {
    fn from(arg: SolutionTypeArg) -> Self {
        match arg {
            SolutionTypeArg::LargestOnly => Self::LargestOnly,
            SolutionTypeArg::AllAtMaxSize => Self::AllAtMaxSize,
        }
    }
}

impl From<DirectionArg> for ScoreDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::HigherIsBetter => Self::HigherIsBetter,
            DirectionArg::LowerIsBetter => Self::LowerIsBetter,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMatchingConfig {
    atom_comparison: Option<AtomCompareArg>,
    bond_comparison: Option<BondCompareArg>,
    min_size: Option<usize>,
    solution_type: Option<SolutionTypeArg>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSelectionConfig {
    threshold: Option<f64>,
    direction: Option<DirectionArg>,
    metric: Option<MetricArg>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGenerationConfig {
    find_all: Option<bool>,
    max_attempts: Option<usize>,
    seed: Option<u64>,
    bond_tolerance: Option<f64>,
    steric_scale: Option<f64>,
    relaxation_steps: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialCurationConfig {
    unique_only: Option<bool>,
    keep_full_ensemble: Option<bool>,
}

/// The configuration file as written by the user; every value is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    matching: Option<PartialMatchingConfig>,
    selection: Option<PartialSelectionConfig>,
    generation: Option<PartialGenerationConfig>,
    curation: Option<PartialCurationConfig>,
}

/// Fully resolved settings of one `generate` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub core: ScaffoldConfig,
    pub metric: MetricArg,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves every setting with the precedence CLI flag > `--set` > file > default.
    pub fn merge_with_cli(mut self, args: &GenerateArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;

        let matching = self.matching.take().unwrap_or_default();
        let selection = self.selection.take().unwrap_or_default();
        let generation = self.generation.take().unwrap_or_default();
        let curation = self.curation.take().unwrap_or_default();

        let mut builder = ScaffoldConfigBuilder::new()
            .atom_comparison(
                args.atom_compare
                    .or(matching.atom_comparison)
                    .map_or(AtomComparison::Element, Into::into),
            )
            .bond_comparison(
                args.bond_compare
                    .or(matching.bond_comparison)
                    .map_or(BondComparison::BondOrder, Into::into),
            )
            .min_size(args.min_size.or(matching.min_size).unwrap_or(DEFAULT_MIN_SIZE))
            .find_all(args.find_all || generation.find_all.unwrap_or(false))
            .unique_only(args.unique || curation.unique_only.unwrap_or(false))
            .keep_full_ensemble(args.save_ensemble || curation.keep_full_ensemble.unwrap_or(false));

        if let Some(solution_type) = args.solution_type.or(matching.solution_type) {
            builder = builder.search_mode(solution_type.into());
        }
        if let Some(threshold) = args.similarity_threshold.or(selection.threshold) {
            builder = builder.similarity_threshold(threshold);
        }
        if let Some(direction) = args.similarity_direction.or(selection.direction) {
            builder = builder.score_direction(direction.into());
        }
        if let Some(attempts) = args.attempts.or(generation.max_attempts) {
            builder = builder.max_attempts(attempts);
        }
        if let Some(seed) = args.seed.or(generation.seed) {
            builder = builder.seed(seed);
        }
        if let Some(tolerance) = generation.bond_tolerance {
            builder = builder.bond_tolerance(tolerance);
        }
        if let Some(scale) = generation.steric_scale {
            builder = builder.steric_scale(scale);
        }
        if let Some(steps) = generation.relaxation_steps {
            builder = builder.relaxation_steps(steps);
        }

        let core = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        let metric = args
            .similarity_metric
            .or(selection.metric)
            .unwrap_or_default();

        Ok(RunConfig { core, metric })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "matching.atom-comparison" => {
                    self.matching_mut().atom_comparison = Some(parse_enum(key, value)?);
                }
                "matching.bond-comparison" => {
                    self.matching_mut().bond_comparison = Some(parse_enum(key, value)?);
                }
                "matching.min-size" => {
                    self.matching_mut().min_size = Some(parse_value(key, value)?);
                }
                "matching.solution-type" => {
                    self.matching_mut().solution_type = Some(parse_enum(key, value)?);
                }
                "selection.threshold" => {
                    self.selection_mut().threshold = Some(parse_value(key, value)?);
                }
                "selection.direction" => {
                    self.selection_mut().direction = Some(parse_enum(key, value)?);
                }
                "selection.metric" => {
                    self.selection_mut().metric = Some(parse_enum(key, value)?);
                }
                "generation.find-all" => {
                    self.generation_mut().find_all = Some(parse_value(key, value)?);
                }
                "generation.max-attempts" => {
                    self.generation_mut().max_attempts = Some(parse_value(key, value)?);
                }
                "generation.seed" => {
                    self.generation_mut().seed = Some(parse_value(key, value)?);
                }
                "generation.bond-tolerance" => {
                    self.generation_mut().bond_tolerance = Some(parse_value(key, value)?);
                }
                "generation.steric-scale" => {
                    self.generation_mut().steric_scale = Some(parse_value(key, value)?);
                }
                "generation.relaxation-steps" => {
                    self.generation_mut().relaxation_steps = Some(parse_value(key, value)?);
                }
                "curation.unique-only" => {
                    self.curation_mut().unique_only = Some(parse_value(key, value)?);
                }
                "curation.keep-full-ensemble" => {
                    self.curation_mut().keep_full_ensemble = Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn matching_mut(&mut self) -> &mut PartialMatchingConfig {
        self.matching.get_or_insert_with(Default::default)
    }

    fn selection_mut(&mut self) -> &mut PartialSelectionConfig {
        self.selection.get_or_insert_with(Default::default)
    }

    fn generation_mut(&mut self) -> &mut PartialGenerationConfig {
        self.generation.get_or_insert_with(Default::default)
    }

    fn curation_mut(&mut self) -> &mut PartialCurationConfig {
        self.curation.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

fn parse_enum<T: ValueEnum>(key: &str, value: &str) -> Result<T> {
    T::from_str(value.trim(), true)
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
}
