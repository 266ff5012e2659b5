use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "AnchorConf CLI - Generate 3D conformers of molecules constrained to the geometry of the most similar scaffold.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate conformers whose shared substructure follows a scaffold's coordinates.
    Generate(GenerateArgs),
}

/// Which atom key must agree for two atoms to be matched.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AtomCompareArg {
    Any,
    Element,
    AtomType,
}

/// Which bond properties must agree for two bonds to be matched.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BondCompareArg {
    Any,
    BondOrder,
    BondOrderWithRingness,
}

/// Solution type of the common-substructure search.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SolutionTypeArg {
    LargestOnly,
    AllAtMaxSize,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionArg {
    HigherIsBetter,
    LowerIsBetter,
}

/// Similarity metric used to choose a scaffold.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MetricArg {
    #[default]
    PathFingerprint,
    CommonSubstructure,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Path to the TOML file holding the molecules to generate conformers for.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the TOML file holding the scaffold molecules (with coordinates).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub scaffolds: PathBuf,

    /// Path for the successfully generated conformers.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path for molecules that had no sufficiently similar scaffold.
    #[arg(long, value_name = "PATH")]
    pub similarity_failure_output: Option<PathBuf>,

    /// Path for molecules for which no conformer could be generated.
    #[arg(long, value_name = "PATH")]
    pub generation_failure_output: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Matching Overrides ---
    /// Atom comparison used by the substructure search.
    #[arg(long, value_enum, value_name = "TYPE")]
    pub atom_compare: Option<AtomCompareArg>,

    /// Bond comparison used by the substructure search.
    #[arg(long, value_enum, value_name = "TYPE")]
    pub bond_compare: Option<BondCompareArg>,

    /// Minimum number of atoms the common substructure must have.
    #[arg(long, value_name = "INT")]
    pub min_size: Option<usize>,

    /// Solution type of the substructure search.
    #[arg(long, value_enum, value_name = "TYPE")]
    pub solution_type: Option<SolutionTypeArg>,

    // --- Selection Overrides ---
    /// Minimum similarity a scaffold must reach, or the molecule is a similarity failure.
    #[arg(long, value_name = "FLOAT")]
    pub similarity_threshold: Option<f64>,

    /// Whether higher or lower similarity scores are better.
    #[arg(long, value_enum, value_name = "DIRECTION")]
    pub similarity_direction: Option<DirectionArg>,

    /// Similarity metric used to choose the scaffold.
    #[arg(long, value_enum, value_name = "METRIC")]
    pub similarity_metric: Option<MetricArg>,

    // --- Generation Overrides ---
    /// Generate one conformer for every maximum-size substructure mapping.
    #[arg(long)]
    pub find_all: bool,

    /// Keep only conformers that are not equivalent to an earlier one.
    #[arg(long)]
    pub unique: bool,

    /// Keep the whole ensemble instead of only the best-ranked conformer.
    #[arg(long)]
    pub save_ensemble: bool,

    /// Maximum geometry attempts per substructure mapping.
    #[arg(long, value_name = "INT")]
    pub attempts: Option<usize>,

    /// Seed for the geometry attempts.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generation.max-attempts=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
