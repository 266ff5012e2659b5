use crate::cli::{GenerateArgs, MetricArg};
use crate::config::{PartialRunConfig, RunConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use anchorconf::{
    core::io::{
        records::{TomlMoleculeFile, TomlRecordWriter},
        traits::{DiscardSink, MoleculeSource, RecordSink},
    },
    core::models::molecule::MoleculeGraph,
    engine::{
        metrics::{
            Capabilities, SimilarityMetric,
            similarity::{PathFingerprintTanimoto, SubstructureTanimoto},
        },
        output::OutputChannels,
        progress::ProgressReporter,
    },
    workflows,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: GenerateArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    info!("Loading scaffolds from {:?}", &args.scaffolds);
    let scaffolds = load_molecules(&args.scaffolds)?;
    info!("Loading target molecules from {:?}", &args.input);
    let targets = load_molecules(&args.input)?;
    if targets.is_empty() {
        warn!("Input file contains no molecules; nothing to do.");
    }

    let channels = OutputChannels::new(
        open_sink(Some(&args.output))?,
        open_sink(args.similarity_failure_output.as_deref())?,
        open_sink(args.generation_failure_output.as_deref())?,
    );

    let similarity = similarity_metric(&config);
    let capabilities = Capabilities::standard(&config.core, similarity.as_ref());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating conformers for {} molecule(s) against {} scaffold(s)...",
        targets.len(),
        scaffolds.len()
    );
    let summary = workflows::conformer_from_scaffold::run(
        &targets,
        &scaffolds,
        &config.core,
        capabilities,
        &channels,
        &reporter,
    )?;

    println!(
        "✓ {} of {} molecule(s) succeeded; written to: {}",
        summary.successes,
        summary.total,
        args.output.display()
    );
    report_failures(
        "had no sufficiently similar scaffold",
        summary.similarity_failures,
        args.similarity_failure_output.as_deref(),
    );
    report_failures(
        "could not be given a valid geometry",
        summary.generation_failures,
        args.generation_failure_output.as_deref(),
    );

    Ok(())
}

fn load_molecules(path: &Path) -> Result<Vec<MoleculeGraph>> {
    TomlMoleculeFile::new(path)
        .molecules()
        .map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
}

fn open_sink(path: Option<&Path>) -> Result<Box<dyn RecordSink>> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            Ok(Box::new(TomlRecordWriter::new(BufWriter::new(file))))
        }
        None => Ok(Box::new(DiscardSink)),
    }
}

fn similarity_metric(config: &RunConfig) -> Box<dyn SimilarityMetric> {
    match config.metric {
        MetricArg::PathFingerprint => Box::new(PathFingerprintTanimoto::default()),
        MetricArg::CommonSubstructure => Box::new(SubstructureTanimoto {
            atom_comparison: config.core.matching.atom_comparison,
            bond_comparison: config.core.matching.bond_comparison,
        }),
    }
}

fn report_failures(what: &str, count: usize, path: Option<&Path>) {
    if count == 0 {
        return;
    }
    match path {
        Some(path) => println!("  {} molecule(s) {}; written to: {}", count, what, path.display()),
        None => println!("  {} molecule(s) {}.", count, what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use anchorconf::core::io::records::RecordFile;
    use clap::Parser;
    use std::fs;

    const PROPANE: &str = r#"
[[molecules]]
name = "propane"

[[molecules.atoms]]
element = "C"
position = [0.0, 0.0, 0.0]

[[molecules.atoms]]
element = "C"
position = [1.54, 0.0, 0.0]

[[molecules.atoms]]
element = "C"
position = [2.05, 1.45, 0.0]

[[molecules.bonds]]
atoms = [0, 1]
order = "single"

[[molecules.bonds]]
atoms = [1, 2]
order = "single"
"#;

    const TARGETS: &str = r#"
[[molecules]]
name = "propane"

[[molecules.atoms]]
element = "C"

[[molecules.atoms]]
element = "C"

[[molecules.atoms]]
element = "C"

[[molecules.bonds]]
atoms = [0, 1]
order = "single"

[[molecules.bonds]]
atoms = [1, 2]
order = "single"

[[molecules]]
name = "hydrazine-chain"

[[molecules.atoms]]
element = "N"

[[molecules.atoms]]
element = "N"

[[molecules.atoms]]
element = "N"

[[molecules.bonds]]
atoms = [0, 1]
order = "single"

[[molecules.bonds]]
atoms = [1, 2]
order = "single"
"#;

    #[test]
    fn generate_writes_each_outcome_to_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("targets.toml");
        let scaffolds = dir.path().join("scaffolds.toml");
        let output = dir.path().join("out.toml");
        let failures = dir.path().join("failed.toml");
        fs::write(&input, TARGETS).unwrap();
        fs::write(&scaffolds, PROPANE).unwrap();

        let cli = Cli::parse_from([
            "anchorconf",
            "generate",
            "-i",
            input.to_str().unwrap(),
            "-s",
            scaffolds.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--generation-failure-output",
            failures.to_str().unwrap(),
        ]);
        let Commands::Generate(args) = cli.command;
        run(args).unwrap();

        let successes = RecordFile::parse(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(successes.records.len(), 1);
        assert_eq!(successes.records[0].input_index, 0);
        assert_eq!(successes.records[0].structures.len(), 1);

        let failed = RecordFile::parse(&fs::read_to_string(&failures).unwrap()).unwrap();
        assert_eq!(failed.records.len(), 1);
        assert_eq!(failed.records[0].input_index, 1);
        assert_eq!(failed.records[0].reason.as_deref(), Some("no-common-substructure"));
    }

    #[test]
    fn unreadable_input_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolds = dir.path().join("scaffolds.toml");
        fs::write(&scaffolds, PROPANE).unwrap();
        let missing = dir.path().join("missing.toml");

        let cli = Cli::parse_from([
            "anchorconf",
            "generate",
            "-i",
            missing.to_str().unwrap(),
            "-s",
            scaffolds.to_str().unwrap(),
            "-o",
            dir.path().join("out.toml").to_str().unwrap(),
        ]);
        let Commands::Generate(args) = cli.command;
        match run(args) {
            Err(CliError::FileParsing { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected a file parsing error, got {:?}", other),
        }
    }
}
