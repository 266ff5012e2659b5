use super::traits::{MoleculeSource, RecordError, RecordSink};
use crate::core::models::atom::Atom;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::outcome::{JobOutcome, OutcomeKind};
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AtomRecord {
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub formal_charge: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
}

fn is_zero(charge: &i8) -> bool {
    *charge == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BondRecord {
    /// Zero-based indices into the molecule's atom list.
    pub atoms: [usize; 2],
    #[serde(default = "default_bond_order")]
    pub order: String,
}

fn default_bond_order() -> String {
    BondOrder::Single.to_string()
}

/// Serialized form of a [`MoleculeGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MoleculeRecord {
    pub name: String,
    #[serde(default)]
    pub atoms: Vec<AtomRecord>,
    #[serde(default)]
    pub bonds: Vec<BondRecord>,
}

impl MoleculeRecord {
    pub fn from_graph(molecule: &MoleculeGraph) -> Self {
        let atoms = molecule
            .atoms()
            .iter()
            .map(|atom| AtomRecord {
                element: atom.element.clone(),
                atom_type: (atom.atom_type != atom.element).then(|| atom.atom_type.clone()),
                formal_charge: atom.formal_charge,
                position: atom.position.map(|p| [p.x, p.y, p.z]),
            })
            .collect();
        let bonds = molecule
            .bonds()
            .iter()
            .map(|bond| BondRecord {
                atoms: [bond.atom1_id, bond.atom2_id],
                order: bond.order.to_string(),
            })
            .collect();
        Self {
            name: molecule.name().to_string(),
            atoms,
            bonds,
        }
    }

    /// Builds the molecule graph described by this record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Invalid`] for empty element symbols, unknown bond orders, and
    /// bonds that reference missing atoms or connect an atom to itself.
    pub fn to_graph(&self) -> Result<MoleculeGraph, RecordError> {
        let invalid = |reason: String| RecordError::Invalid {
            molecule: self.name.clone(),
            reason,
        };

        let mut molecule = MoleculeGraph::new(&self.name);
        for (index, record) in self.atoms.iter().enumerate() {
            if record.element.trim().is_empty() {
                return Err(invalid(format!("atom {} has no element", index)));
            }
            let mut atom = Atom::new(&record.element).with_charge(record.formal_charge);
            if let Some(atom_type) = &record.atom_type {
                atom = atom.with_type(atom_type);
            }
            if let Some([x, y, z]) = record.position {
                atom = atom.at(Point3::new(x, y, z));
            }
            molecule.add_atom(atom);
        }

        for record in &self.bonds {
            let [a, b] = record.atoms;
            let order: BondOrder = record
                .order
                .parse()
                .map_err(|_| invalid(format!("unknown bond order '{}'", record.order)))?;
            molecule
                .add_bond(a, b, order)
                .ok_or_else(|| invalid(format!("bond {}-{} is not valid", a, b)))?;
        }
        Ok(molecule)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoleculeFile {
    #[serde(default)]
    pub molecules: Vec<MoleculeRecord>,
}

/// One entry of an output channel.
///
/// Successful outcomes carry the curated conformers; failures carry the input molecule so
/// the failed records can be resubmitted as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutcomeRecord {
    pub input_index: usize,
    /// Running count of records delivered to this record's channel, this one included.
    pub channel_count: usize,
    pub molecule: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaffold: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structures: Vec<MoleculeRecord>,
}

impl OutcomeRecord {
    pub fn from_outcome(outcome: &JobOutcome, channel_count: usize, target: &MoleculeGraph) -> Self {
        let scaffold = outcome.scaffold();
        let (reason, similarity, structures) = match &outcome.kind {
            OutcomeKind::Success { ensemble, .. } => (
                None,
                scaffold.and_then(|s| s.score),
                ensemble
                    .iter()
                    .filter_map(|candidate| candidate.to_molecule(target))
                    .map(|placed| MoleculeRecord::from_graph(&placed))
                    .collect(),
            ),
            OutcomeKind::SimilarityFailure { best_score } => (
                None,
                *best_score,
                vec![MoleculeRecord::from_graph(target)],
            ),
            OutcomeKind::GenerationFailure { reason, .. } => (
                Some(reason.to_string()),
                scaffold.and_then(|s| s.score),
                vec![MoleculeRecord::from_graph(target)],
            ),
        };

        Self {
            input_index: outcome.input_index,
            channel_count,
            molecule: target.name().to_string(),
            status: outcome.channel().to_string(),
            reason,
            scaffold: scaffold.map(|s| s.index),
            similarity,
            structures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordFile {
    #[serde(default)]
    pub records: Vec<OutcomeRecord>,
}

impl RecordFile {
    pub fn parse(content: &str) -> Result<Self, RecordError> {
        Ok(toml::from_str(content)?)
    }
}

/// A TOML file holding a `[[molecules]]` array.
#[derive(Debug, Clone)]
pub struct TomlMoleculeFile {
    path: PathBuf,
}

impl TomlMoleculeFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse(content: &str) -> Result<Vec<MoleculeGraph>, RecordError> {
        let file: MoleculeFile = toml::from_str(content)?;
        file.molecules.iter().map(MoleculeRecord::to_graph).collect()
    }
}

impl MoleculeSource for TomlMoleculeFile {
    fn molecules(&self) -> Result<Vec<MoleculeGraph>, RecordError> {
        let content = fs::read_to_string(&self.path)?;
        Self::parse(&content)
    }
}

/// Appends each record to `writer` as its own `[[records]]` table.
pub struct TomlRecordWriter<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> TomlRecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RecordSink for TomlRecordWriter<W> {
    fn write(&mut self, record: &OutcomeRecord) -> Result<(), RecordError> {
        let document = RecordFile {
            records: vec![record.clone()],
        };
        let text = toml::to_string(&document)?;
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush()?;
        Ok(())
    }
}
