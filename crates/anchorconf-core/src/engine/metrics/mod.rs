//! Injected capabilities of the pipeline.
//!
//! Every policy the pipeline consults (atom and bond comparison, scaffold similarity,
//! conformer equivalence and conformer ranking) is a narrow trait. Each trait is
//! implemented by the built-in types of this module and by any matching closure, so
//! callers can substitute their own logic without touching the pipeline.

pub mod comparison;
pub mod equivalence;
pub mod ranking;
pub mod similarity;

use crate::core::models::atom::Atom;
use crate::core::models::conformer::ConformerCandidate;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::topology::Bond;
use crate::engine::config::ScaffoldConfig;
use equivalence::SymmetricRmsd;
use ranking::StericStrain;

/// A bond together with the topological facts edge comparison may look at.
#[derive(Debug, Clone, Copy)]
pub struct BondContext<'a> {
    pub bond: &'a Bond,
    pub in_ring: bool,
}

/// Decides whether a target atom may be mapped onto a scaffold atom.
pub trait VertexCompare: Sync {
    fn compatible(&self, target: &Atom, scaffold: &Atom) -> bool;
}

impl<F> VertexCompare for F
where
    F: Fn(&Atom, &Atom) -> bool + Sync,
{
    fn compatible(&self, target: &Atom, scaffold: &Atom) -> bool {
        self(target, scaffold)
    }
}

/// Decides whether a target bond may be mapped onto a scaffold bond.
pub trait EdgeCompare: Sync {
    fn compatible(&self, target: BondContext<'_>, scaffold: BondContext<'_>) -> bool;
}

impl<F> EdgeCompare for F
where
    F: Fn(BondContext<'_>, BondContext<'_>) -> bool + Sync,
{
    fn compatible(&self, target: BondContext<'_>, scaffold: BondContext<'_>) -> bool {
        self(target, scaffold)
    }
}

/// Scores how similar a scaffold candidate is to a target molecule.
///
/// Whether higher or lower values are better is fixed by
/// [`ScoreDirection`](crate::engine::config::ScoreDirection) in the configuration.
pub trait SimilarityMetric: Sync {
    fn similarity(&self, target: &MoleculeGraph, candidate: &MoleculeGraph) -> f64;
}

impl<F> SimilarityMetric for F
where
    F: Fn(&MoleculeGraph, &MoleculeGraph) -> f64 + Sync,
{
    fn similarity(&self, target: &MoleculeGraph, candidate: &MoleculeGraph) -> f64 {
        self(target, candidate)
    }
}

/// Decides whether two conformers of the same molecule are structurally the same.
pub trait EquivalenceComparator: Sync {
    fn are_equivalent(
        &self,
        molecule: &MoleculeGraph,
        a: &ConformerCandidate,
        b: &ConformerCandidate,
    ) -> bool;
}

impl<F> EquivalenceComparator for F
where
    F: Fn(&MoleculeGraph, &ConformerCandidate, &ConformerCandidate) -> bool + Sync,
{
    fn are_equivalent(
        &self,
        molecule: &MoleculeGraph,
        a: &ConformerCandidate,
        b: &ConformerCandidate,
    ) -> bool {
        self(molecule, a, b)
    }
}

/// Ranks conformers; lower scores are better.
pub trait RankingScorer: Sync {
    fn score(&self, molecule: &MoleculeGraph, candidate: &ConformerCandidate) -> f64;
}

impl<F> RankingScorer for F
where
    F: Fn(&MoleculeGraph, &ConformerCandidate) -> f64 + Sync,
{
    fn score(&self, molecule: &MoleculeGraph, candidate: &ConformerCandidate) -> f64 {
        self(molecule, candidate)
    }
}

static STANDARD_EQUIVALENCE: SymmetricRmsd = SymmetricRmsd::new(equivalence::DEFAULT_RMSD_TOLERANCE);
static STANDARD_RANKING: StericStrain = StericStrain;

/// The full set of capabilities one pipeline run consults.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub atom_compare: &'a dyn VertexCompare,
    pub bond_compare: &'a dyn EdgeCompare,
    pub similarity: &'a dyn SimilarityMetric,
    pub equivalence: &'a dyn EquivalenceComparator,
    pub ranking: &'a dyn RankingScorer,
}

impl<'a> Capabilities<'a> {
    /// Comparison policies from `config`, the given similarity metric, symmetry-aware RMSD
    /// equivalence and steric-strain ranking.
    pub fn standard(config: &'a ScaffoldConfig, similarity: &'a dyn SimilarityMetric) -> Self {
        Self {
            atom_compare: &config.matching.atom_comparison,
            bond_compare: &config.matching.bond_comparison,
            similarity,
            equivalence: &STANDARD_EQUIVALENCE,
            ranking: &STANDARD_RANKING,
        }
    }

    pub fn with_equivalence(mut self, equivalence: &'a dyn EquivalenceComparator) -> Self {
        self.equivalence = equivalence;
        self
    }

    pub fn with_ranking(mut self, ranking: &'a dyn RankingScorer) -> Self {
        self.ranking = ranking;
        self
    }
}
