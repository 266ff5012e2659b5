use super::RankingScorer;
use crate::core::forcefield::scoring::StrainModel;
use crate::core::models::conformer::ConformerCandidate;
use crate::core::models::molecule::MoleculeGraph;

/// Ranks conformers by their total strain (bond stretch, angle bend and steric
/// repulsion). Conformers that do not cover every atom rank last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StericStrain;

impl RankingScorer for StericStrain {
    fn score(&self, molecule: &MoleculeGraph, candidate: &ConformerCandidate) -> f64 {
        if candidate.positions.len() != molecule.atom_count() {
            return f64::INFINITY;
        }
        StrainModel::new(molecule)
            .evaluate(&candidate.positions)
            .total()
    }
}
