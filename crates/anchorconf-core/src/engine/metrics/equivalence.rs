use super::EquivalenceComparator;
use crate::core::models::conformer::ConformerCandidate;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::utils::geometry::calculate_rmsd;

pub const DEFAULT_RMSD_TOLERANCE: f64 = 0.1;

/// Treats two conformers as equivalent when some bond-preserving relabeling of
/// same-element atoms superimposes them within `tolerance` RMSD, without any alignment.
///
/// The relabeling is found greedily: each atom of `a` takes the nearest unused atom of `b`
/// with the same element. This recognizes conformers that differ only by how a symmetric
/// molecule was mapped onto the scaffold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricRmsd {
    pub tolerance: f64,
}

impl Default for SymmetricRmsd {
    fn default() -> Self {
        Self::new(DEFAULT_RMSD_TOLERANCE)
    }
}

impl SymmetricRmsd {
    pub const fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn relabeling(
        &self,
        molecule: &MoleculeGraph,
        a: &ConformerCandidate,
        b: &ConformerCandidate,
    ) -> Option<Vec<AtomId>> {
        let atoms = molecule.atoms();
        let mut used = vec![false; atoms.len()];
        let mut permutation = Vec::with_capacity(atoms.len());

        for (i, atom) in atoms.iter().enumerate() {
            let pa = a.position(i)?;
            let (j, dist) = atoms
                .iter()
                .enumerate()
                .filter(|&(j, other)| !used[j] && other.element == atom.element)
                .filter_map(|(j, _)| b.position(j).map(|pb| (j, (pa - pb).norm())))
                .min_by(|x, y| x.1.total_cmp(&y.1))?;
            if dist > self.tolerance {
                return None;
            }
            used[j] = true;
            permutation.push(j);
        }

        let preserves_bonds = molecule.bonds().iter().all(|bond| {
            molecule
                .bond_between(permutation[bond.atom1_id], permutation[bond.atom2_id])
                .is_some()
        });
        preserves_bonds.then_some(permutation)
    }
}

impl EquivalenceComparator for SymmetricRmsd {
    fn are_equivalent(
        &self,
        molecule: &MoleculeGraph,
        a: &ConformerCandidate,
        b: &ConformerCandidate,
    ) -> bool {
        let n = molecule.atom_count();
        if a.positions.len() != n || b.positions.len() != n {
            return false;
        }
        if n == 0 {
            return true;
        }
        let Some(permutation) = self.relabeling(molecule, a, b) else {
            return false;
        };
        let permuted: Vec<_> = permutation.iter().map(|&j| b.positions[j]).collect();
        calculate_rmsd(&a.positions, &permuted).is_some_and(|rmsd| rmsd <= self.tolerance)
    }
}
