use super::correspondence::Correspondence;
use super::ids::AtomId;
use super::molecule::MoleculeGraph;
use nalgebra::Point3;

/// A full 3D coordinate assignment for every atom of a target molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct ConformerCandidate {
    /// One position per target atom, indexed by atom id.
    pub positions: Vec<Point3<f64>>,
    /// The mapping whose scaffold atoms pinned part of this conformer.
    pub correspondence: Correspondence,
}

impl ConformerCandidate {
    pub fn new(positions: Vec<Point3<f64>>, correspondence: Correspondence) -> Self {
        Self {
            positions,
            correspondence,
        }
    }

    pub fn position(&self, atom_id: AtomId) -> Option<&Point3<f64>> {
        self.positions.get(atom_id)
    }

    pub fn is_pinned(&self, atom_id: AtomId) -> bool {
        self.correspondence.contains_target(atom_id)
    }

    /// Copies `molecule` and applies this conformer's coordinates to it.
    pub fn to_molecule(&self, molecule: &MoleculeGraph) -> Option<MoleculeGraph> {
        molecule.with_positions(&self.positions)
    }
}

/// An ordered collection of conformers generated for one target molecule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConformerEnsemble {
    members: Vec<ConformerCandidate>,
}

impl ConformerEnsemble {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: ConformerCandidate) {
        self.members.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[ConformerCandidate] {
        &self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConformerCandidate> {
        self.members.iter()
    }

    pub fn into_members(self) -> Vec<ConformerCandidate> {
        self.members
    }
}

impl From<Vec<ConformerCandidate>> for ConformerEnsemble {
    fn from(members: Vec<ConformerCandidate>) -> Self {
        Self { members }
    }
}

impl FromIterator<ConformerCandidate> for ConformerEnsemble {
    fn from_iter<I: IntoIterator<Item = ConformerCandidate>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ConformerEnsemble {
    type Item = ConformerCandidate;
    type IntoIter = std::vec::IntoIter<ConformerCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConformerEnsemble {
    type Item = &'a ConformerCandidate;
    type IntoIter = std::slice::Iter<'a, ConformerCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::BondOrder;

    fn candidate(x: f64) -> ConformerCandidate {
        ConformerCandidate::new(
            vec![Point3::new(x, 0.0, 0.0), Point3::new(x + 1.5, 0.0, 0.0)],
            Correspondence::new(vec![(0, 0)]).unwrap(),
        )
    }

    #[test]
    fn candidate_reports_pinned_atoms() {
        let c = candidate(0.0);
        assert!(c.is_pinned(0));
        assert!(!c.is_pinned(1));
        assert_eq!(c.position(1), Some(&Point3::new(1.5, 0.0, 0.0)));
        assert_eq!(c.position(2), None);
    }

    #[test]
    fn candidate_applies_coordinates_to_molecule() {
        let mut mol = MoleculeGraph::new("ethane");
        let a = mol.add_atom(Atom::new("C"));
        let b = mol.add_atom(Atom::new("C"));
        mol.add_bond(a, b, BondOrder::Single).unwrap();

        let placed = candidate(2.0).to_molecule(&mol).unwrap();
        assert_eq!(placed.atom(0).unwrap().position, Some(Point3::new(2.0, 0.0, 0.0)));
        assert_eq!(placed.bond_count(), 1);
    }

    #[test]
    fn ensemble_preserves_insertion_order() {
        let ensemble: ConformerEnsemble = (0..3).map(|i| candidate(i as f64)).collect();
        assert_eq!(ensemble.len(), 3);
        let xs: Vec<f64> = ensemble.iter().map(|c| c.positions[0].x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert!(ConformerEnsemble::new().is_empty());
    }
}
