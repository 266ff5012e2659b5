use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::topology::BondOrder;
use crate::core::utils::elements;
use crate::core::utils::geometry::Hybridization;

/// Atoms with more neighbors than this get no angle terms.
pub const MAX_ANGLE_CENTER_DEGREE: usize = 4;

/// Derives ideal internal coordinates (bond lengths, angles, 1-3 distances) from a
/// molecule's elements and bond orders.
pub struct Parameterizer<'a> {
    molecule: &'a MoleculeGraph,
}

impl<'a> Parameterizer<'a> {
    pub fn new(molecule: &'a MoleculeGraph) -> Self {
        Self { molecule }
    }

    /// Triple bonds or two double bonds make an atom linear; any other unsaturation makes
    /// it trigonal.
    pub fn hybridization(&self, atom_id: AtomId) -> Hybridization {
        let mut doubles = 0;
        let mut unsaturated = false;
        for neighbor in self.molecule.neighbors(atom_id) {
            match self.molecule.bond_between(atom_id, neighbor).map(|b| b.order) {
                Some(BondOrder::Triple) => return Hybridization::Sp,
                Some(BondOrder::Double) => doubles += 1,
                Some(BondOrder::Aromatic) => unsaturated = true,
                _ => {}
            }
        }
        if doubles >= 2 {
            Hybridization::Sp
        } else if doubles == 1 || unsaturated {
            Hybridization::Sp2
        } else {
            Hybridization::Sp3
        }
    }

    /// Sum of covalent radii, shortened for multiple bonds.
    pub fn ideal_bond_length(&self, atom1_id: AtomId, atom2_id: AtomId) -> f64 {
        let atoms = self.molecule.atoms();
        let base = elements::ideal_bond_length(&atoms[atom1_id].element, &atoms[atom2_id].element);
        let factor = match self.molecule.bond_between(atom1_id, atom2_id).map(|b| b.order) {
            Some(BondOrder::Aromatic) => 0.915,
            Some(BondOrder::Double) => 0.88,
            Some(BondOrder::Triple) => 0.79,
            _ => 1.0,
        };
        base * factor
    }

    /// Ideal bond angle at `center`, or `None` when the atom is too crowded for angle terms.
    pub fn ideal_angle_degrees(&self, center: AtomId) -> Option<f64> {
        (self.molecule.degree(center) <= MAX_ANGLE_CENTER_DEGREE)
            .then(|| self.hybridization(center).ideal_angle_degrees())
    }

    /// Ideal distance between the two outer atoms of the angle `a`-`center`-`c`.
    pub fn ideal_one_three_distance(&self, a: AtomId, center: AtomId, c: AtomId) -> Option<f64> {
        let angle = self.ideal_angle_degrees(center)?.to_radians();
        let ab = self.ideal_bond_length(a, center);
        let cb = self.ideal_bond_length(c, center);
        Some((ab * ab + cb * cb - 2.0 * ab * cb * angle.cos()).sqrt())
    }

    /// Closest approach tolerated between two atoms that are not bonded to each other.
    pub fn contact_distance(&self, atom1_id: AtomId, atom2_id: AtomId) -> f64 {
        let atoms = self.molecule.atoms();
        elements::contact_distance(&atoms[atom1_id].element, &atoms[atom2_id].element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn molecule_with(orders: &[BondOrder]) -> MoleculeGraph {
        let mut mol = MoleculeGraph::new("m");
        let center = mol.add_atom(Atom::new("C"));
        for &order in orders {
            let other = mol.add_atom(Atom::new("C"));
            mol.add_bond(center, other, order).unwrap();
        }
        mol
    }

    #[test]
    fn saturated_atom_is_sp3() {
        let mol = molecule_with(&[BondOrder::Single, BondOrder::Single]);
        assert_eq!(Parameterizer::new(&mol).hybridization(0), Hybridization::Sp3);
    }

    #[test]
    fn double_or_aromatic_bond_makes_atom_sp2() {
        let mol = molecule_with(&[BondOrder::Double, BondOrder::Single]);
        assert_eq!(Parameterizer::new(&mol).hybridization(0), Hybridization::Sp2);
        let mol = molecule_with(&[BondOrder::Aromatic, BondOrder::Aromatic]);
        assert_eq!(Parameterizer::new(&mol).hybridization(0), Hybridization::Sp2);
    }

    #[test]
    fn triple_or_cumulated_bonds_make_atom_linear() {
        let mol = molecule_with(&[BondOrder::Triple, BondOrder::Single]);
        assert_eq!(Parameterizer::new(&mol).hybridization(0), Hybridization::Sp);
        let mol = molecule_with(&[BondOrder::Double, BondOrder::Double]);
        assert_eq!(Parameterizer::new(&mol).hybridization(0), Hybridization::Sp);
    }

    #[test]
    fn multiple_bonds_are_shorter() {
        let single = molecule_with(&[BondOrder::Single]);
        let double = molecule_with(&[BondOrder::Double]);
        let l1 = Parameterizer::new(&single).ideal_bond_length(0, 1);
        let l2 = Parameterizer::new(&double).ideal_bond_length(0, 1);
        assert!((l1 - 1.52).abs() < 1e-9);
        assert!(l2 < l1);
    }

    #[test]
    fn one_three_distance_follows_law_of_cosines() {
        let mol = molecule_with(&[BondOrder::Single, BondOrder::Single]);
        let d = Parameterizer::new(&mol).ideal_one_three_distance(1, 0, 2).unwrap();
        assert!((d - 2.482).abs() < 1e-3);
    }

    #[test]
    fn crowded_centers_have_no_angle_terms() {
        let mol = molecule_with(&[BondOrder::Single; 5]);
        assert!(Parameterizer::new(&mol).ideal_angle_degrees(0).is_none());
    }
}
