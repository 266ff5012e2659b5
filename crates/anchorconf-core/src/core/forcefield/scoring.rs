use super::parameterization::Parameterizer;
use super::potentials;
use super::term::StrainTerm;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use itertools::Itertools;
use nalgebra::{Point3, Vector3};

/// Pairs closer than this are treated as coincident and contribute no force.
const MIN_PAIR_DISTANCE: f64 = 1e-8;

/// A distance relation between two atoms and the distance it prefers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRestraint {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub ideal: f64,
}

impl PairRestraint {
    pub fn involves(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    pub fn distance(&self, positions: &[Point3<f64>]) -> f64 {
        (positions[self.atom1_id] - positions[self.atom2_id]).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainWeights {
    pub stretch: f64,
    pub bend: f64,
    pub repulsion: f64,
}

impl Default for StrainWeights {
    fn default() -> Self {
        Self {
            stretch: 100.0,
            bend: 20.0,
            repulsion: 2.0,
        }
    }
}

/// Distance-geometry strain model of one molecule.
///
/// Bonds are springs at their ideal length, angles are springs on the 1-3 distance, and
/// atoms three or more bonds apart (or in different components) repel each other inside
/// their van der Waals contact distance.
#[derive(Debug, Clone)]
pub struct StrainModel {
    bonds: Vec<PairRestraint>,
    bends: Vec<PairRestraint>,
    contacts: Vec<PairRestraint>,
    weights: StrainWeights,
}

impl StrainModel {
    pub fn new(molecule: &MoleculeGraph) -> Self {
        let params = Parameterizer::new(molecule);

        let bonds = molecule
            .bonds()
            .iter()
            .map(|bond| PairRestraint {
                atom1_id: bond.atom1_id,
                atom2_id: bond.atom2_id,
                ideal: params.ideal_bond_length(bond.atom1_id, bond.atom2_id),
            })
            .collect();

        let mut bends = Vec::new();
        for center in 0..molecule.atom_count() {
            let neighbors: Vec<AtomId> = molecule.neighbors(center).collect();
            for (a, c) in neighbors.into_iter().tuple_combinations() {
                if let Some(ideal) = params.ideal_one_three_distance(a, center, c) {
                    bends.push(PairRestraint {
                        atom1_id: a,
                        atom2_id: c,
                        ideal,
                    });
                }
            }
        }

        // Pairs three or more bonds apart only interact through the contact wall.
        let distances = molecule.topological_distances();
        let contacts = (0..molecule.atom_count())
            .tuple_combinations()
            .filter(|&(i, j): &(AtomId, AtomId)| distances[i][j] >= 3)
            .map(|(i, j)| PairRestraint {
                atom1_id: i,
                atom2_id: j,
                ideal: params.contact_distance(i, j),
            })
            .collect();

        Self {
            bonds,
            bends,
            contacts,
            weights: StrainWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: StrainWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn bonds(&self) -> &[PairRestraint] {
        &self.bonds
    }

    pub fn bends(&self) -> &[PairRestraint] {
        &self.bends
    }

    pub fn contacts(&self) -> &[PairRestraint] {
        &self.contacts
    }

    pub fn evaluate(&self, positions: &[Point3<f64>]) -> StrainTerm {
        let w = self.weights;
        let stretch = self
            .bonds
            .iter()
            .map(|r| potentials::harmonic(r.distance(positions), r.ideal, w.stretch))
            .sum();
        let bend = self
            .bends
            .iter()
            .map(|r| potentials::harmonic(r.distance(positions), r.ideal, w.bend))
            .sum();
        let repulsion = self
            .contacts
            .iter()
            .map(|r| potentials::soft_repulsion(r.distance(positions), r.ideal, w.repulsion))
            .sum();
        StrainTerm::new(stretch, bend, repulsion)
    }

    /// Gradient of the total strain with respect to every atom position.
    pub fn gradient(&self, positions: &[Point3<f64>]) -> Vec<Vector3<f64>> {
        let w = self.weights;
        let mut gradient = vec![Vector3::zeros(); positions.len()];
        let mut accumulate = |r: &PairRestraint, derivative: &dyn Fn(f64) -> f64| {
            let delta = positions[r.atom1_id] - positions[r.atom2_id];
            let dist = delta.norm();
            if dist < MIN_PAIR_DISTANCE {
                return;
            }
            let g = delta * (derivative(dist) / dist);
            gradient[r.atom1_id] += g;
            gradient[r.atom2_id] -= g;
        };

        for r in &self.bonds {
            accumulate(r, &|d| potentials::harmonic_derivative(d, r.ideal, w.stretch));
        }
        for r in &self.bends {
            accumulate(r, &|d| potentials::harmonic_derivative(d, r.ideal, w.bend));
        }
        for r in &self.contacts {
            accumulate(r, &|d| {
                potentials::soft_repulsion_derivative(d, r.ideal, w.repulsion)
            });
        }
        gradient
    }
}
