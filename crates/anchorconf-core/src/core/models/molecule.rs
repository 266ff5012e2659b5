use super::atom::Atom;
use super::ids::{AtomId, BondIndex};
use super::topology::{Bond, BondOrder};
use nalgebra::Point3;
use std::collections::VecDeque;
use std::sync::OnceLock;

/// Marker for atom pairs that are not connected through any bond path.
pub const UNREACHABLE: usize = usize::MAX;

/// An undirected attributed graph describing one molecule.
///
/// Vertices are [`Atom`]s addressed by their [`AtomId`] (their insertion index) and
/// edges are [`Bond`]s. The graph is assembled once per input record and treated as
/// read-only afterwards, which is what allows it to be shared between worker threads
/// without copying.
#[derive(Debug, Clone, Default)]
pub struct MoleculeGraph {
    /// Record name, used for reporting only.
    name: String,
    /// Atoms in insertion order; the index is the atom id.
    atoms: Vec<Atom>,
    /// All bonds of the molecule.
    bonds: Vec<Bond>,
    /// Cached adjacency list: `adjacency[a]` holds `(neighbor, bond index)` pairs.
    adjacency: Vec<Vec<(AtomId, BondIndex)>>,
    /// Lazily computed ring membership flag per bond.
    ring_bonds: OnceLock<Vec<bool>>,
}

impl MoleculeGraph {
    /// Creates an empty molecule with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an atom and returns its id.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// Adds a bond between two existing, distinct atoms.
    ///
    /// The operation is idempotent: adding a bond that already exists returns the index
    /// of the existing bond and leaves its order untouched.
    ///
    /// # Return
    ///
    /// Returns `Some(BondIndex)` on success, `None` if an atom id is unknown or both ids
    /// are equal.
    pub fn add_bond(
        &mut self,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
    ) -> Option<BondIndex> {
        if atom1_id == atom2_id || atom1_id >= self.atoms.len() || atom2_id >= self.atoms.len() {
            return None;
        }
        if let Some(existing) = self.bond_index_between(atom1_id, atom2_id) {
            return Some(existing);
        }

        let index = self.bonds.len();
        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.adjacency[atom1_id].push((atom2_id, index));
        self.adjacency[atom2_id].push((atom1_id, index));
        self.ring_bonds = OnceLock::new();
        Some(index)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Ids of the atoms bonded to `id`, in bond insertion order.
    pub fn neighbors(&self, id: AtomId) -> impl Iterator<Item = AtomId> + '_ {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(|&(neighbor, _)| neighbor)
    }

    pub fn degree(&self, id: AtomId) -> usize {
        self.adjacency.get(id).map_or(0, Vec::len)
    }

    pub fn bond_index_between(&self, a: AtomId, b: AtomId) -> Option<BondIndex> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|&&(neighbor, _)| neighbor == b)
            .map(|&(_, index)| index)
    }

    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<&Bond> {
        self.bond_index_between(a, b).map(|index| &self.bonds[index])
    }

    /// Whether the bond lies on at least one ring (i.e. it is not a bridge of the graph).
    pub fn is_ring_bond(&self, index: BondIndex) -> bool {
        self.ring_bonds
            .get_or_init(|| self.compute_ring_bonds())
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    /// Whether every atom carries a 3D position.
    pub fn has_complete_geometry(&self) -> bool {
        self.atoms.iter().all(|atom| atom.position.is_some())
    }

    /// Collects all positions, or `None` if any atom lacks one.
    pub fn positions(&self) -> Option<Vec<Point3<f64>>> {
        self.atoms.iter().map(|atom| atom.position).collect()
    }

    /// Returns a copy of the molecule with every atom moved to `positions`.
    ///
    /// `positions` must hold exactly one entry per atom.
    pub fn with_positions(&self, positions: &[Point3<f64>]) -> Option<Self> {
        if positions.len() != self.atoms.len() {
            return None;
        }
        let mut placed = self.clone();
        for (atom, position) in placed.atoms.iter_mut().zip(positions) {
            atom.position = Some(*position);
        }
        Some(placed)
    }

    /// Shortest bond-path lengths between every pair of atoms.
    ///
    /// Pairs in different connected components hold [`UNREACHABLE`].
    pub fn topological_distances(&self) -> Vec<Vec<usize>> {
        (0..self.atoms.len())
            .map(|source| self.bfs_distances(source))
            .collect()
    }

    /// Connected components as sorted lists of atom ids, ordered by their smallest id.
    pub fn connected_components(&self) -> Vec<Vec<AtomId>> {
        let mut seen = vec![false; self.atoms.len()];
        let mut components = Vec::new();
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            let distances = self.bfs_distances(start);
            let component: Vec<AtomId> = distances
                .iter()
                .enumerate()
                .filter(|&(_, &d)| d != UNREACHABLE)
                .map(|(id, _)| id)
                .collect();
            for &id in &component {
                seen[id] = true;
            }
            components.push(component);
        }
        components
    }

    fn bfs_distances(&self, source: AtomId) -> Vec<usize> {
        let mut distances = vec![UNREACHABLE; self.atoms.len()];
        let mut queue = VecDeque::new();
        distances[source] = 0;
        queue.push_back(source);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(current) {
                if distances[neighbor] == UNREACHABLE {
                    distances[neighbor] = distances[current] + 1;
                    queue.push_back(neighbor);
                }
            }
        }
        distances
    }

    // A bond is on a ring iff its ends stay connected once the bond itself is ignored.
    fn compute_ring_bonds(&self) -> Vec<bool> {
        self.bonds
            .iter()
            .enumerate()
            .map(|(index, bond)| {
                let mut seen = vec![false; self.atoms.len()];
                let mut stack = vec![bond.atom1_id];
                seen[bond.atom1_id] = true;
                while let Some(current) = stack.pop() {
                    for &(neighbor, via) in &self.adjacency[current] {
                        if via == index || seen[neighbor] {
                            continue;
                        }
                        if neighbor == bond.atom2_id {
                            return true;
                        }
                        seen[neighbor] = true;
                        stack.push(neighbor);
                    }
                }
                false
            })
            .collect()
    }
}
