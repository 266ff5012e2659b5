use crate::core::models::correspondence::{Correspondence, MatchResult, SearchMode};
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use crate::engine::metrics::{BondContext, EdgeCompare, VertexCompare};
use tracing::{debug, instrument};

/// Fixed-capacity bit set over compatibility-graph nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeSet {
    words: Vec<u64>,
}

impl NodeSet {
    fn empty(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
        }
    }

    fn full(capacity: usize) -> Self {
        let mut set = Self::empty(capacity);
        for i in 0..capacity {
            set.insert(i);
        }
        set
    }

    #[inline]
    fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    #[inline]
    fn remove(&mut self, i: usize) {
        self.words[i / 64] &= !(1u64 << (i % 64));
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn intersection(&self, other: &NodeSet) -> NodeSet {
        NodeSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        }
    }

    fn union(&self, other: &NodeSet) -> NodeSet {
        NodeSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a | b)
                .collect(),
        }
    }

    /// Members in ascending order.
    fn members(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for (w, &word) in self.words.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                out.push(w * 64 + bit);
                bits &= bits - 1;
            }
        }
        out
    }
}

/// The modular product of two molecule graphs.
///
/// Nodes are `(target atom, scaffold atom)` pairs accepted by the vertex policy, in
/// lexicographic order. Two nodes are adjacent when they use distinct atoms on both sides
/// and the two atom pairs are either both bonded through policy-compatible bonds
/// (a c-edge) or both unbonded (a d-edge).
struct CompatibilityGraph {
    nodes: Vec<(AtomId, AtomId)>,
    adjacency: Vec<NodeSet>,
    c_adjacency: Vec<NodeSet>,
}

impl CompatibilityGraph {
    fn build<V, E>(target: &MoleculeGraph, scaffold: &MoleculeGraph, vertex: &V, edge: &E) -> Self
    where
        V: VertexCompare + ?Sized,
        E: EdgeCompare + ?Sized,
    {
        let mut nodes = Vec::new();
        for (t, t_atom) in target.atoms().iter().enumerate() {
            for (s, s_atom) in scaffold.atoms().iter().enumerate() {
                if vertex.compatible(t_atom, s_atom) {
                    nodes.push((t, s));
                }
            }
        }

        let n = nodes.len();
        let mut adjacency = vec![NodeSet::empty(n); n];
        let mut c_adjacency = vec![NodeSet::empty(n); n];

        for i in 0..n {
            let (t1, s1) = nodes[i];
            for j in (i + 1)..n {
                let (t2, s2) = nodes[j];
                if t1 == t2 || s1 == s2 {
                    continue;
                }
                let t_bond = target.bond_index_between(t1, t2);
                let s_bond = scaffold.bond_index_between(s1, s2);
                let (adjacent, connected) = match (t_bond, s_bond) {
                    (Some(tb), Some(sb)) => {
                        let t_ctx = BondContext {
                            bond: &target.bonds()[tb],
                            in_ring: target.is_ring_bond(tb),
                        };
                        let s_ctx = BondContext {
                            bond: &scaffold.bonds()[sb],
                            in_ring: scaffold.is_ring_bond(sb),
                        };
                        let ok = edge.compatible(t_ctx, s_ctx);
                        (ok, ok)
                    }
                    (None, None) => (true, false),
                    _ => (false, false),
                };
                if adjacent {
                    adjacency[i].insert(j);
                    adjacency[j].insert(i);
                }
                if connected {
                    c_adjacency[i].insert(j);
                    c_adjacency[j].insert(i);
                }
            }
        }

        Self {
            nodes,
            adjacency,
            c_adjacency,
        }
    }
}

/// Depth-first enumeration of connected cliques with Bron-Kerbosch style exclusion.
///
/// A clique only grows through candidates joined to it by a c-edge, so every recorded
/// clique maps a connected substructure. A candidate is dropped from the sibling
/// candidate sets once its branch is finished, so no clique is visited twice.
struct CliqueSearch<'a> {
    graph: &'a CompatibilityGraph,
    min_size: usize,
    mode: SearchMode,
    clique: Vec<usize>,
    best_size: usize,
    solutions: Vec<Vec<usize>>,
}

impl<'a> CliqueSearch<'a> {
    fn new(graph: &'a CompatibilityGraph, min_size: usize, mode: SearchMode) -> Self {
        Self {
            graph,
            min_size,
            mode,
            clique: Vec::new(),
            best_size: 0,
            solutions: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Vec<usize>> {
        let n = self.graph.nodes.len();
        let mut remaining = NodeSet::full(n);
        for v in 0..n {
            if !self.can_reach(1 + remaining.intersection(&self.graph.adjacency[v]).count()) {
                remaining.remove(v);
                continue;
            }
            self.clique.push(v);
            let candidates = remaining.intersection(&self.graph.adjacency[v]);
            let frontier = self.graph.c_adjacency[v].clone();
            self.expand(candidates, &frontier);
            self.clique.pop();
            remaining.remove(v);
        }
        self.solutions
    }

    /// Whether a clique that could grow to `bound` nodes is still worth exploring.
    fn can_reach(&self, bound: usize) -> bool {
        if bound < self.min_size {
            return false;
        }
        match self.mode {
            SearchMode::LargestOnly => bound > self.best_size,
            SearchMode::AllAtMaxSize => bound >= self.best_size,
        }
    }

    fn record(&mut self) {
        let size = self.clique.len();
        if size < self.min_size {
            return;
        }
        if size > self.best_size {
            self.best_size = size;
            self.solutions.clear();
            self.solutions.push(self.clique.clone());
        } else if size == self.best_size && self.mode == SearchMode::AllAtMaxSize {
            self.solutions.push(self.clique.clone());
        }
    }

    fn expand(&mut self, mut candidates: NodeSet, frontier: &NodeSet) {
        self.record();
        let extendable = candidates.intersection(frontier).members();
        for v in extendable {
            if !self.can_reach(self.clique.len() + candidates.count()) {
                break;
            }
            self.clique.push(v);
            let next_candidates = candidates.intersection(&self.graph.adjacency[v]);
            let next_frontier = frontier.union(&self.graph.c_adjacency[v]);
            self.expand(next_candidates, &next_frontier);
            self.clique.pop();
            candidates.remove(v);
        }
    }
}

/// Finds the largest connected common substructures of `target` and `scaffold`.
///
/// The search runs over the modular product graph and is exponential in the worst case.
/// `min_size` and the coarseness of the comparison policies are the only levers on its
/// runtime; no timeout is applied. A `min_size` of zero is treated as one.
///
/// # Return
///
/// In [`SearchMode::LargestOnly`] mode, at most one correspondence: the first
/// maximum-size mapping in search order. In [`SearchMode::AllAtMaxSize`] mode, every
/// maximum-size mapping in search order, starting with the same one. The result is
/// empty when no common substructure reaches `min_size`.
#[instrument(skip_all, name = "substructure_match_task")]
pub fn run<V, E>(
    target: &MoleculeGraph,
    scaffold: &MoleculeGraph,
    vertex: &V,
    edge: &E,
    min_size: usize,
    mode: SearchMode,
) -> MatchResult
where
    V: VertexCompare + ?Sized,
    E: EdgeCompare + ?Sized,
{
    let min_size = min_size.max(1);
    if min_size > target.atom_count().min(scaffold.atom_count()) {
        debug!(
            min_size,
            target_atoms = target.atom_count(),
            scaffold_atoms = scaffold.atom_count(),
            "Minimum size exceeds the smaller molecule; skipping search."
        );
        return MatchResult::empty(mode);
    }

    let graph = CompatibilityGraph::build(target, scaffold, vertex, edge);
    debug!(
        nodes = graph.nodes.len(),
        "Built compatibility graph for '{}' against '{}'.",
        target.name(),
        scaffold.name()
    );

    let correspondences: Vec<Correspondence> = CliqueSearch::new(&graph, min_size, mode)
        .run()
        .into_iter()
        .filter_map(|clique| {
            Correspondence::new(clique.into_iter().map(|i| graph.nodes[i]).collect())
        })
        .collect();

    debug!(
        solutions = correspondences.len(),
        size = correspondences.first().map_or(0, Correspondence::len),
        %mode,
        "Common substructure search finished."
    );
    MatchResult {
        mode,
        correspondences,
    }
}
