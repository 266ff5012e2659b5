use super::ids::AtomId;
use std::fmt;

/// Solution semantics of a common-substructure search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// A single maximum-size mapping.
    #[default]
    LargestOnly,
    /// Every mapping that reaches the maximum size.
    AllAtMaxSize,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LargestOnly => write!(f, "largest-only"),
            Self::AllAtMaxSize => write!(f, "all-at-max-size"),
        }
    }
}

/// A partial injective mapping from target atom ids to scaffold atom ids.
///
/// Pairs are kept sorted by target id, so two correspondences covering the same
/// pairs compare equal regardless of the order the search discovered them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Correspondence {
    pairs: Vec<(AtomId, AtomId)>,
}

impl Correspondence {
    /// Builds a correspondence from `(target, scaffold)` pairs.
    ///
    /// Returns `None` if a target or scaffold atom appears more than once.
    pub fn new(mut pairs: Vec<(AtomId, AtomId)>) -> Option<Self> {
        pairs.sort_unstable();
        let mut scaffold_ids: Vec<AtomId> = pairs.iter().map(|&(_, s)| s).collect();
        scaffold_ids.sort_unstable();
        let injective = pairs.windows(2).all(|w| w[0].0 != w[1].0)
            && scaffold_ids.windows(2).all(|w| w[0] != w[1]);
        injective.then_some(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The `(target, scaffold)` pairs, sorted by target id.
    pub fn pairs(&self) -> &[(AtomId, AtomId)] {
        &self.pairs
    }

    /// The scaffold atom that `target` is pinned to, if it is mapped.
    pub fn scaffold_atom_for(&self, target: AtomId) -> Option<AtomId> {
        self.pairs
            .binary_search_by_key(&target, |&(t, _)| t)
            .ok()
            .map(|index| self.pairs[index].1)
    }

    pub fn contains_target(&self, target: AtomId) -> bool {
        self.scaffold_atom_for(target).is_some()
    }

    pub fn target_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.pairs.iter().map(|&(t, _)| t)
    }
}

/// The outcome of one common-substructure search between a target and a scaffold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub mode: SearchMode,
    /// Mappings in discovery order. Empty when nothing reached the minimum size.
    pub correspondences: Vec<Correspondence>,
}

impl MatchResult {
    pub fn empty(mode: SearchMode) -> Self {
        Self {
            mode,
            correspondences: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.correspondences.is_empty()
    }

    /// Size of the mappings found (all share it), or zero when empty.
    pub fn size(&self) -> usize {
        self.correspondences.first().map_or(0, Correspondence::len)
    }

    pub fn first(&self) -> Option<&Correspondence> {
        self.correspondences.first()
    }
}
