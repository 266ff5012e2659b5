/// Position of an atom inside its [`MoleculeGraph`](super::molecule::MoleculeGraph).
///
/// Ids are assigned in insertion order and never reused, so they stay stable for the
/// whole pipeline run of a molecule.
pub type AtomId = usize;

/// Position of a bond inside its molecule's bond list.
pub type BondIndex = usize;
