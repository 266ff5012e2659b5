use super::SimilarityMetric;
use super::comparison::{AtomComparison, BondComparison};
use crate::core::models::correspondence::SearchMode;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use crate::engine::tasks::substructure_match;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// A fixed-size bit vector fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    bits: Vec<u64>,
    nbits: usize,
}

impl Fingerprint {
    pub fn new(nbits: usize) -> Self {
        let nbits = nbits.max(1);
        Self {
            bits: vec![0u64; nbits.div_ceil(64)],
            nbits,
        }
    }

    pub fn set_bit(&mut self, pos: usize) {
        let pos = pos % self.nbits;
        self.bits[pos / 64] |= 1u64 << (pos % 64);
    }

    pub fn get_bit(&self, pos: usize) -> bool {
        let pos = pos % self.nbits;
        (self.bits[pos / 64] >> (pos % 64)) & 1 == 1
    }

    pub fn count_ones(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Tanimoto coefficient. Two empty fingerprints are identical.
    pub fn tanimoto(&self, other: &Fingerprint) -> f64 {
        let mut and_count = 0u32;
        let mut or_count = 0u32;
        for (w1, w2) in self.bits.iter().zip(other.bits.iter()) {
            and_count += (w1 & w2).count_ones();
            or_count += (w1 | w2).count_ones();
        }
        if or_count == 0 {
            return 1.0;
        }
        and_count as f64 / or_count as f64
    }
}

fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Tanimoto similarity of hashed linear-path fingerprints.
///
/// Every simple path of up to `max_path_bonds` bonds is hashed from its element symbols
/// and bond orders, in whichever direction gives the smaller hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFingerprintTanimoto {
    pub max_path_bonds: usize,
    pub nbits: usize,
}

impl Default for PathFingerprintTanimoto {
    fn default() -> Self {
        Self {
            max_path_bonds: 5,
            nbits: 1024,
        }
    }
}

impl PathFingerprintTanimoto {
    pub fn fingerprint(&self, molecule: &MoleculeGraph) -> Fingerprint {
        let mut fp = Fingerprint::new(self.nbits);
        let mut path = Vec::with_capacity(self.max_path_bonds + 1);
        for start in 0..molecule.atom_count() {
            path.push(start);
            self.extend_path(molecule, &mut path, &mut fp);
            path.pop();
        }
        fp
    }

    fn extend_path(&self, molecule: &MoleculeGraph, path: &mut Vec<AtomId>, fp: &mut Fingerprint) {
        fp.set_bit(path_hash(molecule, path) as usize);
        if path.len() > self.max_path_bonds {
            return;
        }
        let Some(&last) = path.last() else {
            return;
        };
        let next: Vec<AtomId> = molecule
            .neighbors(last)
            .filter(|n| !path.contains(n))
            .collect();
        for neighbor in next {
            path.push(neighbor);
            self.extend_path(molecule, path, fp);
            path.pop();
        }
    }
}

fn path_hash(molecule: &MoleculeGraph, path: &[AtomId]) -> u64 {
    let walk = |ids: &mut dyn Iterator<Item = AtomId>| {
        let mut hash = FNV_OFFSET;
        let mut previous: Option<AtomId> = None;
        for id in ids {
            if let Some(prev) = previous {
                let order = molecule
                    .bond_between(prev, id)
                    .map(|b| b.order as u8)
                    .unwrap_or(u8::MAX);
                hash = fnv1a_bytes(hash, &[order]);
            }
            let element = molecule.atom(id).map_or("", |a| a.element.as_str());
            hash = fnv1a_bytes(hash, element.as_bytes());
            hash = fnv1a_bytes(hash, &[0xff]);
            previous = Some(id);
        }
        hash
    };
    let forward = walk(&mut path.iter().copied());
    let backward = walk(&mut path.iter().rev().copied());
    forward.min(backward)
}

impl SimilarityMetric for PathFingerprintTanimoto {
    fn similarity(&self, target: &MoleculeGraph, candidate: &MoleculeGraph) -> f64 {
        self.fingerprint(target).tanimoto(&self.fingerprint(candidate))
    }
}

/// Tanimoto coefficient over atoms, using the largest common substructure as the
/// intersection: `k / (n_target + n_candidate - k)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubstructureTanimoto {
    pub atom_comparison: AtomComparison,
    pub bond_comparison: BondComparison,
}

impl SimilarityMetric for SubstructureTanimoto {
    fn similarity(&self, target: &MoleculeGraph, candidate: &MoleculeGraph) -> f64 {
        let common = substructure_match::run(
            target,
            candidate,
            &self.atom_comparison,
            &self.bond_comparison,
            1,
            SearchMode::LargestOnly,
        )
        .size();
        let union = target.atom_count() + candidate.atom_count() - common;
        if union == 0 {
            return 1.0;
        }
        common as f64 / union as f64
    }
}
