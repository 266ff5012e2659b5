use crate::core::forcefield::parameterization::Parameterizer;
use crate::core::forcefield::scoring::{PairRestraint, StrainModel};
use crate::core::models::conformer::{ConformerCandidate, ConformerEnsemble};
use crate::core::models::correspondence::{Correspondence, MatchResult};
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::models::outcome::GenerationFailureReason;
use crate::core::utils::geometry::{lexicographic_cmp, open_valence_directions};
use crate::engine::config::GenerationConfig;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::{debug, info, instrument, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const AZIMUTH_SAMPLES: usize = 6;
/// Gap along x between a component without pinned atoms and everything placed before it.
const COMPONENT_OFFSET: f64 = 5.0;
const CLEARANCE_CAP: f64 = 10.0;
const RING_CLOSURE_WEIGHT: f64 = 10.0;
const JITTER_AMPLITUDE: f64 = 0.3;

const INITIAL_STEP: f64 = 5e-4;
const MAX_STEP: f64 = 5e-3;
const MIN_STEP: f64 = 1e-8;
const STEP_GROWTH: f64 = 1.2;
/// Largest distance any atom may move in one relaxation step, in Angstroms.
const MAX_DISPLACEMENT: f64 = 0.1;

const BEND_TOLERANCE_FACTOR: f64 = 2.0;

/// Generates conformers of `target` whose mapped atoms sit exactly on the scaffold's
/// coordinates.
///
/// One conformer is attempted per correspondence (only the first one unless
/// `find_all` is set). Each correspondence gets up to `max_attempts` seeded attempts and
/// keeps the first geometrically valid one. The ensemble lists conformers in
/// correspondence order.
#[instrument(skip_all, name = "conformer_generation_task", fields(target = target.name()))]
pub fn run(
    target: &MoleculeGraph,
    scaffold: &MoleculeGraph,
    matches: &MatchResult,
    config: &GenerationConfig,
) -> Result<ConformerEnsemble, GenerationFailureReason> {
    if matches.is_empty() {
        return Err(GenerationFailureReason::NoCommonSubstructure);
    }

    let scaffold_positions: Vec<Option<Point3<f64>>> =
        scaffold.atoms().iter().map(|atom| atom.position).collect();
    let builder = ConformerBuilder::new(target, config);

    let count = if config.find_all {
        matches.correspondences.len()
    } else {
        1
    };
    let selected = &matches.correspondences[..count];

    let iterator = selected.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = selected.par_iter().enumerate();

    let conformers: Vec<Option<ConformerCandidate>> = iterator
        .map(|(index, correspondence)| builder.build(index, correspondence, &scaffold_positions))
        .collect();

    let ensemble: ConformerEnsemble = conformers.into_iter().flatten().collect();
    info!(
        requested = count,
        generated = ensemble.len(),
        "Conformer generation finished."
    );

    if ensemble.is_empty() {
        Err(GenerationFailureReason::NoValidGeometry)
    } else {
        Ok(ensemble)
    }
}

struct ConformerBuilder<'a> {
    config: &'a GenerationConfig,
    params: Parameterizer<'a>,
    model: StrainModel,
    neighbors: Vec<Vec<AtomId>>,
    components: Vec<Vec<AtomId>>,
}

impl<'a> ConformerBuilder<'a> {
    fn new(target: &'a MoleculeGraph, config: &'a GenerationConfig) -> Self {
        let neighbors = (0..target.atom_count())
            .map(|id| {
                let mut list: Vec<AtomId> = target.neighbors(id).collect();
                list.sort_unstable();
                list
            })
            .collect();
        Self {
            config,
            params: Parameterizer::new(target),
            model: StrainModel::new(target),
            neighbors,
            components: target.connected_components(),
        }
    }

    fn atom_count(&self) -> usize {
        self.neighbors.len()
    }

    fn build(
        &self,
        index: usize,
        correspondence: &Correspondence,
        scaffold_positions: &[Option<Point3<f64>>],
    ) -> Option<ConformerCandidate> {
        let mut pinned = vec![None; self.atom_count()];
        for &(target_id, scaffold_id) in correspondence.pairs() {
            let Some(position) = scaffold_positions.get(scaffold_id).copied().flatten() else {
                warn!(scaffold_id, "Scaffold atom has no coordinates; skipping correspondence.");
                return None;
            };
            *pinned.get_mut(target_id)? = Some(position);
        }
        let free: Vec<bool> = pinned.iter().map(Option::is_none).collect();

        let attempts = self.config.max_attempts;
        for attempt in 0..attempts {
            let seed = self
                .config
                .seed
                .wrapping_add((index * attempts + attempt) as u64);
            let mut rng = StdRng::seed_from_u64(seed);
            let jitter = if attempt == 0 { 0.0 } else { JITTER_AMPLITUDE };

            let mut positions = self.initial_positions(&pinned, jitter, &mut rng);
            self.relax(&mut positions, &free);

            if self.is_valid(&positions, &free) {
                debug!(index, attempt, "Accepted conformer.");
                return Some(ConformerCandidate::new(positions, correspondence.clone()));
            }
            trace!(index, attempt, "Rejected conformer attempt.");
        }

        debug!(index, attempts, "No valid geometry for correspondence.");
        None
    }

    /// Grows coordinates outwards from the pinned atoms, one bond at a time.
    fn initial_positions(
        &self,
        pinned: &[Option<Point3<f64>>],
        jitter: f64,
        rng: &mut StdRng,
    ) -> Vec<Point3<f64>> {
        let mut placed = pinned.to_vec();

        for component in &self.components {
            if component.iter().all(|&id| placed[id].is_none()) {
                let max_x = placed
                    .iter()
                    .flatten()
                    .map(|p| p.x)
                    .fold(f64::NEG_INFINITY, f64::max);
                let x = if max_x.is_finite() {
                    max_x + COMPONENT_OFFSET
                } else {
                    0.0
                };
                placed[component[0]] = Some(Point3::new(x, 0.0, 0.0));
            }

            let mut queue: VecDeque<AtomId> = component
                .iter()
                .copied()
                .filter(|&id| placed[id].is_some())
                .collect();
            while let Some(base) = queue.pop_front() {
                let Some(origin) = placed[base] else {
                    continue;
                };
                for &atom in &self.neighbors[base] {
                    if placed[atom].is_none() {
                        let position = self.place_atom(atom, base, origin, &placed, jitter, rng);
                        placed[atom] = Some(position);
                        queue.push_back(atom);
                    }
                }
            }
        }

        placed
            .into_iter()
            .map(|p| p.unwrap_or_else(Point3::origin))
            .collect()
    }

    fn place_atom(
        &self,
        atom: AtomId,
        base: AtomId,
        origin: Point3<f64>,
        placed: &[Option<Point3<f64>>],
        jitter: f64,
        rng: &mut StdRng,
    ) -> Point3<f64> {
        let bonded: Vec<Point3<f64>> = self.neighbors[base]
            .iter()
            .filter_map(|&id| placed[id])
            .collect();
        let directions = open_valence_directions(
            &origin,
            &bonded,
            self.params.hybridization(base),
            AZIMUTH_SAMPLES,
        );
        let length = self.params.ideal_bond_length(base, atom);

        // Already-placed partners of `atom` other than `base` close a ring.
        let closures: Vec<(Point3<f64>, f64)> = self.neighbors[atom]
            .iter()
            .filter(|&&id| id != base)
            .filter_map(|&id| placed[id].map(|p| (p, self.params.ideal_bond_length(atom, id))))
            .collect();

        directions
            .into_iter()
            .map(|direction| {
                let mut candidate = origin + direction * length;
                if jitter > 0.0 {
                    candidate += random_offset(rng, jitter);
                }
                let score = placement_score(&candidate, base, placed, &closures);
                (candidate, score)
            })
            .max_by(|(pa, sa), (pb, sb)| sa.total_cmp(sb).then_with(|| lexicographic_cmp(pb, pa)))
            .map_or_else(|| origin + Vector3::x() * length, |(candidate, _)| candidate)
    }

    /// Steepest descent on the strain model, moving only the free atoms.
    fn relax(&self, positions: &mut [Point3<f64>], free: &[bool]) {
        if !free.iter().any(|&f| f) {
            return;
        }
        let mut step = INITIAL_STEP;
        let mut energy = self.model.evaluate(positions).total();

        for _ in 0..self.config.relaxation_steps {
            let gradient = self.model.gradient(positions);
            let trial: Vec<Point3<f64>> = positions
                .iter()
                .zip(&gradient)
                .zip(free)
                .map(|((p, g), &is_free)| {
                    if is_free {
                        p - clip_displacement(g * step)
                    } else {
                        *p
                    }
                })
                .collect();
            let trial_energy = self.model.evaluate(&trial).total();

            if trial_energy <= energy {
                positions.copy_from_slice(&trial);
                energy = trial_energy;
                step = (step * STEP_GROWTH).min(MAX_STEP);
            } else {
                step *= 0.5;
                if step < MIN_STEP {
                    break;
                }
            }
        }
    }

    /// Checks every restraint touching a free atom against the configured tolerances.
    fn is_valid(&self, positions: &[Point3<f64>], free: &[bool]) -> bool {
        if positions.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return false;
        }
        let touches_free = |r: &&PairRestraint| free[r.atom1_id] || free[r.atom2_id];
        let tolerance = self.config.bond_tolerance;

        let bonds_ok = self
            .model
            .bonds()
            .iter()
            .filter(touches_free)
            .all(|r| (r.distance(positions) - r.ideal).abs() <= tolerance);
        let bends_ok = self
            .model
            .bends()
            .iter()
            .filter(touches_free)
            .all(|r| (r.distance(positions) - r.ideal).abs() <= BEND_TOLERANCE_FACTOR * tolerance);
        let contacts_ok = self
            .model
            .contacts()
            .iter()
            .filter(touches_free)
            .all(|r| r.distance(positions) >= self.config.steric_scale * r.ideal);

        bonds_ok && bends_ok && contacts_ok
    }
}

fn placement_score(
    candidate: &Point3<f64>,
    base: AtomId,
    placed: &[Option<Point3<f64>>],
    closures: &[(Point3<f64>, f64)],
) -> f64 {
    let clearance = placed
        .iter()
        .enumerate()
        .filter(|&(id, _)| id != base)
        .filter_map(|(_, p)| p.as_ref())
        .map(|p| (candidate - p).norm())
        .fold(CLEARANCE_CAP, f64::min);
    let closure_error: f64 = closures
        .iter()
        .map(|(p, ideal)| ((candidate - p).norm() - ideal).abs())
        .sum();
    clearance - RING_CLOSURE_WEIGHT * closure_error
}

fn random_offset(rng: &mut StdRng, amplitude: f64) -> Vector3<f64> {
    Vector3::new(
        rng.gen_range(-amplitude..amplitude),
        rng.gen_range(-amplitude..amplitude),
        rng.gen_range(-amplitude..amplitude),
    )
}

fn clip_displacement(v: Vector3<f64>) -> Vector3<f64> {
    let norm = v.norm();
    if norm > MAX_DISPLACEMENT {
        v * (MAX_DISPLACEMENT / norm)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::correspondence::SearchMode;
    use crate::core::models::topology::BondOrder;
    use crate::engine::config::{
        DEFAULT_BOND_TOLERANCE, DEFAULT_MAX_ATTEMPTS, DEFAULT_RELAXATION_STEPS, DEFAULT_SEED,
        DEFAULT_STERIC_SCALE,
    };

    fn config(find_all: bool) -> GenerationConfig {
        GenerationConfig {
            find_all,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: DEFAULT_SEED,
            bond_tolerance: DEFAULT_BOND_TOLERANCE,
            steric_scale: DEFAULT_STERIC_SCALE,
            relaxation_steps: DEFAULT_RELAXATION_STEPS,
        }
    }

    fn chain(name: &str, elements: &[&str], positions: Option<&[Point3<f64>]>) -> MoleculeGraph {
        let mut mol = MoleculeGraph::new(name);
        for (i, element) in elements.iter().enumerate() {
            let atom = Atom::new(element);
            let atom = match positions {
                Some(p) => atom.at(p[i]),
                None => atom,
            };
            mol.add_atom(atom);
        }
        for i in 1..elements.len() {
            mol.add_bond(i - 1, i, BondOrder::Single).unwrap();
        }
        mol
    }

    fn propane_coordinates() -> [Point3<f64>; 3] {
        [
            Point3::new(-1.2413, -0.8773, 0.0),
            Point3::origin(),
            Point3::new(1.2413, -0.8773, 0.0),
        ]
    }

    fn matches(correspondences: Vec<Vec<(AtomId, AtomId)>>) -> MatchResult {
        MatchResult {
            mode: SearchMode::AllAtMaxSize,
            correspondences: correspondences
                .into_iter()
                .map(|pairs| Correspondence::new(pairs).unwrap())
                .collect(),
        }
    }

    #[test]
    fn empty_match_is_no_common_substructure() {
        let target = chain("t", &["C", "C"], None);
        let scaffold = chain("s", &["C", "C"], Some(&propane_coordinates()[..2]));
        let result = run(
            &target,
            &scaffold,
            &MatchResult::empty(SearchMode::LargestOnly),
            &config(false),
        );
        assert_eq!(result, Err(GenerationFailureReason::NoCommonSubstructure));
    }

    #[test]
    fn fully_mapped_target_reproduces_scaffold_coordinates() {
        let coords = propane_coordinates();
        let scaffold = chain("propane", &["C", "C", "C"], Some(&coords[..]));
        let target = chain("propane", &["C", "C", "C"], None);
        let result = run(
            &target,
            &scaffold,
            &matches(vec![vec![(0, 0), (1, 1), (2, 2)]]),
            &config(false),
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.members()[0].positions, coords.to_vec());
    }

    #[test]
    fn unmapped_atom_is_placed_at_bonding_distance_and_pinned_atoms_stay_exact() {
        let coords = propane_coordinates();
        let scaffold = chain("propane", &["C", "C", "C"], Some(&coords[..]));
        let target = chain("propanol", &["C", "C", "C", "O"], None);
        let result = run(
            &target,
            &scaffold,
            &matches(vec![vec![(0, 0), (1, 1), (2, 2)]]),
            &config(false),
        )
        .unwrap();

        let conformer = &result.members()[0];
        assert_eq!(conformer.positions.len(), 4);
        for i in 0..3 {
            assert_eq!(conformer.positions[i], coords[i]);
            assert!(conformer.is_pinned(i));
        }
        assert!(!conformer.is_pinned(3));
        let bond = (conformer.positions[3] - conformer.positions[2]).norm();
        assert!((bond - 1.42).abs() < DEFAULT_BOND_TOLERANCE);
        let far = (conformer.positions[3] - conformer.positions[0]).norm();
        assert!(far > DEFAULT_STERIC_SCALE * 3.22);
    }

    #[test]
    fn impossible_ring_closure_yields_no_valid_geometry() {
        let line: Vec<Point3<f64>> = (0..4).map(|i| Point3::new(1.52 * i as f64, 0.0, 0.0)).collect();
        let scaffold = chain("butane", &["C", "C", "C", "C"], Some(&line[..]));
        let mut target = chain("cyclopentane", &["C", "C", "C", "C", "C"], None);
        target.add_bond(4, 0, BondOrder::Single).unwrap();

        let result = run(
            &target,
            &scaffold,
            &matches(vec![vec![(0, 0), (1, 1), (2, 2), (3, 3)]]),
            &config(false),
        );
        assert_eq!(result, Err(GenerationFailureReason::NoValidGeometry));
    }

    #[test]
    fn scaffold_without_coordinates_yields_no_valid_geometry() {
        let scaffold = chain("bare", &["C", "C"], None);
        let target = chain("ethane", &["C", "C"], None);
        let result = run(
            &target,
            &scaffold,
            &matches(vec![vec![(0, 0), (1, 1)]]),
            &config(false),
        );
        assert_eq!(result, Err(GenerationFailureReason::NoValidGeometry));
    }

    #[test]
    fn find_all_generates_one_conformer_per_correspondence_in_order() {
        let coords = propane_coordinates();
        let scaffold = chain("propane", &["C", "C", "C"], Some(&coords[..]));
        let mut target = chain("isopropanol", &["C", "C", "C"], None);
        let oxygen = target.add_atom(Atom::new("O"));
        target.add_bond(1, oxygen, BondOrder::Single).unwrap();
        let found = matches(vec![
            vec![(0, 0), (1, 1), (2, 2)],
            vec![(0, 2), (1, 1), (2, 0)],
        ]);

        let all = run(&target, &scaffold, &found, &config(true)).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.members()[0].correspondence, found.correspondences[0]);
        assert_eq!(all.members()[1].correspondence, found.correspondences[1]);
        assert_eq!(all.members()[1].positions[0], coords[2]);
        assert_eq!(all.members()[1].positions[2], coords[0]);

        let first = run(&target, &scaffold, &found, &config(false)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.members()[0].correspondence, found.correspondences[0]);
    }

    #[test]
    fn component_without_mapped_atoms_is_placed_apart() {
        let coords = propane_coordinates();
        let scaffold = chain("propane", &["C", "C", "C"], Some(&coords[..]));
        let mut target = chain("propane", &["C", "C", "C"], None);
        target.add_atom(Atom::new("Cl"));

        let result = run(
            &target,
            &scaffold,
            &matches(vec![vec![(0, 0), (1, 1), (2, 2)]]),
            &config(false),
        )
        .unwrap();
        let ion = result.members()[0].positions[3];
        assert!(ion.x >= coords[2].x + COMPONENT_OFFSET - 1e-9);
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let coords = propane_coordinates();
        let scaffold = chain("propane", &["C", "C", "C"], Some(&coords[..]));
        let target = chain("butanol", &["C", "C", "C", "C", "O"], None);
        let found = matches(vec![vec![(0, 0), (1, 1), (2, 2)]]);
        let a = run(&target, &scaffold, &found, &config(false)).unwrap();
        let b = run(&target, &scaffold, &found, &config(false)).unwrap();
        assert_eq!(a, b);
    }
}
