use nalgebra::{Point3, Rotation3, Unit, Vector3};
use std::cmp::Ordering;

const DEGENERATE_NORM: f64 = 1e-6;

/// Half of the tetrahedral angle, measured from the bisector of two existing bonds.
const TETRAHEDRAL_HALF_ANGLE_DEGREES: f64 = 54.75;

/// Local geometry class of an atom, derived from the orders of its bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hybridization {
    Sp,
    Sp2,
    Sp3,
}

impl Hybridization {
    pub fn ideal_angle_degrees(self) -> f64 {
        match self {
            Self::Sp => 180.0,
            Self::Sp2 => 120.0,
            Self::Sp3 => 109.47,
        }
    }
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Returns some unit vector orthogonal to `v`.
pub fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let n = v.normalize();
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (helper - n * n.dot(&helper)).normalize()
}

/// Angle at `b` formed by `a`-`b`-`c`, in degrees.
pub fn bond_angle_degrees(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let cos = ba.dot(&bc) / (ba.norm() * bc.norm());
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Unit directions in which a new bond may leave `base`, given the atoms already bonded to it.
///
/// With no neighbors the six axis directions are offered. With one neighbor a cone at the
/// ideal angle is sampled at `azimuth_samples` evenly spaced azimuths. With two neighbors
/// the directions opposite their bisector are offered (two tetrahedral ones for sp3). With
/// three or more the direction opposite the sum of the existing bonds is used.
pub fn open_valence_directions(
    base: &Point3<f64>,
    neighbors: &[Point3<f64>],
    hybridization: Hybridization,
    azimuth_samples: usize,
) -> Vec<Vector3<f64>> {
    let bond_vecs: Vec<Vector3<f64>> = neighbors
        .iter()
        .map(|p| p - base)
        .filter(|v| v.norm() > DEGENERATE_NORM)
        .map(|v| v.normalize())
        .collect();

    match bond_vecs.len() {
        0 => vec![
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ],
        1 => {
            let n1 = bond_vecs[0];
            if hybridization == Hybridization::Sp {
                return vec![-n1];
            }
            let theta = hybridization.ideal_angle_degrees().to_radians();
            let first = n1 * theta.cos() + any_perpendicular(&n1) * theta.sin();
            let samples = azimuth_samples.max(1);
            (0..samples)
                .map(|k| {
                    let azimuth = 360.0 * k as f64 / samples as f64;
                    rotation_from_axis_angle(&n1, azimuth) * first
                })
                .collect()
        }
        2 => {
            let (n1, n2) = (bond_vecs[0], bond_vecs[1]);
            let sum = n1 + n2;
            if sum.norm() < DEGENERATE_NORM {
                let p = any_perpendicular(&n1);
                let q = n1.cross(&p).normalize();
                return vec![p, -p, q, -q];
            }
            let bisector = -sum.normalize();
            if hybridization != Hybridization::Sp3 {
                return vec![bisector];
            }
            let normal = n1.cross(&n2);
            let normal = if normal.norm() < DEGENERATE_NORM {
                any_perpendicular(&bisector)
            } else {
                normal.normalize()
            };
            let alpha = TETRAHEDRAL_HALF_ANGLE_DEGREES.to_radians();
            vec![
                bisector * alpha.cos() + normal * alpha.sin(),
                bisector * alpha.cos() - normal * alpha.sin(),
            ]
        }
        _ => {
            let sum: Vector3<f64> = bond_vecs.iter().sum();
            if sum.norm() < DEGENERATE_NORM {
                let normal = bond_vecs[0].cross(&bond_vecs[1]);
                let normal = if normal.norm() < DEGENERATE_NORM {
                    any_perpendicular(&bond_vecs[0])
                } else {
                    normal.normalize()
                };
                vec![normal, -normal]
            } else {
                vec![-sum.normalize()]
            }
        }
    }
}

/// Total order on points by x, then y, then z.
pub fn lexicographic_cmp(a: &Point3<f64>, b: &Point3<f64>) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}
