/// Harmonic spring energy `k * (d - d0)^2`.
#[inline]
pub fn harmonic(dist: f64, ideal_dist: f64, k: f64) -> f64 {
    let delta = dist - ideal_dist;
    k * delta * delta
}

#[inline]
pub fn harmonic_derivative(dist: f64, ideal_dist: f64, k: f64) -> f64 {
    2.0 * k * (dist - ideal_dist)
}

/// Purely repulsive quadratic wall, zero at or beyond `contact_dist`.
#[inline]
pub fn soft_repulsion(dist: f64, contact_dist: f64, k: f64) -> f64 {
    if dist >= contact_dist {
        0.0
    } else {
        let overlap = contact_dist - dist;
        k * overlap * overlap
    }
}

#[inline]
pub fn soft_repulsion_derivative(dist: f64, contact_dist: f64, k: f64) -> f64 {
    if dist >= contact_dist {
        0.0
    } else {
        -2.0 * k * (contact_dist - dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn harmonic_is_zero_at_ideal_distance() {
        assert!(f64_approx_equal(harmonic(1.5, 1.5, 100.0), 0.0));
        assert!(f64_approx_equal(harmonic_derivative(1.5, 1.5, 100.0), 0.0));
    }

    #[test]
    fn harmonic_grows_quadratically() {
        assert!(f64_approx_equal(harmonic(2.0, 1.5, 10.0), 2.5));
        assert!(f64_approx_equal(harmonic_derivative(2.0, 1.5, 10.0), 10.0));
        assert!(f64_approx_equal(harmonic_derivative(1.0, 1.5, 10.0), -10.0));
    }

    #[test]
    fn soft_repulsion_vanishes_beyond_contact() {
        assert!(f64_approx_equal(soft_repulsion(3.5, 3.4, 1.0), 0.0));
        assert!(f64_approx_equal(soft_repulsion_derivative(3.5, 3.4, 1.0), 0.0));
    }

    #[test]
    fn soft_repulsion_pushes_overlapping_atoms_apart() {
        assert!(f64_approx_equal(soft_repulsion(2.4, 3.4, 2.0), 2.0));
        assert!(soft_repulsion_derivative(2.4, 3.4, 2.0) < 0.0);
    }
}
