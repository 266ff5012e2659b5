/// Covalent radius in Angstroms. Unknown elements fall back to a carbon-like value.
pub fn covalent_radius(element: &str) -> f64 {
    match element {
        "H" => 0.31,
        "B" => 0.84,
        "C" => 0.76,
        "N" => 0.71,
        "O" => 0.66,
        "F" => 0.57,
        "Si" => 1.11,
        "P" => 1.07,
        "S" => 1.05,
        "Cl" => 1.02,
        "Se" => 1.20,
        "Br" => 1.20,
        "I" => 1.39,
        _ => 0.77,
    }
}

/// Van der Waals radius in Angstroms.
pub fn vdw_radius(element: &str) -> f64 {
    match element {
        "H" => 1.20,
        "C" => 1.70,
        "N" => 1.55,
        "O" => 1.52,
        "F" => 1.47,
        "P" => 1.80,
        "S" => 1.80,
        "Cl" => 1.75,
        "Br" => 1.85,
        "I" => 1.98,
        _ => 1.70,
    }
}

/// Ideal bond length between two elements: the sum of their covalent radii.
#[inline]
pub fn ideal_bond_length(element1: &str, element2: &str) -> f64 {
    covalent_radius(element1) + covalent_radius(element2)
}

/// Closest approach two non-bonded atoms tolerate before they touch.
#[inline]
pub fn contact_distance(element1: &str, element2: &str) -> f64 {
    vdw_radius(element1) + vdw_radius(element2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn carbon_carbon_bond_is_one_point_five_two() {
        assert!((ideal_bond_length("C", "C") - 1.52).abs() < TOLERANCE);
    }

    #[test]
    fn unknown_elements_use_fallback_radii() {
        assert!((covalent_radius("Xx") - 0.77).abs() < TOLERANCE);
        assert!((vdw_radius("Xx") - 1.70).abs() < TOLERANCE);
    }

    #[test]
    fn contact_distance_sums_vdw_radii() {
        assert!((contact_distance("H", "O") - 2.72).abs() < TOLERANCE);
    }
}
