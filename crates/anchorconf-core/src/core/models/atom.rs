use nalgebra::Point3;

/// Represents an atom of a molecule graph.
///
/// Two keys are carried for substructure comparison: the chemical element and a
/// free-form atom type (e.g. `"C_TrTrTrPi"` or `"C.ar"`). Which key is compared is
/// decided by the configured atom comparison policy. The position is optional because
/// target molecules are usually read before any 3D structure exists for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Normalized element symbol (e.g. `"C"`, `"Cl"`).
    pub element: String,
    /// Full atom type key. Defaults to the element symbol.
    pub atom_type: String,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Cartesian coordinates in Angstroms, if known.
    pub position: Option<Point3<f64>>,
}

impl Atom {
    /// Creates a new `Atom` whose atom type equals its element and that has no position.
    ///
    /// # Arguments
    ///
    /// * `element` - The element symbol, in any letter case.
    pub fn new(element: &str) -> Self {
        let element = normalize_element_symbol(element);
        Self {
            atom_type: element.clone(),
            element,
            formal_charge: 0,
            position: None,
        }
    }

    /// Sets the atom type key, builder style.
    pub fn with_type(mut self, atom_type: &str) -> Self {
        self.atom_type = atom_type.to_string();
        self
    }

    /// Sets the position, builder style.
    pub fn at(mut self, position: Point3<f64>) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the formal charge, builder style.
    pub fn with_charge(mut self, formal_charge: i8) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == "H"
    }
}

/// Normalizes an element symbol to its canonical letter case (`"CL"` becomes `"Cl"`).
pub fn normalize_element_symbol(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
