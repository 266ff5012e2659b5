use std::ops::{Add, AddAssign};

/// Strain energy of a conformer, split by contribution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrainTerm {
    pub stretch: f64,
    pub bend: f64,
    pub repulsion: f64,
}

impl StrainTerm {
    pub fn new(stretch: f64, bend: f64, repulsion: f64) -> Self {
        Self {
            stretch,
            bend,
            repulsion,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.stretch + self.bend + self.repulsion
    }
}

impl Add for StrainTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            stretch: self.stretch + rhs.stretch,
            bend: self.bend + rhs.bend,
            repulsion: self.repulsion + rhs.repulsion,
        }
    }
}

impl AddAssign for StrainTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.stretch += rhs.stretch;
        self.bend += rhs.bend;
        self.repulsion += rhs.repulsion;
    }
}
