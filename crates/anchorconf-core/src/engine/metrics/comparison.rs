use super::{BondContext, EdgeCompare, VertexCompare};
use crate::core::models::atom::Atom;
use std::fmt;

/// Which atom key must agree for two atoms to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtomComparison {
    /// Any atom matches any atom.
    Any,
    /// Element symbols must be equal.
    #[default]
    Element,
    /// Full atom type keys must be equal.
    AtomType,
}

impl VertexCompare for AtomComparison {
    fn compatible(&self, target: &Atom, scaffold: &Atom) -> bool {
        match self {
            Self::Any => true,
            Self::Element => target.element == scaffold.element,
            Self::AtomType => target.atom_type == scaffold.atom_type,
        }
    }
}

impl fmt::Display for AtomComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Element => write!(f, "element"),
            Self::AtomType => write!(f, "atom-type"),
        }
    }
}

/// Which bond properties must agree for two bonds to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondComparison {
    /// Any bond matches any bond.
    Any,
    /// Bond orders must be equal.
    #[default]
    BondOrder,
    /// Bond orders and ring membership must both be equal.
    BondOrderWithRingness,
}

impl EdgeCompare for BondComparison {
    fn compatible(&self, target: BondContext<'_>, scaffold: BondContext<'_>) -> bool {
        match self {
            Self::Any => true,
            Self::BondOrder => target.bond.order == scaffold.bond.order,
            Self::BondOrderWithRingness => {
                target.bond.order == scaffold.bond.order && target.in_ring == scaffold.in_ring
            }
        }
    }
}

impl fmt::Display for BondComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::BondOrder => write!(f, "bond-order"),
            Self::BondOrderWithRingness => write!(f, "bond-order-with-ringness"),
        }
    }
}
