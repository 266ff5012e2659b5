//! # Core Models Module
//!
//! Data structures describing molecules and everything the pipeline derives from them.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms with an element, a comparison type key and an optional position
//! - [`topology`] - Bonds and bond orders
//! - [`molecule`] - The attributed molecule graph with cached connectivity
//! - [`correspondence`] - Matched atom mappings between a target and a scaffold
//! - [`conformer`] - Generated conformers and ensembles
//! - [`outcome`] - Scaffold choices and per-molecule job outcomes
//! - [`ids`] - Identifier types
//!
//! ## Usage
//!
//! ```ignore
//! use anchorconf::core::models::{atom::Atom, molecule::MoleculeGraph, topology::BondOrder};
//!
//! let mut ethanol = MoleculeGraph::new("ethanol");
//! let c1 = ethanol.add_atom(Atom::new("C"));
//! let c2 = ethanol.add_atom(Atom::new("C"));
//! let o = ethanol.add_atom(Atom::new("O"));
//! ethanol.add_bond(c1, c2, BondOrder::Single)?;
//! ethanol.add_bond(c2, o, BondOrder::Single)?;
//! ```

pub mod atom;
pub mod conformer;
pub mod correspondence;
pub mod ids;
pub mod molecule;
pub mod outcome;
pub mod topology;
