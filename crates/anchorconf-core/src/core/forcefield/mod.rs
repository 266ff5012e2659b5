//! # Force Field Module
//!
//! A small distance-geometry force field used to grow, relax, validate and rank generated
//! conformers. It does not aim at accurate energies; it only needs to tell reasonable
//! geometry from strained or clashing geometry.
//!
//! ## Key Components
//!
//! - [`parameterization`] - Ideal bond lengths, angles and contact distances per molecule
//! - [`potentials`] - Harmonic springs and soft repulsive walls
//! - [`scoring`] - The per-molecule [`scoring::StrainModel`] with energy and gradient
//! - [`term`] - Strain energy aggregation
//!
//! ## Usage
//!
//! ```ignore
//! use anchorconf::core::forcefield::scoring::StrainModel;
//!
//! let model = StrainModel::new(&molecule);
//! let strain = model.evaluate(&positions);
//! println!("total strain: {:.3}", strain.total());
//! ```

pub mod parameterization;
pub(crate) mod potentials;
pub mod scoring;
pub mod term;
