//! # Core Module
//!
//! Fundamental building blocks shared by every stage of the scaffold pipeline.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, molecule graphs,
//!   correspondences, conformers and job outcomes
//! - **Steric Potentials** ([`forcefield`]) - Contact distances and strain terms used to
//!   judge and rank generated geometry
//! - **Record I/O** ([`io`]) - Molecule sources and append-only output sinks
//! - **Utilities** ([`utils`]) - Element radii and vector geometry

pub mod forcefield;
pub mod io;
pub mod models;
pub mod utils;
