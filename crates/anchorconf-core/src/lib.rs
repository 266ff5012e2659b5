//! # anchorconf Core Library
//!
//! Scaffold-constrained conformer generation: new 3D conformers are built for a
//! target molecule while a substructure shared with a reference ("scaffold")
//! molecule keeps the scaffold's coordinates unchanged.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MoleculeGraph`,
//!   `Correspondence`, `ConformerEnsemble`), steric potentials, geometry helpers and
//!   the record I/O used as molecule source and output sink.
//!
//! - **[`engine`]: The Logic Core.** Configuration and validation, the injected
//!   capability traits (comparison policies, similarity, equivalence, ranking) and the
//!   four pipeline tasks: substructure matching, scaffold selection, constrained
//!   conformer generation and ensemble curation.
//!
//! - **[`workflows`]: The Public API.** The job orchestrator that drives every input
//!   molecule through the pipeline, possibly in parallel, and routes each outcome to
//!   one of three output channels.

pub mod core;
pub mod engine;
pub mod workflows;
