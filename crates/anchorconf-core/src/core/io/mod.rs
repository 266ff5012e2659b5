//! Molecule sources and outcome sinks.
//!
//! The pipeline reads molecules through [`traits::MoleculeSource`] and hands every
//! terminal outcome to a [`traits::RecordSink`]. The concrete implementations here store
//! records as TOML documents ([`records`]) or keep them in memory ([`memory`]).

pub mod memory;
pub mod records;
pub mod traits;
