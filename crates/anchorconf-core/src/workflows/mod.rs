//! # Workflows Module
//!
//! Top-level entry points that run the whole pipeline over a batch of molecules.
//!
//! - **Conformer from Scaffold** ([`conformer_from_scaffold`]) - Scaffold selection,
//!   substructure matching, constrained conformer generation and ensemble curation for
//!   every target, with each outcome routed to its output channel.

pub mod conformer_from_scaffold;
