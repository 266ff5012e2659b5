//! The computational stages of the per-molecule pipeline.
//!
//! Each submodule exposes a single `run` function: substructure matching, scaffold
//! selection, constrained conformer generation and ensemble curation. Stages are pure with
//! respect to their inputs; the orchestration lives in [`crate::engine::state`].

pub mod conformer_generation;
pub mod ensemble_curation;
pub mod scaffold_selection;
pub mod substructure_match;
