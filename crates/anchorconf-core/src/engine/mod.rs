//! # Engine Module
//!
//! The scaffold-constrained conformer pipeline: configuration, injected capabilities, the
//! four computational stages and the per-molecule state machine that chains them.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Matching, selection, generation and curation options
//! - **Capabilities** ([`metrics`]) - Comparison policies, similarity, equivalence and ranking
//! - **Stages** ([`tasks`]) - Matcher, selector, generator and curator
//! - **State Machine** ([`state`]) - Drives one molecule to its terminal outcome
//! - **Output** ([`output`]) - The three outcome channels and their counters
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Errors that abort a whole run

pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod progress;
pub mod state;
pub mod tasks;
