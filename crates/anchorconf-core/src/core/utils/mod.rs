//! Element property tables and vector geometry shared by the generation and scoring code.

pub mod elements;
pub mod geometry;
