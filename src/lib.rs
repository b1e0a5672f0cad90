//! liskov: generic substitutability checks from the command line.
//!
//! The solver itself lives in the `liskov-solver` crate and is re-exported
//! as [`solver`]. This crate adds the JSON universe-file front end, the
//! `liskov` binary and tracing setup.

pub use liskov_solver as solver;

pub mod cli;
pub mod tracing_config;
