//! Core domain types for the Banker's deadlock-avoidance model.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! the unit-vector arithmetic and the allocation state that the safety and request
//! logic in `banker-core` reason about.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod state;
pub mod vector;

pub use state::{AllocationState, Dimensions, StateError, check_vector};
pub use vector::{LengthMismatch, Units, VectorError};
