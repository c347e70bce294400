//! Core deadlock-avoidance logic.
//!
//! This crate holds the Banker's algorithm proper: the safety check, request
//! evaluation with snapshot isolation, the structured state codec, and the
//! built-in demonstration scenarios. Everything is synchronous and pure over
//! in-memory [`AllocationState`] values; hosts that share one live state
//! across threads serialize access themselves.

pub mod codec;
pub mod presets;
pub mod request;
pub mod safety;

pub use banker_types::{AllocationState, Dimensions, StateError, Units};
pub use codec::StateDocument;
pub use presets::Preset;
pub use request::{
    ApprovedRequest, Denial, DenialReason, Evaluation, EvaluationSummary, evaluate,
    request_and_commit,
};
pub use safety::{SafetyReport, SafetyStep, StepReason, TraceMode, check, check_safety};
