//! Request evaluation and commit.
//!
//! Evaluation never touches the caller's state: bounds are checked against
//! the live matrices, the grant is applied to a snapshot, and the safety
//! algorithm runs on that snapshot. Committing is a separate step that needs
//! the [`ApprovedRequest`] produced by a successful evaluation.
//!
//! Denials are ordinary outcomes, not errors. `Err` is reserved for
//! malformed input (bad process index, wrong vector length, negative units)
//! and for a live state with some Allocation above its Max, which no
//! request may be approved against.

use serde::Serialize;
use tracing::debug;

use banker_types::{AllocationState, StateError, Units, check_vector, vector};

use crate::safety;

/// Reason code reported for an approved request.
pub const APPROVED_REASON: &str = "safe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// Request exceeds the process's remaining Need.
    RequestExceeds,
    /// Request exceeds what is currently Available.
    InsufficientResources,
    /// Granting would leave no safe completion order.
    Unsafe,
}

impl DenialReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestExceeds => "request_exceeds",
            Self::InsufficientResources => "insufficient_resources",
            Self::Unsafe => "unsafe",
        }
    }
}

/// Proof that a request was evaluated safe against a specific state.
///
/// Only [`evaluate`] constructs this. It remembers the state it was computed
/// against so [`ApprovedRequest::commit`] can refuse to apply it to anything
/// else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedRequest {
    process: usize,
    request: Vec<Units>,
    safe_sequence: Vec<usize>,
    basis: AllocationState,
}

impl ApprovedRequest {
    #[must_use]
    pub fn process(&self) -> usize {
        self.process
    }

    #[must_use]
    pub fn request(&self) -> &[Units] {
        &self.request
    }

    #[must_use]
    pub fn safe_sequence(&self) -> &[usize] {
        &self.safe_sequence
    }

    /// Apply the grant to the live state.
    ///
    /// Fails with [`StateError::StaleApproval`] if `live` changed since the
    /// evaluation; `live` is left untouched in that case.
    pub fn commit(&self, live: &mut AllocationState) -> Result<(), StateError> {
        if *live != self.basis {
            return Err(StateError::StaleApproval);
        }
        *live = live.with_grant(self.process, &self.request)?;
        debug!(
            process = self.process,
            request = ?self.request,
            available = ?live.available(),
            "request committed"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub process: usize,
    pub request: Vec<Units>,
    pub reason: DenialReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Approved(ApprovedRequest),
    Denied(Denial),
}

impl Evaluation {
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Evaluation::Approved(_))
    }

    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Evaluation::Approved(_) => APPROVED_REASON,
            Evaluation::Denied(denial) => denial.reason.as_str(),
        }
    }

    /// Safe sequence of the speculative state; empty for denials.
    #[must_use]
    pub fn safe_sequence(&self) -> &[usize] {
        match self {
            Evaluation::Approved(approved) => approved.safe_sequence(),
            Evaluation::Denied(_) => &[],
        }
    }

    #[must_use]
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Evaluation::Approved(_) => None,
            Evaluation::Denied(denial) => Some(denial.reason),
        }
    }

    #[must_use]
    pub fn approved(&self) -> Option<&ApprovedRequest> {
        match self {
            Evaluation::Approved(approved) => Some(approved),
            Evaluation::Denied(_) => None,
        }
    }

    #[must_use]
    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            approved: self.is_approved(),
            reason_code: self.reason_code(),
            safe_sequence: self.safe_sequence().to_vec(),
        }
    }
}

/// Plain-data view of an [`Evaluation`] for hosts that serialize results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub approved: bool,
    pub reason_code: &'static str,
    pub safe_sequence: Vec<usize>,
}

/// Decide whether `process` may be granted `request` without leaving the
/// system unsafe. `state` is only read.
pub fn evaluate(
    state: &AllocationState,
    process: usize,
    request: &[Units],
) -> Result<Evaluation, StateError> {
    let need = state.need_row(process)?;
    check_vector(state.dimensions(), request)?;
    state.ensure_allocation_within_max()?;

    let deny = |reason: DenialReason| -> Result<Evaluation, StateError> {
        debug!(process, request = ?request, reason = reason.as_str(), "request denied");
        Ok(Evaluation::Denied(Denial {
            process,
            request: request.to_vec(),
            reason,
        }))
    };

    if !vector::less_or_equal(request, need)? {
        return deny(DenialReason::RequestExceeds);
    }
    if !vector::less_or_equal(request, state.available())? {
        return deny(DenialReason::InsufficientResources);
    }

    let speculative = state.with_grant(process, request)?;
    let report = safety::check_safety(&speculative)?;
    if !report.safe {
        return deny(DenialReason::Unsafe);
    }

    debug!(process, request = ?request, sequence = ?report.safe_sequence, "request approved");
    Ok(Evaluation::Approved(ApprovedRequest {
        process,
        request: request.to_vec(),
        safe_sequence: report.safe_sequence,
        basis: state.snapshot(),
    }))
}

/// Evaluate and, when approved, commit in one call.
pub fn request_and_commit(
    state: &mut AllocationState,
    process: usize,
    request: &[Units],
) -> Result<Evaluation, StateError> {
    let evaluation = evaluate(state, process, request)?;
    if let Evaluation::Approved(approved) = &evaluation {
        approved.commit(state)?;
    }
    Ok(evaluation)
}
