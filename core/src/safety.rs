//! Banker's safety algorithm.
//!
//! The scan order is part of the contract: on every pass the lowest-index
//! unfinished process whose Need fits in Work is admitted, and the next pass
//! starts again from index 0. Two conforming implementations must produce the
//! same safe sequence for the same state, so do not turn this into a single
//! continuous sweep.

use serde::Serialize;
use tracing::{debug, trace};

use banker_types::vector;
use banker_types::{AllocationState, StateError, Units};

/// Whether [`check`] records a per-iteration trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    #[default]
    Off,
    Steps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepReason {
    /// Work = Available, nothing finished yet.
    Initialized,
    /// `Need[admitted] <= Work`; its allocation was released into Work.
    NeedWithinWork,
    Safe,
    Unsafe,
}

/// One observation of the algorithm's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyStep {
    pub iteration: usize,
    pub admitted: Option<usize>,
    pub reason: StepReason,
    pub work: Vec<Units>,
    pub finished: Vec<bool>,
    /// Completion order so far. Partial (and discarded from the report) when
    /// the state turns out unsafe.
    pub safe_sequence: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub safe: bool,
    /// Full completion order when safe, empty otherwise.
    pub safe_sequence: Vec<usize>,
    /// Empty unless [`TraceMode::Steps`] was requested.
    pub steps: Vec<SafetyStep>,
}

impl SafetyReport {
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.safe
    }
}

/// Safety check without a trace.
pub fn check_safety(state: &AllocationState) -> Result<SafetyReport, StateError> {
    check(state, TraceMode::Off)
}

/// Run the safety algorithm over `state`.
///
/// Assumes Allocation <= Max holds for every cell. Worst case is
/// O(P^2 * R): up to P passes, each scanning up to P Need rows.
pub fn check(state: &AllocationState, mode: TraceMode) -> Result<SafetyReport, StateError> {
    let processes = state.process_count();
    let record = matches!(mode, TraceMode::Steps);

    let mut work = state.available().to_vec();
    let mut finished = vec![false; processes];
    let mut sequence = Vec::with_capacity(processes);
    let mut steps = Vec::new();

    if record {
        steps.push(SafetyStep {
            iteration: 0,
            admitted: None,
            reason: StepReason::Initialized,
            work: work.clone(),
            finished: finished.clone(),
            safe_sequence: Vec::new(),
        });
    }

    let mut iteration = 0;
    while sequence.len() < processes {
        iteration += 1;
        let Some(process) = first_eligible(state, &work, &finished)? else {
            break;
        };

        vector::add_assign(&mut work, &state.allocation()[process])?;
        finished[process] = true;
        sequence.push(process);
        trace!(iteration, process, work = ?work, "process admitted");

        if record {
            steps.push(SafetyStep {
                iteration,
                admitted: Some(process),
                reason: StepReason::NeedWithinWork,
                work: work.clone(),
                finished: finished.clone(),
                safe_sequence: sequence.clone(),
            });
        }
    }

    let safe = sequence.len() == processes;

    if record {
        steps.push(SafetyStep {
            iteration: iteration + 1,
            admitted: None,
            reason: if safe {
                StepReason::Safe
            } else {
                StepReason::Unsafe
            },
            work,
            finished,
            safe_sequence: sequence.clone(),
        });
    }

    debug!(safe, sequence = ?sequence, dims = %state.dimensions(), "safety check finished");

    if !safe {
        sequence.clear();
    }

    Ok(SafetyReport {
        safe,
        safe_sequence: sequence,
        steps,
    })
}

fn first_eligible(
    state: &AllocationState,
    work: &[Units],
    finished: &[bool],
) -> Result<Option<usize>, StateError> {
    for (process, need) in state.need().iter().enumerate() {
        if !finished[process] && vector::less_or_equal(need, work)? {
            return Ok(Some(process));
        }
    }
    Ok(None)
}
