//! Allocation state: the four Banker's matrices and their derivation rules.
//!
//! Need is a cached projection of `Max - Allocation`. It is never written by
//! callers; every Max or Allocation write recomputes the affected row.
//!
//! Allocation <= Max is deliberately *not* enforced on row writes, so an
//! interactive editor may pass through transiently inconsistent rows.
//! [`AllocationState::ensure_allocation_within_max`] is the gate that request
//! evaluation in `banker-core` passes through before trusting a state.

use std::fmt;

use thiserror::Error;

use crate::vector::{self, LengthMismatch, Units, VectorError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("invalid dimensions: {processes} processes x {resources} resources")]
    InvalidDimension { processes: i64, resources: i64 },
    #[error("process index {index} out of range (process count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("expected a vector of length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("malformed state: {reason}")]
    MalformedState { reason: String },
    #[error("negative unit count {value} at position {index}")]
    NegativeUnits { index: usize, value: Units },
    #[error("approval was computed against a state that no longer matches the live state")]
    StaleApproval,
    #[error("allocation exceeds max for process {process}, resource {resource}")]
    AllocationExceedsMax { process: usize, resource: usize },
    #[error("unit count out of range at position {index}")]
    UnitOverflow { index: usize },
}

impl From<LengthMismatch> for StateError {
    fn from(err: LengthMismatch) -> Self {
        StateError::DimensionMismatch {
            expected: err.right,
            actual: err.left,
        }
    }
}

impl From<VectorError> for StateError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Length(mismatch) => mismatch.into(),
            VectorError::Overflow { index } => StateError::UnitOverflow { index },
        }
    }
}

/// Process and resource counts. Fixed for the lifetime of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub processes: usize,
    pub resources: usize,
}

impl Dimensions {
    #[must_use]
    pub const fn new(processes: usize, resources: usize) -> Self {
        Self {
            processes,
            resources,
        }
    }

    /// Validate counts arriving from an untyped boundary (CLI, scripts).
    pub fn try_new(processes: i64, resources: i64) -> Result<Self, StateError> {
        match (usize::try_from(processes), usize::try_from(resources)) {
            (Ok(p), Ok(r)) => Ok(Self::new(p, r)),
            _ => Err(StateError::InvalidDimension {
                processes,
                resources,
            }),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.processes, self.resources)
    }
}

/// The live (or snapshot) state of one Banker's instance.
///
/// `Clone` is a full deep copy: every row is an owned `Vec`, so a clone
/// shares no storage with its source. [`AllocationState::snapshot`] is the
/// named entry point for that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllocationState {
    dims: Dimensions,
    available: Vec<Units>,
    max: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
}

impl AllocationState {
    /// Zero-filled state of the given shape.
    #[must_use]
    pub fn new(dims: Dimensions) -> Self {
        let zero_matrix = || vec![vec![0; dims.resources]; dims.processes];
        Self {
            dims,
            available: vec![0; dims.resources],
            max: zero_matrix(),
            allocation: zero_matrix(),
            need: zero_matrix(),
        }
    }

    /// Reset to a zero-filled state of a (possibly different) shape.
    pub fn initialize(&mut self, dims: Dimensions) {
        *self = Self::new(dims);
    }

    /// Bulk replacement: build a state from whole matrices.
    ///
    /// Shapes are validated against `dims` and Need is derived, never taken
    /// from the caller.
    pub fn from_parts(
        dims: Dimensions,
        available: Vec<Units>,
        max: Vec<Vec<Units>>,
        allocation: Vec<Vec<Units>>,
    ) -> Result<Self, StateError> {
        check_vector(dims, &available)?;
        check_rows(dims, &max)?;
        check_rows(dims, &allocation)?;

        let mut state = Self {
            dims,
            available,
            max,
            allocation,
            need: vec![vec![0; dims.resources]; dims.processes],
        };
        state.recompute_all_needs();
        Ok(state)
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[must_use]
    pub fn process_count(&self) -> usize {
        self.dims.processes
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.dims.resources
    }

    #[must_use]
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    #[must_use]
    pub fn max(&self) -> &[Vec<Units>] {
        &self.max
    }

    #[must_use]
    pub fn allocation(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    #[must_use]
    pub fn need(&self) -> &[Vec<Units>] {
        &self.need
    }

    pub fn max_row(&self, process: usize) -> Result<&[Units], StateError> {
        self.check_index(process)?;
        Ok(&self.max[process])
    }

    pub fn allocation_row(&self, process: usize) -> Result<&[Units], StateError> {
        self.check_index(process)?;
        Ok(&self.allocation[process])
    }

    pub fn need_row(&self, process: usize) -> Result<&[Units], StateError> {
        self.check_index(process)?;
        Ok(&self.need[process])
    }

    pub fn set_available(&mut self, values: &[Units]) -> Result<(), StateError> {
        check_vector(self.dims, values)?;
        self.available = values.to_vec();
        Ok(())
    }

    pub fn set_max_row(&mut self, process: usize, values: &[Units]) -> Result<(), StateError> {
        self.check_index(process)?;
        check_vector(self.dims, values)?;
        self.max[process] = values.to_vec();
        self.recompute_need(process)
    }

    pub fn set_allocation_row(
        &mut self,
        process: usize,
        values: &[Units],
    ) -> Result<(), StateError> {
        self.check_index(process)?;
        check_vector(self.dims, values)?;
        self.allocation[process] = values.to_vec();
        self.recompute_need(process)
    }

    pub fn recompute_need(&mut self, process: usize) -> Result<(), StateError> {
        self.check_index(process)?;
        self.need[process] = vector::subtract(&self.max[process], &self.allocation[process])?;
        Ok(())
    }

    pub fn recompute_all_needs(&mut self) {
        for (need, (max, allocation)) in self
            .need
            .iter_mut()
            .zip(self.max.iter().zip(&self.allocation))
        {
            // Max and Allocation are non-negative, so the difference fits.
            for ((n, m), a) in need.iter_mut().zip(max).zip(allocation) {
                *n = m - a;
            }
        }
    }

    /// Independent deep copy for speculative work and undo buffers.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Copy of this state with `request` moved from Available to `process`.
    ///
    /// Applies the three grant updates (Available -= request,
    /// Allocation[process] += request, Need[process] -= request) to a
    /// snapshot. Bounds against Need and Available are the caller's job;
    /// this only rejects malformed input. `self` is never touched.
    pub fn with_grant(&self, process: usize, request: &[Units]) -> Result<Self, StateError> {
        self.check_index(process)?;
        check_vector(self.dims, request)?;

        let mut next = self.snapshot();
        vector::sub_assign(&mut next.available, request)?;
        vector::add_assign(&mut next.allocation[process], request)?;
        vector::sub_assign(&mut next.need[process], request)?;
        Ok(next)
    }

    /// Per-resource `sum(Allocation[*][j]) + Available[j]`.
    ///
    /// Never stored; every grant must leave it unchanged.
    pub fn total_supply(&self) -> Result<Vec<Units>, StateError> {
        let mut supply = self.available.clone();
        for row in &self.allocation {
            vector::add_assign(&mut supply, row)?;
        }
        Ok(supply)
    }

    /// First `(process, resource)` cell where Allocation exceeds Max.
    #[must_use]
    pub fn allocation_over_max(&self) -> Option<(usize, usize)> {
        self.need.iter().enumerate().find_map(|(i, row)| {
            row.iter()
                .position(|&n| n < 0)
                .map(|j| (i, j))
        })
    }

    /// `Err(AllocationExceedsMax)` naming the first offending cell.
    pub fn ensure_allocation_within_max(&self) -> Result<(), StateError> {
        match self.allocation_over_max() {
            Some((process, resource)) => {
                Err(StateError::AllocationExceedsMax { process, resource })
            }
            None => Ok(()),
        }
    }

    fn check_index(&self, process: usize) -> Result<(), StateError> {
        if process < self.dims.processes {
            Ok(())
        } else {
            Err(StateError::IndexOutOfRange {
                index: process,
                len: self.dims.processes,
            })
        }
    }
}

/// Length and sign check for one resource vector.
pub fn check_vector(dims: Dimensions, values: &[Units]) -> Result<(), StateError> {
    if values.len() != dims.resources {
        return Err(StateError::DimensionMismatch {
            expected: dims.resources,
            actual: values.len(),
        });
    }
    if let Some((index, value)) = vector::first_negative(values) {
        return Err(StateError::NegativeUnits { index, value });
    }
    Ok(())
}

fn check_rows(dims: Dimensions, rows: &[Vec<Units>]) -> Result<(), StateError> {
    if rows.len() != dims.processes {
        return Err(StateError::DimensionMismatch {
            expected: dims.processes,
            actual: rows.len(),
        });
    }
    rows.iter().try_for_each(|row| check_vector(dims, row))
}
