//! Structured import/export of an allocation state.
//!
//! The structured form is what persistence, preset and share collaborators
//! exchange. Export is lossless and includes Need for convenience; import
//! validates shape and sign of every field and always re-derives Need, so a
//! tampered or stale `need` field in the input has no effect.
//!
//! The CSV form is export-only.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use banker_types::{AllocationState, Dimensions, StateError, Units};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    pub process_count: usize,
    pub resource_count: usize,
    pub available: Vec<Units>,
    pub max: Vec<Vec<Units>>,
    pub allocation: Vec<Vec<Units>>,
    pub need: Vec<Vec<Units>>,
}

/// Wire shape accepted by [`import`]. Every field is optional here so a
/// missing one surfaces as `MalformedState` with the field named, rather
/// than as a bare serde message. Older exports used `processes` and
/// `resources` for the counts.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateWire {
    #[serde(alias = "processes")]
    process_count: Option<i64>,
    #[serde(alias = "resources")]
    resource_count: Option<i64>,
    available: Option<Vec<Units>>,
    max: Option<Vec<Vec<Units>>>,
    allocation: Option<Vec<Vec<Units>>>,
}

fn malformed(reason: impl Into<String>) -> StateError {
    StateError::MalformedState {
        reason: reason.into(),
    }
}

fn require<T>(field: Option<T>, name: &str) -> Result<T, StateError> {
    field.ok_or_else(|| malformed(format!("missing field `{name}`")))
}

#[must_use]
pub fn export(state: &AllocationState) -> StateDocument {
    StateDocument {
        process_count: state.process_count(),
        resource_count: state.resource_count(),
        available: state.available().to_vec(),
        max: state.max().to_vec(),
        allocation: state.allocation().to_vec(),
        need: state.need().to_vec(),
    }
}

/// Rebuild a state from its structured form.
pub fn import(value: Value) -> Result<AllocationState, StateError> {
    let wire: StateWire =
        serde_json::from_value(value).map_err(|err| malformed(err.to_string()))?;

    let processes = require(wire.process_count, "processCount")?;
    let resources = require(wire.resource_count, "resourceCount")?;
    let available = require(wire.available, "available")?;
    let max = require(wire.max, "max")?;
    let allocation = require(wire.allocation, "allocation")?;

    let dims = Dimensions::try_new(processes, resources).map_err(|err| malformed(err.to_string()))?;
    check_matrix("max", dims, &max)?;
    check_matrix("allocation", dims, &allocation)?;

    AllocationState::from_parts(dims, available, max, allocation)
        .map_err(|err| malformed(format!("available: {err}")))
}

fn check_matrix(name: &str, dims: Dimensions, rows: &[Vec<Units>]) -> Result<(), StateError> {
    if rows.len() != dims.processes {
        return Err(malformed(format!(
            "{name} has {} rows, expected {}",
            rows.len(),
            dims.processes
        )));
    }
    for (i, row) in rows.iter().enumerate() {
        banker_types::check_vector(dims, row)
            .map_err(|err| malformed(format!("{name} row {i}: {err}")))?;
    }
    Ok(())
}

pub fn to_json(state: &AllocationState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export(state))
}

pub fn from_json(text: &str) -> Result<AllocationState, StateError> {
    let value: Value = serde_json::from_str(text).map_err(|err| malformed(err.to_string()))?;
    import(value)
}

/// Row-labeled table: one row per matrix row, Available first.
///
/// ```text
/// Matrix,Process,R0,R1
/// Available,-,3,3
/// Max,P0,7,5
/// ```
#[must_use]
pub fn to_csv(state: &AllocationState) -> String {
    let mut out = String::from("Matrix,Process");
    for j in 0..state.resource_count() {
        let _ = write!(out, ",R{j}");
    }
    out.push('\n');

    push_csv_row(&mut out, "Available", "-", state.available());
    for (name, matrix) in [
        ("Max", state.max()),
        ("Allocation", state.allocation()),
        ("Need", state.need()),
    ] {
        for (i, row) in matrix.iter().enumerate() {
            push_csv_row(&mut out, name, &format!("P{i}"), row);
        }
    }
    out
}

fn push_csv_row(out: &mut String, matrix: &str, label: &str, values: &[Units]) {
    out.push_str(matrix);
    out.push(',');
    out.push_str(label);
    for value in values {
        let _ = write!(out, ",{value}");
    }
    out.push('\n');
}
