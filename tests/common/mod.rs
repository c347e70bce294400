//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use banker_core::{AllocationState, Dimensions, presets};

/// Five processes, three resources; safe with sequence P1 P3 P0 P2 P4.
pub fn textbook_safe() -> AllocationState {
    presets::find("textbook-safe")
        .expect("preset exists")
        .to_state()
        .expect("preset is well formed")
}

/// Nothing available and every process still needs one of each.
pub fn textbook_unsafe() -> AllocationState {
    presets::find("textbook-unsafe")
        .expect("preset exists")
        .to_state()
        .expect("preset is well formed")
}

/// Build a state from literal rows.
pub fn state(available: &[i64], max: &[&[i64]], allocation: &[&[i64]]) -> AllocationState {
    let dims = Dimensions::new(max.len(), available.len());
    let rows = |m: &[&[i64]]| m.iter().map(|row| row.to_vec()).collect::<Vec<_>>();
    AllocationState::from_parts(dims, available.to_vec(), rows(max), rows(allocation))
        .expect("fixture is well formed")
}

/// `Need[i][j] == Max[i][j] - Allocation[i][j]` for every cell.
pub fn assert_need_consistent(state: &AllocationState) {
    for i in 0..state.process_count() {
        for j in 0..state.resource_count() {
            assert_eq!(
                state.need()[i][j],
                state.max()[i][j] - state.allocation()[i][j],
                "Need[{i}][{j}]"
            );
        }
    }
}
