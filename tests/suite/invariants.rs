//! Properties that must hold across sequences of edits, evaluations and commits.

use banker_core::{StateError, check_safety, evaluate, request_and_commit};

use crate::common::{assert_need_consistent, textbook_safe, textbook_unsafe};

#[test]
fn need_tracks_every_row_edit_and_commit() {
    let mut live = textbook_safe();

    live.set_max_row(2, &[9, 1, 2]).unwrap();
    assert_need_consistent(&live);

    live.set_allocation_row(4, &[1, 0, 2]).unwrap();
    assert_need_consistent(&live);

    request_and_commit(&mut live, 1, &[1, 0, 2]).unwrap();
    assert_need_consistent(&live);

    // Mid-edit: Allocation above Max leaves a negative Need, still consistent.
    live.set_allocation_row(3, &[3, 1, 1]).unwrap();
    assert_eq!(live.need()[3], vec![-1, 1, 1]);
    assert_need_consistent(&live);
}

#[test]
fn allocation_above_max_blocks_evaluation_until_repaired() {
    let mut live = textbook_safe();
    live.set_allocation_row(3, &[3, 1, 1]).unwrap();
    let edited = live.clone();
    let over = StateError::AllocationExceedsMax {
        process: 3,
        resource: 0,
    };

    // Requests from any process are refused, not approved on a state
    // whose negative Need would inflate Work.
    assert_eq!(evaluate(&live, 1, &[1, 0, 2]).unwrap_err(), over);
    assert_eq!(request_and_commit(&mut live, 1, &[1, 0, 2]).unwrap_err(), over);
    assert_eq!(live, edited);

    live.set_max_row(3, &[3, 2, 2]).unwrap();
    assert!(evaluate(&live, 1, &[1, 0, 2]).unwrap().is_approved());
}

#[test]
fn denied_requests_leave_live_state_untouched() {
    let live = textbook_safe();
    let before = live.clone();

    for (process, request) in [
        (0, vec![8, 0, 0]), // above need
        (0, vec![0, 4, 0]), // above available
        (4, vec![3, 3, 0]), // unsafe after grant
    ] {
        let result = evaluate(&live, process, &request).unwrap();
        assert!(!result.is_approved(), "P{process} {request:?}");
        assert_eq!(live, before);
    }
}

#[test]
fn malformed_requests_are_errors_not_denials() {
    let live = textbook_safe();

    assert_eq!(
        evaluate(&live, 5, &[0, 0, 0]).unwrap_err(),
        StateError::IndexOutOfRange { index: 5, len: 5 }
    );
    assert_eq!(
        evaluate(&live, 0, &[0, 0]).unwrap_err(),
        StateError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    );
    assert_eq!(
        evaluate(&live, 0, &[0, -1, 0]).unwrap_err(),
        StateError::NegativeUnits { index: 1, value: -1 }
    );
}

#[test]
fn grants_conserve_total_supply() {
    let mut live = textbook_safe();
    let supply = live.total_supply().unwrap();
    assert_eq!(supply, vec![10, 5, 7]);

    request_and_commit(&mut live, 1, &[1, 0, 2]).unwrap();
    request_and_commit(&mut live, 3, &[0, 1, 0]).unwrap();
    assert_eq!(live.total_supply().unwrap(), supply);
}

#[test]
fn safety_check_is_deterministic_and_read_only() {
    for live in [textbook_safe(), textbook_unsafe()] {
        let before = live.clone();
        let first = check_safety(&live).unwrap();
        for _ in 0..10 {
            assert_eq!(check_safety(&live).unwrap(), first);
        }
        assert_eq!(live, before);
    }
}

#[test]
fn recomputing_needs_is_idempotent() {
    let mut live = textbook_safe();
    live.recompute_all_needs();
    let once = live.need().to_vec();
    live.recompute_all_needs();
    assert_eq!(live.need(), once.as_slice());
}

#[test]
fn stale_approval_cannot_be_committed() {
    let mut live = textbook_safe();
    let result = evaluate(&live, 1, &[1, 0, 2]).unwrap();
    let approved = result.approved().unwrap().clone();

    live.set_available(&[3, 3, 3]).unwrap();
    let edited = live.clone();

    assert_eq!(approved.commit(&mut live), Err(StateError::StaleApproval));
    assert_eq!(live, edited);
}
