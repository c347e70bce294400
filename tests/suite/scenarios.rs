//! End-to-end decisions on known states.

use banker_core::{DenialReason, TraceMode, check, check_safety, evaluate, presets};

use crate::common::{assert_need_consistent, state, textbook_safe, textbook_unsafe};

#[test]
fn known_safe_state_reports_scan_order() {
    let report = check_safety(&textbook_safe()).unwrap();
    assert!(report.safe);
    assert_eq!(report.safe_sequence, vec![1, 3, 0, 2, 4]);
}

#[test]
fn known_unsafe_state_reports_empty_sequence() {
    let report = check_safety(&textbook_unsafe()).unwrap();
    assert!(!report.safe);
    assert!(report.safe_sequence.is_empty());
}

#[test]
fn request_above_need_is_denied() {
    let live = state(&[5, 5, 5], &[&[2, 2, 2]], &[&[0, 0, 0]]);
    assert_eq!(live.need()[0], vec![2, 2, 2]);

    let result = evaluate(&live, 0, &[3, 0, 0]).unwrap();
    assert!(!result.is_approved());
    assert_eq!(result.reason_code(), "request_exceeds");
    assert!(result.safe_sequence().is_empty());
}

#[test]
fn request_above_available_is_denied() {
    let live = state(&[1, 0, 0], &[&[3, 0, 0]], &[&[0, 0, 0]]);

    let result = evaluate(&live, 0, &[2, 0, 0]).unwrap();
    assert_eq!(
        result.denial_reason(),
        Some(DenialReason::InsufficientResources)
    );
}

#[test]
fn approved_request_commits_and_stays_safe() {
    let mut live = textbook_safe();

    let result = evaluate(&live, 1, &[1, 0, 2]).unwrap();
    assert!(result.is_approved());
    assert_eq!(result.reason_code(), "safe");
    assert!(!result.safe_sequence().is_empty());

    result.approved().unwrap().commit(&mut live).unwrap();
    assert_eq!(live.available(), &[2, 3, 0]);
    assert_eq!(live.allocation()[1], vec![3, 0, 2]);
    assert_eq!(live.need()[1], vec![0, 2, 0]);
    assert_need_consistent(&live);

    assert!(check_safety(&live).unwrap().safe);
}

#[test]
fn follow_up_request_can_become_unsafe() {
    let mut live = textbook_safe();
    banker_core::request_and_commit(&mut live, 1, &[1, 0, 2]).unwrap();

    let result = evaluate(&live, 0, &[0, 2, 0]).unwrap();
    assert_eq!(result.denial_reason(), Some(DenialReason::Unsafe));
}

#[test]
fn scan_restarts_from_first_process_after_each_admission() {
    // A single forward sweep would yield [1, 2, 0].
    let live = state(&[1], &[&[2], &[2], &[1]], &[&[0], &[1], &[0]]);
    assert_eq!(check_safety(&live).unwrap().safe_sequence, vec![1, 0, 2]);
}

#[test]
fn trace_of_unsafe_state_keeps_partial_progress() {
    // P0 can finish, then nothing else fits.
    let live = state(&[1, 0], &[&[1, 0], &[3, 3]], &[&[0, 0], &[1, 1]]);
    let report = check(&live, TraceMode::Steps).unwrap();

    assert!(!report.safe);
    assert!(report.safe_sequence.is_empty());
    let last = report.steps.last().unwrap();
    assert_eq!(last.iteration, 3);
    assert_eq!(last.safe_sequence, vec![0]);
    assert_eq!(last.finished, vec![true, false]);
}

#[test]
fn every_preset_has_expected_verdict() {
    let verdicts: Vec<(&str, bool)> = presets::all()
        .iter()
        .map(|p| (p.slug, check_safety(&p.to_state().unwrap()).unwrap().safe))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("textbook-safe", true),
            ("textbook-unsafe", false),
            ("banking-loans", true),
        ]
    );
}
