//! State file round trips through the codec and crash-safe writer.

use banker_core::{StateError, codec, request_and_commit};
use banker_utils::{SyncPolicy, WriteOptions, read_state_file, write_state_file};
use tempfile::tempdir;

use crate::common::{assert_need_consistent, textbook_safe};

const FAST: WriteOptions = WriteOptions {
    sync: SyncPolicy::SkipSync,
    create_parents: true,
};

#[test]
fn committed_state_survives_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut live = textbook_safe();
    request_and_commit(&mut live, 1, &[1, 0, 2]).unwrap();
    write_state_file(&path, codec::to_json(&live).unwrap().as_bytes(), FAST).unwrap();

    let text = read_state_file(&path).unwrap().unwrap();
    let reloaded = codec::from_json(&text).unwrap();
    assert_eq!(reloaded, live);
}

#[test]
fn tampered_need_on_disk_is_recomputed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut doc = serde_json::to_value(codec::export(&textbook_safe())).unwrap();
    doc["need"] = serde_json::json!([[0, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]]);
    write_state_file(&path, doc.to_string().as_bytes(), FAST).unwrap();

    let reloaded = codec::from_json(&read_state_file(&path).unwrap().unwrap()).unwrap();
    assert_eq!(reloaded.need()[0], vec![7, 4, 3]);
    assert_need_consistent(&reloaded);
    assert_eq!(reloaded, textbook_safe());
}

#[test]
fn truncated_state_file_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let text = codec::to_json(&textbook_safe()).unwrap();
    write_state_file(&path, &text.as_bytes()[..text.len() / 2], FAST).unwrap();

    let err = codec::from_json(&read_state_file(&path).unwrap().unwrap()).unwrap_err();
    assert!(matches!(err, StateError::MalformedState { .. }));
}

#[test]
fn csv_export_matches_matrices() {
    insta::assert_snapshot!(codec::to_csv(&textbook_safe()), @r"
    Matrix,Process,R0,R1,R2
    Available,-,3,3,2
    Max,P0,7,5,3
    Max,P1,3,2,2
    Max,P2,9,0,2
    Max,P3,2,2,2
    Max,P4,4,3,3
    Allocation,P0,0,1,0
    Allocation,P1,2,0,0
    Allocation,P2,3,0,2
    Allocation,P3,2,1,1
    Allocation,P4,0,0,2
    Need,P0,7,4,3
    Need,P1,1,2,2
    Need,P2,6,0,0
    Need,P3,0,1,1
    Need,P4,4,3,1
    ");
}
