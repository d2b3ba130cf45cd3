//! crates/psup_io/tests/roundtrip_files.rs
//! Load and write the wire documents through real files.

use std::fs;

use assert_json_diff::assert_json_eq;
use psup_core::{AdmissionOutput, BoardingGroupId, CandidateId, ProgramGroupId, WishStatus};
use psup_io::{hasher, writer, IoError, JsonFileSink, JsonFileSource};
use serde_json::{json, Value};

fn input_doc() -> Value {
    json!({
        "params": { "day": 3, "boarding_reservation_end_day": 12, "gdd_start_day": 40 },
        "groups": [
            { "id": { "ranking_group": 7, "institution": 70, "program": 700 }, "capacity": 2,
              "last_called_rank": 4, "last_called_rank_before": 2 },
            { "id": { "ranking_group": 8, "institution": 70, "program": 800 }, "capacity": 1,
              "admission_stop": 1 }
        ],
        "boarding_groups": [ { "id": { "boarding": 70, "program": 0 }, "capacity": 3 } ],
        "wishes": [
            { "candidate": 11, "group": { "ranking_group": 7, "institution": 70, "program": 700 },
              "call_order": 5, "displayed_call_order": 5, "preference_rank": 2, "status": "AWAITING",
              "boarding_group": { "boarding": 70, "program": 0 }, "boarding_rank": 3 },
            { "candidate": 12, "group": { "ranking_group": 8, "institution": 70, "program": 800 },
              "call_order": 1, "status": "OFFERED_PREVIOUSLY_AWAITING_REPLY", "boarding_requested": true }
        ],
        "responder_candidates": [11]
    })
}

fn write_doc(dir: &tempfile::TempDir, name: &str, v: &Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(v).unwrap()).unwrap();
    path
}

#[test]
fn loaded_input_keeps_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let input = JsonFileSource::new(write_doc(&dir, "in.json", &input_doc())).load().unwrap();

    assert_eq!(input.params.day, 3);
    let g7 = &input.groups()[&ProgramGroupId::new(7, 70, 700)];
    assert_eq!(g7.capacity, 2);
    assert!(g7.is_open());
    assert!(!input.groups()[&ProgramGroupId::new(8, 70, 800)].is_open());
    assert_eq!(input.boarding_groups()[&BoardingGroupId::new(70, 0)].capacity(), 3);

    let w = &input.wishes()[0];
    assert_eq!(w.boarding, Some(BoardingGroupId::new(70, 0)));
    assert_eq!(w.boarding_rank, 3);
    assert_eq!(w.preference_rank, 2);
    let w = &input.wishes()[1];
    assert!(w.id.boarding && w.boarding.is_none());
    assert_eq!(w.status, WishStatus::OfferedPreviouslyAwaitingReply);
    assert!(input.responders().contains(&CandidateId(11)));
}

#[test]
fn archived_input_is_canonical_and_stable() {
    let dir = tempfile::tempdir().unwrap();
    let input = JsonFileSource::new(write_doc(&dir, "in.json", &input_doc())).load().unwrap();

    let archive = dir.path().join("archive").join("day3.json");
    writer::write_input_path(&archive, &input).unwrap();
    let text = fs::read_to_string(&archive).unwrap();
    assert!(text.ends_with('\n') && !text.ends_with("\n\n"));
    assert!(!text.contains(": "));

    let again = JsonFileSource::new(&archive).load().unwrap();
    assert_eq!(hasher::input_digest(&again).unwrap(), hasher::input_digest(&input).unwrap());
    assert_json_eq!(writer::input_value(&again).unwrap(), writer::input_value(&input).unwrap());
}

#[test]
fn output_document_shape() {
    let dir = tempfile::tempdir().unwrap();
    let input = JsonFileSource::new(write_doc(&dir, "in.json", &input_doc())).load().unwrap();
    let mut output = AdmissionOutput::new(input.params);
    output.wishes = input.wishes().to_vec();
    output.boarding_groups = input.boarding_groups().clone();
    output.groups = input.groups().clone();
    output.thresholds.insert(BoardingGroupId::new(70, 0), 2);
    output.max_thresholds.insert(BoardingGroupId::new(70, 0), 3);
    output.set_warning();

    let out = dir.path().join("out.json");
    JsonFileSink::new(&out).write_output(&output).unwrap();
    let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

    assert_json_eq!(
        v["thresholds"],
        json!([ { "boarding_group": { "boarding": 70, "program": 0 }, "value": 2 } ])
    );
    assert_json_eq!(
        v["max_thresholds"],
        json!([ { "boarding_group": { "boarding": 70, "program": 0 }, "value": 3 } ])
    );
    assert_eq!(v["warning"], json!(true));
    assert_eq!(v["alert"], json!(false));
    assert_eq!(v["wishes"][0]["status"], json!("AWAITING"));
    assert_eq!(v["wishes"][0]["iteration"], json!(0));
    assert_eq!(v["groups"].as_array().unwrap().len(), 2);
}

#[test]
fn schema_violations_name_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = input_doc();
    doc["wishes"][1]["surprise"] = json!(1);
    match JsonFileSource::new(write_doc(&dir, "bad.json", &doc)).load() {
        Err(IoError::Schema { pointer, .. }) => assert!(pointer.starts_with("/wishes/1")),
        other => panic!("expected schema error, got {other:?}"),
    }
}
