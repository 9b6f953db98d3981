use tempfile::{tempdir, TempDir};

use crate::constants::MB;
use crate::protocol::{self, Command, VERBS};
use crate::Engine;

fn test_engine() -> (Engine, TempDir) {
    let dir = tempdir().unwrap();
    let engine = Engine::builder()
        .data_dir(dir.path())
        .file_capacity(MB)
        .open()
        .unwrap();
    (engine, dir)
}

fn run(engine: &Engine, line: &[u8]) -> Result<Vec<u8>, String> {
    let command = Command::parse(line);
    protocol::handle(engine, &command)
        .map(|bytes| bytes.to_vec())
        .map_err(|err| err.to_string())
}

// ============ Command Parsing Tests ============

#[test]
fn test_parse_bare_verb() {
    let command = Command::parse(b"hi\n");
    assert_eq!(command.verb, "hi");
    assert_eq!(command.body, None);
}

#[test]
fn test_parse_verb_with_body() {
    let command = Command::parse(b"findid 42\n");
    assert_eq!(command.verb, "findid");
    assert_eq!(command.body.as_deref(), Some(b"42".as_slice()));
}

#[test]
fn test_parse_body_keeps_interior_spaces() {
    let command = Command::parse(br#"updateid 4 {"_id":4, "x": 2}"#);
    assert_eq!(command.verb, "updateid");
    assert_eq!(
        command.body.as_deref(),
        Some(br#"4 {"_id":4, "x": 2}"#.as_slice())
    );
}

#[test]
fn test_parse_trims_nul_and_newline_framing() {
    let mut raw = b"hi".to_vec();
    raw.extend_from_slice(&[b'\r', b'\n', 0, 0]);
    let command = Command::parse(&raw);
    assert_eq!(command.verb, "hi");
    assert_eq!(command.body, None);
}

#[test]
fn test_parse_empty_line() {
    let command = Command::parse(b"\n");
    assert_eq!(command.verb, "");
    assert_eq!(command.body, None);
}

// ============ Dispatch Tests ============

#[test]
fn test_hi_greets() {
    let (engine, _dir) = test_engine();
    assert_eq!(run(&engine, b"hi\n").unwrap(), b"hello frand");
}

#[test]
fn test_help_lists_every_verb() {
    let (engine, _dir) = test_engine();
    let help = String::from_utf8(run(&engine, b"help\n").unwrap()).unwrap();
    for verb in VERBS {
        assert!(help.lines().any(|line| line == *verb), "missing {}", verb);
    }
}

#[test]
fn test_unknown_verb() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        run(&engine, b"frobnicate\n").unwrap_err(),
        "Unrecognized command."
    );
}

#[test]
fn test_insert_and_findid() {
    let (engine, _dir) = test_engine();
    assert_eq!(run(&engine, br#"insert {"_id":1,"x":"a"}"#).unwrap(), b"OK");
    assert_eq!(
        run(&engine, b"findid 1").unwrap(),
        br#"{"_id":1,"x":"a"}"#
    );
}

#[test]
fn test_insert_without_body() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        run(&engine, b"insert").unwrap_err(),
        "insert takes a JSON object as its command body"
    );
}

#[test]
fn test_duplicate_insert_reports_unique_constraint() {
    let (engine, _dir) = test_engine();
    run(&engine, br#"insert {"_id":2,"x":"a"}"#).unwrap();
    let err = run(&engine, br#"insert {"_id":2,"x":"b"}"#).unwrap_err();
    assert!(err.contains("unique constraint"), "got: {}", err);
    assert_eq!(
        run(&engine, b"findid 2").unwrap(),
        br#"{"_id":2,"x":"a"}"#
    );
}

#[test]
fn test_findid_not_found_message() {
    let (engine, _dir) = test_engine();
    assert_eq!(run(&engine, b"findid 3").unwrap_err(), "Id 3 not found");
}

#[test]
fn test_findid_bad_integer() {
    let (engine, _dir) = test_engine();
    let err = run(&engine, b"findid pony").unwrap_err();
    assert!(err.contains("invalid integer"), "got: {}", err);
}

#[test]
fn test_deleteid_round_trip() {
    let (engine, _dir) = test_engine();
    run(&engine, br#"insert {"_id":3,"x":1}"#).unwrap();
    assert_eq!(run(&engine, b"deleteid 3").unwrap(), b"OK");
    assert_eq!(run(&engine, b"findid 3").unwrap_err(), "Id 3 not found");
    assert_eq!(run(&engine, br#"insert {"_id":3,"x":2}"#).unwrap(), b"OK");
}

#[test]
fn test_updateid_mismatch_mentions_same_id() {
    let (engine, _dir) = test_engine();
    run(&engine, br#"insert {"_id":4,"x":1}"#).unwrap();
    let err = run(&engine, br#"updateid 4 {"_id":5,"x":2}"#).unwrap_err();
    assert!(err.contains("same _id"), "got: {}", err);
    assert_eq!(
        run(&engine, b"findid 4").unwrap(),
        br#"{"_id":4,"x":1}"#
    );
}

#[test]
fn test_updateid_requires_id_and_body() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        run(&engine, b"updateid 4").unwrap_err(),
        "updateid takes an integer ID and a JSON object as its command body"
    );
}

#[test]
fn test_findall_and_getmore_pages() {
    let (engine, _dir) = test_engine();
    for id in 1..=25 {
        let line = format!(r#"insert {{"_id":{},"x":"a"}}"#, id);
        run(&engine, line.as_bytes()).unwrap();
    }

    assert_eq!(run(&engine, b"findall").unwrap(), b"1");

    let first = run(&engine, b"getmore 1").unwrap();
    assert_eq!(first.split(|&b| b == b'\n').count(), 20);

    let second = run(&engine, b"getmore 1").unwrap();
    assert_eq!(second.split(|&b| b == b'\n').count(), 5);

    assert_eq!(run(&engine, b"getmore 1").unwrap_err(), "cursor exhausted");
}

#[test]
fn test_getmore_unknown_cursor_message() {
    let (engine, _dir) = test_engine();
    assert_eq!(
        run(&engine, b"getmore 42").unwrap_err(),
        "Cursor 42 is not open"
    );
}

#[test]
fn test_index_toggle_responses() {
    let (engine, _dir) = test_engine();
    assert_eq!(run(&engine, b"index off").unwrap(), b"INDICES OFF");
    assert!(!engine.indexed_reads());
    assert_eq!(run(&engine, b"index on").unwrap(), b"INDICES ON");
    assert!(engine.indexed_reads());
    assert_eq!(
        run(&engine, b"index sideways").unwrap_err(),
        "index takes 'on' or 'off' as its command body"
    );
}

#[test]
fn test_flush_responds_ok() {
    let (engine, _dir) = test_engine();
    assert_eq!(run(&engine, b"flush").unwrap(), b"OK");
}

#[test]
fn test_stats_reports_document_count() {
    let (engine, _dir) = test_engine();
    run(&engine, br#"insert {"_id":1,"x":"a"}"#).unwrap();
    run(&engine, br#"insert {"_id":2,"x":"b"}"#).unwrap();
    assert_eq!(run(&engine, b"stats").unwrap(), b"Documents: 2");
}
