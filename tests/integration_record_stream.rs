//! Integration tests for the record stream against task files on disk
//!
//! Each test writes a small task file into a temporary directory and reads it
//! back through the public parser API.

use std::fs;
use std::path::PathBuf;
use taskscript::parser::cleaner::{strip_fence, unquote_field};
use taskscript::parser::{RecordStream, split_fields};
use taskscript::{ParsedRecord, TaskError};
use tempfile::TempDir;

const SCENARIO: &str = "1,Alice,yes,fnA,\"What is X?\",```
a = 1
```,```
result = a
```
2,Bob,no,fnB,\"q2\",```
b = 2
```,```
result = b
```
";

fn write_tasks(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("AllTask.csv");
    fs::write(&path, content).unwrap();
    path
}

fn records_for(content: &str, owner: &str) -> Vec<ParsedRecord> {
    let dir = TempDir::new().unwrap();
    let path = write_tasks(&dir, content);
    RecordStream::open(&path, owner).unwrap().collect()
}

/// Owner filtering over a two-record file
///
/// Purpose: Validate the end-to-end path from file lines to filtered records
/// Benefit: Covers boundary detection, splitting, cleaning and projection together
#[test]
fn test_scenario_filters_by_owner() {
    let alice = records_for(SCENARIO, "Alice");
    assert_eq!(
        alice,
        vec![ParsedRecord {
            id: "1".to_string(),
            owner: "Alice".to_string(),
            question: "What is X?".to_string(),
            prepare_code: "a = 1".to_string(),
            run_code: "result = a".to_string(),
        }]
    );

    let bob = records_for(SCENARIO, "Bob");
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].id, "2");
    assert_eq!(bob[0].question, "q2");
    assert_eq!(bob[0].run_code, "result = b");

    assert!(records_for(SCENARIO, "Carol").is_empty());
}

#[test]
fn test_windows_line_endings() {
    let content = SCENARIO.replace('\n', "\r\n");
    let alice = records_for(&content, "Alice");

    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].prepare_code, "a = 1");
    assert_eq!(alice[0].run_code, "result = a");
}

#[test]
fn test_plain_fields_round_trip() {
    let fields = ["17", "Dana", "yes", "fnQ", "plain question", "x = 1", "result = x"];
    let joined = fields.join(",");

    assert_eq!(split_fields(&joined, ',', Some(6)), fields);
}

#[test]
fn test_escaped_quotes_in_question() {
    let fields = split_fields("3,Alice,no,fnC,\"he said \"\"hi\"\"\",a,b", ',', Some(6));

    assert_eq!(fields.len(), 7);
    assert_eq!(unquote_field(&fields[4]), "he said \"hi\"");
}

#[test]
fn test_escaped_empty_string_in_question() {
    let content = "6,Alice,no,fnF,\"use \"\"\"\" for empty\",p,r\n";
    let records = records_for(content, "Alice");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].question, "use \"\" for empty");
}

#[test]
fn test_fenced_field_keeps_commas_and_newlines() {
    let fields = split_fields("4,Alice,no,fnD,q,```\nx = 1, y = 2\n```,r", ',', Some(6));

    assert_eq!(fields.len(), 7);
    assert_eq!(strip_fence(&fields[5]), "x = 1, y = 2");
    assert_eq!(fields[6], "r");
}

#[test]
fn test_split_cap_keeps_remaining_commas() {
    let fields = split_fields("5,Alice,no,fnE,q,p,r1,r2,r3", ',', Some(6));

    assert_eq!(fields.len(), 7);
    assert_eq!(fields[6], "r1,r2,r3");
}

#[test]
fn test_numbered_line_starts_new_record() {
    let content = "7,Alice,no,fnG,q,p,r\ncontinued text\n42,anything\n";
    let dir = TempDir::new().unwrap();
    let path = write_tasks(&dir, content);

    let mut stream = RecordStream::open(&path, "Alice").unwrap();
    let records: Vec<_> = stream.by_ref().collect();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "7");
    assert_eq!(records[0].run_code, "r\ncontinued text");

    // "42,anything" was its own record and too short to project
    assert_eq!(stream.stats().records_seen, 2);
    assert_eq!(stream.stats().records_malformed, 1);
}

#[test]
fn test_owner_match_is_exact() {
    let content = "1,Alice,no,fnA,q,p,r\n2,alice,no,fnB,q,p,r\n3,Alice Smith,no,fnC,q,p,r\n4, Alice ,no,fnD,q,p,r\n";
    let ids: Vec<_> = records_for(content, "Alice")
        .into_iter()
        .map(|r| r.id)
        .collect();

    // Owner values are trimmed before comparison; case and extra words are not ignored
    assert_eq!(ids, vec!["1", "4"]);
}

/// Malformed record isolation
///
/// Purpose: Validate that a record with too few fields is skipped
/// Benefit: One bad record never stops the rest of the file from being read
#[test]
fn test_malformed_record_is_isolated() {
    let content = "1,Alice,yes,fnA\n2,Alice,no,fnB,\"Q?\",```\nb = 2\n```,```\nresult = b\n```\n";
    let dir = TempDir::new().unwrap();
    let path = write_tasks(&dir, content);

    let mut stream = RecordStream::open(&path, "Alice").unwrap();
    let records: Vec<_> = stream.by_ref().collect();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "2");
    assert_eq!(records[0].prepare_code, "b = 2");
    assert_eq!(stream.stats().records_malformed, 1);
    assert_eq!(stream.stats().records_skipped(), 1);
    assert!(stream.take_error().is_none());
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");

    match RecordStream::open(&missing, "Alice") {
        Err(TaskError::SourceUnavailable { path, .. }) => assert_eq!(path, missing),
        Err(other) => panic!("Expected SourceUnavailable, got {:?}", other),
        Ok(_) => panic!("Expected SourceUnavailable, got a stream"),
    }
}

#[test]
fn test_empty_file_yields_nothing() {
    assert!(records_for("", "Alice").is_empty());
}
