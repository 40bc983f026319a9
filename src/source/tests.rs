//! Tests for source module

use super::*;
use crate::error::ErrorKind;
use crate::storage::Location;
use bytes::Bytes;
use object_store::memory::InMemory;
use std::sync::Arc;
use test_case::test_case;

async fn memory_source(files: &[(&str, &str)]) -> JsonSource {
    let location = Location::from_store(Arc::new(InMemory::new()), "input");
    for (path, body) in files {
        location
            .put(path, Bytes::from(body.to_string()))
            .await
            .unwrap();
    }
    JsonSource::new(location)
}

// ============================================================================
// PathPattern Tests
// ============================================================================

#[test_case("song_data/*/*/*/*.json", "song_data/A/B/C/TRABCEI.json", true ; "song file")]
#[test_case("song_data/*/*/*/*.json", "song_data/A/B/TRABCEI.json", false ; "too shallow")]
#[test_case("song_data/*/*/*/*.json", "song_data/A/B/C/D/TRABCEI.json", false ; "too deep")]
#[test_case("log_data/*/*/*.json", "log_data/2018/11/2018-11-15-events.json", true ; "log file")]
#[test_case("log_data/*/*/*.json", "log_data/2018/11/2018-11-15-events.jsonl", false ; "wrong extension")]
#[test_case("log_data/2018/1?/*.json", "log_data/2018/11/a.json", true ; "single char")]
#[test_case("data/a.b.json", "data/aXb.json", false ; "dot is literal")]
fn test_path_pattern_matches(pattern: &str, path: &str, expected: bool) {
    let pattern = PathPattern::parse(pattern).unwrap();
    assert_eq!(pattern.matches(path), expected);
}

#[test_case("song_data/*/*/*/*.json", "song_data" ; "wildcards after root")]
#[test_case("log_data/2018/*/*.json", "log_data/2018" ; "two literal segments")]
#[test_case("*.json", "" ; "no literal prefix")]
#[test_case("/data/events.json/", "data" ; "fully literal file")]
fn test_path_pattern_literal_prefix(pattern: &str, prefix: &str) {
    assert_eq!(PathPattern::parse(pattern).unwrap().literal_prefix(), prefix);
}

#[test]
fn test_path_pattern_rejects_empty() {
    assert_eq!(
        PathPattern::parse("/").unwrap_err().kind(),
        ErrorKind::Config
    );
    assert_eq!(
        PathPattern::parse("a//b").unwrap_err().kind(),
        ErrorKind::Config
    );
}

#[test]
fn test_path_pattern_display() {
    let pattern = PathPattern::parse("log_data/*/*/*.json").unwrap();
    assert_eq!(pattern.to_string(), "log_data/*/*/*.json");
}

// ============================================================================
// JsonSource Tests
// ============================================================================

#[tokio::test]
async fn test_json_source_reads_in_lexicographic_order() {
    let source = memory_source(&[
        ("log_data/2018/11/b.json", "{\"n\": 3}\n"),
        ("log_data/2018/11/a.json", "{\"n\": 1}\n{\"n\": 2}\n"),
        ("log_data/2018/11/notes.txt", "ignored"),
    ])
    .await;

    let pattern = PathPattern::parse("log_data/*/*/*.json").unwrap();
    let records = source.read(&pattern).await.unwrap();

    let values: Vec<i64> = records
        .iter()
        .map(|r| r.fields["n"].as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(records[0].shard, 0);
    assert_eq!(records[2].shard, 1);
    assert_eq!(records[1].context(), "log_data/2018/11/a.json:2");
}

#[tokio::test]
async fn test_json_source_no_match_is_input_not_found() {
    let source = memory_source(&[("song_data/A/x.json", "{}\n")]).await;
    let pattern = PathPattern::parse("song_data/*/*/*/*.json").unwrap();

    let err = source.read(&pattern).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputNotFound);
    assert!(err.to_string().contains("song_data/*/*/*/*.json"));
}

#[tokio::test]
async fn test_json_source_empty_files_are_input_not_found() {
    let source = memory_source(&[("log_data/2018/11/a.json", "\n\n")]).await;
    let pattern = PathPattern::parse("log_data/*/*/*.json").unwrap();

    let err = source.read(&pattern).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputNotFound);
}

#[tokio::test]
async fn test_json_source_decode_error_names_file() {
    let source = memory_source(&[("log_data/2018/11/a.json", "{\"n\": 1}\n{oops\n")]).await;
    let pattern = PathPattern::parse("log_data/*/*/*.json").unwrap();

    let err = source.read(&pattern).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    let message = err.to_string();
    assert!(message.contains("log_data/2018/11/a.json"));
    assert!(message.contains("line 2"));
}

#[tokio::test]
async fn test_json_source_local_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("song_data/A/B/C");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("TRAAAAW128F429D538.json"),
        r#"{"song_id": "S1", "title": "Test Song"}"#,
    )
    .unwrap();

    let location = Location::open_input(
        temp_dir.path().to_str().unwrap(),
        &crate::config::StorageCredentials::default(),
    )
    .unwrap();
    let source = JsonSource::new(location);
    let pattern = PathPattern::parse("song_data/*/*/*/*.json").unwrap();

    let records = source.read(&pattern).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields["song_id"], "S1");
    assert_eq!(records[0].line, 1);
}
