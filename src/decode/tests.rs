//! Tests for decoder module

use super::*;
use crate::error::ErrorKind;

// ============================================================================
// JSONL Decoder Tests
// ============================================================================

#[test]
fn test_jsonl_decoder_basic() {
    let decoder = JsonlDecoder::new();
    let body = r#"{"id": 1}
{"id": 2}
{"id": 3}"#;

    let records = decoder.decode(body).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].fields["id"], 1);
    assert_eq!(records[2].fields["id"], 3);
    assert_eq!(records[2].line, 3);
}

#[test]
fn test_jsonl_decoder_empty_lines_keep_line_numbers() {
    let decoder = JsonlDecoder::new();
    let body = "{\"id\": 1}\n\n   \n{\"id\": 2}\n";

    let records = decoder.decode(body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].line, 1);
    assert_eq!(records[1].line, 4);
}

#[test]
fn test_jsonl_decoder_crlf() {
    let decoder = JsonlDecoder::new();
    let records = decoder.decode("{\"a\": 1}\r\n{\"a\": 2}\r\n").unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_jsonl_decoder_empty_body() {
    let decoder = JsonlDecoder::new();
    assert!(decoder.decode("").unwrap().is_empty());
}

#[test]
fn test_jsonl_decoder_invalid_line() {
    let decoder = JsonlDecoder::new();
    let body = r#"{"id": 1}
not valid json
{"id": 2}"#;

    let err = decoder.decode(body).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_jsonl_decoder_rejects_non_object() {
    let decoder = JsonlDecoder::new();
    let err = decoder.decode("{\"id\": 1}\n[1, 2]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("array"));
}
