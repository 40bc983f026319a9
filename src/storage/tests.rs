//! Tests for storage module

use super::*;
use crate::config::StorageCredentials;
use crate::error::ErrorKind;
use bytes::Bytes;
use object_store::memory::InMemory;
use std::sync::Arc;

fn memory_location(prefix: &str) -> Location {
    Location::from_store(Arc::new(InMemory::new()), prefix)
}

// ============================================================================
// Parsing Tests
// ============================================================================

#[test]
fn test_open_local_output_creates_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("lake");
    let location =
        Location::open_output(path.to_str().unwrap(), &StorageCredentials::default()).unwrap();
    assert!(path.is_dir());
    assert_eq!(location.scheme(), "file");
}

#[test]
fn test_open_local_input_missing_is_input_not_found() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("does-not-exist");
    let err = Location::open_input(path.to_str().unwrap(), &StorageCredentials::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputNotFound);
}

#[test]
fn test_open_file_url() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("file://{}", temp_dir.path().display());
    let location = Location::open_input(&url, &StorageCredentials::default()).unwrap();
    assert_eq!(location.scheme(), "file");
    assert_eq!(location.url(), url);
}

#[tokio::test]
async fn test_open_file_url_with_escaped_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("my lake");
    std::fs::create_dir_all(dir.join("song_data")).unwrap();
    std::fs::write(dir.join("song_data/a.json"), "{}").unwrap();

    let url = format!("file://{}/my%20lake", temp_dir.path().display());
    let location = Location::open_input(&url, &StorageCredentials::default()).unwrap();
    assert_eq!(
        location.list("song_data").await.unwrap(),
        vec!["song_data/a.json".to_string()]
    );
}

#[test]
fn test_open_s3a_with_explicit_credentials() {
    let credentials = StorageCredentials::new("AKIAEXAMPLE", "secret").with_region("us-west-2");
    let location = Location::open_input("s3a://udacity-dend/", &credentials).unwrap();
    assert_eq!(location.scheme(), "s3");
}

#[test]
fn test_open_unknown_scheme_fails() {
    let err = Location::open_input("ftp://host/path", &StorageCredentials::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_display_path() {
    let location = memory_location("lake");
    assert_eq!(
        location.display_path("songs/_SUCCESS"),
        "memory:///lake/songs/_SUCCESS"
    );
}

// ============================================================================
// Object Operation Tests
// ============================================================================

#[tokio::test]
async fn test_put_get_list_relative_to_prefix() {
    let location = memory_location("root/lake");
    location
        .put("songs/year=2000/part-0.parquet", Bytes::from_static(b"a"))
        .await
        .unwrap();
    location
        .put("artists/part-0.parquet", Bytes::from_static(b"b"))
        .await
        .unwrap();

    let all = location.list("").await.unwrap();
    assert_eq!(
        all,
        vec![
            "artists/part-0.parquet".to_string(),
            "songs/year=2000/part-0.parquet".to_string()
        ]
    );

    let songs = location.list("songs").await.unwrap();
    assert_eq!(songs, vec!["songs/year=2000/part-0.parquet".to_string()]);

    let data = location.get("artists/part-0.parquet").await.unwrap();
    assert_eq!(data.as_ref(), b"b");
}

#[tokio::test]
async fn test_list_missing_prefix_is_empty() {
    let location = memory_location("");
    assert!(location.list("nothing/here").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_round_trips_escaped_segments() {
    let location = memory_location("");
    let path = "songs/artist_id=AR%2F1/part-0.parquet";
    location.put(path, Bytes::from_static(b"x")).await.unwrap();

    let listed = location.list("songs").await.unwrap();
    assert_eq!(listed, vec![path.to_string()]);
    assert_eq!(location.get(&listed[0]).await.unwrap().as_ref(), b"x");
}

#[tokio::test]
async fn test_rename_and_delete_prefix() {
    let location = memory_location("");
    location
        .put("_temporary/run/users/part-0.parquet", Bytes::from_static(b"u"))
        .await
        .unwrap();
    location
        .rename("_temporary/run/users/part-0.parquet", "users/part-0.parquet")
        .await
        .unwrap();

    assert!(location.list("_temporary").await.unwrap().is_empty());
    assert_eq!(location.list("users").await.unwrap().len(), 1);

    let removed = location.delete_prefix("users").await.unwrap();
    assert_eq!(removed, 1);
    assert!(location.list("users").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let location =
        Location::open_output(temp_dir.path().to_str().unwrap(), &StorageCredentials::default())
            .unwrap();
    location
        .put("time/year=2018/month=11/part-0.parquet", Bytes::from_static(b"t"))
        .await
        .unwrap();

    assert!(temp_dir
        .path()
        .join("time/year=2018/month=11/part-0.parquet")
        .exists());
    assert_eq!(
        location.list("time").await.unwrap(),
        vec!["time/year=2018/month=11/part-0.parquet".to_string()]
    );
}

// ============================================================================
// Percent Decoding Tests
// ============================================================================

#[test]
fn test_percent_decode() {
    assert_eq!(percent_decode("plain"), "plain");
    assert_eq!(percent_decode("AR%2F1"), "AR/1");
    assert_eq!(percent_decode("a%3Db"), "a=b");
    assert_eq!(percent_decode("100%"), "100%");
    assert_eq!(percent_decode("%zz"), "%zz");
}
