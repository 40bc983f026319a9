//! Integration tests against local directories
//!
//! Tests the full end-to-end flow: JSON input tree → pipeline → partitioned
//! Parquet output → read back through the sink

use chrono::{Datelike, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use songlake::cli::{Cli, Runner};
use songlake::config::{PipelineConfig, SinkSettings, StorageCredentials};
use songlake::engine::Pipeline;
use songlake::error::{ErrorKind, Stage};
use songlake::model::{Artist, Song, Songplay, TimeRow, User};
use songlake::sink::{read_relation, ParquetSink};
use songlake::storage::Location;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

struct Lake {
    input: TempDir,
    output: TempDir,
}

impl Lake {
    fn new() -> Self {
        Self {
            input: tempfile::tempdir().unwrap(),
            output: tempfile::tempdir().unwrap(),
        }
    }

    fn write_jsonl(&self, relative: &str, records: &[Value]) {
        let path = self.input.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let body: Vec<String> = records.iter().map(Value::to_string).collect();
        fs::write(path, body.join("\n")).unwrap();
    }

    fn config(&self) -> PipelineConfig {
        PipelineConfig::new(
            self.input.path().to_str().unwrap(),
            self.output.path().to_str().unwrap(),
        )
    }

    async fn run(&self) -> songlake::Result<songlake::RunStats> {
        Pipeline::from_config(&self.config())?.run().await
    }

    fn sink(&self) -> ParquetSink {
        let location = Location::open_input(
            self.output.path().to_str().unwrap(),
            &StorageCredentials::default(),
        )
        .unwrap();
        ParquetSink::new(location, &SinkSettings::default())
    }

    fn output_files(&self, relation: &str) -> Vec<PathBuf> {
        files_under(&self.output.path().join(relation))
    }
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return files;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn catalog_record(song_id: &str, title: &str, artist_id: &str, year: i64) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": format!("Artist {artist_id}"),
        "song_id": song_id,
        "title": title,
        "duration": 180.0,
        "year": year
    })
}

fn log_record(page: &str, user_id: &str, song: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Lily",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Koch",
        "length": null,
        "level": "paid",
        "location": "Chicago-Naperville-Elgin, IL-IN-WI",
        "method": "PUT",
        "page": page,
        "registration": 1_541_048_010_796.0,
        "sessionId": 172,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

const NOV_15: i64 = 1_542_242_826_796;
const DEC_01: i64 = 1_543_622_400_000;

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_end_to_end_scenario() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/A/A/TRAAAAA.json",
        &[json!({"song_id": "S1", "title": "Test Song", "artist_id": "A1", "year": 2000, "duration": 210.5})],
    );
    lake.write_jsonl(
        "log_data/2018/11/2018-11-15-events.json",
        &[json!({
            "page": "NextSong",
            "song": "Test Song",
            "userId": "42",
            "ts": NOV_15,
            "sessionId": 1,
            "level": "free",
            "location": "X",
            "userAgent": "UA"
        })],
    );

    let stats = lake.run().await.unwrap();
    assert_eq!(stats.rows_written("songplays"), 1);

    let songplays: Vec<Songplay> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(songplays.len(), 1);
    let row = &songplays[0];
    assert_eq!(row.song_id.as_deref(), Some("S1"));
    assert_eq!(row.artist_id.as_deref(), Some("A1"));
    assert_eq!(row.user_id, "42");
    assert_eq!((row.year, row.month), (2018, 11));
    assert_eq!(row.start_time.timestamp_millis(), NOV_15);

    let songs: Vec<Song> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(songs[0].year, 2000);
    assert!((songs[0].duration - 210.5).abs() < f64::EPSILON);

    let artists: Vec<Artist> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, None);

    let out = lake.output.path();
    assert!(out.join("songs/year=2000/artist_id=A1").is_dir());
    assert!(out.join("songplays/year=2018/month=11").is_dir());
    assert!(out.join("time/year=2018/month=11").is_dir());
    for relation in ["songs", "artists", "users", "time", "songplays"] {
        assert!(out.join(relation).join("_SUCCESS").is_file(), "{relation}");
    }
    assert!(files_under(&out.join("_temporary")).is_empty());
}

#[tokio::test]
async fn test_only_next_song_events_reach_time_and_songplays() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/B/C/TRABC.json",
        &[catalog_record("S1", "Intro", "A1", 2010)],
    );
    lake.write_jsonl(
        "log_data/2018/11/2018-11-15-events.json",
        &[
            log_record("Home", "10", "Intro", NOV_15 - 5_000),
            log_record("NextSong", "10", "Intro", NOV_15),
            log_record("Logout", "11", "Intro", NOV_15 + 5_000),
            log_record("NextSong", "12", "Intro", NOV_15 + 10_000),
        ],
    );

    let stats = lake.run().await.unwrap();
    assert_eq!(stats.filtered_out, 2);

    let next_song_ts = [NOV_15, NOV_15 + 10_000];
    let time: Vec<TimeRow> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(time.len(), 2);
    assert!(time
        .iter()
        .all(|t| next_song_ts.contains(&t.start_time.timestamp_millis())));

    let songplays: Vec<Songplay> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(songplays.len(), 2);
    assert!(songplays
        .iter()
        .all(|p| next_song_ts.contains(&p.start_time.timestamp_millis())));

    let mut users: Vec<User> = read_relation(&lake.sink()).await.unwrap();
    users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    let ids: Vec<&str> = users.iter().map(|u| u.user_id.as_str()).collect();
    assert_eq!(ids, vec!["10", "12"]);
}

#[tokio::test]
async fn test_partition_values_match_row_values() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/A/A/a.json",
        &[
            catalog_record("S1", "Intro", "A1", 2010),
            catalog_record("S2", "Outro", "A2", 2012),
        ],
    );
    lake.write_jsonl(
        "log_data/2018/11/2018-11-15-events.json",
        &[
            log_record("NextSong", "10", "Intro", NOV_15),
            log_record("NextSong", "10", "Missing", NOV_15 + 1),
        ],
    );
    lake.write_jsonl(
        "log_data/2018/12/2018-12-01-events.json",
        &[log_record("NextSong", "11", "Outro", DEC_01)],
    );

    let stats = lake.run().await.unwrap();
    assert_eq!(stats.unmatched, 1);

    let songplays: Vec<Songplay> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(songplays.len(), 2);
    for row in &songplays {
        assert_eq!(row.year, row.start_time.year());
        assert_eq!(row.month, row.start_time.month() as i32);
    }

    let time: Vec<TimeRow> = read_relation(&lake.sink()).await.unwrap();
    for row in &time {
        assert_eq!(row.year, row.start_time.year());
        assert_eq!(row.month, row.start_time.month() as i32);
        assert_eq!(TimeRow::from_start_time(row.start_time), *row);
    }

    // Every file sits under the directory of its own rows
    for file in lake.output_files("songplays") {
        let text = file.to_string_lossy().to_string();
        if text.ends_with("_SUCCESS") {
            continue;
        }
        assert!(text.contains("year=2018/month=11/") || text.contains("year=2018/month=12/"));
    }

    // Ids are unique and carry the shard of their input file
    let mut ids: Vec<i64> = songplays.iter().map(|p| p.songplay_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1_i64 << 33]);

    let songs: Vec<Song> = read_relation(&lake.sink()).await.unwrap();
    assert!(lake
        .output
        .path()
        .join("songs/year=2012/artist_id=A2")
        .is_dir());
    assert_eq!(songs.len(), 2);
}

#[tokio::test]
async fn test_second_run_overwrites_with_identical_result() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/A/A/a.json",
        &[catalog_record("S1", "Intro", "A1", 2010)],
    );
    lake.write_jsonl(
        "log_data/2018/11/a.json",
        &[
            log_record("NextSong", "10", "Intro", NOV_15),
            log_record("NextSong", "10", "Intro", NOV_15 + 1_000),
        ],
    );

    lake.run().await.unwrap();
    let first_files = lake.output_files("songplays").len();
    let mut first: Vec<Songplay> = read_relation(&lake.sink()).await.unwrap();

    lake.run().await.unwrap();
    let second_files = lake.output_files("songplays").len();
    let mut second: Vec<Songplay> = read_relation(&lake.sink()).await.unwrap();

    first.sort_by_key(|p| p.songplay_id);
    second.sort_by_key(|p| p.songplay_id);
    assert_eq!(first, second);
    assert_eq!(first_files, second_files);

    let users: Vec<User> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(users.len(), 1);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_empty_input_is_input_not_found() {
    let lake = Lake::new();
    let err = lake.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputNotFound);
    assert_eq!(err.stage(), Some(Stage::Catalog));
}

#[tokio::test]
async fn test_malformed_timestamp_fails_activity_stage() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/A/A/a.json",
        &[catalog_record("S1", "Intro", "A1", 2010)],
    );
    let mut bad = log_record("NextSong", "10", "Intro", NOV_15);
    bad["ts"] = json!(-1);
    lake.write_jsonl("log_data/2018/11/a.json", &[bad]);

    let err = lake.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedTimestamp);
    assert_eq!(err.stage(), Some(Stage::Activity));
    assert!(err.to_string().contains("log_data/2018/11/a.json:1"));

    // The catalog stage committed before the failure
    assert!(lake.output.path().join("songs/_SUCCESS").is_file());
    assert!(!lake.output.path().join("users/_SUCCESS").exists());
}

#[tokio::test]
async fn test_missing_required_field_is_schema_mismatch() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/A/A/a.json",
        &[json!({"song_id": "S1", "artist_id": "A1", "year": 2000, "duration": 1.0})],
    );

    let err = lake.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    assert_eq!(err.stage(), Some(Stage::Catalog));
}

// ============================================================================
// CLI Tests
// ============================================================================

#[tokio::test]
async fn test_runner_with_flags() {
    let lake = Lake::new();
    lake.write_jsonl(
        "song_data/A/A/A/a.json",
        &[catalog_record("S1", "Intro", "A1", 2010)],
    );
    lake.write_jsonl(
        "log_data/2018/11/a.json",
        &[log_record("NextSong", "10", "Intro", NOV_15)],
    );

    let cli = <Cli as clap::Parser>::try_parse_from([
        "songlake",
        "--input",
        lake.input.path().to_str().unwrap(),
        "--output",
        lake.output.path().to_str().unwrap(),
    ])
    .unwrap();
    let stats = Runner::new(cli).run().await.unwrap();
    assert_eq!(stats.rows_written("songplays"), 1);
    assert_eq!(stats.rows_written("artists"), 1);

    let start = Utc.timestamp_millis_opt(NOV_15).unwrap();
    let time: Vec<TimeRow> = read_relation(&lake.sink()).await.unwrap();
    assert_eq!(time, vec![TimeRow::from_start_time(start)]);
}
