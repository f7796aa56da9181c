//! CLI end-to-end tests
//!
//! Tests for the hlsrec command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the hlsrec binary
#[allow(deprecated)]
fn hlsrec_cmd() -> Command {
    Command::cargo_bin("hlsrec").unwrap()
}

/// Write payload files and an event log describing one init segment,
/// two media segments and one frameless media segment.
fn write_event_log(dir: &Path) -> PathBuf {
    fs::create_dir_all(dir.join("raw")).unwrap();
    fs::write(dir.join("raw/init.bin"), b"ftypmoov").unwrap();
    fs::write(dir.join("raw/1.bin"), b"moofmdat-1").unwrap();
    fs::write(dir.join("raw/2.bin"), b"moofmdat-2").unwrap();
    fs::write(dir.join("raw/3.bin"), b"moof").unwrap();

    let lines = [
        r#"{"payload": "raw/init.bin", "kind": "initialization"}"#,
        r#"{"payload": "raw/1.bin", "kind": "media", "report": {"track_reports": [{"media_type": "video", "duration": {"value": 2360, "timescale": 600}}]}}"#,
        r#"{"payload": "raw/3.bin", "kind": "media", "report": {"track_reports": [{"media_type": "video", "duration": {"value": 0, "timescale": 600}}]}}"#,
        r#"{"payload": "raw/2.bin", "kind": "media", "report": {"track_reports": [{"media_type": "audio", "duration": {"value": 2400, "timescale": 600}}, {"media_type": "video", "duration": {"value": 2400, "timescale": 600}}]}}"#,
    ];
    let log = dir.join("events.jsonl");
    fs::write(&log, lines.join("\n")).unwrap();
    log
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = hlsrec_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = hlsrec_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hlsrec"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = hlsrec_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hlsrec"));
}

#[test]
fn test_cli_ingest_help() {
    let mut cmd = hlsrec_cmd();
    cmd.args(["ingest", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replay a segment event log"));
}

#[test]
fn test_cli_ingest_writes_playlist() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let log = write_event_log(input.path());

    let mut cmd = hlsrec_cmd();
    cmd.arg("ingest")
        .arg(&log)
        .arg("--output")
        .arg(output.path())
        .args(["--prefix", "clip", "--interval", "4.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted: 3"))
        .stdout(predicate::str::contains("Skipped: 1"));

    let manifest = fs::read_to_string(output.path().join("clip.m3u8")).unwrap();
    let expected = "\
#EXTM3U
#EXT-X-VERSION:6
#EXT-X-TARGETDURATION:5
#EXT-X-MEDIA-SEQUENCE:0
#EXT-X-PLAYLIST-TYPE:VOD
#EXT-X-INDEPENDENT-SEGMENTS
#EXT-X-MAP:URI=\"clip-0-init.mp4\"
#EXTINF:3.933333,
clip-1.m4s
#EXTINF:4.000000,
clip-3.m4s
#EXT-X-ENDLIST
";
    assert_eq!(manifest, expected);
    assert_eq!(
        fs::read(output.path().join("clip-3.m4s")).unwrap(),
        b"moofmdat-2"
    );
    // The frameless segment is still persisted under its own name.
    assert!(output.path().join("clip-2.m4s").exists());
}

#[test]
fn test_cli_ingest_print_events() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let log = write_event_log(input.path());

    let mut cmd = hlsrec_cmd();
    let assert = cmd
        .arg("ingest")
        .arg(&log)
        .arg("--output")
        .arg(output.path())
        .args(["--prefix", "clip", "--print-events"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["payload"]["type"], "segment_created");
    assert_eq!(events[0]["payload"]["segment"]["order"], 0);
    assert_eq!(events[2]["payload"]["segment"]["order"], 3);
    assert_eq!(events[3]["payload"]["type"], "recording_finished");
    assert_eq!(events[3]["payload"]["segments"], 3);
}

#[test]
fn test_cli_ingest_no_manifest() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let log = write_event_log(input.path());

    let mut cmd = hlsrec_cmd();
    cmd.arg("ingest")
        .arg(&log)
        .arg("--output")
        .arg(output.path())
        .args(["--prefix", "clip", "--no-manifest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest: none"));

    assert!(!output.path().join("clip.m3u8").exists());
    assert!(output.path().join("clip-1.m4s").exists());
}

#[test]
fn test_cli_ingest_missing_video_track_fails() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    fs::write(input.path().join("a.bin"), b"moof").unwrap();
    let log = input.path().join("events.jsonl");
    fs::write(
        &log,
        r#"{"payload": "a.bin", "kind": "media", "report": {"track_reports": []}}"#,
    )
    .unwrap();

    let mut cmd = hlsrec_cmd();
    cmd.arg("ingest")
        .arg(&log)
        .arg("--output")
        .arg(output.path())
        .args(["--prefix", "clip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no video track"));

    let manifest = fs::read_to_string(output.path().join("clip.m3u8")).unwrap();
    assert!(manifest.ends_with("#EXT-X-INDEPENDENT-SEGMENTS\n#EXT-X-ENDLIST\n"));
}

#[test]
fn test_cli_ingest_logs_debug_by_default() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let log = write_event_log(input.path());

    let mut cmd = hlsrec_cmd();
    cmd.env_remove("RUST_LOG")
        .arg("ingest")
        .arg(&log)
        .arg("--output")
        .arg(output.path())
        .args(["--prefix", "clip"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote segment file"));
}

#[test]
fn test_cli_ingest_huge_duration_still_finalizes() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    fs::write(input.path().join("a.bin"), b"moof").unwrap();
    let log = input.path().join("events.jsonl");
    fs::write(
        &log,
        r#"{"payload": "a.bin", "kind": "media", "report": {"track_reports": [{"media_type": "video", "duration": {"value": 9223372036854775807, "timescale": 1}}]}}"#,
    )
    .unwrap();

    let mut cmd = hlsrec_cmd();
    cmd.arg("ingest")
        .arg(&log)
        .arg("--output")
        .arg(output.path())
        .args(["--prefix", "clip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted: 1"));

    let manifest = fs::read_to_string(output.path().join("clip.m3u8")).unwrap();
    assert!(manifest.ends_with("clip-0.m4s\n#EXT-X-ENDLIST\n"));
}

#[test]
fn test_cli_ingest_missing_log() {
    let mut cmd = hlsrec_cmd();
    cmd.args(["ingest", "/nonexistent/events.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_render() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.json");
    fs::write(
        &path,
        r#"{"target_duration": 7, "init_segment_uri": "init.mp4", "segments": [{"duration": 6.0, "uri": "seg-1.m4s"}], "ended": true}"#,
    )
    .unwrap();

    let mut cmd = hlsrec_cmd();
    cmd.arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#EXTM3U\n"))
        .stdout(predicate::str::contains("#EXT-X-TARGETDURATION:7"))
        .stdout(predicate::str::contains("#EXTINF:6.000000,\nseg-1.m4s\n"))
        .stdout(predicate::str::ends_with("#EXT-X-ENDLIST\n"));
}

#[test]
fn test_cli_validate_default() {
    let mut cmd = hlsrec_cmd();
    cmd.arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("segment.m3u8"));
}

#[test]
fn test_cli_validate_warns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hlsrec.json");
    fs::write(&path, r#"{"segment_interval_secs": 0, "mp4_version": "standard"}"#).unwrap();

    let mut cmd = hlsrec_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("segment_interval_secs"))
        .stdout(predicate::str::contains("Manifest: disabled"));
}

#[test]
fn test_cli_validate_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hlsrec.json");
    fs::write(&path, r#"{"mp4_version": "fmp4"}"#).unwrap();

    let mut cmd = hlsrec_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
