mod common;

use chrono::{Datelike, Local, TimeZone, Utc};
use gpto_core::log::{LogLevel, MemorySink, NullSink};
use gpto_core::{organize, CollisionPolicy, NoProgress, RunStatistics};
use tempfile::tempdir;

use common::*;

fn local_folder(unix_seconds: i64) -> String {
    let local = Local.timestamp_opt(unix_seconds, 0).unwrap();
    format!("{:04}/{:02}", local.year(), local.month())
}

#[test]
fn sidecar_timestamp_decides_folder_and_mtime() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let media = input.path().join("Photos from 2021/a.jpg");
    // The embedded tag and the file time disagree with the sidecar; the sidecar wins.
    write(&media, &jpeg_with_date_time_original("2018:07:01 12:00:00"));
    set_mtime(&media, 1_700_000_000);
    write(
        &input.path().join("Photos from 2021/a.jpg.json"),
        br#"{"photoTakenTime":{"timestamp":"1609459200"}}"#,
    );

    let report = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();

    let expected = format!("{}/a.jpg", local_folder(1_609_459_200));
    assert_eq!(tree(output.path()), vec![expected.clone()]);
    assert_eq!(mtime(&output.path().join(&expected)), 1_609_459_200);
    assert_eq!(
        report.stats,
        RunStatistics {
            processed: 1,
            copied_dated: 1,
            ..Default::default()
        }
    );
}

#[test]
fn embedded_date_before_launch_goes_to_dateunknown() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write(
        &input.path().join("Photos/b.jpg"),
        &jpeg_with_date_time_original("2010:03:15 10:00:00"),
    );

    let report = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();

    assert_eq!(tree(output.path()), vec!["dateunknown/b.jpg"]);
    assert_eq!(report.stats.copied_unknown, 1);
}

#[test]
fn embedded_date_inside_window_is_used() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let media = input.path().join("Photos/e.jpg");
    write(&media, &jpeg_with_date_time_original("2018:07:15 12:00:00"));
    set_mtime(&media, 1_700_000_000);

    organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();

    assert_eq!(tree(output.path()), vec!["2018/07/e.jpg"]);
}

#[test]
fn mtime_fallback_is_idempotent_across_runs() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let media = input.path().join("Videos/c.mp4");
    write(&media, b"not much of a video");
    let t = Utc.with_ymd_and_hms(2020, 6, 15, 12, 0, 0).unwrap().timestamp();
    set_mtime(&media, t);

    let first = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();
    let expected = format!("{}/c.mp4", local_folder(t));
    assert_eq!(tree(output.path()), vec![expected]);
    assert_eq!(first.stats.copied_dated, 1);

    let second = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();
    assert_eq!(second.stats.copied_dated, 0);
    assert_eq!(second.stats.skipped, 1);
    assert_eq!(tree(output.path()).len(), 1);
}

#[test]
fn second_run_skips_everything() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write(&input.path().join("a/1.jpg"), b"one");
    write(&input.path().join("a/1.jpg.json"), br#"{"photoTakenTime":{"timestamp":"1262304000"}}"#);
    write(&input.path().join("b/2.png"), b"two");
    write(&input.path().join("3.mov"), b"three");

    let first = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();
    assert_eq!(first.stats.processed, 3);
    assert_eq!(first.stats.copied_dated + first.stats.copied_unknown, 3);
    let files = tree(output.path());

    let second = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();
    assert_eq!(second.stats.skipped, 3);
    assert_eq!(second.stats.copied_dated + second.stats.copied_unknown, 0);
    assert_eq!(tree(output.path()), files);
}

#[test]
fn implausible_sidecar_dates_never_reach_dated_folders() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    // 2015-05-27T23:59:59Z and one year from now
    let early = 1_432_771_199;
    let future = (Utc::now() + chrono::Duration::days(365)).timestamp();
    write(&input.path().join("p/early.jpg"), b"early");
    write(
        &input.path().join("p/early.jpg.json"),
        format!(r#"{{"photoTakenTime":{{"timestamp":"{}"}}}}"#, early).as_bytes(),
    );
    write(&input.path().join("p/future.jpg"), b"future");
    write(
        &input.path().join("p/future.json"),
        format!(r#"{{"photoTakenTime":{{"timestamp":"{}"}}}}"#, future).as_bytes(),
    );

    let report = organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();

    assert_eq!(tree(output.path()), vec!["dateunknown/early.jpg", "dateunknown/future.jpg"]);
    assert_eq!(report.stats.copied_unknown, 2);
}

#[test]
fn sidecar_in_another_export_folder_is_found() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write(&input.path().join("Takeout/Google Photos/Trip/d.jpg"), b"d");
    write(
        &input.path().join("Takeout 2/Google Photos/Trip/d.jpg.supplemental-metadata.json"),
        "{\"photoTakenTime\":{\"formatted\":\"2019年8月10日 午前 9:00:00 UTC\"}}".as_bytes(),
    );

    organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();

    assert_eq!(tree(output.path()), vec!["2019/08/d.jpg"]);
}

#[test]
fn name_collision_is_skipped_with_warning() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write(&input.path().join("x/f.jpg"), b"first");
    write(&input.path().join("x/f.jpg.json"), br#"{"photoTakenTime":{"timestamp":"1609459200"}}"#);
    write(&input.path().join("y/f.jpg"), b"second, longer");
    write(&input.path().join("y/f.jpg.json"), br#"{"photoTakenTime":{"timestamp":"1609459200"}}"#);

    let log = MemorySink::new();
    let report = organize(&options(input.path(), output.path()), &log, &NoProgress).unwrap();

    assert_eq!(report.stats.copied_dated, 1);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(report.stats.name_collisions, 1);
    assert!(log.contains(LogLevel::Warn, "different size"));
}

#[test]
fn rename_policy_keeps_both_files() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write(&input.path().join("x/f.jpg"), b"first");
    write(&input.path().join("x/f.jpg.json"), br#"{"photoTakenTime":{"timestamp":"1609459200"}}"#);
    write(&input.path().join("y/f.jpg"), b"second, longer");
    write(&input.path().join("y/f.jpg.json"), br#"{"photoTakenTime":{"timestamp":"1609459200"}}"#);

    let mut opts = options(input.path(), output.path());
    opts.collision = CollisionPolicy::Rename;
    let first = organize(&opts, &NullSink, &NoProgress).unwrap();
    assert_eq!(first.stats.copied_dated, 2);
    assert_eq!(tree(output.path()).len(), 2);

    let second = organize(&opts, &NullSink, &NoProgress).unwrap();
    assert_eq!(second.stats.skipped, 2);
    assert_eq!(second.stats.name_collisions, 0);
}

#[test]
fn output_inside_input_is_not_reprocessed() {
    let input = tempdir().unwrap();
    let output = input.path().join("organized");
    write(&input.path().join("Photos/g.mp4"), b"g");

    let first = organize(&options(input.path(), &output), &NullSink, &NoProgress).unwrap();
    assert_eq!(first.stats.processed, 1);

    let second = organize(&options(input.path(), &output), &NullSink, &NoProgress).unwrap();
    assert_eq!(second.stats.processed, 1);
    assert_eq!(second.stats.skipped, 1);
    assert_eq!(tree(&output).len(), 1);
}

#[test]
fn source_tree_is_untouched() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write(&input.path().join("Photos/h.jpg"), b"h");
    write(&input.path().join("Photos/h.jpg.json"), br#"{"photoTakenTime":{"timestamp":"1609459200"}}"#);
    set_mtime(&input.path().join("Photos/h.jpg"), 1_650_000_000);
    let before = tree(input.path());

    organize(&options(input.path(), output.path()), &NullSink, &NoProgress).unwrap();

    assert_eq!(tree(input.path()), before);
    assert_eq!(mtime(&input.path().join("Photos/h.jpg")), 1_650_000_000);
}

#[test]
fn output_equal_to_input_keeps_split_export_lookup() {
    let root = tempdir().unwrap();
    let media = root.path().join("Takeout/Trip/d.jpg");
    write(&media, b"d");
    set_mtime(&media, 1_700_000_000);
    write(
        &root.path().join("Takeout 2/Trip/d.jpg.supplemental-metadata.json"),
        "{\"photoTakenTime\":{\"formatted\":\"2019年8月10日 午前 9:00:00 UTC\"}}".as_bytes(),
    );
    let before = tree(root.path());

    let first = organize(&options(root.path(), root.path()), &NullSink, &NoProgress).unwrap();
    assert_eq!(first.stats.copied_dated, 1);
    let mut expected = before.clone();
    expected.push("2019/08/d.jpg".to_string());
    expected.sort();
    assert_eq!(tree(root.path()), expected);

    let second = organize(&options(root.path(), root.path()), &NullSink, &NoProgress).unwrap();
    assert_eq!(second.stats.processed, 1);
    assert_eq!(second.stats.skipped, 1);
    assert_eq!(tree(root.path()), expected);
}
