// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end tests for catch-up reads and long-polling.

use std::time::Duration;

use catchlog::{
    CatchupReader, Error, Event, EventLog, EventLogConfig, OriginMetadata, ReadMode, ReadOptions,
    WaitPolicy,
};
use rstest::{fixture, rstest};
use tempfile::{tempdir, TempDir};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const SECRET: &str = "admin-secret";

struct Harness {
    _dir: TempDir,
    reader: CatchupReader,
}

impl Harness {
    fn log(&self) -> &EventLog {
        self.reader.log()
    }

    fn seed(&self, id: &str, versions: &[u64]) {
        for &v in versions {
            self.log()
                .append(id, v, &format!(r#"{{"v":{v}}}"#), None)
                .expect("append failed");
        }
    }
}

#[fixture]
fn harness() -> Harness {
    let dir = tempdir().expect("Failed to create temp dir");
    let log = EventLog::open(EventLogConfig::new(dir.path()).with_admin_secret(SECRET))
        .expect("Failed to open event log");
    Harness {
        _dir: dir,
        reader: CatchupReader::new(log),
    }
}

fn versions(events: &[Event]) -> Vec<u64> {
    events.iter().map(|e| e.version).collect()
}

fn policy(poll_ms: u64, deadline_ms: u64) -> WaitPolicy {
    WaitPolicy::new(
        Duration::from_millis(poll_ms),
        Duration::from_millis(deadline_ms),
    )
    .expect("valid policy")
}

// ============================================
// Reads
// ============================================

#[rstest]
fn test_contiguous_mode_stops_at_gap(harness: Harness) {
    harness.seed("doc", &[1, 2, 4]);

    let contiguous = harness
        .reader
        .read_after("doc", ReadOptions::after(0))
        .expect("read failed");
    assert_eq!(versions(&contiguous), vec![1, 2]);

    let all = harness
        .reader
        .read_after("doc", ReadOptions::after(0).mode(ReadMode::All))
        .expect("read failed");
    assert_eq!(versions(&all), vec![1, 2, 4]);
}

#[rstest]
fn test_gap_fills_in_once_late_write_lands(harness: Harness) {
    harness.seed("doc", &[1, 3]);
    let before = harness
        .reader
        .read_after("doc", ReadOptions::after(1))
        .expect("read failed");
    assert!(before.is_empty());

    harness.seed("doc", &[2]);
    let after = harness
        .reader
        .read_after("doc", ReadOptions::after(1))
        .expect("read failed");
    assert_eq!(versions(&after), vec![2, 3]);
}

#[rstest]
#[case(0, vec![1, 2, 3])]
#[case(1, vec![2, 3])]
#[case(2, vec![3])]
#[case(3, vec![])]
#[case(10, vec![])]
fn test_threshold_filtering(harness: Harness, #[case] after: u64, #[case] expected: Vec<u64>) {
    harness.seed("doc", &[1, 2, 3]);
    let events = harness
        .reader
        .read_after("doc", ReadOptions::after(after))
        .expect("read failed");
    assert_eq!(versions(&events), expected);
}

#[rstest]
fn test_reads_are_idempotent(harness: Harness) {
    harness.seed("doc", &[1, 2, 5]);
    for mode in [ReadMode::Contiguous, ReadMode::All] {
        let first = harness
            .reader
            .read_after("doc", ReadOptions::after(0).mode(mode))
            .expect("read failed");
        let second = harness
            .reader
            .read_after("doc", ReadOptions::after(0).mode(mode))
            .expect("read failed");
        assert_eq!(first, second);
    }
}

#[rstest]
fn test_metadata_only_with_token(harness: Harness) {
    let origin = OriginMetadata::capture(
        Some("203.0.113.5".parse().expect("valid ip")),
        [("X-Forwarded-For", "198.51.100.2")],
    );
    harness
        .log()
        .append("doc", 1, "{}", Some(origin.clone()))
        .expect("append failed");

    let public = harness
        .reader
        .read_after("doc", ReadOptions::after(0))
        .expect("read failed");
    assert!(public[0].origin.is_none());

    let token = harness.log().authorize(SECRET).expect("authorize failed");
    let private = harness
        .reader
        .read_after("doc", ReadOptions::after(0).with_metadata(&token))
        .expect("read failed");
    assert_eq!(private[0].origin.as_ref(), Some(&origin));

    let forged = ReadOptions {
        include_metadata: true,
        ..ReadOptions::after(0)
    };
    assert!(matches!(
        harness.reader.read_after("doc", forged),
        Err(Error::Unauthorized)
    ));
}

// ============================================
// Long-polling
// ============================================

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wait_wakes_on_concurrent_append(harness: Harness) {
    let writer = harness.log().clone();
    let append = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        writer.append("X", 1, r#"{"hello":"world"}"#, None)
    });

    let started = Instant::now();
    let events = harness
        .reader
        .wait_for_events("X", ReadOptions::after(0), policy(10, 1_000))
        .await
        .expect("wait failed");

    assert_eq!(versions(&events), vec![1]);
    assert!(started.elapsed() < Duration::from_secs(1));
    append
        .await
        .expect("append task panicked")
        .expect("append failed");
}

#[rstest]
#[tokio::test]
async fn test_wait_returns_immediately_when_events_exist(harness: Harness) {
    harness.seed("doc", &[1, 2]);
    let started = Instant::now();
    let events = harness
        .reader
        .wait_for_events("doc", ReadOptions::after(0), policy(10, 5_000))
        .await
        .expect("wait failed");
    assert_eq!(versions(&events), vec![1, 2]);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[rstest]
#[tokio::test]
async fn test_wait_times_out_empty(harness: Harness) {
    let started = Instant::now();
    let events = harness
        .reader
        .wait_for_events("Y", ReadOptions::after(0), policy(10, 100))
        .await
        .expect("wait failed");

    let elapsed = started.elapsed();
    assert!(events.is_empty());
    assert!(elapsed >= Duration::from_millis(100), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "overran deadline: {elapsed:?}");
}

#[rstest]
#[tokio::test]
async fn test_wait_ignores_events_beyond_a_gap(harness: Harness) {
    harness.seed("doc", &[2]);
    let events = harness
        .reader
        .wait_for_events(
            "doc",
            ReadOptions::after(0).mode(ReadMode::All),
            policy(10, 50),
        )
        .await
        .expect("wait failed");
    assert!(events.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_wait_stops_when_cancelled(harness: Harness) {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let events = harness
        .reader
        .wait_for_events_cancellable("Z", ReadOptions::after(0), policy(10, 10_000), &cancel)
        .await
        .expect("wait failed");

    assert!(events.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[rstest]
#[tokio::test]
async fn test_wait_surfaces_invalid_input(harness: Harness) {
    let result = harness
        .reader
        .wait_for_events("", ReadOptions::after(0), policy(10, 50))
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}
