// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;

use catchlog::{
    contiguous_prefix, CatchupReader, EventLog, EventLogConfig, ReadMode, ReadOptions,
};
use chrono::DateTime;
use proptest::prelude::*;
use tempfile::tempdir;

fn events_at(versions: &BTreeSet<u64>) -> Vec<catchlog::Event> {
    versions
        .iter()
        .map(|&version| catchlog::Event {
            id: "p".into(),
            version,
            payload: "x".into(),
            recorded_at: DateTime::UNIX_EPOCH,
            origin: None,
        })
        .collect()
}

proptest! {
    #[test]
    fn test_prefix_is_gap_free_and_maximal(
        versions in prop::collection::btree_set(1u64..40, 0..30),
        after in 0u64..20,
    ) {
        let input: BTreeSet<u64> = versions.into_iter().filter(|v| *v > after).collect();
        let prefix = contiguous_prefix(after, events_at(&input));

        for (i, event) in prefix.iter().enumerate() {
            prop_assert_eq!(event.version, after + 1 + i as u64);
        }
        // Maximal: the next version is not available.
        let next = after + 1 + prefix.len() as u64;
        prop_assert!(!input.contains(&next));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]
    #[test]
    fn test_stored_order_is_ascending(
        versions in prop::collection::vec(1u64..1_000, 1..25),
    ) {
        let dir = tempdir().unwrap();
        let log = EventLog::open(EventLogConfig::new(dir.path())).unwrap();

        let mut stored = BTreeSet::new();
        for v in versions {
            let result = log.append("prop", v, "{}", None);
            if stored.insert(v) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.unwrap_err().is_conflict());
            }
        }

        let reader = CatchupReader::new(log);
        let all = reader
            .read_after("prop", ReadOptions::after(0).mode(ReadMode::All))
            .unwrap();
        let read: Vec<u64> = all.iter().map(|e| e.version).collect();
        prop_assert_eq!(read, stored.into_iter().collect::<Vec<_>>());
    }
}
