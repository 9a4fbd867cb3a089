#![no_main]

// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.
use arbitrary::Arbitrary;
use catchlog::{contiguous_prefix, EventLog, EventLogConfig};
use libfuzzer_sys::fuzz_target;
use tempfile::tempdir;

#[derive(Arbitrary, Debug)]
struct Op {
    id: String,
    version: u64,
    payload: String,
}

fuzz_target!(|ops: Vec<Op>| {
    let dir = match tempdir() {
        Ok(d) => d,
        Err(_) => return,
    };
    let log = match EventLog::open(EventLogConfig::new(dir.path())) {
        Ok(l) => l,
        Err(_) => return,
    };

    for op in &ops {
        // Invalid input and conflicts are expected; we are looking for panics.
        let _ = log.append(&op.id, op.version, &op.payload, None);
    }

    for op in &ops {
        if let Ok(events) = log.query(&op.id, 0, false, None) {
            assert!(events.windows(2).all(|w| w[0].version < w[1].version));
            assert!(events.iter().all(|e| e.id == op.id));
            let prefix = contiguous_prefix(0, events);
            assert!(prefix.iter().enumerate().all(|(i, e)| e.version == i as u64 + 1));
        }
    }
});
