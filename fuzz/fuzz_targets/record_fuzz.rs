#![no_main]

// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.
use catchlog::model::{StoredEvent, StreamKey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Corrupt rows and keys MUST surface as errors, never panics.
    let _ = StoredEvent::from_bytes(data);
    let _ = StreamKey::parse(data);
});
