// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use std::time::Duration;

pub const EVENTS_DB_NAME: &str = "events";
pub const META_DB_NAME: &str = "meta";
pub const CLOCK_KEY: &str = "clock";

pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024; // 1 GiB
pub const DEFAULT_MAX_DBS: u32 = 2;

/// Separates the stream id from the big-endian version inside an event key.
pub const KEY_SEPARATOR: u8 = 0x00;

/// LMDB caps keys at 511 bytes; ids stay well below that.
pub const MAX_ID_LEN: usize = 255;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_WAIT_DEADLINE: Duration = Duration::from_secs(25);

/// Output format of `recorded_at` on the wire.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
