// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

//! Embedded, append-only event log keyed by stream id and caller-chosen version.
//!
//! - [`EventLog`] appends with optimistic concurrency: a taken `(id, version)` is a
//!   [`Error::VersionConflict`], never an overwrite.
//! - [`CatchupReader`] reads everything after a version, cut at the first gap, and
//!   can long-poll until something arrives.
//! - [`wire`] renders events in the JSON shape clients consume.

pub mod auth;
pub mod catchup;
pub mod config;
pub mod constants;
pub mod error;
pub mod event_log;
pub mod log;
pub mod model;
pub mod origin;
pub mod types;
pub mod utils;
pub mod wire;

pub use auth::AdminToken;
pub use catchup::{contiguous_prefix, CatchupReader, ReadMode, ReadOptions};
pub use config::{EventLogConfig, WaitPolicy};
pub use error::{Error, ErrorKind, Result, Status};
pub use event_log::EventLog;
pub use origin::OriginMetadata;
pub use types::{Appended, Event, Payload};
pub use wire::WireEvent;
