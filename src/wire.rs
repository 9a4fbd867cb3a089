// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

//! JSON shape served to clients.
//!
//! ```text
//! {"version": 3, "event": <decoded JSON or raw string>, "at": "2024-05-01T12:00:00Z", "ip_info": {...}}
//! ```
//!
//! `ip_info` only appears when the read included metadata. Full-log dumps also carry `id`.

use serde::Serialize;

use crate::error::Result;
use crate::origin::OriginMetadata;
use crate::types::{Event, Payload};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub version: u64,
    pub event: Payload,
    pub at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_info: Option<OriginMetadata>,
}

impl WireEvent {
    /// Wire form of a stream read, without the id.
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: None,
            version: event.version,
            event: event.decode(),
            at: event.at(),
            ip_info: event.origin.clone(),
        }
    }

    /// Wire form of a full-log read, tagged with the stream id.
    pub fn tagged(event: &Event) -> Self {
        Self {
            id: Some(event.id.clone()),
            ..Self::from_event(event)
        }
    }
}

/// Serializes the result of a stream read.
pub fn to_json(events: &[Event]) -> Result<String> {
    let wire: Vec<WireEvent> = events.iter().map(WireEvent::from_event).collect();
    Ok(serde_json::to_string(&wire)?)
}

/// Serializes the result of a full-log read.
pub fn to_json_tagged(events: &[Event]) -> Result<String> {
    let wire: Vec<WireEvent> = events.iter().map(WireEvent::tagged).collect();
    Ok(serde_json::to_string(&wire)?)
}
