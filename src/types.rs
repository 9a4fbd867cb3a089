// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants;
use crate::origin::OriginMetadata;

/// A single event read back from the log.
///
/// `recorded_at` is always truncated to whole seconds. `origin` is only populated
/// when the read explicitly asked for metadata with an admin token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub version: u64,
    pub payload: String,
    pub recorded_at: DateTime<Utc>,
    pub origin: Option<OriginMetadata>,
}

impl Event {
    /// Decodes the payload as JSON, falling back to the raw text.
    pub fn decode(&self) -> Payload {
        Payload::parse(&self.payload)
    }

    /// `recorded_at` formatted as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn at(&self) -> String {
        self.recorded_at
            .format(constants::TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// A payload after a decode attempt.
///
/// Payloads are stored verbatim. Ones that are not valid JSON are still served,
/// as a plain string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Decoded(serde_json::Value),
    Raw(String),
}

impl Payload {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(value) => Payload::Decoded(value),
            Err(_) => Payload::Raw(raw.to_owned()),
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, Payload::Decoded(_))
    }
}

/// Acknowledgment of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub id: String,
    pub version: u64,
    pub recorded_at: DateTime<Utc>,
}
