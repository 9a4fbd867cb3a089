// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

//! On-disk layout of the event log.

use rkyv::{Archive, Deserialize, Serialize};

use crate::constants::KEY_SEPARATOR;
use crate::error::{Error, Result};
use crate::origin::OriginMetadata;

/// Key of a row in the events database: `id ++ 0x00 ++ version (big endian)`.
///
/// Ids never contain NUL, so every key of a stream shares the `id ++ 0x00` prefix and
/// sorts by version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamKey<'a> {
    pub id: &'a str,
    pub version: u64,
}

impl<'a> StreamKey<'a> {
    pub fn new(id: &'a str, version: u64) -> Self {
        Self { id, version }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Self::prefix(self.id);
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf
    }

    /// Common prefix of every key that belongs to `id`.
    pub fn prefix(id: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(id.len() + 9);
        buf.extend_from_slice(id.as_bytes());
        buf.push(KEY_SEPARATOR);
        buf
    }

    /// Exclusive upper bound of the keys that belong to `id`.
    pub fn upper_bound(id: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(id.len() + 1);
        buf.extend_from_slice(id.as_bytes());
        buf.push(KEY_SEPARATOR + 1);
        buf
    }

    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 9 {
            return Err(Error::Serialization(format!(
                "event key too short: {} bytes",
                bytes.len()
            )));
        }
        let (head, version) = bytes.split_at(bytes.len() - 8);
        let (id, separator) = head.split_at(head.len() - 1);
        if separator[0] != KEY_SEPARATOR {
            return Err(Error::Serialization("event key missing separator".into()));
        }
        let id = std::str::from_utf8(id)
            .map_err(|e| Error::Serialization(format!("event key id is not UTF-8: {e}")))?;
        let mut be = [0u8; 8];
        be.copy_from_slice(version);
        Ok(Self {
            id,
            version: u64::from_be_bytes(be),
        })
    }
}

/// The value stored for each `(id, version)`.
#[derive(Archive, Serialize, Deserialize, Debug, PartialEq)]
#[rkyv(derive(Debug))]
pub struct StoredEvent {
    pub payload: String,
    /// Milliseconds since the Unix epoch, never lower than the previous row's.
    pub recorded_at_ms: i64,
    pub origin: Option<Vec<OriginEntry>>,
}

#[derive(Archive, Serialize, Deserialize, Debug, PartialEq)]
#[rkyv(derive(Debug))]
pub struct OriginEntry {
    pub key: String,
    pub value: String,
}

impl StoredEvent {
    pub fn new(payload: &str, recorded_at_ms: i64, origin: Option<&OriginMetadata>) -> Self {
        Self {
            payload: payload.to_owned(),
            recorded_at_ms,
            origin: origin.map(|meta| {
                meta.iter()
                    .map(|(key, value)| OriginEntry {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    })
                    .collect()
            }),
        }
    }

    pub fn to_bytes(&self) -> Result<rkyv::util::AlignedVec> {
        Ok(rkyv::to_bytes::<rkyv::rancor::Error>(self)?)
    }

    /// Validates and deserializes a stored row.
    ///
    /// LMDB gives no alignment guarantee for values, so the bytes are copied into an
    /// aligned scratch buffer first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        Ok(rkyv::from_bytes::<Self, rkyv::rancor::Error>(
            aligned.as_slice(),
        )?)
    }

    pub fn origin_metadata(&self) -> OriginMetadata {
        self.origin
            .iter()
            .flatten()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }
}
