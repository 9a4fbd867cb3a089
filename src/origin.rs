// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Proxy headers worth recording, with the CGI-style name each is stored under.
const FORWARDING_HEADERS: [(&str, &str); 5] = [
    ("client-ip", "HTTP_CLIENT_IP"),
    ("x-forwarded-for", "HTTP_X_FORWARDED_FOR"),
    ("x-forwarded", "HTTP_X_FORWARDED"),
    ("forwarded-for", "HTTP_FORWARDED_FOR"),
    ("forwarded", "HTTP_FORWARDED"),
];

pub const REMOTE_ADDR: &str = "REMOTE_ADDR";

/// Opaque client attributes captured by the transport when an event is written.
///
/// The log stores these next to the event and never looks inside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginMetadata(BTreeMap<String, String>);

impl OriginMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the peer address and any forwarding headers.
    ///
    /// Header names match case-insensitively; repeated headers are joined with `", "`.
    /// All other headers are ignored.
    pub fn capture<'a, I>(remote_addr: Option<IpAddr>, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut meta = Self::new();
        if let Some(addr) = remote_addr {
            meta.insert(REMOTE_ADDR, addr.to_string());
        }
        for (name, value) in headers {
            let Some((_, key)) = FORWARDING_HEADERS
                .iter()
                .find(|(header, _)| header.eq_ignore_ascii_case(name.trim()))
            else {
                continue;
            };
            meta.0
                .entry((*key).to_owned())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_owned());
        }
        meta
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for OriginMetadata {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
