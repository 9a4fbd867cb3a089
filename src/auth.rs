// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::atomic::{AtomicU64, Ordering};

use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

static NEXT_GATE_ID: AtomicU64 = AtomicU64::new(1);

/// Capability required by elevated operations: `query_all`, metadata reads and `reset`.
///
/// Only [`AdminGate::authorize`] can mint one, and it is only honoured by the gate
/// that minted it.
#[derive(Debug)]
pub struct AdminToken {
    issuer: u64,
}

/// Single shared-secret check.
pub struct AdminGate {
    id: u64,
    secret: Option<Vec<u8>>,
}

impl AdminGate {
    /// An empty secret is treated as no secret: nothing authorizes.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            id: NEXT_GATE_ID.fetch_add(1, Ordering::Relaxed),
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
        }
    }

    pub fn authorize(&self, presented: &str) -> Result<AdminToken> {
        match &self.secret {
            Some(secret) if bool::from(secret.as_slice().ct_eq(presented.as_bytes())) => {
                Ok(AdminToken { issuer: self.id })
            }
            _ => Err(Error::Unauthorized),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Accepts only a token minted by this gate.
    pub fn require<'t>(&self, grant: Option<&'t AdminToken>) -> Result<&'t AdminToken> {
        match grant {
            Some(token) if self.is_configured() && token.issuer == self.id => Ok(token),
            _ => Err(Error::Unauthorized),
        }
    }
}
