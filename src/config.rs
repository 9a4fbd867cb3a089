// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;
use crate::error::{Error, Result};

/// Configuration for opening an [`EventLog`](crate::EventLog).
#[derive(Clone)]
pub struct EventLogConfig {
    pub path: PathBuf,
    pub map_size: usize,
    pub max_dbs: u32,
    pub create_dir: bool,
    /// Shared secret for admin operations. `None` disables them entirely.
    pub admin_secret: Option<String>,
}

impl EventLogConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_dbs < constants::DEFAULT_MAX_DBS {
            return Err(Error::InvalidInput(format!(
                "max_dbs must be at least {}, got {}",
                constants::DEFAULT_MAX_DBS,
                self.max_dbs
            )));
        }
        if self.map_size == 0 {
            return Err(Error::InvalidInput("map_size must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catchlog.mdb"),
            map_size: constants::DEFAULT_MAP_SIZE,
            max_dbs: constants::DEFAULT_MAX_DBS,
            create_dir: true,
            admin_secret: None,
        }
    }
}

impl fmt::Debug for EventLogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogConfig")
            .field("path", &self.path)
            .field("map_size", &self.map_size)
            .field("max_dbs", &self.max_dbs)
            .field("create_dir", &self.create_dir)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Timing of a long-poll read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    poll_interval: Duration,
    deadline: Duration,
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, deadline: Duration) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(Error::InvalidInput("poll interval must be non-zero".into()));
        }
        Ok(Self {
            poll_interval,
            deadline,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: constants::DEFAULT_POLL_INTERVAL,
            deadline: constants::DEFAULT_WAIT_DEADLINE,
        }
    }
}
