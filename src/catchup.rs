// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

//! Gap-free and long-polling reads on top of [`EventLog`].
//!
//! Writers pick their own versions and may race, so a reader can briefly see
//! version N+2 before N+1 lands. Contiguous reads cut the result at the first
//! gap, so a client that resumes from its last seen version never skips one.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::auth::AdminToken;
use crate::config::WaitPolicy;
use crate::error::Result;
use crate::event_log::EventLog;
use crate::types::Event;

/// How a read treats gaps in the version sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Stop at the first missing version.
    #[default]
    Contiguous,
    /// Everything above the threshold, gaps included. For inspection only.
    All,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions<'a> {
    pub after_version: u64,
    pub mode: ReadMode,
    pub include_metadata: bool,
    pub grant: Option<&'a AdminToken>,
}

impl<'a> ReadOptions<'a> {
    pub fn after(after_version: u64) -> Self {
        Self {
            after_version,
            ..Default::default()
        }
    }

    pub fn mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_metadata(mut self, grant: &'a AdminToken) -> Self {
        self.include_metadata = true;
        self.grant = Some(grant);
        self
    }
}

/// Keeps the longest run of `events` whose versions are exactly
/// `after_version + 1, after_version + 2, ...`.
///
/// `events` must already be sorted by version.
pub fn contiguous_prefix(after_version: u64, events: Vec<Event>) -> Vec<Event> {
    let mut expected = after_version;
    events
        .into_iter()
        .take_while(|event| match expected.checked_add(1) {
            Some(next) => {
                expected = next;
                event.version == next
            }
            None => false,
        })
        .collect()
}

/// Stateless query layer over an [`EventLog`].
#[derive(Clone)]
pub struct CatchupReader {
    log: EventLog,
}

impl CatchupReader {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn read_after(&self, id: &str, options: ReadOptions<'_>) -> Result<Vec<Event>> {
        let events = self.log.query(
            id,
            options.after_version,
            options.include_metadata,
            options.grant,
        )?;
        Ok(match options.mode {
            ReadMode::All => events,
            ReadMode::Contiguous => contiguous_prefix(options.after_version, events),
        })
    }

    /// Polls until a contiguous read returns something or the policy's deadline passes.
    ///
    /// Running out of time is not an error: the result is simply empty. `options.mode`
    /// is ignored; waiting is always contiguous.
    ///
    /// Each poll is a synchronous LMDB range read on the calling task. Reads are
    /// short for streams of ordinary size; callers serving very large streams should
    /// run the wait on a runtime with spare worker threads.
    pub async fn wait_for_events(
        &self,
        id: &str,
        options: ReadOptions<'_>,
        policy: WaitPolicy,
    ) -> Result<Vec<Event>> {
        self.wait_for_events_cancellable(id, options, policy, &CancellationToken::new())
            .await
    }

    /// Like [`wait_for_events`](Self::wait_for_events), but also returns an empty
    /// result as soon as `cancel` fires, e.g. when the client disconnects.
    pub async fn wait_for_events_cancellable(
        &self,
        id: &str,
        options: ReadOptions<'_>,
        policy: WaitPolicy,
        cancel: &CancellationToken,
    ) -> Result<Vec<Event>> {
        let options = options.mode(ReadMode::Contiguous);
        let deadline = Instant::now() + policy.deadline();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let events = self.read_after(id, options)?;
            if !events.is_empty() {
                trace!(id, attempts, count = events.len(), "wait satisfied");
                return Ok(events);
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(id, attempts, "wait deadline elapsed");
                return Ok(Vec::new());
            }

            let wake = (now + policy.poll_interval()).min(deadline);
            tokio::select! {
                _ = tokio::time::sleep_until(wake) => {}
                _ = cancel.cancelled() => {
                    debug!(id, attempts, "wait cancelled");
                    return Ok(Vec::new());
                }
            }
        }
    }
}
