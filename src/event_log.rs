// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use std::ops::Bound;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use heed::byteorder::BigEndian;
use heed::types::{Bytes, Str, I64};
use heed::{Database, Env, EnvOpenOptions, MdbError, PutFlags};
use tracing::debug;

use crate::auth::{AdminGate, AdminToken};
use crate::config::EventLogConfig;
use crate::constants;
use crate::error::{Error, Result};
use crate::model::{StoredEvent, StreamKey};
use crate::origin::OriginMetadata;
use crate::timed_trace;
use crate::types::{Appended, Event};

pub type EventsDb = Database<Bytes, Bytes>;
pub type MetaDb = Database<Str, I64<BigEndian>>;

/// Durable, per-stream append log.
///
/// - `(id, version)` is unique. A second append of the same pair fails with
///   [`Error::VersionConflict`] and never overwrites.
/// - Versions are chosen by the caller and may arrive out of order.
/// - Rows are never updated; only [`EventLog::reset`] removes them, all at once.
///
/// The handle is cheap to clone. All clones share one LMDB environment, whose
/// single-writer transactions make concurrent appends of the same version resolve
/// to exactly one winner.
///
/// # Example
///
/// ```rust
/// use catchlog::{EventLog, EventLogConfig};
/// use tempfile::tempdir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempdir()?;
/// let log = EventLog::open(EventLogConfig::new(dir.path()))?;
///
/// log.append("doc-1", 1, r#"{"op":"insert"}"#, None)?;
/// let events = log.query("doc-1", 0, false, None)?;
/// assert_eq!(events.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EventLog {
    core: Arc<LogCore>,
}

struct LogCore {
    env: Env,
    events_db: EventsDb,
    meta_db: MetaDb,
    gate: AdminGate,
}

impl EventLog {
    pub fn open(config: EventLogConfig) -> Result<Self> {
        config.validate()?;
        if config.create_dir {
            std::fs::create_dir_all(&config.path)?;
        }

        let env = unsafe {
            EnvOpenOptions::new()
                .read_txn_with_tls()
                .max_dbs(config.max_dbs)
                .map_size(config.map_size)
                .open(&config.path)?
        };

        let (events_db, meta_db) = {
            let mut wtxn = env.write_txn()?;
            let events_db: EventsDb =
                env.create_database(&mut wtxn, Some(constants::EVENTS_DB_NAME))?;
            let meta_db: MetaDb = env.create_database(&mut wtxn, Some(constants::META_DB_NAME))?;
            wtxn.commit()?;
            (events_db, meta_db)
        };

        let gate = AdminGate::new(config.admin_secret.as_deref());
        debug!(
            path = %config.path.display(),
            admin = gate.is_configured(),
            "event log opened"
        );

        Ok(Self {
            core: Arc::new(LogCore {
                env,
                events_db,
                meta_db,
                gate,
            }),
        })
    }

    /// Flushes and closes the environment.
    ///
    /// If other clones of this handle are still alive the environment stays open
    /// and closes when the last one is dropped.
    pub fn close(self) -> Result<()> {
        self.core.env.force_sync()?;
        match Arc::try_unwrap(self.core) {
            Ok(core) => {
                core.env.prepare_for_closing().wait();
                debug!("event log closed");
            }
            Err(_) => debug!("event log still shared; deferring close"),
        }
        Ok(())
    }

    /// Checks the shared secret and mints an [`AdminToken`].
    pub fn authorize(&self, presented: &str) -> Result<AdminToken> {
        self.core.gate.authorize(presented)
    }

    /// Appends an event under `(id, version)`.
    ///
    /// `recorded_at` is assigned here and never decreases from one row to the next,
    /// even if the wall clock steps back.
    pub fn append(
        &self,
        id: &str,
        version: u64,
        payload: &str,
        origin: Option<OriginMetadata>,
    ) -> Result<Appended> {
        validate_id(id)?;
        validate_version(version)?;
        if payload.is_empty() {
            return Err(Error::InvalidInput("payload must not be empty".into()));
        }

        let key = StreamKey::new(id, version).to_bytes();
        let mut wtxn = self.core.env.write_txn()?;

        let last_ms = self
            .core
            .meta_db
            .get(&wtxn, constants::CLOCK_KEY)?
            .unwrap_or(i64::MIN);
        let recorded_at_ms = Utc::now().timestamp_millis().max(last_ms);

        let bytes = StoredEvent::new(payload, recorded_at_ms, origin.as_ref()).to_bytes()?;

        let put = timed_trace!("put", {
            self.core.events_db.put_with_flags(
                &mut wtxn,
                PutFlags::NO_OVERWRITE,
                key.as_slice(),
                bytes.as_slice(),
            )
        });
        match put {
            Ok(()) => {}
            // Dropping the transaction aborts it, so nothing is written.
            Err(heed::Error::Mdb(MdbError::KeyExist)) => {
                debug!(id, version, "append rejected: version exists");
                return Err(Error::VersionConflict {
                    id: id.to_owned(),
                    version,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.core
            .meta_db
            .put(&mut wtxn, constants::CLOCK_KEY, &recorded_at_ms)?;
        timed_trace!("commit", wtxn.commit())?;

        debug!(id, version, "event appended");
        Ok(Appended {
            id: id.to_owned(),
            version,
            recorded_at: to_utc_seconds(recorded_at_ms)?,
        })
    }

    /// Returns every event of `id` with `version > after_version`, ascending.
    ///
    /// No matching rows is an empty vector, not an error. Asking for metadata without
    /// a token fails with [`Error::Unauthorized`].
    pub fn query(
        &self,
        id: &str,
        after_version: u64,
        include_metadata: bool,
        grant: Option<&AdminToken>,
    ) -> Result<Vec<Event>> {
        validate_id(id)?;
        if include_metadata {
            self.core.gate.require(grant)?;
        }
        let Some(first) = after_version.checked_add(1) else {
            return Ok(Vec::new());
        };

        let lower = StreamKey::new(id, first).to_bytes();
        let upper = StreamKey::upper_bound(id);
        let range = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );

        let rtxn = self.core.env.read_txn()?;
        let events = timed_trace!("query", {
            let mut events = Vec::new();
            for entry in self.core.events_db.range(&rtxn, &range)? {
                let (key, bytes) = entry?;
                events.push(decode_event(StreamKey::parse(key)?, bytes, include_metadata)?);
            }
            Ok::<_, Error>(events)
        })?;

        debug!(id, after_version, count = events.len(), "stream queried");
        Ok(events)
    }

    /// Point lookup of a single `(id, version)`.
    pub fn get(
        &self,
        id: &str,
        version: u64,
        include_metadata: bool,
        grant: Option<&AdminToken>,
    ) -> Result<Option<Event>> {
        validate_id(id)?;
        if include_metadata {
            self.core.gate.require(grant)?;
        }
        let key_bytes = StreamKey::new(id, version).to_bytes();
        let rtxn = self.core.env.read_txn()?;
        match self.core.events_db.get(&rtxn, key_bytes.as_slice())? {
            Some(bytes) => Ok(Some(decode_event(
                StreamKey::new(id, version),
                bytes,
                include_metadata,
            )?)),
            None => Ok(None),
        }
    }

    /// Every event of every stream, ordered by `(id, version)`. Admin only.
    pub fn query_all(
        &self,
        include_metadata: bool,
        grant: Option<&AdminToken>,
    ) -> Result<Vec<Event>> {
        self.core.gate.require(grant)?;
        let rtxn = self.core.env.read_txn()?;
        let mut events = Vec::new();
        for entry in self.core.events_db.iter(&rtxn)? {
            let (key, bytes) = entry?;
            events.push(decode_event(StreamKey::parse(key)?, bytes, include_metadata)?);
        }
        debug!(count = events.len(), "full log queried");
        Ok(events)
    }

    /// Number of stored events across all streams.
    pub fn len(&self) -> Result<u64> {
        let rtxn = self.core.env.read_txn()?;
        Ok(self.core.events_db.len(&rtxn)?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Removes every event and the recorded clock in one transaction.
    ///
    /// Returns the number of events removed.
    pub fn reset(&self, grant: &AdminToken) -> Result<u64> {
        self.core.gate.require(Some(grant))?;
        let mut wtxn = self.core.env.write_txn()?;
        let removed = self.core.events_db.len(&wtxn)?;
        self.core.events_db.clear(&mut wtxn)?;
        self.core.meta_db.clear(&mut wtxn)?;
        wtxn.commit()?;
        debug!(removed, "event log reset");
        Ok(removed)
    }
}

fn decode_event(key: StreamKey<'_>, bytes: &[u8], include_metadata: bool) -> Result<Event> {
    let stored = StoredEvent::from_bytes(bytes)?;
    let origin = include_metadata.then(|| stored.origin_metadata());
    Ok(Event {
        id: key.id.to_owned(),
        version: key.version,
        recorded_at: to_utc_seconds(stored.recorded_at_ms)?,
        payload: stored.payload,
        origin,
    })
}

fn to_utc_seconds(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ms.div_euclid(1000), 0)
        .ok_or_else(|| Error::Serialization(format!("timestamp out of range: {ms}")))
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidInput("id must not be empty".into()));
    }
    if id.len() > constants::MAX_ID_LEN {
        return Err(Error::InvalidInput(format!(
            "id is {} bytes, limit is {}",
            id.len(),
            constants::MAX_ID_LEN
        )));
    }
    if id.as_bytes().contains(&constants::KEY_SEPARATOR) {
        return Err(Error::InvalidInput("id must not contain NUL".into()));
    }
    Ok(())
}

fn validate_version(version: u64) -> Result<()> {
    if version == 0 {
        return Err(Error::InvalidInput("version must be positive".into()));
    }
    Ok(())
}
