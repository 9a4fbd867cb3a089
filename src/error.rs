// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::types::Appended;

/// Custom error type for Catchlog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The `(id, version)` pair already exists.
    #[error("Version conflict: stream {id} version {version} already exists")]
    VersionConflict { id: String, version: u64 },

    /// LMDB storage error (via `heed`).
    #[error("LMDB error: {0}")]
    Storage(#[from] heed::Error),

    /// IO error occurred (e.g., file system issues).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Malformed id, version, payload or configuration. Rejected before touching storage.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An elevated operation was attempted without a valid admin token.
    #[error("Unauthorized")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<rkyv::rancor::Error> for Error {
    fn from(e: rkyv::rancor::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// The failure taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Lost the race for a version; retry after re-reading.
    Conflict,
    /// The store is unavailable or returned something unexpected.
    Storage,
    InvalidInput,
    Unauthorized,
}

/// Transport-agnostic outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    Conflict,
    StorageError,
    BadRequest,
    Forbidden,
}

impl Status {
    /// HTTP status code a transport should answer with.
    pub fn http_code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::Conflict => 409,
            Status::StorageError => 500,
            Status::BadRequest => 400,
            Status::Forbidden => 403,
        }
    }

    pub fn for_append(result: &Result<Appended>) -> Self {
        match result {
            Ok(_) => Status::Created,
            Err(e) => e.status(),
        }
    }

    /// Status of a read. An empty result is still `Ok`.
    pub fn for_read<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::VersionConflict { .. } => ErrorKind::Conflict,
            Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => ErrorKind::Storage,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Unauthorized => ErrorKind::Unauthorized,
        }
    }

    pub fn status(&self) -> Status {
        match self.kind() {
            ErrorKind::Conflict => Status::Conflict,
            ErrorKind::Storage => Status::StorageError,
            ErrorKind::InvalidInput => Status::BadRequest,
            ErrorKind::Unauthorized => Status::Forbidden,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::VersionConflict { .. })
    }
}
