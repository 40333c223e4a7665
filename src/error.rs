//! Domain error types
//!
//! Persistence and platform failures are typed so callers can recover
//! locally (skip a corrupt instance, terminate a deleted one, skip a
//! sample). Process-level plumbing uses `anyhow` on top of these.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file does not exist (deleted out-of-band)
    #[error("config file {path} does not exist")]
    Missing { path: PathBuf },

    /// Malformed JSON or undecodable content
    #[error("config file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Read or directory access failure
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persistence write failure, retried on the next flush
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::Missing { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A geometry, cursor or foreground-window query failed
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform query unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    pub fn unavailable(what: impl std::fmt::Display) -> Self {
        PlatformError::Unavailable(what.to_string())
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;
