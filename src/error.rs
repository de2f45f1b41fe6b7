//! Error types for the export pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// The stage of an export a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Building the store client or opening the store.
    Connecting,
    /// Enumerating the keys.
    Listing,
    /// Fetching individual values.
    Reading,
    /// Encoding the collected record.
    Serializing,
    /// Putting the encoded bytes on disk.
    Writing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connecting => "connecting",
            Phase::Listing => "listing",
            Phase::Reading => "reading",
            Phase::Serializing => "serializing",
            Phase::Writing => "writing",
        };
        f.write_str(name)
    }
}

/// Errors that abort an export. None of them leaves a partial output file
/// behind when the atomic write mode is used.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("store unavailable while {phase}{}: {source}", key_suffix(key.as_deref()))]
    StoreUnavailable {
        phase: Phase,
        key: Option<String>,
        #[source]
        source: StoreError,
    },

    #[error("serialization failed{}: {message}", for_key(key.as_deref()))]
    Serialization {
        key: Option<String>,
        message: String,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A [`Result`] alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

fn key_suffix(key: Option<&str>) -> String {
    key.map(|k| format!(" key '{}'", k)).unwrap_or_default()
}

fn for_key(key: Option<&str>) -> String {
    key.map(|k| format!(" for key '{}'", k)).unwrap_or_default()
}

impl ExportError {
    /// Wrap a store failure that happened while opening the store.
    pub fn connecting(source: StoreError) -> Self {
        Self::StoreUnavailable {
            phase: Phase::Connecting,
            key: None,
            source,
        }
    }

    pub(crate) fn listing(source: StoreError) -> Self {
        Self::StoreUnavailable {
            phase: Phase::Listing,
            key: None,
            source,
        }
    }

    /// A read failure. Undecodable values are reported as serialization
    /// errors since the store itself answered.
    pub(crate) fn reading(key: &str, source: StoreError) -> Self {
        match source {
            StoreError::Decode { source, .. } => Self::Serialization {
                key: Some(key.to_string()),
                message: source.to_string(),
            },
            source => Self::StoreUnavailable {
                phase: Phase::Reading,
                key: Some(key.to_string()),
                source,
            },
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// The phase the export was in when it failed.
    pub fn phase(&self) -> Phase {
        match self {
            Self::StoreUnavailable { phase, .. } => *phase,
            Self::Serialization { .. } => Phase::Serializing,
            Self::Write { .. } => Phase::Writing,
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StoreUnavailable { .. } => 3,
            Self::Serialization { .. } => 4,
            Self::Write { .. } => 5,
        }
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
