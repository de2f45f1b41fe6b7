//! Key-value stores the exporter can read from.
//!
//! The exporter only needs two capabilities from a store: enumerate the keys
//! and fetch a value by key. Each backend lives in its own module:
//!
//! - [`ReplitDb`] - hosted key-value database over HTTP (requires `http` feature)
//! - [`LocalStore`] - on-disk fjall keyspace (requires `local` feature)
//! - [`MemoryStore`] - in-memory map, mostly for tests

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "local")]
mod local;
mod memory;

#[cfg(feature = "http")]
pub use http::{ReplitDb, ReplitDbOptions, DB_URL_ENV};
#[cfg(feature = "local")]
pub use local::LocalStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Read access to a key-value store.
///
/// Listing is a snapshot: keys may be added or removed by other writers while
/// an export runs. `get` returns `Ok(None)` for a key that no longer exists.
pub trait Store {
    /// All keys starting with `prefix`. An empty prefix selects every key.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Human-readable description of where the data comes from. Must not
    /// contain credentials.
    fn location(&self) -> String;
}

/// Errors raised by store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {location}")]
    Status { status: u16, location: String },

    #[error("invalid store URL: {0}")]
    InvalidUrl(String),

    #[cfg(feature = "local")]
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("store not found at {0}")]
    NotFound(String),

    #[error("no store configured: {0}")]
    NotConfigured(String),

    #[error("key is not valid UTF-8: {0}")]
    KeyEncoding(String),

    #[error("value for key '{key}' is not valid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Free-form failure, for backends without a dedicated variant.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// How stored bytes become a JSON value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// Stored text is itself a JSON document.
    #[default]
    Json,
    /// Stored text is kept verbatim as a JSON string.
    Raw,
}

impl ValueEncoding {
    /// Decode the bytes stored under `key`.
    pub fn decode(self, key: &str, bytes: &[u8]) -> Result<Value, StoreError> {
        match self {
            ValueEncoding::Json => serde_json::from_slice(bytes).map_err(|source| {
                StoreError::Decode {
                    key: key.to_string(),
                    source,
                }
            }),
            ValueEncoding::Raw => Ok(Value::String(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }
}
