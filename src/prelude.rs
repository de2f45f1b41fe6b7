//! Convenient re-exports for common usage patterns.
//!
//! ```ignore
//! use kv_export::prelude::*;
//!
//! let store: MemoryStore = [("greeting", serde_json::json!("hi"))].into_iter().collect();
//! export(&store, Path::new("out.json"))?;
//! ```

pub use std::path::Path;

pub use crate::error::{ExportError, Phase, Result};
pub use crate::export::{ExportOptions, ExportSummary, Exporter, export};
pub use crate::output::WriteMode;
pub use crate::record::ExportRecord;
pub use crate::store::{MemoryStore, Store, StoreError, ValueEncoding};

// Store backends (require their features)
#[cfg(feature = "local")]
pub use crate::store::LocalStore;
#[cfg(feature = "http")]
pub use crate::store::{ReplitDb, ReplitDbOptions};
