//! Export every key-value pair of a key-value store to one JSON document.
//!
//! # Quick Start
//!
//! ```ignore
//! use kv_export::prelude::*;
//!
//! let store = ReplitDb::from_env(ReplitDbOptions::default())?;
//! let summary = export(&store, Path::new("database_export.json"))?;
//! println!("exported {} keys", summary.exported);
//! ```
//!
//! The export is all-or-nothing: values are read into an [`ExportRecord`],
//! encoded in memory, and only then written out. With the default
//! [`WriteMode::Atomic`] the document is written to a temporary file and
//! renamed over the target.
//!
//! # Feature Flags
//!
//! - `http` - Hosted key-value database client (enabled by default)
//! - `local` - Export local fjall keyspaces (enabled by default)
//! - `cli` - Command-line interface binary (enabled by default)
//! - `logging` - Library-level tracing (consumers provide their own subscriber)
//! - `full` - Enable all features

mod error;
mod export;
mod logging;
mod output;
pub mod prelude;
mod record;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{ExportError, Phase, Result};
pub use export::{Collected, DEFAULT_OUTPUT, ExportOptions, ExportSummary, Exporter, export};
pub use output::{WriteMode, write_output};
pub use record::ExportRecord;
pub use store::{MemoryStore, Store, StoreError, ValueEncoding};

#[cfg(feature = "http")]
pub use store::{ReplitDb, ReplitDbOptions};

#[cfg(feature = "local")]
pub use store::LocalStore;
