//! Reading a whole store and writing it out as one JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::logging::{debug, info, warn};
use crate::output::{WriteMode, write_output};
use crate::record::ExportRecord;
use crate::store::Store;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "database_export.json";

/// Knobs for a single export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Only export keys starting with this prefix.
    pub prefix: String,
    /// Pretty-print the JSON document.
    pub pretty: bool,
    pub write_mode: WriteMode,
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Keys returned by the listing.
    pub listed: usize,
    /// Pairs written to the output.
    pub exported: usize,
    /// Listed keys that were gone by the time they were read.
    pub skipped: usize,
    pub bytes_written: u64,
    pub output: PathBuf,
}

/// The pairs read from a store, before they are encoded.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub record: ExportRecord,
    /// Keys returned by the listing, duplicates included.
    pub listed: usize,
    /// Listed keys that were gone by the time they were read.
    pub skipped: usize,
}

/// Copies every pair of a store into a JSON file.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Read every matching pair from `store` into memory.
    pub fn collect<S: Store + ?Sized>(&self, store: &S) -> Result<Collected> {
        let keys = store
            .list_keys(&self.options.prefix)
            .map_err(ExportError::listing)?;
        info!(
            store = %store.location(),
            keys = keys.len(),
            "listed keys"
        );

        let listed = keys.len();
        let mut record = ExportRecord::new();
        let mut skipped = 0;
        for key in keys {
            debug!(key = %key, "reading value");
            match store.get(&key) {
                Ok(Some(value)) => record.insert(key, value),
                Ok(None) => {
                    warn!(key = %key, "key disappeared before it could be read, skipping");
                    skipped += 1;
                }
                Err(e) => return Err(ExportError::reading(&key, e)),
            }
        }

        Ok(Collected {
            record,
            listed,
            skipped,
        })
    }

    /// Export `store` to `output`.
    ///
    /// The document is fully encoded in memory before the output is touched,
    /// so a failing store or value never truncates an existing file.
    pub fn export<S: Store + ?Sized>(&self, store: &S, output: &Path) -> Result<ExportSummary> {
        let Collected {
            record,
            listed,
            skipped,
        } = self.collect(store)?;
        let bytes = record.to_json(self.options.pretty)?;

        let bytes_written = write_output(output, &bytes, self.options.write_mode)?;
        info!(
            output = %output.display(),
            keys = record.len(),
            bytes = bytes_written,
            "export written"
        );

        Ok(ExportSummary {
            listed,
            exported: record.len(),
            skipped,
            bytes_written,
            output: output.to_path_buf(),
        })
    }
}

/// Export `store` to `output` with default options.
pub fn export<S: Store + ?Sized>(store: &S, output: &Path) -> Result<ExportSummary> {
    Exporter::default().export(store, output)
}
