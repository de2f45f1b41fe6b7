//! The in-memory result of reading a store.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ExportError, Result};

/// Every exported key with the value read for it.
///
/// Keys are kept sorted so that two exports of the same data serialize to
/// identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExportRecord {
    entries: BTreeMap<String, Value>,
}

impl ExportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, replacing an earlier value for the same key.
    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Encode the record as one JSON object.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>> {
        let encoded = if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        encoded.map_err(|e| ExportError::Serialization {
            key: None,
            message: e.to_string(),
        })
    }
}

impl FromIterator<(String, Value)> for ExportRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_is_empty_object() -> Result<()> {
        assert_eq!(ExportRecord::new().to_json(false)?, b"{}");
        assert_eq!(ExportRecord::new().to_json(true)?, b"{}");
        Ok(())
    }

    #[test]
    fn test_keys_serialize_sorted() -> Result<()> {
        let record: ExportRecord = [
            ("zeta".to_string(), json!(1)),
            ("alpha".to_string(), json!("two")),
            ("mid".to_string(), json!([true, null])),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            record.to_json(false)?,
            br#"{"alpha":"two","mid":[true,null],"zeta":1}"#
        );
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["alpha", "mid", "zeta"]);
        Ok(())
    }

    #[test]
    fn test_pretty_output_parses_back() -> Result<()> {
        let mut record = ExportRecord::new();
        record.insert("a".to_string(), json!({"x": [1, 2, 3]}));

        let bytes = record.to_json(true)?;
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains('\n'));

        let parsed: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ExportError::Serialization {
                key: None,
                message: e.to_string(),
            }
        })?;
        assert_eq!(parsed, json!({"a": {"x": [1, 2, 3]}}));
        Ok(())
    }
}
