//! Property-based tests for export completeness and determinism.
//!
//! For any store contents, the exported document parses back to exactly the
//! stored mapping, and exporting twice yields identical bytes.

use std::collections::BTreeMap;

use kv_export::{ExportOptions, Exporter, MemoryStore, export};
use proptest::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// JSON values without floats, which do not survive a text round trip exactly.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn store_contents() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(".{0,16}", json_value(), 0..12)
}

proptest! {
    #[test]
    fn export_contains_exactly_the_stored_pairs(contents in store_contents()) {
        let store: MemoryStore = contents.clone().into_iter().collect();
        let dir = TempDir::new()?;
        let output = dir.path().join("out.json");

        let summary = export(&store, &output)?;
        prop_assert_eq!(summary.exported, contents.len());

        let bytes = std::fs::read(&output)?;
        let parsed: BTreeMap<String, Value> = serde_json::from_slice(&bytes)?;
        prop_assert_eq!(parsed, contents);
    }

    #[test]
    fn export_is_deterministic(contents in store_contents(), pretty in any::<bool>()) {
        let store: MemoryStore = contents.into_iter().collect();
        let dir = TempDir::new()?;
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        let exporter = Exporter::new(ExportOptions {
            pretty,
            ..ExportOptions::default()
        });

        exporter.export(&store, &first)?;
        exporter.export(&store, &second)?;
        prop_assert_eq!(std::fs::read(&first)?, std::fs::read(&second)?);
    }

    #[test]
    fn prefix_export_is_a_filtered_subset(contents in store_contents(), prefix in "[a-c]{0,2}") {
        let store: MemoryStore = contents.clone().into_iter().collect();
        let dir = TempDir::new()?;
        let output = dir.path().join("out.json");
        let exporter = Exporter::new(ExportOptions {
            prefix: prefix.clone(),
            ..ExportOptions::default()
        });

        exporter.export(&store, &output)?;
        let parsed: BTreeMap<String, Value> = serde_json::from_slice(&std::fs::read(&output)?)?;
        let expected: BTreeMap<String, Value> = contents
            .into_iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect();
        prop_assert_eq!(parsed, expected);
    }
}
