//! Local store backed by a fjall keyspace.

use std::path::Path;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};
use serde_json::Value;

use super::{Store, StoreError, ValueEncoding};

/// File fjall writes at the root of every database directory.
const FJALL_MARKER: &str = "version";

/// A single keyspace of an on-disk fjall database whose values are JSON text.
pub struct LocalStore {
    db: fjall::Database,
    keyspace: Keyspace,
    location: String,
    encoding: ValueEncoding,
}

impl LocalStore {
    /// Open `keyspace` in the existing database at `path`.
    ///
    /// Never creates anything: a directory that is not a fjall database or
    /// a keyspace the database does not have is [`StoreError::NotFound`].
    pub fn open(path: &Path, keyspace: &str, encoding: ValueEncoding) -> Result<Self, StoreError> {
        if !path.join(FJALL_MARKER).is_file() {
            return Err(StoreError::NotFound(format!(
                "{} (not a fjall database)",
                path.display()
            )));
        }

        let db = fjall::Database::builder(path).open()?;
        if !db.keyspace_exists(keyspace) {
            return Err(StoreError::NotFound(format!(
                "keyspace '{}' in {}",
                keyspace,
                path.display()
            )));
        }
        Self::from_database(db, path, keyspace, encoding)
    }

    /// Open `keyspace` at `path`, creating the database if needed.
    pub fn create(path: &Path, keyspace: &str, encoding: ValueEncoding) -> Result<Self, StoreError> {
        let db = fjall::Database::builder(path).open()?;
        let store = Self::from_database(db, path, keyspace, encoding)?;
        store.db.persist(PersistMode::SyncAll)?;
        Ok(store)
    }

    fn from_database(
        db: fjall::Database,
        path: &Path,
        keyspace: &str,
        encoding: ValueEncoding,
    ) -> Result<Self, StoreError> {
        let ks = db.keyspace(keyspace, KeyspaceCreateOptions::default)?;

        Ok(Self {
            db,
            keyspace: ks,
            location: format!("{}#{}", path.display(), keyspace),
            encoding,
        })
    }

    /// Switch how stored bytes are decoded.
    pub fn with_encoding(mut self, encoding: ValueEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Store `value` as JSON text under `key`.
    pub fn insert(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let text = value.to_string();
        self.keyspace.insert(key, text.as_bytes())?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    /// Store raw bytes under `key`, bypassing JSON encoding.
    pub fn insert_raw(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.keyspace.insert(key, bytes)?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.keyspace.remove(key)?;
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl Store for LocalStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for kv in self.keyspace.prefix(prefix) {
            let key_bytes = kv.key()?;
            let Ok(key) = std::str::from_utf8(&key_bytes) else {
                return Err(StoreError::KeyEncoding(
                    String::from_utf8_lossy(&key_bytes).into_owned(),
                ));
            };
            keys.push(key.to_string());
        }
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.keyspace.get(key)? {
            Some(bytes) => self.encoding.decode(key, bytes.as_ref()).map(Some),
            None => Ok(None),
        }
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
