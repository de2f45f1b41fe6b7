//! Common test utilities and fixtures.
//!
//! Provides stores that fail on demand and a fake hosted key-value database
//! served over real HTTP so the blocking client can be exercised end to end.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::Value;

use kv_export::{MemoryStore, Store, StoreError};

// =============================================================================
// Failing stores
// =============================================================================

/// Wraps a [`MemoryStore`] and fails listing or reading on demand.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_listing: bool,
    pub fail_on_key: Option<String>,
}

impl FailingStore {
    pub fn failing_on(inner: MemoryStore, key: &str) -> Self {
        Self {
            inner,
            fail_listing: false,
            fail_on_key: Some(key.to_string()),
        }
    }

    pub fn failing_listing(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_listing: true,
            fail_on_key: None,
        }
    }
}

impl Store for FailingStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        if self.fail_listing {
            return Err(StoreError::other("connection refused"));
        }
        self.inner.list_keys(prefix)
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        if self.fail_on_key.as_deref() == Some(key) {
            return Err(StoreError::other("connection reset by peer"));
        }
        self.inner.get(key)
    }

    fn location(&self) -> String {
        "failing".to_string()
    }
}

/// Read and parse an exported document.
pub fn read_export(path: &Path) -> anyhow::Result<Value> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

// =============================================================================
// Fake hosted database
// =============================================================================

/// Path segment standing in for the access token embedded in database URLs.
pub const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct FakeState {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    failing: Arc<Mutex<BTreeSet<String>>>,
}

/// A hosted key-value database speaking the list/get HTTP protocol.
pub struct FakeKvServer {
    /// Database URL including the token.
    pub url: String,
    /// Base URL without the token.
    pub base: String,
    state: FakeState,
}

impl FakeKvServer {
    /// Serve `entries` (raw stored text) on an ephemeral local port.
    pub fn spawn(entries: &[(&str, &str)]) -> anyhow::Result<Self> {
        let state = FakeState::default();
        {
            let mut map = state
                .entries
                .lock()
                .map_err(|_| anyhow::anyhow!("poisoned"))?;
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
        }

        let app = Router::new()
            .route("/{token}", get(list_keys))
            .route("/{token}/{key}", get(get_value))
            .with_state(state.clone());

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        std::thread::spawn(move || -> anyhow::Result<()> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)?;
                axum::serve(listener, app).await?;
                Ok::<(), anyhow::Error>(())
            })
        });

        let base = format!("http://{}", addr);
        Ok(Self {
            url: format!("{}/{}", base, TOKEN),
            base,
            state,
        })
    }

    /// Make reads of `key` answer with a server error.
    pub fn fail_on(&self, key: &str) -> anyhow::Result<()> {
        self.state
            .failing
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .insert(key.to_string());
        Ok(())
    }
}

async fn list_keys(
    State(state): State<FakeState>,
    UrlPath(token): UrlPath<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if token != TOKEN {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Ok(entries) = state.entries.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let prefix = params.get("prefix").map(String::as_str).unwrap_or("");
    let encode = params.get("encode").is_some_and(|v| v == "true");
    let keys: Vec<String> = entries
        .keys()
        .filter(|k| k.starts_with(prefix))
        .map(|k| {
            if encode {
                urlencoding::encode(k).into_owned()
            } else {
                k.clone()
            }
        })
        .collect();

    keys.join("\n").into_response()
}

async fn get_value(
    State(state): State<FakeState>,
    UrlPath((token, key)): UrlPath<(String, String)>,
) -> Response {
    if token != TOKEN {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let failing = match state.failing.lock() {
        Ok(failing) => failing.contains(&key),
        Err(_) => true,
    };
    if failing {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let Ok(entries) = state.entries.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    match entries.get(&key) {
        Some(value) => value.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
