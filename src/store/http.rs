//! Client for a hosted key-value database reached over HTTP.
//!
//! The database URL embeds its own access token, so it is treated as a
//! secret: only scheme and host ever show up in messages.
//!
//! Protocol:
//! - `GET {url}?encode=true&prefix={prefix}` lists matching keys, one
//!   percent-encoded key per line.
//! - `GET {url}/{percent-encoded key}` returns the stored text, `404` when
//!   the key does not exist.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::logging::debug;

use super::{Store, StoreError, ValueEncoding};

/// Environment variable holding the database URL.
pub const DB_URL_ENV: &str = "REPLIT_DB_URL";

/// Connection options for [`ReplitDb`].
#[derive(Debug, Clone, Copy)]
pub struct ReplitDbOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    pub encoding: ValueEncoding,
}

impl Default for ReplitDbOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            encoding: ValueEncoding::Json,
        }
    }
}

/// Blocking client for the hosted key-value database.
pub struct ReplitDb {
    client: Client,
    url: String,
    location: String,
    encoding: ValueEncoding,
}

impl ReplitDb {
    /// Create a client for the database at `url`.
    pub fn new(url: &str, options: ReplitDbOptions) -> Result<Self, StoreError> {
        let url = url.trim();
        let parsed =
            reqwest::Url::parse(url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        let Some(host) = parsed.host_str() else {
            return Err(StoreError::InvalidUrl("missing host".to_string()));
        };
        let location = match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
            None => format!("{}://{}", parsed.scheme(), host),
        };

        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(without_url)?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            location,
            encoding: options.encoding,
        })
    }

    /// Create a client from the URL in [`DB_URL_ENV`].
    pub fn from_env(options: ReplitDbOptions) -> Result<Self, StoreError> {
        let url = std::env::var(DB_URL_ENV)
            .map_err(|_| StoreError::NotConfigured(format!("{} is not set", DB_URL_ENV)))?;
        Self::new(&url, options)
    }

    fn check_status(&self, status: StatusCode) -> Result<(), StoreError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                status: status.as_u16(),
                location: self.location.clone(),
            })
        }
    }
}

impl Store for ReplitDb {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        debug!(prefix = prefix, "listing keys");
        let response = self
            .client
            .get(&self.url)
            .query(&[("encode", "true"), ("prefix", prefix)])
            .send()
            .map_err(without_url)?;
        self.check_status(response.status())?;

        let body = response.text().map_err(without_url)?;
        body.lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                urlencoding::decode(line)
                    .map(Cow::into_owned)
                    .map_err(|e| StoreError::KeyEncoding(e.to_string()))
            })
            .collect()
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let url = format!("{}/{}", self.url, urlencoding::encode(key));
        let response = self.client.get(url).send().map_err(without_url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.check_status(response.status())?;

        let bytes = response.bytes().map_err(without_url)?;
        self.encoding.decode(key, &bytes).map(Some)
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}

/// reqwest errors embed the request URL, which carries the access token.
fn without_url(err: reqwest::Error) -> StoreError {
    StoreError::Http(err.without_url())
}
