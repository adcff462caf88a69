//! Static option loader -- canned responses keyed by exact URL.
//!
//! Used by tests and by the CLI when `[loader.fixtures]` is configured, so
//! rules with data sources can be evaluated without network access.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LoaderError, OptionLoader};

/// Most recent requests kept by [`StaticOptionLoader::requests`].
pub const REQUEST_LOG_LIMIT: usize = 256;

/// What the loader answers for a URL.
#[derive(Debug, Clone)]
pub enum StaticResponse {
    Json(serde_json::Value),
    /// Simulate a data source failing with this HTTP status.
    Status(u16),
}

/// Loader answering from a fixed URL -> response table.
///
/// Requested URLs are recorded, including unconfigured ones, so callers can
/// assert on how placeholders were substituted. Only the last
/// [`REQUEST_LOG_LIMIT`] are kept.
#[derive(Debug, Default)]
pub struct StaticOptionLoader {
    responses: HashMap<String, StaticResponse>,
    requests: Mutex<VecDeque<String>>,
}

impl StaticOptionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    pub fn with_json(mut self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.responses.insert(url.into(), StaticResponse::Json(body));
        self
    }

    /// Fail requests for `url` with `status`.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(url.into(), StaticResponse::Status(status));
        self
    }

    /// Recently requested URLs, oldest first.
    pub fn requests(&self) -> Vec<String> {
        match self.requests.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn record(&self, url: &str) {
        let mut guard = match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.len() == REQUEST_LOG_LIMIT {
            guard.pop_front();
        }
        guard.push_back(url.to_string());
    }
}

#[async_trait]
impl OptionLoader for StaticOptionLoader {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, LoaderError> {
        self.record(url);
        match self.responses.get(url) {
            Some(StaticResponse::Json(body)) => Ok(body.clone()),
            Some(StaticResponse::Status(status)) => Err(LoaderError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(LoaderError::NotConfigured {
                url: url.to_string(),
            }),
        }
    }

    fn loader_id(&self) -> &str {
        "static"
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
