//! HTTP option loader -- GETs option lists from REST endpoints.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime.

use async_trait::async_trait;

use super::{LoaderConfig, LoaderError, OptionLoader};

/// Loader that fetches option lists via HTTP GET.
///
/// - request timeout from [`LoaderConfig::timeout`]
/// - `Authorization: Bearer` from config or `FORMRULE_LOADER_AUTH_TOKEN`
/// - non-2xx statuses surface as [`LoaderError::Status`]
pub struct HttpOptionLoader {
    agent: ureq::Agent,
    auth_token: Option<String>,
}

impl HttpOptionLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        let mut builder = ureq::Agent::config_builder().timeout_global(Some(config.timeout));
        if !config.use_env_proxy {
            builder = builder.proxy(None);
        }
        let agent: ureq::Agent = builder.build().into();

        HttpOptionLoader {
            agent,
            auth_token: config.resolved_auth_token(),
        }
    }
}

impl Default for HttpOptionLoader {
    fn default() -> Self {
        Self::new(&LoaderConfig::default())
    }
}

#[async_trait]
impl OptionLoader for HttpOptionLoader {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, LoaderError> {
        let agent = self.agent.clone();
        let auth_token = self.auth_token.clone();
        let target = url.to_string();

        tokio::task::spawn_blocking(move || {
            let mut request = agent.get(&target).header("Accept", "application/json");
            if let Some(ref token) = auth_token {
                request = request.header("Authorization", &format!("Bearer {}", token));
            }

            let response = request.call().map_err(|e| match e {
                ureq::Error::StatusCode(status) => LoaderError::Status {
                    url: target.clone(),
                    status,
                },
                other => LoaderError::Transport {
                    url: target.clone(),
                    message: other.to_string(),
                },
            })?;

            response
                .into_body()
                .read_json::<serde_json::Value>()
                .map_err(|e| LoaderError::Payload {
                    url: target.clone(),
                    message: format!("failed to parse response as JSON: {}", e),
                })
        })
        .await
        .map_err(|e| LoaderError::Transport {
            url: url.to_string(),
            message: format!("task join error: {}", e),
        })?
    }

    fn loader_id(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let loader = HttpOptionLoader::new(&LoaderConfig {
            timeout: Duration::from_millis(500),
            auth_token: None,
            use_env_proxy: false,
        });
        // Port 9 on loopback is the discard service; nothing listens in CI.
        let result = loader.fetch("http://127.0.0.1:9/options").await;
        assert!(matches!(result, Err(LoaderError::Transport { .. })));
    }

    #[test]
    fn token_comes_from_config() {
        let loader = HttpOptionLoader::new(&LoaderConfig {
            auth_token: Some("t0k".to_string()),
            ..LoaderConfig::default()
        });
        assert_eq!(loader.auth_token, Some("t0k".to_string()));
    }
}
