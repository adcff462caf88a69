//! Option loading for `loadOptions` actions.
//!
//! An [`OptionLoader`] fetches a JSON array from an external data source and
//! projects each object into an [`OptionItem`]. Two implementations ship:
//!
//! - [`http::HttpOptionLoader`] -- GET over HTTP (feature `http`)
//! - [`static_loader::StaticOptionLoader`] -- canned responses keyed by URL
//!
//! Every failure is a [`LoaderError`]. The engine treats them as
//! recoverable: options stay unchanged and the failure is reported as an
//! evaluation result.

#[cfg(feature = "http")]
pub mod http;
pub mod static_loader;

use std::time::Duration;

use async_trait::async_trait;
use formrule_core::{DataSourceConfig, FormValues, OptionItem};

/// Environment variable consulted for a bearer token when the config has none.
pub const AUTH_TOKEN_ENV: &str = "FORMRULE_LOADER_AUTH_TOKEN";

/// Upper bound on a single option request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ──────────────────────────────────────────────
// LoaderError
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    /// The data source answered with a non-success status.
    #[error("request to '{url}' failed with status {status}")]
    Status { url: String, status: u16 },

    /// The request did not complete (connection, timeout, ...).
    #[error("request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    /// The response body is not a JSON array of objects.
    #[error("unexpected payload from '{url}': {message}")]
    Payload { url: String, message: String },

    /// A returned object lacks a configured property, or it is not a string.
    #[error("option {index} has no string property '{property}'")]
    MissingProperty { index: usize, property: String },

    /// No canned response exists for the URL.
    #[error("no response configured for '{url}'")]
    NotConfigured { url: String },
}

// ──────────────────────────────────────────────
// LoaderConfig
// ──────────────────────────────────────────────

/// Settings for network-backed loaders.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub timeout: Duration,
    /// Sent as `Authorization: Bearer <token>`. Falls back to
    /// [`AUTH_TOKEN_ENV`] when unset.
    pub auth_token: Option<String>,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`-style environment settings.
    pub use_env_proxy: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            timeout: DEFAULT_TIMEOUT,
            auth_token: None,
            use_env_proxy: true,
        }
    }
}

impl LoaderConfig {
    /// The configured token, or the one from the environment.
    pub fn resolved_auth_token(&self) -> Option<String> {
        self.auth_token
            .clone()
            .or_else(|| std::env::var(AUTH_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
    }
}

// ──────────────────────────────────────────────
// OptionLoader trait
// ──────────────────────────────────────────────

/// Fetches option lists from a dynamic data source.
///
/// Implementations only provide [`OptionLoader::fetch`]; URL templating and
/// projection are shared by the provided [`OptionLoader::load`].
#[async_trait]
pub trait OptionLoader: Send + Sync {
    /// GET `url` and return the parsed JSON body.
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, LoaderError>;

    /// Identifier used in logs (e.g. "http", "static").
    fn loader_id(&self) -> &str;

    /// Build the request URL from the current values, fetch it, and project
    /// the response into options.
    async fn load(
        &self,
        source: &DataSourceConfig,
        values: &FormValues,
    ) -> Result<Vec<OptionItem>, LoaderError> {
        let url = build_url(source, values);
        tracing::debug!(loader = self.loader_id(), url = %url, "loading options");
        let payload = self.fetch(&url).await?;
        project_options(&url, &payload, source)
    }
}

/// Substitute every configured `{name}` placeholder with the text of the
/// mapped field's current value (empty when absent).
pub fn build_url(source: &DataSourceConfig, values: &FormValues) -> String {
    source
        .parameters
        .iter()
        .fold(source.url.clone(), |url, (placeholder, field_name)| {
            let replacement = values
                .get(field_name)
                .map(|v| v.to_text())
                .unwrap_or_default();
            url.replace(&format!("{{{}}}", placeholder), &replacement)
        })
}

/// Project a JSON array of objects into options using the configured
/// value/text property names.
pub fn project_options(
    url: &str,
    payload: &serde_json::Value,
    source: &DataSourceConfig,
) -> Result<Vec<OptionItem>, LoaderError> {
    let items = payload.as_array().ok_or_else(|| LoaderError::Payload {
        url: url.to_string(),
        message: "expected a JSON array".to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(LoaderError::Payload {
                    url: url.to_string(),
                    message: format!("element {} is not an object", index),
                });
            }
            let property = |name: &str| {
                item.get(name)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| LoaderError::MissingProperty {
                        index,
                        property: name.to_string(),
                    })
            };
            Ok(OptionItem {
                value: property(&source.value_field)?,
                text: property(&source.text_field)?,
            })
        })
        .collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> DataSourceConfig {
        serde_json::from_value(serde_json::json!({
            "url": "https://api.example.com/states?country={country}&lang={lang}",
            "parameters": {"country": "Country", "lang": "Language"},
            "valueField": "code",
            "textField": "name"
        }))
        .unwrap()
    }

    #[test]
    fn build_url_substitutes_placeholders() {
        let mut values = FormValues::new();
        values.set("Country", "US");
        assert_eq!(
            build_url(&source(), &values),
            "https://api.example.com/states?country=US&lang="
        );
    }

    #[test]
    fn build_url_without_parameters_is_unchanged() {
        let mut src = source();
        src.parameters.clear();
        assert_eq!(build_url(&src, &FormValues::new()), src.url);
    }

    #[test]
    fn project_options_maps_properties() {
        let payload = serde_json::json!([
            {"code": "CA", "name": "California", "extra": 1},
            {"code": "NY", "name": "New York"}
        ]);
        let options = project_options("u", &payload, &source()).unwrap();
        assert_eq!(
            options,
            vec![
                OptionItem::new("CA", "California"),
                OptionItem::new("NY", "New York")
            ]
        );
    }

    #[test]
    fn project_options_rejects_missing_property() {
        let payload = serde_json::json!([{"code": "CA"}]);
        assert_eq!(
            project_options("u", &payload, &source()),
            Err(LoaderError::MissingProperty {
                index: 0,
                property: "name".to_string()
            })
        );
    }

    #[test]
    fn project_options_rejects_non_string_property() {
        let payload = serde_json::json!([{"code": 1, "name": "One"}]);
        assert!(matches!(
            project_options("u", &payload, &source()),
            Err(LoaderError::MissingProperty { .. })
        ));
    }

    #[test]
    fn project_options_rejects_non_arrays() {
        assert!(matches!(
            project_options("u", &serde_json::json!({"items": []}), &source()),
            Err(LoaderError::Payload { .. })
        ));
        assert!(matches!(
            project_options("u", &serde_json::json!(["CA"]), &source()),
            Err(LoaderError::Payload { .. })
        ));
    }

    #[test]
    fn explicit_token_wins_over_environment() {
        let config = LoaderConfig {
            auth_token: Some("abc".to_string()),
            ..LoaderConfig::default()
        };
        assert_eq!(config.resolved_auth_token(), Some("abc".to_string()));
    }
}
