//! CLI configuration file.
//!
//! # Example
//!
//! ```toml
//! [loader]
//! timeout_ms = 5000
//! auth_token = "..."
//! use_env_proxy = false
//!
//! # Answer these URLs from local files instead of the network.
//! [loader.fixtures]
//! "https://geo.example.com/states?country=US" = "fixtures/us-states.json"
//! ```
//!
//! Relative fixture paths resolve against the config file's directory.
//! `FORMRULE_LOADER_TIMEOUT_MS` overrides `timeout_ms`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use formrule_eval::{LoaderConfig, RuleEngine, StaticOptionLoader};
use serde::Deserialize;

pub(crate) const TIMEOUT_ENV: &str = "FORMRULE_LOADER_TIMEOUT_MS";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CliConfig {
    #[serde(default)]
    pub loader: LoaderSection,
    /// Directory the config was read from; fixture paths are relative to it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// `[loader]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LoaderSection {
    pub timeout_ms: Option<u64>,
    pub auth_token: Option<String>,
    pub use_env_proxy: Option<bool>,
    /// URL -> JSON file answering it.
    #[serde(default)]
    pub fixtures: BTreeMap<String, PathBuf>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config TOML file from `path`.
///
/// Returns a human-readable error string on failure.
pub(crate) fn read_config(path: &Path) -> Result<CliConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let mut config: CliConfig = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
    config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(config)
}

impl CliConfig {
    /// Loader settings with defaults and the environment override applied.
    pub(crate) fn loader_config(&self) -> Result<LoaderConfig, String> {
        let mut config = LoaderConfig::default();
        if let Some(ms) = self.loader.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a number of milliseconds, got '{}'", TIMEOUT_ENV, raw))?;
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(token) = &self.loader.auth_token {
            config.auth_token = Some(token.clone());
        }
        if let Some(use_env_proxy) = self.loader.use_env_proxy {
            config.use_env_proxy = use_env_proxy;
        }
        Ok(config)
    }

    /// Engine using fixtures when any are configured, HTTP otherwise.
    pub(crate) fn build_engine(&self) -> Result<RuleEngine, String> {
        if self.loader.fixtures.is_empty() {
            return Ok(RuleEngine::with_http(&self.loader_config()?));
        }

        let mut loader = StaticOptionLoader::new();
        for (url, file) in &self.loader.fixtures {
            let path = self.base_dir.join(file);
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("could not read fixture '{}': {}", path.display(), e))?;
            let body: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| format!("invalid JSON in fixture '{}': {}", path.display(), e))?;
            loader = loader.with_json(url.clone(), body);
        }
        tracing::debug!(fixtures = self.loader.fixtures.len(), "using fixture option loader");
        Ok(RuleEngine::new(Arc::new(loader)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loader_section() {
        let config: CliConfig = toml::from_str(
            r#"
            [loader]
            timeout_ms = 250
            use_env_proxy = false

            [loader.fixtures]
            "https://x.test/a" = "a.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.loader.timeout_ms, Some(250));
        assert_eq!(config.loader.use_env_proxy, Some(false));
        assert_eq!(
            config.loader.fixtures.get("https://x.test/a"),
            Some(&PathBuf::from("a.json"))
        );
    }

    #[test]
    fn empty_file_is_default() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert!(config.loader.fixtures.is_empty());
        assert!(config.loader.timeout_ms.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CliConfig>("[loader]\nretries = 3\n").is_err());
    }

    #[test]
    fn fixtures_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"[{"id": "1", "label": "One"}]"#).unwrap();
        let config_path = dir.path().join("formrule.toml");
        std::fs::write(&config_path, "[loader.fixtures]\n\"https://x.test/a\" = \"a.json\"\n").unwrap();

        let config = read_config(&config_path).unwrap();
        let engine = config.build_engine().unwrap();
        assert_eq!(engine.loader().loader_id(), "static");
    }

    #[test]
    fn missing_fixture_is_an_error() {
        let mut config = CliConfig::default();
        config
            .loader
            .fixtures
            .insert("https://x.test/a".to_string(), PathBuf::from("/nonexistent/a.json"));
        assert!(config.build_engine().unwrap_err().contains("could not read fixture"));
    }
}
