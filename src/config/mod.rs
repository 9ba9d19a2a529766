use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use tracing::info;

use crate::provider::gemini::DEFAULT_API_BASE_URL;

const DEFAULT_PORT: u16 = 8420;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// Optional `config.toml` overrides.  Everything here has a sane default so
/// the file is never required; the API key is env-only and never written to
/// disk or config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    port: Option<u16>,
    bind_address: Option<String>,
    api_base_url: Option<String>,
}

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (env `GEMINI_API_KEY`).  Required — startup fails
    /// without it.
    pub api_key: String,
    pub api_base_url: String,
    pub port: u16,
    pub bind_address: String,
}

impl Config {
    /// Resolve configuration: defaults ← config file ← CLI/env overrides.
    ///
    /// A missing API key is a fatal configuration error, surfaced before any
    /// listener is bound.
    pub fn load(
        config_path: Option<&Path>,
        port_override: Option<u16>,
        bind_override: Option<String>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                let parsed: FileConfig = toml::from_str(&text)
                    .with_context(|| format!("invalid config file {}", path.display()))?;
                info!(path = %path.display(), "loaded config file");
                parsed
            }
            _ => FileConfig::default(),
        };

        let api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable is not set")?;

        Ok(Self {
            api_key,
            api_base_url: file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            port: port_override.or(file.port).unwrap_or(DEFAULT_PORT),
            bind_address: bind_override
                .or(file.bind_address)
                .unwrap_or_else(default_bind_address),
        })
    }
}

// The api_key must never appear in logs — log Config via this summary, not Debug.
impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bind={}:{} api_base={}",
            self.bind_address, self.port, self.api_base_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    // Env-var tests share GEMINI_API_KEY; run serially.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn defaults_apply_without_config_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("GEMINI_API_KEY", "test-key");
        let cfg = Config::load(None, None, None).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.bind_address, "127.0.0.1");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("GEMINI_API_KEY");
        let err = Config::load(None, None, None).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        std::env::set_var("GEMINI_API_KEY", "test-key");
    }

    #[test]
    fn file_values_override_defaults_and_flags_override_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("GEMINI_API_KEY", "test-key");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9000\nbind_address = \"0.0.0.0\"").unwrap();

        let cfg = Config::load(Some(file.path()), None, None).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bind_address, "0.0.0.0");

        let cfg = Config::load(Some(file.path()), Some(4242), None).unwrap();
        assert_eq!(cfg.port, 4242);
    }

    #[test]
    fn display_summary_never_contains_the_key() {
        let cfg = Config {
            api_key: "super-secret".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
        };
        assert!(!format!("{cfg}").contains("super-secret"));
    }
}
