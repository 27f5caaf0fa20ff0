//! Proxy settings
//!
//! Settings come from an optional JSON file, overridden by CLI flags and
//! environment variables at startup.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Which Ollama API the proxy speaks upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Ollama's native `/api/chat` API
    Native,
    /// Ollama's OpenAI-compatible `/v1/chat/completions` API
    Openai,
}

/// Proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Address to bind the HTTP server on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the HTTP server on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the Ollama server (no `/api/chat` or `/v1` suffix)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Backend request timeout in seconds, applied once at client construction
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upstream dialect
    #[serde(default = "default_dialect")]
    pub dialect: Dialect,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_backend_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    240
}

fn default_dialect() -> Dialect {
    Dialect::Native
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
            dialect: default_dialect(),
        }
    }
}

impl RelaySettings {
    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. A missing file
    /// yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| RelayError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| RelayError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Backend base URL without a trailing slash
    pub fn backend_url_trimmed(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = RelaySettings::default();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.backend_url, "http://localhost:11434");
        assert_eq!(settings.timeout_secs, 240);
        assert_eq!(settings.dialect, Dialect::Native);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings =
            RelaySettings::load_from_path(Path::new("/nonexistent/relay.json")).unwrap();
        assert_eq!(settings.port, 5000);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 8080, "dialect": "openai"}}"#).unwrap();

        let settings = RelaySettings::load_from_path(file.path()).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.dialect, Dialect::Openai);
        // Unspecified fields fall back to defaults
        assert_eq!(settings.timeout_secs, 240);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = RelaySettings::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, RelayError::ConfigParse { .. }));
    }

    #[test]
    fn test_backend_url_trimmed() {
        let settings = RelaySettings {
            backend_url: "http://localhost:11434/".to_string(),
            ..RelaySettings::default()
        };
        assert_eq!(settings.backend_url_trimmed(), "http://localhost:11434");
    }
}
