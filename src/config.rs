//! TOML configuration.
//!
//! Every section is optional; [`Config::default`] is a working configuration
//! pointing at the public free-exercise-db dataset. After the file is parsed,
//! the `PORT` and `EXERCISE_CATALOG_URL` environment variables override the
//! bind address and dataset URL.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/yuhonas/free-exercise-db/main/dist/exercises.json";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Local JSON file to read instead of `url`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    crate::fuzzy::DEFAULT_THRESHOLD
}

/// Reads and validates a config file, then applies environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Loads `path` if given, otherwise starts from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => {
            let mut config = Config::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

impl Config {
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if !port.trim().is_empty() {
                self.server.bind = format!("0.0.0.0:{}", port.trim());
            }
        }
        if let Ok(url) = std::env::var("EXERCISE_CATALOG_URL") {
            if !url.trim().is_empty() {
                self.source.url = url.trim().to_string();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.source.timeout_secs == 0 {
            anyhow::bail!("source.timeout_secs must be > 0");
        }

        if self.source.path.is_none() && self.source.url.trim().is_empty() {
            anyhow::bail!("source.url must be set when source.path is absent");
        }

        if !self.search.threshold.is_finite() || self.search.threshold < 0.0 {
            anyhow::bail!("search.threshold must be a finite number >= 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, content: &str) -> PathBuf {
        let path = tmp.path().join("catalog.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.cache.ttl_secs, 3600);
        assert_eq!(cfg.source.timeout_secs, 10);
        assert!(cfg.source.path.is_none());
        assert!((cfg.search.threshold - crate::fuzzy::DEFAULT_THRESHOLD).abs() < 1e-9);
    }

    #[test]
    fn test_sections_parse() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[source]
path = "/tmp/exercises.json"
timeout_secs = 3

[cache]
ttl_secs = 60

[search]
threshold = 0.25
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.source.path, Some(PathBuf::from("/tmp/exercises.json")));
        assert_eq!(cfg.source.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.cache.ttl(), Duration::from_secs(60));
        assert!((cfg.search.threshold - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[source]\ntimeout_secs = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[search]\nthreshold = -1.0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
