//! Configuration loading, validation, and management for Siftwire.
//!
//! Loads configuration from `~/.siftwire/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.siftwire/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default text-generation provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Page fetching and extraction settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Topic directory access
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("scraper", &self.scraper)
            .field("directory", &self.directory)
            .field("providers", &self.providers)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Fetch timeouts and extraction limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Timeout for a homepage scan
    #[serde(default = "default_homepage_timeout")]
    pub homepage_timeout_secs: u64,

    /// Timeout for a single article fetch
    #[serde(default = "default_article_timeout")]
    pub article_timeout_secs: u64,

    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Most articles read per question by the research pipeline
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

fn default_homepage_timeout() -> u64 {
    15
}
fn default_article_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("siftwire/", env!("CARGO_PKG_VERSION")).into()
}
fn default_max_articles() -> usize {
    8
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            homepage_timeout_secs: default_homepage_timeout(),
            article_timeout_secs: default_article_timeout(),
            user_agent: default_user_agent(),
            max_articles: default_max_articles(),
        }
    }
}

/// Access to the curated-link directory (a Notion database).
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Integration token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Database queried when a question does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,

    #[serde(default = "default_directory_url")]
    pub api_url: String,

    /// Select property holding each record's category
    #[serde(default = "default_category_property")]
    pub category_property: String,

    /// URL property holding each record's homepage
    #[serde(default = "default_url_property")]
    pub url_property: String,

    /// Static subject categories; when empty they are read from the database
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_directory_url() -> String {
    "https://api.notion.com/v1".into()
}
fn default_category_property() -> String {
    "Category".into()
}
fn default_url_property() -> String {
    "Website".into()
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            api_url: default_directory_url(),
            category_property: default_category_property(),
            url_property: default_url_property(),
            categories: Vec::new(),
        }
    }
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("token", &redact(&self.token))
            .field("database_id", &self.database_id)
            .field("api_url", &self.api_url)
            .field("category_property", &self.category_property)
            .field("url_property", &self.url_property)
            .field("categories", &self.categories)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.siftwire/config.toml).
    ///
    /// Environment variables fill in what the file leaves unset:
    /// - `SIFTWIRE_API_KEY`, `GEMINI_API_KEY`, `GOOGLE_API_KEY`, `OPENAI_API_KEY`
    /// - `NOTION_TOKEN`, `SIFTWIRE_DATABASE_ID`
    ///
    /// `SIFTWIRE_PROVIDER` and `SIFTWIRE_MODEL` always win over the file.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(k).filter(|v| !v.is_empty()));

        if self.api_key.is_none() {
            self.api_key = first(&[
                "SIFTWIRE_API_KEY",
                "GEMINI_API_KEY",
                "GOOGLE_API_KEY",
                "OPENAI_API_KEY",
            ]);
        }
        if self.directory.token.is_none() {
            self.directory.token = first(&["NOTION_TOKEN"]);
        }
        if self.directory.database_id.is_none() {
            self.directory.database_id = first(&["SIFTWIRE_DATABASE_ID"]);
        }
        if let Some(provider) = first(&["SIFTWIRE_PROVIDER"]) {
            self.default_provider = provider;
        }
        if let Some(model) = first(&["SIFTWIRE_MODEL"]) {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".siftwire")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.scraper.homepage_timeout_secs == 0 || self.scraper.article_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "scraper timeouts must be at least 1 second".into(),
            ));
        }

        if self.scraper.max_articles == 0 {
            return Err(ConfigError::ValidationError(
                "scraper.max_articles must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            scraper: ScraperConfig::default(),
            directory: DirectoryConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.scraper.homepage_timeout_secs, 15);
        assert_eq!(config.scraper.article_timeout_secs, 10);
        assert_eq!(config.directory.category_property, "Category");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.directory.url_property, "Website");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_articles_rejected() {
        let mut config = AppConfig::default();
        config.scraper.max_articles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "gemini-2.0-flash");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_model = "gemini-1.5-pro"

[scraper]
article_timeout_secs = 4

[directory]
database_id = "abc123"
categories = ["science", "health"]

[providers.openai]
api_url = "http://localhost:8080/v1"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gemini-1.5-pro");
        assert_eq!(config.scraper.article_timeout_secs, 4);
        assert_eq!(config.scraper.homepage_timeout_secs, 15);
        assert_eq!(config.directory.database_id.as_deref(), Some("abc123"));
        assert_eq!(config.directory.categories, vec!["science", "health"]);
        assert_eq!(
            config.providers["openai"].api_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_temperature = \"warm\"").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_fills_unset_secrets_only() {
        let mut config = AppConfig::default();
        config.directory.token = Some("from-file".into());
        config.apply_env(|key| match key {
            "GEMINI_API_KEY" => Some("gem-key".into()),
            "NOTION_TOKEN" => Some("from-env".into()),
            "SIFTWIRE_MODEL" => Some("gemini-2.5-flash".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("gem-key"));
        assert_eq!(config.directory.token.as_deref(), Some("from-file"));
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert_eq!(config.default_provider, "gemini");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-secret".into());
        config.directory.token = Some("secret_notion".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("secret_notion"));
        assert!(debug.contains("[REDACTED]"));
    }
}
