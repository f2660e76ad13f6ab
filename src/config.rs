//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. DELIVERY_RATES_CONFIG environment variable
//! 3. Built-in defaults

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::aggregate::UnknownKeyPolicy;
use crate::classifier::ClassifierConfig;
use crate::error::{ReportError, Result};
use crate::rate::Thresholds;
use crate::report::{ReportOptions, SortOrder};
use crate::source::DataSource;

pub const CONFIG_ENV: &str = "DELIVERY_RATES_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub classifier: ClassifierConfig,
    pub report: ReportConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// CSV export link of the order spreadsheet
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long the API server keeps a fetched sheet before refetching
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl SourceConfig {
    /// A local path takes precedence over a URL.
    pub fn data_source(&self) -> Option<DataSource> {
        match (&self.path, &self.url) {
            (Some(path), _) => Some(DataSource::File(path.clone())),
            (None, Some(url)) => Some(DataSource::Url(url.clone())),
            (None, None) => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyMode {
    #[default]
    Exclude,
    Bucket,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub order: SortOrder,
    /// Handling of orders without a courier (or base)
    #[serde(default)]
    pub unknown_key: UnknownKeyMode,
    #[serde(default = "default_unknown_label")]
    pub unknown_label: String,
    #[serde(default)]
    pub thresholds: Thresholds,
}

fn default_unknown_label() -> String {
    "(não informado)".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            order: SortOrder::default(),
            unknown_key: UnknownKeyMode::default(),
            unknown_label: default_unknown_label(),
            thresholds: Thresholds::default(),
        }
    }
}

impl ReportConfig {
    pub fn options(&self) -> ReportOptions {
        let unknown = match self.unknown_key {
            UnknownKeyMode::Exclude => UnknownKeyPolicy::Exclude,
            UnknownKeyMode::Bucket => UnknownKeyPolicy::Bucket(self.unknown_label.clone()),
        };
        ReportOptions {
            order: self.order,
            unknown,
            thresholds: self.thresholds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text).map_err(|e| ReportError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ReportError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded config from {:?}", path);
        Self::from_toml(&text)
    }

    /// Explicit path, then the environment variable, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.report.thresholds.validate()?;
        if self.source.timeout_secs == 0 {
            return Err(ReportError::Config("source.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert!(config.classifier.at_base);
        assert_eq!(config.report.order, SortOrder::Ascending);
        assert_eq!(config.report.options().unknown, UnknownKeyPolicy::Exclude);
        assert_eq!(config.report.thresholds, Thresholds::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.source.data_source(), None);
    }

    #[test]
    fn test_full_file() {
        let text = r#"
            [source]
            url = "https://example.com/sheet.csv"
            timeout_secs = 10

            [classifier]
            at_base = false
            delivered_exact = ["Sim"]

            [report]
            order = "none"
            unknown_key = "bucket"
            unknown_label = "(sem entregador)"

            [report.thresholds]
            green = 97.5
            yellow = 90.0

            [server]
            port = 9000
        "#;
        let config = AppConfig::from_toml(text).unwrap();
        assert_eq!(
            config.source.data_source(),
            Some(DataSource::Url("https://example.com/sheet.csv".to_string()))
        );
        assert_eq!(config.source.timeout(), Duration::from_secs(10));
        assert_eq!(config.source.cache_ttl_secs, 300);
        assert!(!config.classifier.at_base);
        assert_eq!(config.classifier.delivered_exact, vec!["Sim".to_string()]);

        let options = config.report.options();
        assert_eq!(options.order, SortOrder::Unordered);
        assert_eq!(options.unknown, UnknownKeyPolicy::Bucket("(sem entregador)".to_string()));
        assert_eq!(options.thresholds.green, 97.5);
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_example_file_parses() {
        let config = AppConfig::from_toml(include_str!("../config/example.toml")).unwrap();
        assert!(matches!(config.source.data_source(), Some(DataSource::Url(_))));
        assert_eq!(config.report.order, SortOrder::Ascending);
    }

    #[test]
    fn test_path_wins_over_url() {
        let source = SourceConfig {
            path: Some(PathBuf::from("orders.csv")),
            url: Some("https://example.com".to_string()),
            ..SourceConfig::default()
        };
        assert_eq!(source.data_source(), Some(DataSource::File(PathBuf::from("orders.csv"))));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let text = "[report.thresholds]\ngreen = 90.0\nyellow = 95.0\n";
        assert!(matches!(AppConfig::from_toml(text), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_order() {
        assert!(AppConfig::from_toml("[report]\norder = \"sideways\"\n").is_err());
    }
}
