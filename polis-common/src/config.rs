//! Configuration loading and config file resolution
//!
//! The dashboard reads one TOML file. Which file is read follows the same
//! priority order used for every setting that can come from several places:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file (`~/.config/polis-dash/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing or malformed file never aborts startup: a warning is logged and
//! the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "POLIS_DASH_CONFIG";

/// Report shown in the URL input when nothing else is provided
pub const DEFAULT_REPORT_URL: &str = "https://pol.is/report/r4zdxrdscmukmkakmbz3k";

/// Example image shown by the placeholder plot backend
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/TutteInstitute/datamapplot/main/doc/datamapplot_example.png";

/// Which presentation variant renders the statement map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlotBackend {
    /// Pannable/zoomable map with search, embedded as HTML
    #[default]
    Interactive,
    /// Scatter figure colored by top-level label and moderation state
    Static,
    /// Fixed example image (no rendering)
    Placeholder,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Analysis recipe tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Number of label hierarchy levels (zoom levels)
    #[serde(default = "default_layers")]
    pub layers: usize,

    /// Clusters smaller than twice this size are not split further
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Iteration cap for projection and clustering loops
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            min_cluster_size: default_min_cluster_size(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Dashboard configuration (TOML file contents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Pre-filled report URL
    #[serde(default = "default_report_url")]
    pub default_report_url: String,

    /// Show the translation language input
    #[serde(default = "default_true")]
    pub translation_enabled: bool,

    /// Pre-fill inputs from `?report=` and `?lang=` query parameters
    #[serde(default = "default_true")]
    pub query_prefill: bool,

    #[serde(default)]
    pub plot_backend: PlotBackend,

    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,

    /// Transport timeout for report downloads
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub recipe: RecipeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            default_report_url: default_report_url(),
            translation_enabled: true,
            query_prefill: true,
            plot_backend: PlotBackend::default(),
            placeholder_image_url: default_placeholder_image_url(),
            http_timeout_secs: default_http_timeout_secs(),
            recipe: RecipeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_report_url() -> String {
    DEFAULT_REPORT_URL.to_string()
}

fn default_placeholder_image_url() -> String {
    DEFAULT_PLACEHOLDER_IMAGE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_layers() -> usize {
    3
}

fn default_min_cluster_size() -> usize {
    4
}

fn default_max_iterations() -> usize {
    25
}

impl DashboardConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Resolves which config file to read, then loads it with graceful degradation
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Locate the config file following the priority order
    ///
    /// Returns `None` when no tier names an existing file.
    pub fn config_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config file
        dirs::config_dir()
            .map(|d| d.join("polis-dash").join("config.toml"))
            .filter(|p| p.exists())
    }

    /// Load configuration, falling back to compiled defaults
    pub fn load(&self) -> DashboardConfig {
        let Some(path) = self.config_path() else {
            info!("No config file found, using compiled defaults");
            return DashboardConfig::default();
        };

        match DashboardConfig::from_file(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                // Priority 4: Compiled defaults
                warn!(
                    "Could not load config from {} ({}), using compiled defaults",
                    path.display(),
                    e
                );
                DashboardConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.port, 5780);
        assert_eq!(config.plot_backend, PlotBackend::Interactive);
        assert_eq!(config.recipe.layers, 3);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            port = 9000
            plot_backend = "static"
            translation_enabled = false

            [recipe]
            layers = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.plot_backend, PlotBackend::Static);
        assert!(!config.translation_enabled);
        assert!(config.query_prefill);
        assert_eq!(config.recipe.layers, 4);
        assert_eq!(config.recipe.min_cluster_size, 4);
        assert_eq!(config.default_report_url, DEFAULT_REPORT_URL);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = DashboardConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(DashboardConfig::from_toml_str("plot_backend = \"bokeh\"").is_err());
    }
}
