//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::pipeline::stats::DEFAULT_HEADER_SCAN_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input files for the join pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_income_source")]
    pub income: StatSourceConfig,

    #[serde(default = "default_unemployment_source")]
    pub unemployment: StatSourceConfig,

    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// How many leading rows may precede a statistics header
    #[serde(default = "default_header_scan_limit")]
    pub header_scan_limit: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            income: default_income_source(),
            unemployment: default_unemployment_source(),
            boundary: BoundaryConfig::default(),
            header_scan_limit: default_header_scan_limit(),
        }
    }
}

fn default_header_scan_limit() -> usize {
    DEFAULT_HEADER_SCAN_LIMIT
}

/// One statistics table
#[derive(Debug, Clone, Deserialize)]
pub struct StatSourceConfig {
    pub path: String,

    #[serde(default = "default_county_column")]
    pub county_column: String,

    pub value_column: String,

    /// Exact number of data rows the file must contain
    #[serde(default)]
    pub expected_rows: Option<usize>,
}

fn default_county_column() -> String {
    "County".to_string()
}

fn default_income_source() -> StatSourceConfig {
    StatSourceConfig {
        path: "Household income in minnesota.csv".to_string(),
        county_column: default_county_column(),
        value_column: "Value (Dollars)".to_string(),
        expected_rows: None,
    }
}

fn default_unemployment_source() -> StatSourceConfig {
    StatSourceConfig {
        path: "Unemployment in minnesota.csv".to_string(),
        county_column: default_county_column(),
        value_column: "Value (Percent)".to_string(),
        expected_rows: None,
    }
}

/// County boundary file
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryConfig {
    #[serde(default = "default_boundary_path")]
    pub path: String,

    /// FIPS code of the state to keep
    #[serde(default = "default_state_fips")]
    pub state_fips: String,

    #[serde(default = "default_state_column")]
    pub state_column: String,

    #[serde(default = "default_name_column")]
    pub name_column: String,

    #[serde(default = "default_geoid_column")]
    pub geoid_column: String,

    /// Source CRS override, e.g. "EPSG:4269"
    #[serde(default)]
    pub crs: Option<String>,
}

fn default_boundary_path() -> String {
    "shapefiles/cb_2022_us_county_20m.shp".to_string()
}

fn default_state_fips() -> String {
    "27".to_string()
}

fn default_state_column() -> String {
    "STATEFP".to_string()
}

fn default_name_column() -> String {
    "NAME".to_string()
}

fn default_geoid_column() -> String {
    "GEOID".to_string()
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            path: default_boundary_path(),
            state_fips: default_state_fips(),
            state_column: default_state_column(),
            name_column: default_name_column(),
            geoid_column: default_geoid_column(),
            crs: None,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Enable the export endpoint
    #[serde(default = "default_enable_export")]
    pub enable_export: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_enable_export() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            enable_export: default_enable_export(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Export file naming
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// File name without extension
    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    /// Worksheet name in XLSX exports
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

fn default_file_stem() -> String {
    "mn_selected_data".to_string()
}

fn default_sheet_name() -> String {
    "Selected Data".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_stem: default_file_stem(),
            sheet_name: default_sheet_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        // Try default config locations
        let config_paths = [
            dirs::config_dir().map(|p| p.join("countyscope").join("config.toml")),
            Some(PathBuf::from("/etc/countyscope/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Data overrides
        if let Some(path) = var("COUNTYSCOPE_INCOME_PATH") {
            self.data.income.path = path;
        }
        if let Some(path) = var("COUNTYSCOPE_UNEMPLOYMENT_PATH") {
            self.data.unemployment.path = path;
        }
        if let Some(path) = var("COUNTYSCOPE_BOUNDARY_PATH") {
            self.data.boundary.path = path;
        }
        if let Some(fips) = var("COUNTYSCOPE_STATE_FIPS") {
            self.data.boundary.state_fips = fips;
        }

        // API overrides
        if let Some(host) = var("COUNTYSCOPE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("COUNTYSCOPE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("COUNTYSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("COUNTYSCOPE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Countyscope Configuration
#
# Environment variables override these settings:
# - COUNTYSCOPE_INCOME_PATH
# - COUNTYSCOPE_UNEMPLOYMENT_PATH
# - COUNTYSCOPE_BOUNDARY_PATH
# - COUNTYSCOPE_STATE_FIPS
# - COUNTYSCOPE_API_HOST
# - COUNTYSCOPE_API_PORT
# - COUNTYSCOPE_LOG_LEVEL
# - COUNTYSCOPE_LOG_FORMAT

[data]
# Maximum number of rows searched for the statistics header
header_scan_limit = 20

[data.income]
path = "Household income in minnesota.csv"
county_column = "County"
value_column = "Value (Dollars)"
# Fail the load unless exactly this many data rows are present
# expected_rows = 87

[data.unemployment]
path = "Unemployment in minnesota.csv"
county_column = "County"
value_column = "Value (Percent)"
# expected_rows = 87

[data.boundary]
# Shapefile (.shp) or GeoJSON (.geojson/.json)
path = "shapefiles/cb_2022_us_county_20m.shp"

# Keep only counties of this state (27 = Minnesota)
state_fips = "27"
state_column = "STATEFP"
name_column = "NAME"
geoid_column = "GEOID"

# Source CRS when the file does not declare one
# crs = "EPSG:4269"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8085

# Allowed CORS origins (empty = permissive)
cors_origins = []

# Enable the export endpoint
enable_export = true

[export]
# Download file name without extension
file_stem = "mn_selected_data"

# Worksheet name in XLSX exports
sheet_name = "Selected Data"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/countyscope/countyscope.log"
"#
    .to_string()
}
