//! Configuration types and parsing for reportpull.yml
//!
//! The file is optional: without one the built-in catalog and defaults are
//! used. Secrets (the API token) never live in the file; they come from the
//! environment or the command line and are merged into a [`RunConfig`]
//! once at start-up.

use crate::catalog::QueryDefinition;
use crate::error::{CoreError, CoreResult};
use crate::warehouse::{parse_warehouse_list, WarehouseCode};
use crate::QueryCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Config file names looked up in the project directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["reportpull.yml", "reportpull.yaml"];

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "API_TOKEN";

/// Environment variable holding the API base URL.
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";

/// Environment variable holding the warehouse list.
pub const ENV_WAREHOUSES: &str = "WAREHOUSES";

/// Upper bound accepted for `fetch.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 100;

/// Rolling window (days) used by the built-in catalog.
const DEFAULT_LOOKBACK_DAYS: u64 = 120;

/// Project configuration from reportpull.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name, used in log lines
    #[serde(default = "default_name")]
    pub name: String,

    /// API base URL (the environment or `--base-url` wins when set)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Directory receiving one output file per pairing
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Serialization format of output files
    #[serde(default)]
    pub format: OutputFormat,

    /// Timeouts, retries and pauses
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Warehouse codes (the environment or `--warehouses` wins when set)
    #[serde(default)]
    pub warehouses: Vec<WarehouseCode>,

    /// Variables available to filter templates
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,

    /// Query catalog. Empty means the built-in catalog.
    #[serde(default)]
    pub queries: Vec<QueryDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            name: default_name(),
            base_url: None,
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            fetch: FetchConfig::default(),
            warehouses: Vec::new(),
            vars: HashMap::new(),
            queries: Vec::new(),
        };
        config.apply_default_vars();
        config
    }
}

fn default_name() -> String {
    "reportpull".to_string()
}

fn default_output_dir() -> String {
    "data".to_string()
}

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON array (default)
    #[default]
    Json,
    /// Newline-delimited JSON, one record per line
    Ndjson,
    /// Columnar Parquet file
    Parquet,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Ndjson => "ndjson",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "ndjson" | "jsonl" => Ok(OutputFormat::Ndjson),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(CoreError::ConfigInvalid {
                message: format!(
                    "Unknown output format '{}'. Valid formats: json, ndjson, parquet",
                    other
                ),
            }),
        }
    }
}

/// Request timeout, retry and pacing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between attempts, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Pause between distinct queries, in seconds
    #[serde(default = "default_query_delay_secs")]
    pub query_delay_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            query_delay_secs: default_query_delay_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_secs() -> u64 {
    10
}

fn default_query_delay_secs() -> u64 {
    30
}

impl FetchConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause between attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Pause between distinct queries
    pub fn query_delay(&self) -> Duration {
        Duration::from_secs(self.query_delay_secs)
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_default_vars();
        config.validate()?;
        Ok(config)
    }

    /// Load reportpull.yml (or .yaml) from a project directory, falling back
    /// to defaults when neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!(
                    "No config file in {}, using built-in catalog",
                    dir.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Locate the config file in a project directory.
    pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Fill in template variables the built-in catalog relies on, without
    /// overriding anything the file sets.
    fn apply_default_vars(&mut self) {
        self.vars
            .entry("lookback_days".to_string())
            .or_insert_with(|| serde_yaml::Value::Number(DEFAULT_LOOKBACK_DAYS.into()));
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.output_dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "output_dir cannot be empty".to_string(),
            });
        }

        if self.fetch.timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "fetch.timeout_secs must be greater than zero".to_string(),
            });
        }

        if self.fetch.max_retries > MAX_RETRIES_LIMIT {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "fetch.max_retries must be at most {}, got {}",
                    MAX_RETRIES_LIMIT, self.fetch.max_retries
                ),
            });
        }

        for (i, code) in self.warehouses.iter().enumerate() {
            if self.warehouses[..i].contains(code) {
                return Err(CoreError::InvalidWarehouse {
                    code: code.to_string(),
                    reason: "listed more than once in warehouses".to_string(),
                });
            }
        }

        if self.vars.contains_key(crate::catalog::WAREHOUSE_VAR) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "'{}' is reserved for the warehouse code and cannot be set in vars",
                    crate::catalog::WAREHOUSE_VAR
                ),
            });
        }

        // Structural catalog checks; template checks happen in rp-request
        self.catalog()?;
        Ok(())
    }

    /// Build the validated query catalog described by this config.
    pub fn catalog(&self) -> CoreResult<QueryCatalog> {
        if self.queries.is_empty() {
            QueryCatalog::builtin()
        } else {
            QueryCatalog::new(self.queries.clone())
        }
    }
}

/// Settings supplied from the command line or environment.
///
/// `None` means "not given"; the config file value (if any) applies.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// API base URL
    pub base_url: Option<String>,
    /// API token
    pub token: Option<String>,
    /// Raw warehouse list (JSON list or comma-separated)
    pub warehouses: Option<String>,
    /// Output directory
    pub output_dir: Option<String>,
    /// Output format
    pub format: Option<OutputFormat>,
    /// Skip the pause between queries
    pub no_delay: bool,
}

/// Fully resolved settings for one run.
///
/// Built once at start-up and passed by reference to the URL builder,
/// fetcher and orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// API base URL
    pub base_url: String,
    /// API token, sent as the `token` header
    pub token: Option<String>,
    /// Warehouse codes for warehouse queries
    pub warehouses: Vec<WarehouseCode>,
    /// Absolute or project-relative output directory
    pub output_dir: PathBuf,
    /// Output serialization format
    pub format: OutputFormat,
    /// Timeouts, retries and pauses
    pub fetch: FetchConfig,
    /// Filter template variables
    pub vars: HashMap<String, serde_yaml::Value>,
}

impl RunConfig {
    /// Merge the config file with command line/environment overrides.
    ///
    /// Fails when no base URL is available from any source.
    pub fn resolve(config: &Config, root: &Path, overrides: RunOverrides) -> CoreResult<Self> {
        let base_url = overrides
            .base_url
            .or_else(|| config.base_url.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::MissingSetting {
                name: ENV_API_BASE_URL.to_string(),
                hint: format!(
                    "--base-url, the {} environment variable, or base_url in reportpull.yml",
                    ENV_API_BASE_URL
                ),
            })?;

        let warehouses = match overrides.warehouses.as_deref() {
            Some(raw) => parse_warehouse_list(raw)?,
            None => config.warehouses.clone(),
        };

        let output_dir = root.join(overrides.output_dir.as_deref().unwrap_or(&config.output_dir));

        let mut fetch = config.fetch.clone();
        if overrides.no_delay {
            fetch.query_delay_secs = 0;
        }

        Ok(Self {
            base_url,
            token: overrides
                .token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            warehouses,
            output_dir,
            format: overrides.format.unwrap_or(config.format),
            fetch,
            vars: config.vars.clone(),
        })
    }

    /// The API token, or a configuration error when none was supplied.
    pub fn require_token(&self) -> CoreResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| CoreError::MissingSetting {
                name: ENV_API_TOKEN.to_string(),
                hint: format!("--token or the {} environment variable", ENV_API_TOKEN),
            })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
