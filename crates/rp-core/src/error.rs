//! Error types for rp-core

use thiserror::Error;

/// Core error type for Reportpull
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Required setting missing from flags, environment and config file
    #[error("[C004] Missing required setting {name}. Set it with {hint}")]
    MissingSetting { name: String, hint: String },

    /// Q001: Query definition rejected at catalog construction
    #[error("[Q001] Invalid query '{id}': {reason}")]
    InvalidQuery { id: String, reason: String },

    /// Q002: Two catalog entries share an id
    #[error("[Q002] Duplicate query id: {id}")]
    DuplicateQuery { id: String },

    /// Q003: Two catalog entries would write the same output file
    #[error("[Q003] Queries '{first}' and '{second}' share the output name '{output}'")]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },

    /// Q004: Catalog has no queries
    #[error("[Q004] Query catalog is empty")]
    EmptyCatalog,

    /// Q005: Query selected on the command line is not in the catalog
    #[error("[Q005] Query not found: {id}. Available queries: {available}")]
    QueryNotFound { id: String, available: String },

    /// W001: Warehouse code rejected
    #[error("[W001] Invalid warehouse code '{code}': {reason}")]
    InvalidWarehouse { code: String, reason: String },

    /// W002: Warehouse list could not be parsed
    #[error("[W002] Failed to parse warehouse list '{input}': {message}")]
    WarehouseListParse { input: String, message: String },

    /// C005: IO error with file path context
    #[error("[C005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
