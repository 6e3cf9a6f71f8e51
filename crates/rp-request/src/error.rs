//! Error types for rp-request

use thiserror::Error;

/// Request building errors
#[derive(Error, Debug)]
pub enum RequestError {
    /// No base URL to build requests against (R001)
    #[error("[R001] API base URL is empty. Set API_BASE_URL or base_url in reportpull.yml")]
    MissingBaseUrl,

    /// Filter template failed to parse or render (R002)
    #[error("[R002] Filter template error in query '{query}': {message}")]
    Template { query: String, message: String },

    /// Non-warehouse query mentions the warehouse variable (R003)
    #[error(
        "[R003] Query '{query}' references '{{{{ warehouse }}}}' but does not set use_warehouse"
    )]
    WarehousePlaceholderNotAllowed { query: String },

    /// Warehouse query built without a warehouse code (R004)
    #[error("[R004] Query '{query}' requires a warehouse code")]
    MissingWarehouse { query: String },

    /// Warehouse predicate that never mentions the warehouse (R005)
    #[error("[R005] warehouse_predicate of query '{query}' must reference '{{{{ warehouse }}}}'")]
    PredicateWithoutPlaceholder { query: String },
}

/// Result type alias for RequestError
pub type RequestResult<T> = Result<T, RequestError>;
