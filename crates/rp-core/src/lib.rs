//! rp-core - Core library for Reportpull
//!
//! This crate provides the shared types used across all Reportpull
//! components: configuration parsing, the query catalog, validated
//! identifiers, record sets with their load annotations, and the
//! per-run outcome that decides the process exit status.

pub mod catalog;
pub mod config;
pub mod error;
mod identifier;
pub mod outcome;
pub mod query_id;
pub mod record;
pub mod warehouse;

pub use catalog::{
    check_output_names, QueryCatalog, QueryDefinition, DEFAULT_WAREHOUSE_PREDICATE, WAREHOUSE_VAR,
};
pub use config::{Config, FetchConfig, OutputFormat, RunConfig, RunOverrides};
pub use error::{CoreError, CoreResult};
pub use outcome::{PairingOutcome, PairingStatus, RunOutcome};
pub use query_id::QueryId;
pub use record::{annotate, Record, RecordSet};
pub use warehouse::{parse_warehouse_list, WarehouseCode};
