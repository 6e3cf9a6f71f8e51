//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use rp_core::{Config, CoreError, QueryDefinition, RunConfig, RunOverrides, WarehouseCode};
use rp_request::RequestError;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Return `Err(ExitCode(N).into())` instead of calling
/// `std::process::exit(N)` so destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main handles it before anything is printed
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status for pairing failures
pub(crate) const EXIT_PAIRING_FAILED: i32 = 1;

/// Exit status for configuration and usage errors
pub(crate) const EXIT_CONFIG_ERROR: i32 = 2;

/// Map an error that escaped a command to a process exit status.
///
/// Configuration problems exit with 2, anything else with 1.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> i32 {
    let is_config = err
        .chain()
        .any(|cause| cause.is::<CoreError>() || cause.is::<RequestError>());
    if is_config {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_PAIRING_FAILED
    }
}

/// Load the project configuration and return it with the project root.
///
/// `--config` names the file directly; otherwise reportpull.yml is looked
/// up in `--project-dir`, falling back to the built-in catalog.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(Config, PathBuf)> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::load_from_dir(&root)
            .with_context(|| format!("Failed to load project at {}", root.display()))?,
    };
    log::debug!("Loaded config '{}'", config.name);
    Ok((config, root))
}

/// Overrides shared by every command that talks to (or about) the API.
pub(crate) fn global_overrides(global: &GlobalArgs) -> RunOverrides {
    RunOverrides {
        base_url: global.base_url.clone(),
        token: global.token.clone(),
        warehouses: global.warehouses.clone(),
        ..RunOverrides::default()
    }
}

/// Resolve run settings, attaching CLI context to configuration errors.
pub(crate) fn resolve_run_config(
    config: &Config,
    root: &Path,
    overrides: RunOverrides,
) -> Result<RunConfig> {
    RunConfig::resolve(config, root, overrides).context("Invalid run settings")
}

/// Split a comma-separated `--queries` value.
pub(crate) fn parse_query_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Warehouses a query runs against: one `Some` per code for warehouse
/// queries, a single `None` otherwise. Empty when a warehouse query has
/// no codes to run with.
pub(crate) fn pairings_for<'a>(
    query: &QueryDefinition,
    warehouses: &'a [WarehouseCode],
) -> Vec<Option<&'a WarehouseCode>> {
    if query.use_warehouse {
        warehouses.iter().map(Some).collect()
    } else {
        vec![None]
    }
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!(
        "{}",
        render(headers.iter().map(|h| h.to_string()).collect())
    );
    println!(
        "{}",
        render(widths.iter().map(|&w| "-".repeat(w)).collect())
    );
    for row in rows {
        println!("{}", render(row.clone()));
    }
}
