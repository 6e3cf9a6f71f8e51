//! Validate command implementation

use anyhow::{Context, Result};
use rp_core::config::{ENV_API_BASE_URL, ENV_API_TOKEN};
use rp_core::{check_output_names, parse_warehouse_list, Config};
use rp_request::FilterRenderer;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common;

/// Execute the validate command
pub(crate) fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = common::load_config(global)?;
    let catalog = config.catalog().context("Invalid query catalog")?;

    FilterRenderer::new(&config.vars)
        .validate_catalog(&catalog)
        .context("Filter template validation failed")?;

    let warehouses = match &global.warehouses {
        Some(raw) => parse_warehouse_list(raw).context("Invalid warehouse list")?,
        None => config.warehouses.clone(),
    };
    check_output_names(&catalog, &warehouses).context("Output file names collide")?;

    if args.strict {
        let run_config =
            common::resolve_run_config(&config, &root, common::global_overrides(global))?;
        run_config.require_token()?;
    } else {
        warn_missing_settings(&config, global);
    }

    let per_warehouse = catalog.iter().filter(|q| q.use_warehouse).count();
    if per_warehouse > 0 && warehouses.is_empty() {
        println!(
            "  ! {} warehouse queries will be skipped: no warehouse codes configured",
            per_warehouse
        );
    }

    println!(
        "✓ {} is valid: {} queries, {} warehouses, format {}",
        config.name,
        catalog.len(),
        warehouses.len(),
        config.format
    );
    Ok(())
}

fn warn_missing_settings(config: &Config, global: &GlobalArgs) {
    if global.base_url.is_none() && config.base_url.is_none() {
        println!("  ! {} is not set", ENV_API_BASE_URL);
    }
    if global.token.is_none() {
        println!("  ! {} is not set", ENV_API_TOKEN);
    }
}

