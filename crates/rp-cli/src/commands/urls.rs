//! Urls command implementation: a dry run that prints request URLs

use anyhow::{Context, Result};
use rp_request::UrlBuilder;

use crate::cli::{GlobalArgs, UrlsArgs};
use crate::commands::common;

/// Execute the urls command
pub(crate) fn execute(args: &UrlsArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = common::load_config(global)?;
    let catalog = config.catalog().context("Invalid query catalog")?;
    let selected = common::parse_query_list(args.queries.as_deref());
    let queries = catalog.select(&selected)?;

    let run_config = common::resolve_run_config(&config, &root, common::global_overrides(global))?;
    let urls = UrlBuilder::from_config(&run_config)?;
    urls.validate_catalog(&catalog)
        .context("Filter template validation failed")?;

    for query in queries {
        let warehouses = common::pairings_for(query, &run_config.warehouses);
        if warehouses.is_empty() {
            println!("# {} skipped: no warehouse codes configured", query.id);
            continue;
        }
        for warehouse in warehouses {
            let label = match warehouse {
                Some(code) => format!("{}@{}", query.id, code),
                None => query.id.to_string(),
            };
            let url = urls
                .build(query, warehouse)
                .with_context(|| format!("Failed to build request URL for {}", label))?;
            println!("{}\t{}", label, url);
        }
    }
    Ok(())
}
