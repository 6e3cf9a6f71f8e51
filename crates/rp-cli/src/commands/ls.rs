//! List command implementation

use anyhow::{Context, Result};
use rp_core::QueryDefinition;
use serde::Serialize;

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::commands::common::{self, print_table};

/// One catalog entry as shown by `rp ls`
#[derive(Debug, Serialize)]
struct QueryInfo {
    id: String,
    endpoint: String,
    order_by: String,
    take: u32,
    use_warehouse: bool,
    output: String,
}

impl QueryInfo {
    fn new(query: &QueryDefinition, extension: &str) -> Self {
        let output = if query.use_warehouse {
            format!("{}_<warehouse>.{}", query.id, extension)
        } else {
            query.output_file_name(None, extension)
        };
        Self {
            id: query.id.to_string(),
            endpoint: query.endpoint.clone(),
            order_by: query.order_by.clone(),
            take: query.take,
            use_warehouse: query.use_warehouse,
            output,
        }
    }
}

/// Execute the ls command
pub(crate) fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let (config, _) = common::load_config(global)?;
    let catalog = config.catalog().context("Invalid query catalog")?;
    let extension = config.format.extension();

    let infos: Vec<QueryInfo> = catalog
        .iter()
        .map(|q| QueryInfo::new(q, extension))
        .collect();

    match args.output {
        LsOutput::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&infos).context("Failed to serialize catalog")?
            );
        }
        LsOutput::Table => {
            let rows: Vec<Vec<String>> = infos
                .iter()
                .map(|info| {
                    vec![
                        info.id.clone(),
                        info.endpoint.clone(),
                        info.take.to_string(),
                        if info.use_warehouse { "yes" } else { "no" }.to_string(),
                        info.output.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "ENDPOINT", "TAKE", "WAREHOUSE", "OUTPUT"], &rows);
            println!("\n{} queries", infos.len());
        }
    }
    Ok(())
}
