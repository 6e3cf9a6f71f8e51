//! Warehouse codes and parsing of the configured warehouse list.

use crate::error::{CoreError, CoreResult};
use crate::identifier::{check_file_safe, define_identifier};

fn check_warehouse(s: &str) -> Result<(), &'static str> {
    check_file_safe(s)?;
    // Spliced into a single-quoted filter literal
    if s.contains('\'') {
        return Err("must not contain single quotes");
    }
    Ok(())
}

define_identifier! {
    /// Opaque site/location identifier used to parameterize queries.
    pub struct WarehouseCode;
    validate = check_warehouse;
}

/// Parse the `WAREHOUSES` setting.
///
/// Accepts a JSON list (`["1145", "1290"]`, numbers allowed) or a plain
/// comma-separated list (`1145,1290`). Blank input yields an empty list.
/// Duplicates are dropped, first occurrence wins.
pub fn parse_warehouse_list(input: &str) -> CoreResult<Vec<WarehouseCode>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<String> = if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(trimmed).map_err(|e| CoreError::WarehouseListParse {
                input: input.to_string(),
                message: e.to_string(),
            })?;
        values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => Ok(s),
                serde_json::Value::Number(n) => Ok(n.to_string()),
                other => Err(CoreError::WarehouseListParse {
                    input: input.to_string(),
                    message: format!("expected string or number, found {}", other),
                }),
            })
            .collect::<CoreResult<_>>()?
    } else {
        trimmed
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    let mut codes: Vec<WarehouseCode> = Vec::with_capacity(raw.len());
    for code in raw {
        let parsed = WarehouseCode::parse(code.clone()).map_err(|reason| {
            CoreError::InvalidWarehouse {
                code,
                reason: reason.to_string(),
            }
        })?;
        if codes.contains(&parsed) {
            log::warn!("Ignoring duplicate warehouse code '{}'", parsed);
            continue;
        }
        codes.push(parsed);
    }
    Ok(codes)
}
