//! Query catalog: the ordered list of API queries a run executes.
//!
//! Each [`QueryDefinition`] names an endpoint plus the three request
//! parameters the reporting API understands (`orderby`, `take`, `where`).
//! Definitions are validated when the catalog is constructed and are never
//! mutated afterwards.

use crate::error::{CoreError, CoreResult};
use crate::identifier::check_file_safe;
use crate::query_id::QueryId;
use crate::warehouse::WarehouseCode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Name of the template variable that receives the warehouse code.
pub const WAREHOUSE_VAR: &str = "warehouse";

/// Predicate appended to the filter when a warehouse query has no placeholder.
pub const DEFAULT_WAREHOUSE_PREDICATE: &str = "ctxn_warehouse_code ilike '{{ warehouse }}'";

/// Endpoint shared by the built-in material transaction queries.
const MATERIAL_TRANSACTIONS_ENDPOINT: &str = "/System.MaterialTransactions.List.View1";

/// One parameterized API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDefinition {
    /// Query identifier, stamped onto records as `_query_id`
    pub id: QueryId,

    /// Fixed output file name for pairings without a warehouse.
    /// Its extension is replaced by the configured format's extension.
    #[serde(default)]
    pub output: Option<String>,

    /// Endpoint path appended to the base URL
    pub endpoint: String,

    /// `orderby` parameter
    pub order_by: String,

    /// `take` parameter (row limit)
    pub take: u32,

    /// `where` parameter template. May reference configured vars and,
    /// for warehouse queries, `{{ warehouse }}`.
    #[serde(default)]
    pub filter: String,

    /// Run once per configured warehouse code
    #[serde(default)]
    pub use_warehouse: bool,

    /// Predicate appended to `filter` when `use_warehouse` is set and the
    /// filter has no warehouse placeholder
    #[serde(default = "default_warehouse_predicate")]
    pub warehouse_predicate: String,
}

fn default_warehouse_predicate() -> String {
    DEFAULT_WAREHOUSE_PREDICATE.to_string()
}

impl QueryDefinition {
    /// Check the structural invariants of a single definition.
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: &str| CoreError::InvalidQuery {
            id: self.id.to_string(),
            reason: reason.to_string(),
        };

        if self.endpoint.trim().is_empty() {
            return Err(invalid("endpoint must not be empty"));
        }
        if self
            .endpoint
            .chars()
            .any(|c| c.is_whitespace() || c == '?' || c == '#')
        {
            return Err(invalid(
                "endpoint must be a plain path without whitespace, '?' or '#'",
            ));
        }
        if self.order_by.trim().is_empty() {
            return Err(invalid("order_by must not be empty"));
        }
        if self.take == 0 {
            return Err(invalid("take must be greater than zero"));
        }
        if self.use_warehouse && self.warehouse_predicate.trim().is_empty() {
            return Err(invalid(
                "warehouse_predicate must not be empty when use_warehouse is set",
            ));
        }
        if let Some(output) = &self.output {
            check_file_safe(output)
                .map_err(|reason| invalid(&format!("output name {}", reason)))?;
        }
        Ok(())
    }

    /// Stem used for the output file of the no-warehouse pairing.
    pub fn output_stem(&self) -> &str {
        self.output
            .as_deref()
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.id.as_str())
    }

    /// Deterministic output file name for a pairing.
    ///
    /// - with a warehouse: `{id}_{warehouse}.{ext}`
    /// - without: the fixed output name (extension replaced) or `{id}.{ext}`
    pub fn output_file_name(&self, warehouse: Option<&WarehouseCode>, extension: &str) -> String {
        match warehouse {
            Some(code) => format!("{}_{}.{}", self.id, code, extension),
            None => format!("{}.{}", self.output_stem(), extension),
        }
    }
}

/// Reject pairings of `queries` x `warehouses` that would write the same
/// output file.
///
/// Warehouse queries contribute one `{id}_{code}` name per code, so a
/// collision can only be detected once the warehouse list is known.
pub fn check_output_names<'a, I>(queries: I, warehouses: &[WarehouseCode]) -> CoreResult<()>
where
    I: IntoIterator<Item = &'a QueryDefinition>,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    for query in queries {
        let pairings: Vec<Option<&WarehouseCode>> = if query.use_warehouse {
            warehouses.iter().map(Some).collect()
        } else {
            vec![None]
        };

        for warehouse in pairings {
            let stem = match warehouse {
                Some(code) => format!("{}_{}", query.id, code),
                None => query.output_stem().to_string(),
            };
            let label = match warehouse {
                Some(code) => format!("{}@{}", query.id, code),
                None => query.id.to_string(),
            };
            if let Some(first) = seen.get(&stem) {
                return Err(CoreError::DuplicateOutput {
                    output: stem,
                    first: first.clone(),
                    second: label,
                });
            }
            seen.insert(stem, label);
        }
    }
    Ok(())
}

/// Ordered, validated list of query definitions.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct QueryCatalog {
    queries: Vec<QueryDefinition>,
}

impl QueryCatalog {
    /// Build a catalog, rejecting invalid or conflicting definitions.
    pub fn new(queries: Vec<QueryDefinition>) -> CoreResult<Self> {
        if queries.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }

        let mut seen_ids: HashSet<&str> = HashSet::with_capacity(queries.len());
        for query in &queries {
            query.validate()?;

            if !seen_ids.insert(query.id.as_str()) {
                return Err(CoreError::DuplicateQuery {
                    id: query.id.to_string(),
                });
            }
        }

        // Warehouse pairings are checked once the codes are known
        check_output_names(&queries, &[])?;
        Ok(Self { queries })
    }

    /// The catalog shipped with the binary: material transactions for
    /// movement type 261 over a rolling `lookback_days` window.
    pub fn builtin() -> CoreResult<Self> {
        Self::new(builtin_queries()?)
    }

    /// Iterate definitions in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryDefinition> {
        self.queries.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the catalog has no definitions.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&QueryDefinition> {
        self.queries.iter().find(|q| q.id == id)
    }

    /// Query ids in catalog order.
    pub fn ids(&self) -> Vec<&str> {
        self.queries.iter().map(|q| q.id.as_str()).collect()
    }

    /// Narrow the catalog to the given ids, keeping catalog order.
    ///
    /// An empty selection returns every definition.
    pub fn select(&self, ids: &[String]) -> CoreResult<Vec<&QueryDefinition>> {
        if ids.is_empty() {
            return Ok(self.queries.iter().collect());
        }

        for id in ids {
            if self.get(id).is_none() {
                return Err(CoreError::QueryNotFound {
                    id: id.clone(),
                    available: self.ids().join(", "),
                });
            }
        }

        Ok(self
            .queries
            .iter()
            .filter(|q| ids.iter().any(|id| q.id == id.as_str()))
            .collect())
    }
}

impl<'a> IntoIterator for &'a QueryCatalog {
    type Item = &'a QueryDefinition;
    type IntoIter = std::slice::Iter<'a, QueryDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}

fn material_transactions(id: &str, filter: &str) -> CoreResult<QueryDefinition> {
    let query_id = QueryId::parse(id).map_err(|reason| CoreError::InvalidQuery {
        id: id.to_string(),
        reason: reason.to_string(),
    })?;
    Ok(QueryDefinition {
        id: query_id,
        output: Some(format!("{}.json", id)),
        endpoint: MATERIAL_TRANSACTIONS_ENDPOINT.to_string(),
        order_by: "ctxn_transaction_date desc".to_string(),
        take: 30000,
        filter: filter.to_string(),
        use_warehouse: false,
        warehouse_predicate: default_warehouse_predicate(),
    })
}

fn builtin_queries() -> CoreResult<Vec<QueryDefinition>> {
    Ok(vec![
        material_transactions(
            "Consulta_1",
            "ctxn_movement_type ilike '261%' \
             and (ctxn_transaction_date > current_date - {{ lookback_days }}) \
             and ctxn_warehouse_code ilike '1145' \
             and not (ctxn_primary_uom_code ilike 'Und')",
        )?,
        material_transactions(
            "Consulta_2",
            "ctxn_movement_type ilike '261%' \
             and (ctxn_transaction_date > current_date - {{ lookback_days }}) \
             and ctxn_warehouse_code ilike '1145' \
             and ctxn_primary_uom_code ilike 'Und'",
        )?,
        material_transactions(
            "Consulta_3",
            "ctxn_movement_type ilike '261%' \
             and (ctxn_transaction_date > current_date - {{ lookback_days }}) \
             and ctxn_warehouse_code ilike '1290'",
        )?,
    ])
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
