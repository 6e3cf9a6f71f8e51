//! Filter template rendering.
//!
//! Filters are minijinja templates. The render context is the configured
//! `vars` plus `warehouse` for warehouse pairings. Undefined variables are
//! render errors.

use crate::error::{RequestError, RequestResult};
use minijinja::{Environment, UndefinedBehavior};
use rp_core::{QueryCatalog, QueryDefinition, WarehouseCode, WAREHOUSE_VAR};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Placeholder code used to dry-render warehouse templates during validation.
const VALIDATION_WAREHOUSE: &str = "0000";

/// Renders query filters against the configured template variables
pub struct FilterRenderer {
    env: Environment<'static>,
    vars: BTreeMap<String, serde_yaml::Value>,
}

impl FilterRenderer {
    /// Create a renderer over the configured template variables
    pub fn new(vars: &HashMap<String, serde_yaml::Value>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self {
            env,
            vars: vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    /// Whether a template mentions the warehouse variable.
    pub fn references_warehouse(&self, query: &str, template: &str) -> RequestResult<bool> {
        Ok(undeclared_variables(query, template)?.contains(WAREHOUSE_VAR))
    }

    /// Render one template, exposing `warehouse` only when given.
    pub fn render(
        &self,
        query: &str,
        template: &str,
        warehouse: Option<&str>,
    ) -> RequestResult<String> {
        let mut ctx = self.vars.clone();
        if let Some(code) = warehouse {
            ctx.insert(
                WAREHOUSE_VAR.to_string(),
                serde_yaml::Value::String(code.to_string()),
            );
        }
        self.env
            .render_str(template, ctx)
            .map(|s| s.trim().to_string())
            .map_err(|e| RequestError::Template {
                query: query.to_string(),
                message: e.to_string(),
            })
    }

    /// Produce the final `where` predicate for one pairing.
    ///
    /// A non-warehouse query ignores `warehouse` entirely. A warehouse query
    /// whose filter has no placeholder gets its `warehouse_predicate`
    /// appended with `and`, or used alone when the filter is empty.
    pub fn render_filter(
        &self,
        query: &QueryDefinition,
        warehouse: Option<&WarehouseCode>,
    ) -> RequestResult<String> {
        self.build_filter(query, warehouse.map(WarehouseCode::as_str))
    }

    fn build_filter(&self, query: &QueryDefinition, warehouse: Option<&str>) -> RequestResult<String> {
        let id = query.id.as_str();

        if !query.use_warehouse {
            if self.references_warehouse(id, &query.filter)? {
                return Err(RequestError::WarehousePlaceholderNotAllowed {
                    query: id.to_string(),
                });
            }
            return self.render(id, &query.filter, None);
        }

        let code = warehouse.ok_or_else(|| RequestError::MissingWarehouse {
            query: id.to_string(),
        })?;

        let rendered = self.render(id, &query.filter, Some(code))?;
        if self.references_warehouse(id, &query.filter)? {
            return Ok(rendered);
        }

        let predicate = self.render(id, &query.warehouse_predicate, Some(code))?;
        if rendered.is_empty() {
            Ok(predicate)
        } else {
            Ok(format!("{} and {}", rendered, predicate))
        }
    }

    /// Check every template in the catalog before any request is made.
    pub fn validate_catalog(&self, catalog: &QueryCatalog) -> RequestResult<()> {
        for query in catalog {
            let id = query.id.as_str();
            if query.use_warehouse {
                if !self.references_warehouse(id, &query.warehouse_predicate)? {
                    return Err(RequestError::PredicateWithoutPlaceholder {
                        query: id.to_string(),
                    });
                }
                self.build_filter(query, Some(VALIDATION_WAREHOUSE))?;
            } else {
                self.build_filter(query, None)?;
            }
            log::debug!("Filter template of '{}' is valid", id);
        }
        Ok(())
    }
}

fn undeclared_variables(query: &str, template: &str) -> RequestResult<HashSet<String>> {
    let env = Environment::new();
    let parsed = env
        .template_from_str(template)
        .map_err(|e| RequestError::Template {
            query: query.to_string(),
            message: e.to_string(),
        })?;
    Ok(parsed.undeclared_variables(false))
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
