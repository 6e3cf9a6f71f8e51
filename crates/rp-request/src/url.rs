//! Request URL assembly.

use crate::error::{RequestError, RequestResult};
use crate::filter::FilterRenderer;
use rp_core::{QueryCatalog, QueryDefinition, RunConfig, WarehouseCode};
use std::collections::HashMap;

/// Builds `GET` URLs for (query, warehouse) pairings.
///
/// Parameters are emitted in a fixed order (`orderby`, `take`, `where`)
/// and every value is percent-encoded, so the result contains no raw
/// spaces or quotes.
pub struct UrlBuilder {
    base_url: String,
    renderer: FilterRenderer,
}

impl UrlBuilder {
    /// Create a builder for `base_url`, rendering filters with `vars`.
    pub fn new(base_url: &str, vars: &HashMap<String, serde_yaml::Value>) -> RequestResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RequestError::MissingBaseUrl);
        }
        Ok(Self {
            base_url: base_url.to_string(),
            renderer: FilterRenderer::new(vars),
        })
    }

    /// Create a builder from resolved run settings.
    pub fn from_config(config: &RunConfig) -> RequestResult<Self> {
        Self::new(&config.base_url, &config.vars)
    }

    /// Check every filter template in the catalog.
    pub fn validate_catalog(&self, catalog: &QueryCatalog) -> RequestResult<()> {
        self.renderer.validate_catalog(catalog)
    }

    /// Build the URL for one pairing.
    pub fn build(
        &self,
        query: &QueryDefinition,
        warehouse: Option<&WarehouseCode>,
    ) -> RequestResult<String> {
        let filter = self.renderer.render_filter(query, warehouse)?;
        let endpoint = query.endpoint.trim().trim_start_matches('/');

        let mut url = format!(
            "{}/{}?orderby={}&take={}",
            self.base_url,
            endpoint,
            urlencoding::encode(query.order_by.trim()),
            query.take
        );
        if !filter.is_empty() {
            url.push_str("&where=");
            url.push_str(&urlencoding::encode(&filter));
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "url_test.rs"]
mod tests;
