//! Query x warehouse loop: build URL, fetch, annotate, persist.

use anyhow::{Context, Result};
use chrono::Utc;
use rp_core::{
    annotate, check_output_names, PairingOutcome, QueryDefinition, RunConfig, RunOutcome,
    WarehouseCode,
};
use rp_http::{FetchResult, Fetcher, NoDataReason, Transport};
use rp_request::UrlBuilder;
use rp_store::Persister;
use std::time::{Duration, Instant};

use crate::commands::common::pairings_for;

/// Everything a run needs, built once at start-up
pub(crate) struct RunContext<'a, T: Transport> {
    pub config: &'a RunConfig,
    pub urls: &'a UrlBuilder,
    pub fetcher: &'a Fetcher<T>,
    pub persister: &'a Persister,
}

/// Execute every pairing of `queries`, in order, to completion.
///
/// Pairing failures are recorded and the loop continues. Errors returned
/// from here abort the run: two pairings sharing an output file (checked
/// before any request) or a filter that cannot be rendered. `pause` is
/// called between executed queries, never after a skipped one; `progress`
/// after every pairing.
pub(crate) fn run_pairings<T: Transport>(
    ctx: &RunContext<'_, T>,
    queries: &[&QueryDefinition],
    pause: &mut dyn FnMut(Duration),
    progress: &mut dyn FnMut(&PairingOutcome),
) -> Result<RunOutcome> {
    check_output_names(queries.iter().copied(), &ctx.config.warehouses)
        .context("Output file names collide")?;

    let start = Instant::now();
    let mut outcome = RunOutcome::new();
    let query_delay = ctx.config.fetch.query_delay();
    let mut executed_any = false;

    log::info!(
        "Run {}: {} queries, {} warehouses, output to {}",
        outcome.run_id,
        queries.len(),
        ctx.config.warehouses.len(),
        ctx.persister.output_dir().display()
    );

    for query in queries {
        let warehouses = pairings_for(query, &ctx.config.warehouses);
        if warehouses.is_empty() {
            log::warn!(
                "Skipping {}: it runs per warehouse but no warehouse codes are configured",
                query.id
            );
            let skipped = PairingOutcome::skipped(query.id.as_str(), "no warehouse codes configured");
            progress(&skipped);
            outcome.record(skipped);
            continue;
        }

        if executed_any && !query_delay.is_zero() {
            log::info!(
                "Waiting {}s before query {}",
                query_delay.as_secs(),
                query.id
            );
            pause(query_delay);
        }
        executed_any = true;

        for warehouse in warehouses {
            let pairing = run_pairing(ctx, query, warehouse)?;
            progress(&pairing);
            outcome.record(pairing);
        }
    }

    outcome.finish(start.elapsed().as_secs_f64());
    log::info!(
        "Run {} finished in {:.1}s: {} succeeded, {} failed",
        outcome.run_id,
        outcome.elapsed_secs,
        outcome.success_count(),
        outcome.failure_count()
    );
    Ok(outcome)
}

fn run_pairing<T: Transport>(
    ctx: &RunContext<'_, T>,
    query: &QueryDefinition,
    warehouse: Option<&WarehouseCode>,
) -> Result<PairingOutcome> {
    let start = Instant::now();
    let query_id = query.id.as_str();
    let code = warehouse.map(WarehouseCode::as_str);
    let label = match code {
        Some(code) => format!("{}@{}", query_id, code),
        None => query_id.to_string(),
    };

    let url = ctx
        .urls
        .build(query, warehouse)
        .with_context(|| format!("Failed to build request URL for {}", label))?;
    log::debug!("{}: GET {}", label, url);

    let pairing = match ctx.fetcher.fetch(&url, &label) {
        FetchResult::NoData(NoDataReason::Empty) => PairingOutcome::empty(query_id, code),
        FetchResult::NoData(reason) => PairingOutcome::error(query_id, code, reason.to_string()),
        FetchResult::Data(records) => {
            let annotated = annotate(records, &query.id, warehouse, Utc::now());
            let file_name =
                query.output_file_name(warehouse, ctx.persister.format().extension());
            match ctx.persister.persist(Some(&annotated), &file_name) {
                Ok(report) => {
                    PairingOutcome::success(query_id, code, report.rows, report.path, report.bytes)
                }
                Err(err) => {
                    log::error!("{}: failed to write {}: {}", label, file_name, err);
                    PairingOutcome::error(query_id, code, err.to_string())
                }
            }
        }
    };

    Ok(pairing.with_duration(start.elapsed().as_secs_f64()))
}

#[cfg(test)]
#[path = "orchestrate_test.rs"]
mod tests;
