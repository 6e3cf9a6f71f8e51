//! Run command implementation
//!
//! `orchestrate` holds the query x warehouse loop; this module resolves
//! settings, wires the URL builder, fetcher and persister together, and
//! reports the outcome.

mod orchestrate;

use anyhow::{Context, Result};
use rp_core::{PairingOutcome, PairingStatus, RunOutcome};
use rp_http::{Fetcher, UreqTransport};
use rp_request::UrlBuilder;
use rp_store::Persister;

use crate::cli::{GlobalArgs, RunArgs, RunOutput};
use crate::commands::common::{self, ExitCode, EXIT_PAIRING_FAILED};
use orchestrate::{run_pairings, RunContext};

/// Execute the run command
pub(crate) fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = common::load_config(global)?;
    let catalog = config.catalog().context("Invalid query catalog")?;
    let selected = common::parse_query_list(args.queries.as_deref());
    let queries = catalog.select(&selected)?;

    let overrides = rp_core::RunOverrides {
        output_dir: args.output_dir.clone(),
        format: args.format.map(Into::into),
        no_delay: args.no_delay,
        ..common::global_overrides(global)
    };
    let run_config = common::resolve_run_config(&config, &root, overrides)?;
    let token = run_config.require_token()?.to_string();

    let urls = UrlBuilder::from_config(&run_config)?;
    urls.validate_catalog(&catalog)
        .context("Filter template validation failed")?;

    let fetcher = Fetcher::new(
        UreqTransport::new(run_config.fetch.timeout()),
        token,
        &run_config.fetch,
    );
    let persister = Persister::new(&run_config.output_dir, run_config.format);
    let ctx = RunContext {
        config: &run_config,
        urls: &urls,
        fetcher: &fetcher,
        persister: &persister,
    };

    let json_mode = args.output == RunOutput::Json;
    if !json_mode {
        println!(
            "Running {} queries against {}\n",
            queries.len(),
            run_config.base_url
        );
    }

    let outcome = run_pairings(
        &ctx,
        &queries,
        &mut |delay: std::time::Duration| std::thread::sleep(delay),
        &mut |pairing: &PairingOutcome| {
            if !json_mode {
                print_pairing(pairing);
            }
        },
    )?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize run outcome")?
        );
    } else {
        print_summary(&outcome);
    }

    if outcome.has_errors() {
        return Err(ExitCode(EXIT_PAIRING_FAILED).into());
    }
    Ok(())
}

fn print_pairing(pairing: &PairingOutcome) {
    match pairing.status {
        PairingStatus::Success => println!(
            "  ✓ {} ({} rows) [{:.2}s]",
            pairing.label(),
            pairing.rows,
            pairing.duration_secs
        ),
        PairingStatus::Empty => println!("  ✗ {}: empty result", pairing.label()),
        PairingStatus::Error => println!(
            "  ✗ {}: {}",
            pairing.label(),
            pairing.error.as_deref().unwrap_or("failed")
        ),
        PairingStatus::Skipped => println!(
            "  - {} skipped ({})",
            pairing.label(),
            pairing.error.as_deref().unwrap_or("not run")
        ),
    }
}

fn print_summary(outcome: &RunOutcome) {
    let skipped = outcome.count(PairingStatus::Skipped);
    println!();
    if skipped > 0 {
        println!(
            "Completed: {} succeeded, {} failed, {} skipped ({} rows, {:.1}s)",
            outcome.success_count(),
            outcome.failure_count(),
            skipped,
            outcome.total_rows(),
            outcome.elapsed_secs
        );
    } else {
        println!(
            "Completed: {} succeeded, {} failed ({} rows, {:.1}s)",
            outcome.success_count(),
            outcome.failure_count(),
            outcome.total_rows(),
            outcome.elapsed_secs
        );
    }
}
