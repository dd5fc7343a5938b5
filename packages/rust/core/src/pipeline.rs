//! End-to-end pipeline: collect → enrich → notify → persist.
//!
//! Strictly downstream control flow. All network calls of a successful run
//! share one client scoped to the run; the error notice on failure uses its
//! own short-lived client inside the notifier.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{error, info, instrument, warn};

use threatwire_reports::ReportPaths;
use threatwire_shared::{Config, Enrichment, Result, RunId, ThreatwireError};

/// Per-request timeout on the run-scoped client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("threatwire/", env!("CARGO_PKG_VERSION"));

/// Result of a successful pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Run identifier (log correlation).
    pub run_id: RunId,
    /// The parsed enrichment result.
    pub enrichment: Enrichment,
    /// Paths of the two report files written.
    pub reports: ReportPaths,
    /// Total elapsed time.
    pub elapsed: Duration,
}

fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ThreatwireError::network(format!("failed to build HTTP client: {e}")))
}

/// Run the four pipeline stages in sequence.
///
/// Any stage error aborts the remaining stages; nothing is persisted on
/// failure. The run-scoped client is dropped at scope end on every path.
#[instrument(skip_all, fields(term = %term))]
pub async fn run(config: &Config, term: &str) -> Result<PipelineOutcome> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, "starting pipeline");

    let client = build_client()?;

    let bundle = threatwire_collector::collect(&client, config, term).await?;
    let enrichment = threatwire_enricher::enrich(&client, config, &bundle).await?;
    threatwire_notifier::post_message(&client, &config.webhook_url, &enrichment.summary).await?;
    let reports = threatwire_reports::write_reports(&config.output_dir, &enrichment)?;

    let elapsed = start.elapsed();
    info!(
        %run_id,
        iocs = enrichment.iocs.len(),
        mitre = enrichment.mitre.len(),
        elapsed_ms = elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(PipelineOutcome {
        run_id,
        enrichment,
        reports,
        elapsed,
    })
}

/// Run the pipeline; on failure, attempt one best-effort error notice to the
/// webhook before propagating the original error.
///
/// A failure of the notice itself is logged and discarded — it must never
/// mask or replace the error that caused it.
pub async fn run_notified(config: &Config, term: &str) -> Result<PipelineOutcome> {
    match run(config, term).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            error!(error = %err, "pipeline failed");
            if let Err(notice_err) =
                threatwire_notifier::send_error_notice(&config.webhook_url, &err.to_string()).await
            {
                warn!(error = %notice_err, "error notice could not be delivered");
            }
            Err(err)
        }
    }
}
