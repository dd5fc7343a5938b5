//! Webhook notification.
//!
//! Posts `{"text": <message>}` to the configured chat webhook. Used twice per
//! run at most: once for the enrichment summary on success, and once — on its
//! own short-lived client — to report the error message when the pipeline
//! fails.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use threatwire_shared::{Result, ThreatwireError};

const NOTICE_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("threatwire/", env!("CARGO_PKG_VERSION"));

/// Post a text message to the webhook. Non-success status is an error.
pub async fn post_message(client: &Client, webhook_url: &Url, message: &str) -> Result<()> {
    debug!(chars = message.len(), "posting webhook message");

    let response = client
        .post(webhook_url.clone())
        .json(&serde_json::json!({"text": message}))
        .send()
        .await
        .map_err(|e| ThreatwireError::network(format!("webhook: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ThreatwireError::network(format!("webhook: HTTP {status}")));
    }
    Ok(())
}

/// Post an error notice on a dedicated short-lived client.
///
/// The orchestrator calls this after the run-scoped client may already be
/// gone; the caller is expected to swallow any error this returns.
pub async fn send_error_notice(webhook_url: &Url, message: &str) -> Result<()> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(NOTICE_TIMEOUT)
        .build()
        .map_err(|e| ThreatwireError::network(format!("failed to build HTTP client: {e}")))?;

    post_message(&client, webhook_url, message).await
}
