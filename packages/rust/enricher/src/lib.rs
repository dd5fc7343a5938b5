//! LLM enrichment — one completion request, strict-JSON extraction result.
//!
//! The collected bundle is serialized, truncated to a fixed character budget,
//! and sent to an OpenAI-compatible chat-completions endpoint with a fixed
//! analyst instruction. The model's reply must be valid JSON; the first parse
//! failure is fatal to the run. No retry, no partial-credit parsing.

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use threatwire_shared::{Config, Enrichment, Result, SignalBundle, ThreatwireError};

/// Character budget for the serialized bundle embedded in the prompt.
/// Data beyond this length is silently dropped (token-budget control).
pub const PROMPT_BUDGET: usize = 2000;

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 600;

const ANALYST_INSTRUCTION: &str = "You are a senior cyber-threat analyst. \
Extract IoCs (IPs, domains, hashes, CVEs) and MITRE ATT&CK IDs; then output \
STRICT JSON with keys: \"iocs\", \"mitre\", \"summary\" (\u{2264}120 words).";

/// Build the single user message: instruction plus length-bounded raw data.
pub fn build_prompt(bundle: &SignalBundle) -> Result<String> {
    let serialized = serde_json::to_string(bundle)
        .map_err(|e| ThreatwireError::enrichment(format!("bundle serialization failed: {e}")))?;
    // Character truncation, matching the budget regardless of UTF-8 width.
    let payload: String = serialized.chars().take(PROMPT_BUDGET).collect();
    Ok(format!("{ANALYST_INSTRUCTION}\n\nRAW_DATA:\n{payload}"))
}

/// Send one completion request for the bundle and parse the reply.
#[instrument(skip_all, fields(model = %config.model))]
pub async fn enrich(
    client: &Client,
    config: &Config,
    bundle: &SignalBundle,
) -> Result<Enrichment> {
    let url = completion_url(&config.endpoints.completion_base);
    let prompt = build_prompt(bundle)?;
    let body = json!({
        "model": config.model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
        "stream": false,
    });

    debug!(url = %url, "sending completion request");

    let response = client
        .post(&url)
        .bearer_auth(&config.openai_api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| ThreatwireError::network(format!("completion request failed: {e}")))?;

    let status = response.status();
    let response_body = response
        .text()
        .await
        .map_err(|e| ThreatwireError::network(format!("completion body read failed: {e}")))?;

    if !status.is_success() {
        return Err(ThreatwireError::network(format!(
            "completion endpoint: HTTP {status}: {}",
            snippet(&response_body)
        )));
    }

    let envelope: Value = serde_json::from_str(&response_body)
        .map_err(|e| ThreatwireError::enrichment(format!("malformed completion envelope: {e}")))?;

    let content = envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ThreatwireError::enrichment("completion response has no message content")
        })?;

    serde_json::from_str(content)
        .map_err(|e| ThreatwireError::enrichment(format!("model output is not valid JSON: {e}")))
}

fn completion_url(base: &Url) -> String {
    format!("{}/chat/completions", base.as_str().trim_end_matches('/'))
}

/// First 200 characters of an error body, for log-safe messages.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
