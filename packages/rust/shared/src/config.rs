//! Runtime configuration for the Threatwire pipeline.
//!
//! Everything comes from the process environment (a `.env` file is honored).
//! The three secrets fall back to an interactive hidden prompt when missing;
//! the output directory does not. Loaded once per run and immutable after.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Result, ThreatwireError};

/// Env var holding the model API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Env var holding the social-search bearer token.
pub const ENV_TWITTER_BEARER: &str = "TWITTER_BEARER";
/// Env var holding the chat webhook URL.
pub const ENV_TEAMS_WEBHOOK_URL: &str = "TEAMS_WEBHOOK_URL";
/// Env var holding the report output directory.
pub const ENV_SHARE_PATH: &str = "SHARE_PATH";

/// The three secret-bearing env vars, in redaction order.
pub const SECRET_ENV_VARS: [&str; 3] = [
    ENV_OPENAI_API_KEY,
    ENV_TWITTER_BEARER,
    ENV_TEAMS_WEBHOOK_URL,
];

const ENV_RSS_URL: &str = "RSS_URL";
const ENV_NVD_URL: &str = "NVD_URL";
const ENV_TWITTER_URL: &str = "TWITTER_URL";
const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";

const DEFAULT_RSS_URL: &str = "https://example.com/rss";
const DEFAULT_NVD_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";
const DEFAULT_TWITTER_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const WRITE_PROBE_NAME: &str = ".threatwire-write-probe";

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Validated configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model API key.
    pub openai_api_key: String,
    /// Social-search bearer token.
    pub twitter_bearer: String,
    /// Chat webhook URL (https only).
    pub webhook_url: Url,
    /// Report output directory (exists and is writable after load).
    pub output_dir: PathBuf,
    /// Outbound endpoints for the three signal sources and the model API.
    pub endpoints: Endpoints,
    /// Completion model identifier.
    pub model: String,
}

/// Outbound endpoint URLs, each overridable via the environment.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// RSS feed source.
    pub rss: Url,
    /// Vulnerability database search.
    pub nvd: Url,
    /// Social-media recent search.
    pub twitter: Url,
    /// Base URL of the OpenAI-compatible completion API.
    pub completion_base: Url,
}

impl Config {
    /// Load and validate configuration from the environment.
    ///
    /// Secrets missing from the environment are requested interactively with
    /// hidden input. Fails before any network call on a missing or invalid
    /// required value.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let openai_api_key = required_secret(ENV_OPENAI_API_KEY)?;
        let twitter_bearer = required_secret(ENV_TWITTER_BEARER)?;
        let webhook_url = parse_webhook_url(&required_secret(ENV_TEAMS_WEBHOOK_URL)?)?;

        let share_path = env_var(ENV_SHARE_PATH).ok_or_else(|| {
            ThreatwireError::config(format!("{ENV_SHARE_PATH} is required"))
        })?;
        let output_dir = prepare_output_dir(&share_path)?;

        Ok(Self {
            openai_api_key,
            twitter_bearer,
            webhook_url,
            output_dir,
            endpoints: Endpoints::from_env()?,
            model: env_var(ENV_OPENAI_MODEL).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
        })
    }
}

impl Endpoints {
    /// Resolve endpoint URLs from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rss: endpoint_url(ENV_RSS_URL, DEFAULT_RSS_URL)?,
            nvd: endpoint_url(ENV_NVD_URL, DEFAULT_NVD_URL)?,
            twitter: endpoint_url(ENV_TWITTER_URL, DEFAULT_TWITTER_URL)?,
            completion_base: endpoint_url(ENV_OPENAI_BASE_URL, DEFAULT_OPENAI_BASE_URL)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Read an env var, treating unset and empty/whitespace values as missing.
fn env_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

/// Read a required secret, prompting with hidden input when missing.
fn required_secret(name: &str) -> Result<String> {
    if let Some(value) = env_var(name) {
        return Ok(value);
    }

    tracing::debug!(var = name, "secret not in environment, prompting");
    let entered = dialoguer::Password::new()
        .with_prompt(format!("Enter {name}"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| ThreatwireError::config(format!("could not prompt for {name}: {e}")))?;

    let entered = entered.trim().to_string();
    if entered.is_empty() {
        return Err(ThreatwireError::config(format!("{name} is required")));
    }
    Ok(entered)
}

/// Parse and validate the webhook URL. Secure transport only.
pub fn parse_webhook_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        ThreatwireError::config(format!("{ENV_TEAMS_WEBHOOK_URL} is not a valid URL: {e}"))
    })?;
    if url.scheme() != "https" {
        return Err(ThreatwireError::config(format!(
            "{ENV_TEAMS_WEBHOOK_URL} must start with https://"
        )));
    }
    Ok(url)
}

/// Resolve the output directory: expand `~`, create it if absent, and verify
/// it is writable with a probe file.
pub fn prepare_output_dir(raw: &str) -> Result<PathBuf> {
    let path = expand_tilde(raw);

    std::fs::create_dir_all(&path).map_err(|e| {
        ThreatwireError::config(format!(
            "could not create output directory {}: {e}",
            path.display()
        ))
    })?;

    let probe = path.join(WRITE_PROBE_NAME);
    std::fs::write(&probe, b"").map_err(|e| {
        ThreatwireError::config(format!(
            "output directory {} is not writable: {e}",
            path.display()
        ))
    })?;
    let _ = std::fs::remove_file(&probe);

    Ok(path)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(raw: &str) -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        if raw == "~" {
            return home;
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn endpoint_url(var: &str, default: &str) -> Result<Url> {
    let raw = env_var(var).unwrap_or_else(|| default.into());
    Url::parse(&raw)
        .map_err(|e| ThreatwireError::config(format!("{var} is not a valid URL: {e}")))
}

/// Check that a path is an existing writable directory (used by the CLI for
/// `--out` overrides; same rules as `SHARE_PATH`).
pub fn validate_output_dir(path: &Path) -> Result<PathBuf> {
    prepare_output_dir(&path.to_string_lossy())
}
