//! Shared types, error model, and configuration for Threatwire.
//!
//! This crate is the foundation depended on by all other Threatwire crates.
//! It provides:
//! - [`ThreatwireError`] — the unified error type
//! - Domain types ([`SignalBundle`], [`Enrichment`], [`FeedItem`], [`RunId`])
//! - Configuration ([`Config`], [`Endpoints`], env loading and validation)
//! - [`SecretRedactor`] — exact-substitution redaction for log output

pub mod config;
pub mod error;
pub mod redact;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    Config, Endpoints, ENV_OPENAI_API_KEY, ENV_SHARE_PATH, ENV_TEAMS_WEBHOOK_URL,
    ENV_TWITTER_BEARER, SECRET_ENV_VARS, parse_webhook_url, prepare_output_dir,
    validate_output_dir,
};
pub use error::{Result, ThreatwireError};
pub use redact::{REDACTED, SecretRedactor};
pub use types::{Enrichment, FeedItem, MAX_ITEMS_PER_SOURCE, RunId, SignalBundle};
