//! Secret redaction for log output.
//!
//! Exact text substitution of the configured secret values — no pattern
//! matching. Applied by the CLI's log writer to every formatted line before
//! it reaches the terminal; structured fields themselves are never mutated.

use crate::config::SECRET_ENV_VARS;

/// Replacement marker for redacted secrets.
pub const REDACTED: &str = "[REDACTED]";

/// Redacts known secret values from text.
#[derive(Debug, Clone, Default)]
pub struct SecretRedactor {
    /// Non-empty secret values, longest first so overlapping substrings of a
    /// longer secret never survive a shorter one's pass.
    secrets: Vec<String>,
}

impl SecretRedactor {
    /// Build a redactor from the given secret values. Empty values are
    /// dropped.
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut secrets: Vec<String> = secrets
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
        Self { secrets }
    }

    /// Build a redactor from the three secret env vars.
    ///
    /// Call after `.env` loading and before the tracing subscriber is
    /// installed so every log line is covered.
    pub fn from_env() -> Self {
        Self::new(
            SECRET_ENV_VARS
                .iter()
                .filter_map(|var| std::env::var(var).ok()),
        )
    }

    /// Replace every occurrence of every known secret with [`REDACTED`].
    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();
        for secret in &self.secrets {
            if result.contains(secret.as_str()) {
                result = result.replace(secret.as_str(), REDACTED);
            }
        }
        result
    }

    /// True when no secrets are registered.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}
