//! Threatwire CLI — threat-intelligence signal pipeline.
//!
//! Collects RSS/vulnerability/social signals for a search term, extracts
//! IoCs and MITRE ATT&CK IDs with a language model, posts a summary to a
//! chat webhook, and writes timestamped JSON/Markdown reports.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;
use threatwire_shared::SecretRedactor;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Load .env before building the redactor so file-sourced secrets are
    // covered by log redaction too.
    let _ = dotenvy::dotenv();
    commands::init_tracing(&cli, SecretRedactor::from_env());

    commands::run(cli).await
}
