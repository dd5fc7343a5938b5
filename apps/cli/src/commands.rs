//! CLI definition, tracing setup with secret redaction, and command dispatch.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

use threatwire_shared::{Config, SecretRedactor, validate_output_dir};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Threatwire — threat-intel signals in, IoC reports out.
#[derive(Parser)]
#[command(
    name = "threatwire",
    version,
    about = "Fetch threat-intel signals, extract IoCs and ATT&CK IDs, notify, persist reports.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Search term to collect signals for.
    #[arg(default_value = "")]
    pub term: String,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Override the configured output directory for reports.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Log writer that passes every formatted line through the secret redactor
/// before it reaches stderr. Structured event fields are untouched; only the
/// rendered output is filtered.
#[derive(Clone)]
pub(crate) struct RedactingWriter {
    redactor: Arc<SecretRedactor>,
}

impl RedactingWriter {
    pub(crate) fn new(redactor: SecretRedactor) -> Self {
        Self {
            redactor: Arc::new(redactor),
        }
    }
}

impl io::Write for RedactingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The fmt layer hands over one fully formatted line per call.
        let line = String::from_utf8_lossy(buf);
        io::stderr().write_all(self.redactor.redact(&line).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for RedactingWriter {
    type Writer = RedactingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize tracing based on CLI flags. Called once per process, before
/// config loading, so every subsequent log line is redacted.
pub(crate) fn init_tracing(cli: &Cli, redactor: SecretRedactor) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "threatwire=info",
        1 => "threatwire=debug",
        _ => "threatwire=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let writer = RedactingWriter::new(redactor);

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(writer)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Load config, run the pipeline, print the outcome.
///
/// A pipeline error propagates out of `main` and terminates the process with
/// exit code 1; the error notice has already been attempted by then.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(out) = &cli.out {
        config.output_dir = validate_output_dir(out)?;
    }

    info!(term = %cli.term, "threatwire starting");
    let outcome = threatwire_core::run_notified(&config, &cli.term).await?;

    println!("{}", outcome.enrichment.summary);
    println!();
    println!("IoCs:  {}", outcome.enrichment.iocs.len());
    println!("MITRE: {}", outcome.enrichment.mitre.len());
    println!("Reports:");
    println!("  {}", outcome.reports.json.display());
    println!("  {}", outcome.reports.markdown.display());

    Ok(())
}
