//! Report persistence — timestamped JSON and Markdown artifacts.
//!
//! A successful run leaves exactly two files in the output directory:
//! `<UTC-timestamp>.json` (the full enrichment result, pretty-printed) and
//! `<UTC-timestamp>.md` (summary plus bulleted IoC and MITRE lists).

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, instrument};

use threatwire_shared::{Enrichment, Result, ThreatwireError};

/// UTC timestamp format used for report file names, e.g. `20260807T091500Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Paths of the two files written for a run.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    /// `<stamp>.json` — full enrichment result.
    pub json: PathBuf,
    /// `<stamp>.md` — human-readable report.
    pub markdown: PathBuf,
}

/// Write both reports into `dir`, stamped with the current UTC time.
pub fn write_reports(dir: &Path, enrichment: &Enrichment) -> Result<ReportPaths> {
    let stamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
    write_reports_stamped(dir, &stamp, enrichment)
}

/// Write both reports with an explicit stamp (separated for testability).
#[instrument(skip_all, fields(dir = %dir.display(), stamp = %stamp))]
pub fn write_reports_stamped(
    dir: &Path,
    stamp: &str,
    enrichment: &Enrichment,
) -> Result<ReportPaths> {
    let json_path = dir.join(format!("{stamp}.json"));
    let md_path = dir.join(format!("{stamp}.md"));

    let json = serde_json::to_string_pretty(enrichment)
        .map_err(|e| ThreatwireError::io(&json_path, std::io::Error::other(e)))?;
    std::fs::write(&json_path, json).map_err(|e| ThreatwireError::io(&json_path, e))?;

    std::fs::write(&md_path, render_markdown(enrichment))
        .map_err(|e| ThreatwireError::io(&md_path, e))?;

    info!(
        json = %json_path.display(),
        markdown = %md_path.display(),
        "reports written"
    );

    Ok(ReportPaths {
        json: json_path,
        markdown: md_path,
    })
}

/// Render the Markdown report body.
pub fn render_markdown(enrichment: &Enrichment) -> String {
    let mut lines = vec![
        format!("# Summary\n{}\n", enrichment.summary),
        "## IoCs".to_string(),
    ];
    for ioc in &enrichment.iocs {
        lines.push(format!("- {ioc}"));
    }
    lines.push("## MITRE".to_string());
    for technique in &enrichment.mitre {
        lines.push(format!("- {technique}"));
    }
    lines.join("\n")
}
