//! Statistics reports for assessment records.
//!
//! [`render`] produces a localized PDF and falls back to a reduced ASCII
//! summary when the localized document cannot be drawn.

pub mod document;
pub mod locale;
pub mod pdf;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};

use assessment_core::model::{AssessmentRecord, StatisticsSummary};

pub use document::{compose, compose_fallback, ReportDocument};
pub use locale::Locale;
pub use pdf::RenderError;

/// Render the report for `locale`, stamped with the current local time.
pub fn render(
    summary: &StatisticsSummary,
    records: &[AssessmentRecord],
    locale: Locale,
) -> Result<Vec<u8>, RenderError> {
    render_at(summary, records, locale, Local::now().naive_local())
}

/// Render the report with an explicit generation timestamp.
///
/// A failure of the localized document is logged and replaced by the ASCII
/// summary; only a failure to produce that summary is returned.
pub fn render_at(
    summary: &StatisticsSummary,
    records: &[AssessmentRecord],
    locale: Locale,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, RenderError> {
    let document = compose(summary, records, locale, generated_at);
    match pdf::write_pdf(&document) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            tracing::warn!("{locale} report failed ({e}), falling back to summary report");
            pdf::write_pdf(&compose_fallback(summary, generated_at))
        }
    }
}

/// `assessment_report_<YYYYMMDD>.pdf`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("assessment_report_{}.pdf", date.format("%Y%m%d"))
}

/// Write a rendered report to `path`, creating parent directories.
pub fn write_report(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    tracing::info!("report written to {}", path.display());
    Ok(())
}
