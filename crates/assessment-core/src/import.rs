//! Bulk spreadsheet import.
//!
//! Uploads are gated by [`check_upload`] before any decoding. [`BulkImport`]
//! then parses every data row, validates the candidates, and hands all
//! accepted candidates to the repository in a single batch. A bad row is
//! logged and recorded in [`ImportOutcome::rejected`]; it never fails the
//! batch.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::{SpreadsheetError, StoreError, UploadError};
use crate::model::{AssessmentRecord, NewAssessment};
use crate::spreadsheet::{self, RowError, SheetRow};
use crate::traits::AssessmentRepository;
use crate::validation;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted spreadsheet extensions.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Reject uploads that are empty, not Excel files, or larger than `limit` bytes.
pub fn check_upload(file_name: &str, size: u64, limit: u64) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    if !extension.is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str())) {
        return Err(UploadError::UnsupportedExtension(file_name.to_string()));
    }
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    Ok(())
}

/// A row that was not imported, with its 1-based row number.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub row: usize,
    pub error: RowError,
}

impl Serialize for RejectedRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("RejectedRow", 2)?;
        s.serialize_field("row", &self.row)?;
        s.serialize_field("reason", &self.error.to_string())?;
        s.end()
    }
}

/// Result of one import run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Persisted records with their storage-assigned ids.
    pub records: Vec<AssessmentRecord>,
    /// Rows that failed parsing or validation.
    pub rejected: Vec<RejectedRow>,
    /// Rows skipped because the name cell was blank.
    pub skipped_blank: usize,
}

impl ImportOutcome {
    pub fn imported(&self) -> usize {
        self.records.len()
    }
}

/// Errors that abort an import before any row is processed.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The bulk import pipeline.
pub struct BulkImport {
    repository: Arc<dyn AssessmentRepository>,
    today: NaiveDate,
}

impl BulkImport {
    /// Create a pipeline whose fallback date is the local calendar date.
    pub fn new(repository: Arc<dyn AssessmentRepository>) -> Self {
        Self {
            repository,
            today: Local::now().date_naive(),
        }
    }

    /// Override the date used for rows without a usable date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Decode a workbook and import its first sheet.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ImportOutcome, ImportError> {
        let rows = spreadsheet::read_first_sheet(bytes)?;
        Ok(self.import_rows(&rows)?)
    }

    /// Import already-decoded rows. Row index 0 is the header and is skipped.
    pub fn import_rows(&self, rows: &[SheetRow]) -> Result<ImportOutcome, StoreError> {
        let mut accepted: Vec<NewAssessment> = Vec::new();
        let mut outcome = ImportOutcome::default();

        for row in rows.iter().filter(|r| r.index >= 1) {
            match self.accept(row) {
                Ok(Some(candidate)) => accepted.push(candidate),
                Ok(None) => outcome.skipped_blank += 1,
                Err(error) => {
                    tracing::warn!("skipping row {}: {}", row.number(), error);
                    outcome.rejected.push(RejectedRow {
                        row: row.number(),
                        error,
                    });
                }
            }
        }

        if !accepted.is_empty() {
            outcome.records = self.repository.insert_all(accepted)?;
        }

        tracing::info!(
            "imported {} rows ({} rejected, {} blank)",
            outcome.records.len(),
            outcome.rejected.len(),
            outcome.skipped_blank
        );
        Ok(outcome)
    }

    fn accept(&self, row: &SheetRow) -> Result<Option<NewAssessment>, RowError> {
        let Some(candidate) = spreadsheet::parse_row(&row.cells, self.today)? else {
            return Ok(None);
        };
        validation::check(&candidate)?;
        Ok(Some(candidate))
    }
}
