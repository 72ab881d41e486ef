//! Error types for the assessment pipeline.
//!
//! Validation and upload errors are caller-visible and carry a message that
//! names the offending field or limit. Row-level import faults live in
//! [`crate::spreadsheet::RowError`] and never escape an import batch.

use thiserror::Error;

/// A field invariant violated by a candidate record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The student name is empty or whitespace only.
    #[error("student name must not be blank")]
    BlankName,

    /// No assessment date was supplied.
    #[error("assessment date is required")]
    MissingDate,

    /// Discipline score outside 1..=5.
    #[error("discipline score must be between 1 and 5, got {0}")]
    DisciplineOutOfRange(i32),

    /// Skill completion rate outside 0..=100 (or not a finite number).
    #[error("skill completion rate must be between 0 and 100, got {0}")]
    SkillRateOutOfRange(f64),

    /// Task counts violate `0 <= completed <= total` or `total > 0`.
    #[error("invalid task counts: {completed} completed of {total} total")]
    InvalidTaskCounts { completed: i32, total: i32 },
}

impl ValidationError {
    /// The name of the field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::BlankName => "studentName",
            ValidationError::MissingDate => "assessmentDate",
            ValidationError::DisciplineOutOfRange(_) => "disciplineScore",
            ValidationError::SkillRateOutOfRange(_) => "skillCompletionRate",
            ValidationError::InvalidTaskCounts { total, .. } if *total <= 0 => "totalTasks",
            ValidationError::InvalidTaskCounts { .. } => "tasksCompleted",
        }
    }
}

/// A spreadsheet upload rejected before parsing begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("no file selected or the file is empty")]
    Empty,

    #[error("unsupported file '{0}': expected an Excel file (.xlsx or .xls)")]
    UnsupportedExtension(String),

    /// `limit` is in bytes.
    #[error("file is {size} bytes, larger than the {} limit", format_limit(.limit))]
    TooLarge { size: u64, limit: u64 },
}

const MIB: u64 = 1024 * 1024;

/// `10 MiB`, or `1.50 MiB (1572864 bytes)` when not a whole number of MiB.
fn format_limit(bytes: &u64) -> String {
    let bytes = *bytes;
    if bytes % MIB == 0 {
        format!("{} MiB", bytes / MIB)
    } else {
        format!("{:.2} MiB ({bytes} bytes)", bytes as f64 / MIB as f64)
    }
}

/// Failures of a repository backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("assessment {0} does not exist")]
    UnknownId(u64),
}

/// The workbook as a whole could not be read.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("failed to open workbook: {0}")]
    Open(String),

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("failed to read sheet '{sheet}': {message}")]
    Sheet { sheet: String, message: String },
}

/// Caller-facing failures of [`crate::service::AssessmentService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("assessment {0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Returns `true` if the caller sent bad input (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_) | ServiceError::Upload(_) | ServiceError::NotFound(_)
        )
    }
}
