//! The assessment service facade.
//!
//! Every outward operation (create, query, statistics, import) goes through
//! [`AssessmentService`], which validates input and delegates persistence to
//! an [`AssessmentRepository`].

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::ServiceError;
use crate::import::{self, BulkImport, ImportError, ImportOutcome};
use crate::model::{AssessmentRecord, NewAssessment, StatisticsSummary};
use crate::statistics;
use crate::traits::AssessmentRepository;
use crate::validation;

impl From<ImportError> for ServiceError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Spreadsheet(e) => ServiceError::Spreadsheet(e),
            ImportError::Store(e) => ServiceError::Store(e),
        }
    }
}

/// Liveness information.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub date: NaiveDate,
    pub version: &'static str,
    pub total_assessments: u64,
}

/// Validating front door to the record store.
#[derive(Clone)]
pub struct AssessmentService {
    repository: Arc<dyn AssessmentRepository>,
    max_upload_bytes: u64,
}

impl AssessmentService {
    pub fn new(repository: Arc<dyn AssessmentRepository>) -> Self {
        Self {
            repository,
            max_upload_bytes: import::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload size ceiling.
    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Validate and store a new record. A missing date becomes today.
    pub fn create(&self, mut new: NewAssessment) -> Result<AssessmentRecord, ServiceError> {
        new.assessment_date.get_or_insert_with(today);
        validation::check(&new)?;
        let record = self.repository.insert(new)?;
        tracing::debug!("created assessment {} for {}", record.id, record.student_name);
        Ok(record)
    }

    /// Replace every field of record `id`. When `update` carries no date the
    /// stored date is kept.
    pub fn update(&self, id: u64, update: NewAssessment) -> Result<AssessmentRecord, ServiceError> {
        let existing = self.get(id)?;
        let merged = NewAssessment {
            assessment_date: update.assessment_date.or(Some(existing.assessment_date)),
            ..update
        };
        validation::check(&merged)?;

        let record = AssessmentRecord::from_new(id, merged, existing.assessment_date);
        self.repository.replace(&record)?;
        Ok(record)
    }

    pub fn delete(&self, id: u64) -> Result<(), ServiceError> {
        if self.repository.delete(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }

    pub fn get(&self, id: u64) -> Result<AssessmentRecord, ServiceError> {
        self.repository
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(id))
    }

    /// All records in insertion order.
    pub fn list(&self) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(self.repository.find_all()?)
    }

    pub fn by_student(&self, name: &str) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(self.repository.find_by_student(name)?)
    }

    pub fn search(&self, keyword: &str) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(self.repository.search_by_name(keyword)?)
    }

    /// Records dated within `from..=to`. A reversed range yields nothing.
    pub fn by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(self.repository.find_by_date_range(from, to)?)
    }

    pub fn by_discipline_range(
        &self,
        min: i32,
        max: i32,
    ) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(self.repository.find_by_discipline_range(min, max)?)
    }

    pub fn by_skill_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(self.repository.find_by_skill_range(min, max)?)
    }

    /// Records with discipline of 4 or more and skill rate of 80% or more.
    pub fn excellent(&self) -> Result<Vec<AssessmentRecord>, ServiceError> {
        Ok(statistics::excellent(&self.repository.find_all()?))
    }

    /// Averages and count from storage plus trends over the whole corpus.
    pub fn statistics(&self) -> Result<StatisticsSummary, ServiceError> {
        let averages = self.repository.averages()?;
        let total = self.repository.count()?;
        let recent = self.repository.find_recent()?;
        Ok(statistics::summarize(&recent, averages, total))
    }

    /// Gate an uploaded workbook, then run the bulk import over it.
    pub fn import_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportOutcome, ServiceError> {
        import::check_upload(file_name, bytes.len() as u64, self.max_upload_bytes)?;
        tracing::info!("importing {} ({} bytes)", file_name, bytes.len());
        Ok(BulkImport::new(Arc::clone(&self.repository)).import_bytes(bytes)?)
    }

    pub fn health(&self) -> Result<HealthReport, ServiceError> {
        Ok(HealthReport {
            status: "OK",
            date: today(),
            version: env!("CARGO_PKG_VERSION"),
            total_assessments: self.repository.count()?,
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
