//! The storage capability the pipeline depends on.
//!
//! Persistence is an external collaborator. The pipeline only needs the
//! operations below; [`crate::store`] provides an in-memory backend and a
//! JSON-file backend.

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::{AssessmentRecord, NewAssessment, StoredAverages};

/// Trait for assessment storage backends.
///
/// Implementations own their concurrency control; callers never lock.
pub trait AssessmentRepository: Send + Sync {
    /// Persist one validated candidate and return it with its new id.
    fn insert(&self, new: NewAssessment) -> Result<AssessmentRecord, StoreError>;

    /// Persist a batch in one call. Either every candidate is stored or none is.
    fn insert_all(&self, batch: Vec<NewAssessment>) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Replace every field of an existing record.
    fn replace(&self, record: &AssessmentRecord) -> Result<(), StoreError>;

    fn find_by_id(&self, id: u64) -> Result<Option<AssessmentRecord>, StoreError>;

    /// All records in insertion order.
    fn find_all(&self) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// All records, most recent assessment date first.
    fn find_recent(&self) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Records for one student (exact name), oldest first.
    fn find_by_student(&self, name: &str) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Records whose student name contains `keyword`, ignoring case.
    fn search_by_name(&self, keyword: &str) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Records dated within `start..=end`.
    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Records with a discipline score within `min..=max`.
    fn find_by_discipline_range(
        &self,
        min: i32,
        max: i32,
    ) -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Records with a skill completion rate within `min..=max`.
    fn find_by_skill_range(&self, min: f64, max: f64)
        -> Result<Vec<AssessmentRecord>, StoreError>;

    /// Delete by id. Returns `false` if no such record existed.
    fn delete(&self, id: u64) -> Result<bool, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;

    /// Pre-aggregated averages of the three metrics.
    fn averages(&self) -> Result<StoredAverages, StoreError>;
}
