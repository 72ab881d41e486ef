//! Bundled repository backends.
//!
//! [`InMemoryRepository`] keeps records in a vector behind a lock and is the
//! fake used throughout the tests. [`JsonFileRepository`] keeps the same
//! state and writes it to a JSON file after every mutation.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{AssessmentRecord, NewAssessment, StoredAverages};
use crate::traits::AssessmentRepository;

/// The full contents of a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreState {
    next_id: u64,
    records: Vec<AssessmentRecord>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

impl StoreState {
    fn insert(&mut self, new: NewAssessment, today: NaiveDate) -> AssessmentRecord {
        let record = AssessmentRecord::from_new(self.next_id, new, today);
        self.next_id += 1;
        self.records.push(record.clone());
        record
    }

    fn replace(&mut self, record: &AssessmentRecord) -> Result<(), StoreError> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StoreError::UnknownId(record.id))?;
        *slot = record.clone();
        Ok(())
    }

    fn delete(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    fn find_by_id(&self, id: u64) -> Option<AssessmentRecord> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    fn filtered(&self, keep: impl Fn(&AssessmentRecord) -> bool) -> Vec<AssessmentRecord> {
        self.records.iter().filter(|r| keep(r)).cloned().collect()
    }

    fn recent(&self) -> Vec<AssessmentRecord> {
        let mut records = self.records.clone();
        // stable sort keeps insertion order within a date
        records.sort_by(|a, b| b.assessment_date.cmp(&a.assessment_date));
        records
    }

    fn by_student(&self, name: &str) -> Vec<AssessmentRecord> {
        let mut records = self.filtered(|r| r.student_name == name);
        records.sort_by(|a, b| a.assessment_date.cmp(&b.assessment_date));
        records
    }

    fn search(&self, keyword: &str) -> Vec<AssessmentRecord> {
        let needle = keyword.to_lowercase();
        self.filtered(|r| r.student_name.to_lowercase().contains(&needle))
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// A repository that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<StoreState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with candidates, ids assigned in order.
    pub fn with_records(records: impl IntoIterator<Item = NewAssessment>) -> Self {
        let mut state = StoreState::default();
        for new in records {
            state.insert(new, today());
        }
        Self {
            state: RwLock::new(state),
        }
    }
}

impl AssessmentRepository for InMemoryRepository {
    fn insert(&self, new: NewAssessment) -> Result<AssessmentRecord, StoreError> {
        Ok(write_lock(&self.state).insert(new, today()))
    }

    fn insert_all(&self, batch: Vec<NewAssessment>) -> Result<Vec<AssessmentRecord>, StoreError> {
        let mut state = write_lock(&self.state);
        let today = today();
        Ok(batch.into_iter().map(|n| state.insert(n, today)).collect())
    }

    fn replace(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        write_lock(&self.state).replace(record)
    }

    fn find_by_id(&self, id: u64) -> Result<Option<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state).find_by_id(id))
    }

    fn find_all(&self) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state).records.clone())
    }

    fn find_recent(&self) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state).recent())
    }

    fn find_by_student(&self, name: &str) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state).by_student(name))
    }

    fn search_by_name(&self, keyword: &str) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state).search(keyword))
    }

    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state)
            .filtered(|r| (start..=end).contains(&r.assessment_date)))
    }

    fn find_by_discipline_range(
        &self,
        min: i32,
        max: i32,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state).filtered(|r| (min..=max).contains(&r.discipline_score)))
    }

    fn find_by_skill_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(read_lock(&self.state)
            .filtered(|r| (min..=max).contains(&r.skill_completion_rate)))
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        Ok(write_lock(&self.state).delete(id))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(read_lock(&self.state).records.len() as u64)
    }

    fn averages(&self) -> Result<StoredAverages, StoreError> {
        Ok(StoredAverages::from_records(&read_lock(&self.state).records))
    }
}

// ---------------------------------------------------------------------------
// JSON file backend
// ---------------------------------------------------------------------------

/// A repository persisted as a single JSON document.
///
/// Mutations are applied to a copy of the state, written to disk, and only
/// then made visible, so a failed write leaves the store unchanged.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileRepository {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read data file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse data file {}", path.display()))?
        } else {
            tracing::info!("no data file at {}, starting empty", path.display());
            StoreState::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(
            "wrote {} records to {}",
            state.records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl AssessmentRepository for JsonFileRepository {
    fn insert(&self, new: NewAssessment) -> Result<AssessmentRecord, StoreError> {
        self.mutate(|s| Ok(s.insert(new, today())))
    }

    fn insert_all(&self, batch: Vec<NewAssessment>) -> Result<Vec<AssessmentRecord>, StoreError> {
        let today = today();
        self.mutate(|s| Ok(batch.into_iter().map(|n| s.insert(n, today)).collect()))
    }

    fn replace(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        self.mutate(|s| s.replace(record))
    }

    fn find_by_id(&self, id: u64) -> Result<Option<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.find_by_id(id)))
    }

    fn find_all(&self) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.records.clone()))
    }

    fn find_recent(&self) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(StoreState::recent))
    }

    fn find_by_student(&self, name: &str) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.by_student(name)))
    }

    fn search_by_name(&self, keyword: &str) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.search(keyword)))
    }

    fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.filtered(|r| (start..=end).contains(&r.assessment_date))))
    }

    fn find_by_discipline_range(
        &self,
        min: i32,
        max: i32,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.filtered(|r| (min..=max).contains(&r.discipline_score))))
    }

    fn find_by_skill_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        Ok(self.read(|s| s.filtered(|r| (min..=max).contains(&r.skill_completion_rate))))
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        self.mutate(|s| Ok(s.delete(id)))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read(|s| s.records.len() as u64))
    }

    fn averages(&self) -> Result<StoredAverages, StoreError> {
        Ok(self.read(|s| StoredAverages::from_records(&s.records)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, date: (i32, u32, u32), discipline: i32, skill: f64) -> NewAssessment {
        NewAssessment {
            student_name: name.into(),
            assessment_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            discipline_score: discipline,
            skill_completion_rate: skill,
            tasks_completed: 3,
            total_tasks: 4,
        }
    }

    #[test]
    fn ids_are_assigned_in_order() {
        let repo = InMemoryRepository::new();
        let a = repo.insert(candidate("Ann", (2024, 1, 1), 4, 90.0)).unwrap();
        let b = repo.insert(candidate("Bo", (2024, 1, 2), 3, 70.0)).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let repo = InMemoryRepository::new();
        let a = repo.insert(candidate("Ann", (2024, 1, 1), 4, 90.0)).unwrap();
        assert!(repo.delete(a.id).unwrap());
        assert!(!repo.delete(a.id).unwrap());
        let b = repo.insert(candidate("Bo", (2024, 1, 2), 3, 70.0)).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn recent_is_date_descending() {
        let repo = InMemoryRepository::with_records([
            candidate("Ann", (2024, 1, 2), 4, 90.0),
            candidate("Bo", (2024, 1, 3), 3, 70.0),
            candidate("Cy", (2024, 1, 1), 5, 99.0),
        ]);
        let names: Vec<_> = repo
            .find_recent()
            .unwrap()
            .into_iter()
            .map(|r| r.student_name)
            .collect();
        assert_eq!(names, vec!["Bo", "Ann", "Cy"]);
    }

    #[test]
    fn student_lookup_is_exact_and_oldest_first() {
        let repo = InMemoryRepository::with_records([
            candidate("Ann", (2024, 2, 1), 4, 90.0),
            candidate("Anna", (2024, 1, 1), 3, 70.0),
            candidate("Ann", (2024, 1, 1), 5, 99.0),
        ]);
        let records = repo.find_by_student("Ann").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].discipline_score, 5);
    }

    #[test]
    fn search_ignores_case() {
        let repo = InMemoryRepository::with_records([
            candidate("Ann Lee", (2024, 2, 1), 4, 90.0),
            candidate("Bo", (2024, 1, 1), 3, 70.0),
        ]);
        assert_eq!(repo.search_by_name("lee").unwrap().len(), 1);
        assert_eq!(repo.search_by_name("").unwrap().len(), 2);
    }

    #[test]
    fn range_queries_are_inclusive() {
        let repo = InMemoryRepository::with_records([
            candidate("Ann", (2024, 1, 1), 2, 60.0),
            candidate("Bo", (2024, 1, 15), 3, 80.0),
            candidate("Cy", (2024, 2, 1), 5, 100.0),
        ]);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(repo.find_by_date_range(start, end).unwrap().len(), 2);
        assert_eq!(repo.find_by_discipline_range(3, 5).unwrap().len(), 2);
        assert_eq!(repo.find_by_skill_range(60.0, 80.0).unwrap().len(), 2);
    }

    #[test]
    fn replace_unknown_id_fails() {
        let repo = InMemoryRepository::new();
        let ghost = AssessmentRecord::from_new(
            42,
            candidate("Ann", (2024, 1, 1), 4, 90.0),
            today(),
        );
        assert!(matches!(
            repo.replace(&ghost),
            Err(StoreError::UnknownId(42))
        ));
    }

    #[test]
    fn empty_store_has_no_averages() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.averages().unwrap(), StoredAverages::default());
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("assessments.json");

        {
            let repo = JsonFileRepository::open(&path).unwrap();
            repo.insert_all(vec![
                candidate("Ann", (2024, 1, 1), 4, 90.0),
                candidate("Bo", (2024, 1, 2), 3, 70.0),
            ])
            .unwrap();
            assert!(repo.delete(1).unwrap());
        }

        let reopened = JsonFileRepository::open(&path).unwrap();
        let all = reopened.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].student_name, "Bo");

        let next = reopened
            .insert(candidate("Cy", (2024, 1, 3), 5, 95.0))
            .unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn json_store_does_not_persist_derived_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assessments.json");
        let repo = JsonFileRepository::open(&path).unwrap();
        repo.insert(candidate("Ann", (2024, 1, 1), 4, 90.0)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("studentName"));
        assert!(!raw.contains("taskCompletionRate"));
    }

    #[test]
    fn json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assessments.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonFileRepository::open(&path).is_err());
    }
}
