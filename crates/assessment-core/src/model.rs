//! Core data model types.
//!
//! An [`AssessmentRecord`] is one periodic assessment of one student. A
//! [`NewAssessment`] is the same entry before storage has assigned it an id
//! (a "candidate"). Statistics types are recomputed on every request and
//! never persisted.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discipline score at or above which a student counts as excellent.
pub const EXCELLENT_DISCIPLINE: i32 = 4;
/// Skill completion rate at or above which a student counts as excellent.
pub const EXCELLENT_SKILL_RATE: f64 = 80.0;

/// A persisted assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    /// Storage-assigned identifier.
    pub id: u64,
    pub student_name: String,
    pub assessment_date: NaiveDate,
    /// Discipline score, 1 to 5.
    pub discipline_score: i32,
    /// Skill completion rate as a percentage, 0 to 100.
    pub skill_completion_rate: f64,
    pub tasks_completed: i32,
    pub total_tasks: i32,
}

impl AssessmentRecord {
    /// Attach a storage id to a validated candidate.
    ///
    /// A candidate without a date gets `today`.
    pub fn from_new(id: u64, new: NewAssessment, today: NaiveDate) -> Self {
        Self {
            id,
            student_name: new.student_name,
            assessment_date: new.assessment_date.unwrap_or(today),
            discipline_score: new.discipline_score,
            skill_completion_rate: new.skill_completion_rate,
            tasks_completed: new.tasks_completed,
            total_tasks: new.total_tasks,
        }
    }

    /// Percentage of tasks completed. Derived, never stored.
    pub fn task_completion_rate(&self) -> f64 {
        task_completion_rate(self.tasks_completed, self.total_tasks)
    }

    /// Discipline of 4 or more and skill rate of 80% or more.
    pub fn is_excellent(&self) -> bool {
        self.discipline_score >= EXCELLENT_DISCIPLINE
            && self.skill_completion_rate >= EXCELLENT_SKILL_RATE
    }

    /// The outward JSON presentation, including the derived completion rate.
    pub fn view(&self) -> RecordView<'_> {
        RecordView {
            record: self,
            task_completion_rate: self.task_completion_rate(),
        }
    }
}

/// `completed / total * 100`, or 0 when there are no tasks.
pub fn task_completion_rate(completed: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

/// A record serialized together with its derived completion rate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView<'a> {
    #[serde(flatten)]
    pub record: &'a AssessmentRecord,
    pub task_completion_rate: f64,
}

/// A candidate assessment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    pub student_name: String,
    #[serde(default)]
    pub assessment_date: Option<NaiveDate>,
    pub discipline_score: i32,
    pub skill_completion_rate: f64,
    pub tasks_completed: i32,
    pub total_tasks: i32,
}

impl NewAssessment {
    /// Percentage of tasks completed, see [`task_completion_rate`].
    pub fn task_completion_rate(&self) -> f64 {
        task_completion_rate(self.tasks_completed, self.total_tasks)
    }
}

impl From<&AssessmentRecord> for NewAssessment {
    fn from(record: &AssessmentRecord) -> Self {
        Self {
            student_name: record.student_name.clone(),
            assessment_date: Some(record.assessment_date),
            discipline_score: record.discipline_score,
            skill_completion_rate: record.skill_completion_rate,
            tasks_completed: record.tasks_completed,
            total_tasks: record.total_tasks,
        }
    }
}

/// The metric a trend series is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Discipline,
    Skill,
    Task,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Discipline, Metric::Skill, Metric::Task];

    /// The per-record value of this metric.
    pub fn value_of(self, record: &AssessmentRecord) -> f64 {
        match self {
            Metric::Discipline => record.discipline_score as f64,
            Metric::Skill => record.skill_completion_rate,
            Metric::Task => record.task_completion_rate(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Discipline => write!(f, "discipline"),
            Metric::Skill => write!(f, "skill"),
            Metric::Task => write!(f, "task"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discipline" => Ok(Metric::Discipline),
            "skill" => Ok(Metric::Skill),
            "task" => Ok(Metric::Task),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// One day's average of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub value: f64,
}

impl TrendPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// Daily averages sorted ascending by date, one point per date present.
pub type TrendSeries = Vec<TrendPoint>;

/// Averages pre-aggregated by the storage backend.
///
/// `None` means the backend had no rows to average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredAverages {
    pub discipline: Option<f64>,
    pub skill: Option<f64>,
    pub task: Option<f64>,
}

/// Aggregate statistics over every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub average_discipline_score: f64,
    pub average_skill_completion_rate: f64,
    pub average_task_completion_rate: f64,
    pub total_assessments: u64,
    pub discipline_trend: TrendSeries,
    pub skill_trend: TrendSeries,
    pub task_trend: TrendSeries,
}

impl StatisticsSummary {
    /// Zeroed statistics for an empty corpus.
    pub fn empty() -> Self {
        Self {
            average_discipline_score: 0.0,
            average_skill_completion_rate: 0.0,
            average_task_completion_rate: 0.0,
            total_assessments: 0,
            discipline_trend: Vec::new(),
            skill_trend: Vec::new(),
            task_trend: Vec::new(),
        }
    }

    /// The trend series for one metric.
    pub fn trend(&self, metric: Metric) -> &TrendSeries {
        match metric {
            Metric::Discipline => &self.discipline_trend,
            Metric::Skill => &self.skill_trend,
            Metric::Task => &self.task_trend,
        }
    }
}
