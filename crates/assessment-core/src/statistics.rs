//! Aggregate statistics and date-bucketed trend series.
//!
//! Task completion rate is averaged per record everywhere: each record's
//! `completed / total * 100` is computed first and those percentages are
//! averaged. The storage-side average and the trend series therefore agree.

use std::collections::BTreeMap;

use crate::model::{
    AssessmentRecord, Metric, StatisticsSummary, StoredAverages, TrendPoint, TrendSeries,
};

/// Date key format for trend buckets.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Group records by calendar date and average `metric` within each day.
///
/// The result is sorted ascending by date key; dates with no records are not
/// interpolated. An empty input yields an empty series.
pub fn build_trend(records: &[AssessmentRecord], metric: Metric) -> TrendSeries {
    // BTreeMap over "YYYY-MM-DD" keys iterates in date order
    let mut grouped: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let key = record.assessment_date.format(DATE_KEY_FORMAT).to_string();
        let entry = grouped.entry(key).or_insert((0.0, 0));
        entry.0 += metric.value_of(record);
        entry.1 += 1;
    }

    grouped
        .into_iter()
        .map(|(date, (sum, n))| TrendPoint::new(date, sum / n as f64))
        .collect()
}

/// Assemble the statistics summary.
///
/// `averages` and `total` come from storage; missing averages become `0.0`.
/// `recent` is the full corpus in any order (storage returns it most recent
/// first) and only feeds the trend series.
pub fn summarize(
    recent: &[AssessmentRecord],
    averages: StoredAverages,
    total: u64,
) -> StatisticsSummary {
    StatisticsSummary {
        average_discipline_score: averages.discipline.unwrap_or(0.0),
        average_skill_completion_rate: averages.skill.unwrap_or(0.0),
        average_task_completion_rate: averages.task.unwrap_or(0.0),
        total_assessments: total,
        discipline_trend: build_trend(recent, Metric::Discipline),
        skill_trend: build_trend(recent, Metric::Skill),
        task_trend: build_trend(recent, Metric::Task),
    }
}

/// Mean of a metric over all records, `None` when there are none.
pub fn mean(records: &[AssessmentRecord], metric: Metric) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(|r| metric.value_of(r)).sum();
    Some(sum / records.len() as f64)
}

impl StoredAverages {
    /// Compute the averages a storage backend would return for `records`.
    pub fn from_records(records: &[AssessmentRecord]) -> Self {
        Self {
            discipline: mean(records, Metric::Discipline),
            skill: mean(records, Metric::Skill),
            task: mean(records, Metric::Task),
        }
    }
}

/// Records with discipline of 4 or more and skill rate of 80% or more.
pub fn excellent(records: &[AssessmentRecord]) -> Vec<AssessmentRecord> {
    records.iter().filter(|r| r.is_excellent()).cloned().collect()
}
