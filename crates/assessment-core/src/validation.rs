//! Field validation for candidate assessments.
//!
//! The same rules gate direct creation (where the first violation is reported
//! to the caller) and bulk import (where invalid rows are dropped).

use crate::error::ValidationError;
use crate::model::NewAssessment;

pub const MIN_DISCIPLINE: i32 = 1;
pub const MAX_DISCIPLINE: i32 = 5;
pub const MIN_SKILL_RATE: f64 = 0.0;
pub const MAX_SKILL_RATE: f64 = 100.0;

/// Returns `true` iff every field invariant holds.
pub fn validate(candidate: &NewAssessment) -> bool {
    check(candidate).is_ok()
}

/// Check every field invariant, reporting the first violation.
///
/// Fields are checked in order: name, date, discipline score, skill rate,
/// task counts.
pub fn check(candidate: &NewAssessment) -> Result<(), ValidationError> {
    if candidate.student_name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if candidate.assessment_date.is_none() {
        return Err(ValidationError::MissingDate);
    }
    if !(MIN_DISCIPLINE..=MAX_DISCIPLINE).contains(&candidate.discipline_score) {
        return Err(ValidationError::DisciplineOutOfRange(
            candidate.discipline_score,
        ));
    }
    let rate = candidate.skill_completion_rate;
    if !rate.is_finite() || !(MIN_SKILL_RATE..=MAX_SKILL_RATE).contains(&rate) {
        return Err(ValidationError::SkillRateOutOfRange(rate));
    }
    let (completed, total) = (candidate.tasks_completed, candidate.total_tasks);
    if completed < 0 || total <= 0 || completed > total {
        return Err(ValidationError::InvalidTaskCounts { completed, total });
    }
    Ok(())
}
