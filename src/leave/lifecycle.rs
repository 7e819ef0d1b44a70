//! State machine for a leave request.
//!
//! pending -> approved | rejected (HR, one-shot) or deleted (owner).
//! Edits keep a pending record pending; approved and rejected are
//! terminal. All functions here are pure checks and computations over
//! already-fetched records; the persistence layer enforces the
//! pending-status guard atomically with a conditional UPDATE.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{LeaveError, LeaveResult};
use crate::leave::policy::{self, Actor, LeaveOp};
use crate::model::leave::{DurationUnit, LeaveRequest, LeaveStatus, LeaveType};

pub const MIN_REASON_LEN: usize = 10;
pub const MIN_REJECT_REASON_LEN: usize = 5;
const WORK_HOURS_PER_DAY: f64 = 8.0;

/// Raw create input as supplied by the client. A client-sent duration is
/// accepted for wire compatibility but always discarded; see
/// [`compute_duration`].
#[derive(Debug)]
pub struct NewLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_unit: DurationUnit,
    pub reason: String,
}

/// Create input that has passed every field check, with the duration
/// already computed server-side. Only this type reaches the insert path.
#[derive(Debug)]
pub struct ValidatedLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: f64,
    pub duration_unit: DurationUnit,
    pub reason: String,
}

/// Per-field patch for a pending record; unset fields are unchanged.
#[derive(Debug, Default)]
pub struct LeavePatch {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Debug)]
pub enum Decision {
    Approve {
        admin_comment: Option<String>,
    },
    Reject {
        rejected_reason: Option<String>,
        admin_comment: Option<String>,
    },
}

/// Inclusive day count over the date range, times 8 for hour units.
pub fn compute_duration(start: NaiveDate, end: NaiveDate, unit: DurationUnit) -> f64 {
    let days = ((end - start).num_days() + 1) as f64;
    match unit {
        DurationUnit::Days => days,
        DurationUnit::Hours => days * WORK_HOURS_PER_DAY,
    }
}

fn check_date_range(start: NaiveDate, end: NaiveDate) -> LeaveResult<()> {
    if start >= end {
        return Err(LeaveError::validation("End date must be after start date"));
    }
    Ok(())
}

fn check_not_past(start: NaiveDate, today: NaiveDate) -> LeaveResult<()> {
    // Start-of-day comparison: applying for today is allowed.
    if start < today {
        return Err(LeaveError::validation("Cannot apply for leave in the past"));
    }
    Ok(())
}

fn check_reason(reason: &str) -> LeaveResult<String> {
    let trimmed = reason.trim();
    if trimmed.len() < MIN_REASON_LEN {
        return Err(LeaveError::validation(format!(
            "Reason must be at least {} characters",
            MIN_REASON_LEN
        )));
    }
    Ok(trimmed.to_string())
}

impl NewLeave {
    /// Validates a create request against `today` (calendar date, not a
    /// point in time) and computes the authoritative duration.
    pub fn validate(self, today: NaiveDate) -> LeaveResult<ValidatedLeave> {
        check_date_range(self.start_date, self.end_date)?;
        check_not_past(self.start_date, today)?;
        let reason = check_reason(&self.reason)?;
        let duration = compute_duration(self.start_date, self.end_date, self.duration_unit);

        Ok(ValidatedLeave {
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            duration,
            duration_unit: self.duration_unit,
            reason,
        })
    }
}

/// Applies an owner edit to a pending record, returning the updated copy.
/// The stored record is untouched on any error.
///
/// When either date changes the duration is recomputed with the full
/// formula, including the hours conversion for hour-unit requests.
pub fn edit(
    record: &LeaveRequest,
    actor_id: u64,
    patch: LeavePatch,
    today: NaiveDate,
) -> LeaveResult<LeaveRequest> {
    if actor_id != record.employee_id {
        return Err(LeaveError::Authorization);
    }
    if record.status != LeaveStatus::Pending {
        return Err(LeaveError::already_processed());
    }

    let mut updated = record.clone();

    if let Some(leave_type) = patch.leave_type {
        updated.leave_type = leave_type;
    }

    let dates_changed = patch.start_date.is_some() || patch.end_date.is_some();

    if let Some(start) = patch.start_date {
        check_not_past(start, today)?;
        updated.start_date = start;
    }
    if let Some(end) = patch.end_date {
        updated.end_date = end;
    }
    if dates_changed {
        check_date_range(updated.start_date, updated.end_date)?;
        updated.duration =
            compute_duration(updated.start_date, updated.end_date, updated.duration_unit);
    }

    if let Some(reason) = patch.reason {
        updated.reason = check_reason(&reason)?;
    }

    Ok(updated)
}

/// Owner cancellation of a pending record. The caller deletes the row
/// after this check passes.
pub fn cancel(record: &LeaveRequest, actor_id: u64) -> LeaveResult<()> {
    if actor_id != record.employee_id {
        return Err(LeaveError::Authorization);
    }
    if record.status != LeaveStatus::Pending {
        return Err(LeaveError::already_processed());
    }
    Ok(())
}

/// One-shot HR decision on a pending record, returning the decided copy.
/// Rejections without a usable reason fail validation and leave the
/// record pending.
pub fn decide(
    record: &LeaveRequest,
    reviewer: &Actor,
    decision: Decision,
    now: DateTime<Utc>,
) -> LeaveResult<LeaveRequest> {
    policy::authorize(reviewer, record, LeaveOp::Decide)?;
    if record.status != LeaveStatus::Pending {
        return Err(LeaveError::already_processed());
    }

    let mut updated = record.clone();

    match decision {
        Decision::Approve { admin_comment } => {
            updated.status = LeaveStatus::Approved;
            updated.admin_comment = admin_comment;
        }
        Decision::Reject {
            rejected_reason,
            admin_comment,
        } => {
            let reason = rejected_reason.as_deref().unwrap_or("").trim().to_string();
            if reason.len() < MIN_REJECT_REASON_LEN {
                return Err(LeaveError::validation(format!(
                    "Rejection reason must be at least {} characters",
                    MIN_REJECT_REASON_LEN
                )));
            }
            updated.status = LeaveStatus::Rejected;
            updated.rejected_reason = Some(reason);
            updated.admin_comment = admin_comment;
        }
    }

    updated.reviewer_id = Some(reviewer.id);
    updated.reviewed_at = Some(now);

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 1)
    }

    fn new_leave(start: NaiveDate, end: NaiveDate, unit: DurationUnit) -> NewLeave {
        NewLeave {
            leave_type: LeaveType::Vacation,
            start_date: start,
            end_date: end,
            duration_unit: unit,
            reason: "Family event out of town".to_string(),
        }
    }

    fn pending_record(employee_id: u64) -> LeaveRequest {
        LeaveRequest {
            id: 7,
            employee_id,
            leave_type: LeaveType::Vacation,
            start_date: date(2025, 6, 10),
            end_date: date(2025, 6, 12),
            duration: 3.0,
            duration_unit: DurationUnit::Days,
            reason: "Family event out of town".to_string(),
            status: LeaveStatus::Pending,
            admin_comment: None,
            rejected_reason: None,
            reviewer_id: None,
            reviewed_at: None,
            applied_at: Utc::now(),
        }
    }

    fn hr_actor() -> Actor {
        Actor {
            id: 42,
            role: Role::Hr,
        }
    }

    #[test]
    fn duration_is_inclusive_day_count() {
        // 2025-06-10 .. 2025-06-12 spans three calendar days.
        assert_eq!(
            compute_duration(date(2025, 6, 10), date(2025, 6, 12), DurationUnit::Days),
            3.0
        );
        assert_eq!(
            compute_duration(date(2025, 6, 10), date(2025, 6, 11), DurationUnit::Days),
            2.0
        );
    }

    #[test]
    fn duration_in_hours_multiplies_by_eight() {
        assert_eq!(
            compute_duration(date(2025, 6, 10), date(2025, 6, 12), DurationUnit::Hours),
            24.0
        );
    }

    #[test]
    fn create_computes_duration_and_overrides_client_value() {
        let validated = new_leave(date(2025, 6, 10), date(2025, 6, 12), DurationUnit::Days)
            .validate(today())
            .unwrap();
        assert_eq!(validated.duration, 3.0);
        assert_eq!(validated.reason, "Family event out of town");
    }

    #[test]
    fn create_with_equal_dates_fails() {
        let err = new_leave(date(2025, 6, 10), date(2025, 6, 10), DurationUnit::Days)
            .validate(today())
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[test]
    fn create_with_end_before_start_fails() {
        let err = new_leave(date(2025, 6, 12), date(2025, 6, 10), DurationUnit::Days)
            .validate(today())
            .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[test]
    fn create_starting_yesterday_fails_starting_today_succeeds() {
        let yesterday = new_leave(date(2025, 5, 31), date(2025, 6, 3), DurationUnit::Days)
            .validate(today());
        assert!(matches!(yesterday, Err(LeaveError::Validation(_))));

        let same_day =
            new_leave(date(2025, 6, 1), date(2025, 6, 3), DurationUnit::Days).validate(today());
        assert!(same_day.is_ok());
    }

    #[test]
    fn create_with_short_reason_fails() {
        let mut input = new_leave(date(2025, 6, 10), date(2025, 6, 12), DurationUnit::Days);
        input.reason = "too short".to_string(); // 9 chars
        assert!(matches!(
            input.validate(today()),
            Err(LeaveError::Validation(_))
        ));
    }

    #[test]
    fn reason_is_trimmed_before_length_check() {
        let mut input = new_leave(date(2025, 6, 10), date(2025, 6, 12), DurationUnit::Days);
        input.reason = "   short    ".to_string();
        assert!(matches!(
            input.validate(today()),
            Err(LeaveError::Validation(_))
        ));
    }

    #[test]
    fn edit_by_non_owner_fails_regardless_of_role() {
        let record = pending_record(5);
        let patch = LeavePatch {
            reason: Some("Another perfectly valid reason".to_string()),
            ..Default::default()
        };
        let err = edit(&record, 6, patch, today()).unwrap_err();
        assert!(matches!(err, LeaveError::Authorization));
    }

    #[test]
    fn edit_on_decided_record_fails() {
        let mut record = pending_record(5);
        record.status = LeaveStatus::Approved;
        let err = edit(&record, 5, LeavePatch::default(), today()).unwrap_err();
        assert!(matches!(err, LeaveError::InvalidState(_)));
    }

    #[test]
    fn edit_with_short_reason_fails_and_leaves_record_unchanged() {
        let record = pending_record(5);
        let patch = LeavePatch {
            reason: Some("nope!".to_string()),
            ..Default::default()
        };
        let err = edit(&record, 5, patch, today()).unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
        // Input record is borrowed, never mutated.
        assert_eq!(record.reason, "Family event out of town");
        assert_eq!(record.status, LeaveStatus::Pending);
    }

    #[test]
    fn edit_recomputes_duration_when_dates_change() {
        let record = pending_record(5);
        let patch = LeavePatch {
            end_date: Some(date(2025, 6, 14)),
            ..Default::default()
        };
        let updated = edit(&record, 5, patch, today()).unwrap();
        assert_eq!(updated.duration, 5.0);
        assert_eq!(updated.status, LeaveStatus::Pending);
    }

    #[test]
    fn edit_recomputes_hours_conversion_too() {
        let mut record = pending_record(5);
        record.duration_unit = DurationUnit::Hours;
        record.duration = 24.0;
        let patch = LeavePatch {
            end_date: Some(date(2025, 6, 11)),
            ..Default::default()
        };
        let updated = edit(&record, 5, patch, today()).unwrap();
        assert_eq!(updated.duration, 16.0);
    }

    #[test]
    fn edit_cannot_move_start_into_the_past() {
        let record = pending_record(5);
        let patch = LeavePatch {
            start_date: Some(date(2025, 5, 20)),
            ..Default::default()
        };
        assert!(matches!(
            edit(&record, 5, patch, today()),
            Err(LeaveError::Validation(_))
        ));
    }

    #[test]
    fn edit_without_date_change_keeps_duration() {
        let record = pending_record(5);
        let patch = LeavePatch {
            leave_type: Some(LeaveType::Sick),
            ..Default::default()
        };
        let updated = edit(&record, 5, patch, today()).unwrap();
        assert_eq!(updated.duration, 3.0);
        assert_eq!(updated.leave_type, LeaveType::Sick);
    }

    #[test]
    fn cancel_is_owner_and_pending_only() {
        let record = pending_record(5);
        assert!(cancel(&record, 5).is_ok());
        assert!(matches!(
            cancel(&record, 6).unwrap_err(),
            LeaveError::Authorization
        ));

        let mut decided = pending_record(5);
        decided.status = LeaveStatus::Rejected;
        assert!(matches!(
            cancel(&decided, 5).unwrap_err(),
            LeaveError::InvalidState(_)
        ));
    }

    #[test]
    fn approve_sets_review_metadata() {
        let record = pending_record(5);
        let now = Utc::now();
        let updated = decide(
            &record,
            &hr_actor(),
            Decision::Approve {
                admin_comment: Some("ok".to_string()),
            },
            now,
        )
        .unwrap();

        assert_eq!(updated.status, LeaveStatus::Approved);
        assert_eq!(updated.admin_comment.as_deref(), Some("ok"));
        assert_eq!(updated.reviewer_id, Some(42));
        assert_eq!(updated.reviewed_at, Some(now));
    }

    #[test]
    fn decide_by_employee_fails() {
        let record = pending_record(5);
        let owner = Actor {
            id: 5,
            role: Role::Employee,
        };
        let err = decide(
            &record,
            &owner,
            Decision::Approve {
                admin_comment: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, LeaveError::Authorization));
    }

    #[test]
    fn second_decision_fails_with_invalid_state() {
        let record = pending_record(5);
        let approved = decide(
            &record,
            &hr_actor(),
            Decision::Approve {
                admin_comment: None,
            },
            Utc::now(),
        )
        .unwrap();

        let err = decide(
            &approved,
            &hr_actor(),
            Decision::Reject {
                rejected_reason: Some("late notice".to_string()),
                admin_comment: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidState(_)));
    }

    #[test]
    fn reject_requires_a_reason_of_five_chars() {
        let record = pending_record(5);

        let missing = decide(
            &record,
            &hr_actor(),
            Decision::Reject {
                rejected_reason: None,
                admin_comment: None,
            },
            Utc::now(),
        );
        assert!(matches!(missing, Err(LeaveError::Validation(_))));

        let short = decide(
            &record,
            &hr_actor(),
            Decision::Reject {
                rejected_reason: Some("bad".to_string()),
                admin_comment: None,
            },
            Utc::now(),
        );
        assert!(matches!(short, Err(LeaveError::Validation(_))));

        // Record stays pending either way.
        assert_eq!(record.status, LeaveStatus::Pending);

        let ok = decide(
            &record,
            &hr_actor(),
            Decision::Reject {
                rejected_reason: Some("peak season".to_string()),
                admin_comment: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ok.status, LeaveStatus::Rejected);
        assert_eq!(ok.rejected_reason.as_deref(), Some("peak season"));
    }
}
