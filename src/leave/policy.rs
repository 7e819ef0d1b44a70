use crate::error::{LeaveError, LeaveResult};
use crate::model::{leave::LeaveRequest, role::Role};

/// The authenticated identity attempting an operation. Built once per
/// call from the verified token; the core never reads ambient auth state.
#[derive(Debug, Copy, Clone)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LeaveOp {
    View,
    Edit,
    Cancel,
    Decide,
    ListAll,
}

/// Pure access predicate for one actor, one record, one operation.
///
/// Edit and cancel are owner-only regardless of role; HR cannot modify
/// another employee's pending request through this path.
pub fn can_access(actor: &Actor, record: &LeaveRequest, op: LeaveOp) -> bool {
    match op {
        LeaveOp::View => actor.role == Role::Hr || actor.id == record.employee_id,
        LeaveOp::Edit | LeaveOp::Cancel => actor.id == record.employee_id,
        LeaveOp::Decide | LeaveOp::ListAll => actor.role == Role::Hr,
    }
}

pub fn authorize(actor: &Actor, record: &LeaveRequest, op: LeaveOp) -> LeaveResult<()> {
    if can_access(actor, record, op) {
        Ok(())
    } else {
        Err(LeaveError::Authorization)
    }
}

/// Record-independent gate for `Decide` and `ListAll`.
pub fn require_hr(actor: &Actor) -> LeaveResult<()> {
    if actor.role == Role::Hr {
        Ok(())
    } else {
        Err(LeaveError::Authorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::{DurationUnit, LeaveStatus, LeaveType};
    use chrono::{NaiveDate, Utc};

    fn record_of(employee_id: u64) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            employee_id,
            leave_type: LeaveType::Vacation,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
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

    fn employee(id: u64) -> Actor {
        Actor {
            id,
            role: Role::Employee,
        }
    }

    fn hr(id: u64) -> Actor {
        Actor { id, role: Role::Hr }
    }

    #[test]
    fn owner_can_view_own_record() {
        assert!(can_access(&employee(5), &record_of(5), LeaveOp::View));
    }

    #[test]
    fn other_employee_cannot_view_record() {
        assert!(!can_access(&employee(6), &record_of(5), LeaveOp::View));
    }

    #[test]
    fn hr_can_view_any_record() {
        assert!(can_access(&hr(99), &record_of(5), LeaveOp::View));
    }

    #[test]
    fn edit_and_cancel_are_owner_only_even_for_hr() {
        let record = record_of(5);
        assert!(can_access(&employee(5), &record, LeaveOp::Edit));
        assert!(can_access(&employee(5), &record, LeaveOp::Cancel));
        assert!(!can_access(&hr(99), &record, LeaveOp::Edit));
        assert!(!can_access(&hr(99), &record, LeaveOp::Cancel));
        assert!(!can_access(&employee(6), &record, LeaveOp::Edit));
    }

    #[test]
    fn decide_and_list_all_require_hr() {
        let record = record_of(5);
        assert!(can_access(&hr(99), &record, LeaveOp::Decide));
        assert!(can_access(&hr(99), &record, LeaveOp::ListAll));
        // Owning the record does not grant decide.
        assert!(!can_access(&employee(5), &record, LeaveOp::Decide));
        assert!(!can_access(&employee(5), &record, LeaveOp::ListAll));
    }

    #[test]
    fn authorize_denial_is_authorization_error() {
        let err = authorize(&employee(6), &record_of(5), LeaveOp::Edit).unwrap_err();
        assert!(matches!(err, LeaveError::Authorization));
    }

    #[test]
    fn require_hr_rejects_employee() {
        assert!(require_hr(&hr(1)).is_ok());
        assert!(matches!(
            require_hr(&employee(1)).unwrap_err(),
            LeaveError::Authorization
        ));
    }
}
