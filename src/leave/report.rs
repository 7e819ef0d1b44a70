//! Read-only aggregation over a snapshot of leave records.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave::{LeaveRequest, LeaveStatus};

/// Approved leaves that span the reference calendar day, ascending by
/// start date. The comparison is day-inclusive on both ends so a leave
/// covering the day is captured regardless of time-of-day components in
/// the stored timestamps.
pub fn todays_approved_leaves(records: &[LeaveRequest], reference: NaiveDate) -> Vec<LeaveRequest> {
    let mut out: Vec<LeaveRequest> = records
        .iter()
        .filter(|l| {
            l.status == LeaveStatus::Approved
                && l.start_date <= reference
                && l.end_date >= reference
        })
        .cloned()
        .collect();
    out.sort_by_key(|l| l.start_date);
    out
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStats {
    #[schema(example = 4)]
    pub total_leaves: u64,
    #[schema(example = 2)]
    pub approved_leaves: u64,
    #[schema(example = 1)]
    pub pending_leaves: u64,
    #[schema(example = 1)]
    pub rejected_leaves: u64,
}

pub fn personal_stats(records: &[LeaveRequest], employee_id: u64) -> PersonalStats {
    let mine = records.iter().filter(|l| l.employee_id == employee_id);

    let mut stats = PersonalStats {
        total_leaves: 0,
        approved_leaves: 0,
        pending_leaves: 0,
        rejected_leaves: 0,
    };

    for leave in mine {
        stats.total_leaves += 1;
        match leave.status {
            LeaveStatus::Approved => stats.approved_leaves += 1,
            LeaveStatus::Pending => stats.pending_leaves += 1,
            LeaveStatus::Rejected => stats.rejected_leaves += 1,
        }
    }

    stats
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgStats {
    #[schema(example = 25)]
    pub total_employees: i64,
    #[schema(example = 40)]
    pub total_leaves: u64,
    #[schema(example = 5)]
    pub pending_leaves: u64,
    #[schema(example = 30)]
    pub approved_leaves: u64,
    #[schema(example = 5)]
    pub rejected_leaves: u64,
    /// Count of approved leaves spanning the reference day.
    #[schema(example = 2)]
    pub today_leaves: u64,
    pub today_leaves_details: Vec<LeaveRequest>,
}

pub fn org_stats(records: &[LeaveRequest], employee_count: i64, reference: NaiveDate) -> OrgStats {
    let mut pending = 0;
    let mut approved = 0;
    let mut rejected = 0;
    for leave in records {
        match leave.status {
            LeaveStatus::Pending => pending += 1,
            LeaveStatus::Approved => approved += 1,
            LeaveStatus::Rejected => rejected += 1,
        }
    }

    let today_details = todays_approved_leaves(records, reference);

    OrgStats {
        total_employees: employee_count,
        total_leaves: records.len() as u64,
        pending_leaves: pending,
        approved_leaves: approved,
        rejected_leaves: rejected,
        today_leaves: today_details.len() as u64,
        today_leaves_details: today_details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::{DurationUnit, LeaveType};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        id: u64,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        status: LeaveStatus,
    ) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id,
            leave_type: LeaveType::Vacation,
            start_date: start,
            end_date: end,
            duration: ((end - start).num_days() + 1) as f64,
            duration_unit: DurationUnit::Days,
            reason: "Family event out of town".to_string(),
            status,
            admin_comment: None,
            rejected_reason: None,
            reviewer_id: None,
            reviewed_at: None,
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn today_window_captures_spanning_leave() {
        let records = vec![record(
            1,
            5,
            date(2025, 6, 10),
            date(2025, 6, 12),
            LeaveStatus::Approved,
        )];

        assert_eq!(todays_approved_leaves(&records, date(2025, 6, 11)).len(), 1);
        // Boundary days count too.
        assert_eq!(todays_approved_leaves(&records, date(2025, 6, 10)).len(), 1);
        assert_eq!(todays_approved_leaves(&records, date(2025, 6, 12)).len(), 1);
        // Day after the leave ends does not.
        assert!(todays_approved_leaves(&records, date(2025, 6, 13)).is_empty());
    }

    #[test]
    fn today_window_ignores_pending_and_rejected() {
        let records = vec![
            record(1, 5, date(2025, 6, 10), date(2025, 6, 12), LeaveStatus::Pending),
            record(2, 6, date(2025, 6, 10), date(2025, 6, 12), LeaveStatus::Rejected),
        ];
        assert!(todays_approved_leaves(&records, date(2025, 6, 11)).is_empty());
    }

    #[test]
    fn today_leaves_sorted_by_start_date() {
        let records = vec![
            record(1, 5, date(2025, 6, 11), date(2025, 6, 13), LeaveStatus::Approved),
            record(2, 6, date(2025, 6, 9), date(2025, 6, 12), LeaveStatus::Approved),
        ];
        let today = todays_approved_leaves(&records, date(2025, 6, 11));
        assert_eq!(today.len(), 2);
        assert_eq!(today[0].id, 2);
        assert_eq!(today[1].id, 1);
    }

    #[test]
    fn personal_stats_counts_only_own_records() {
        let records = vec![
            record(1, 5, date(2025, 6, 1), date(2025, 6, 2), LeaveStatus::Approved),
            record(2, 5, date(2025, 6, 5), date(2025, 6, 6), LeaveStatus::Pending),
            record(3, 5, date(2025, 6, 8), date(2025, 6, 9), LeaveStatus::Rejected),
            record(4, 6, date(2025, 6, 1), date(2025, 6, 2), LeaveStatus::Approved),
        ];

        let stats = personal_stats(&records, 5);
        assert_eq!(stats.total_leaves, 3);
        assert_eq!(stats.approved_leaves, 1);
        assert_eq!(stats.pending_leaves, 1);
        assert_eq!(stats.rejected_leaves, 1);

        let nobody = personal_stats(&records, 99);
        assert_eq!(nobody.total_leaves, 0);
    }

    #[test]
    fn org_stats_combines_counts_with_today_view() {
        let records = vec![
            record(1, 5, date(2025, 6, 10), date(2025, 6, 12), LeaveStatus::Approved),
            record(2, 6, date(2025, 7, 1), date(2025, 7, 3), LeaveStatus::Approved),
            record(3, 7, date(2025, 6, 10), date(2025, 6, 11), LeaveStatus::Pending),
            record(4, 8, date(2025, 6, 10), date(2025, 6, 11), LeaveStatus::Rejected),
        ];

        let stats = org_stats(&records, 25, date(2025, 6, 11));
        assert_eq!(stats.total_employees, 25);
        assert_eq!(stats.total_leaves, 4);
        assert_eq!(stats.pending_leaves, 1);
        assert_eq!(stats.approved_leaves, 2);
        assert_eq!(stats.rejected_leaves, 1);
        assert_eq!(stats.today_leaves, 1);
        assert_eq!(stats.today_leaves_details[0].id, 1);
    }
}
