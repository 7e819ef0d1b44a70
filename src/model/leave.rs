use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Vacation,
    Personal,
    Emergency,
    Other,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Days,
    Hours,
}

/// A single leave application together with its review outcome.
///
/// Field names serialize in camelCase because the unchanged frontend
/// client consumes them that way.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    /// Owner of the request; immutable once created.
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "sick")]
    pub leave_type: LeaveType,
    #[schema(example = "2025-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Inclusive day count, multiplied by 8 when the unit is hours.
    /// Always server-computed.
    #[schema(example = 3.0)]
    pub duration: f64,
    #[schema(example = "days")]
    pub duration_unit: DurationUnit,
    #[schema(example = "Family event out of town")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    /// Set only when HR decides the request.
    pub admin_comment: Option<String>,
    /// Required when the request is rejected, unset otherwise.
    pub rejected_reason: Option<String>,
    /// HR account that decided the request; unset while pending.
    pub reviewer_id: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[schema(format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
}
