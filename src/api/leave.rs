use crate::auth::auth::AuthUser;
use crate::error::{LeaveError, LeaveResult};
use crate::leave::lifecycle::{self, Decision, LeavePatch, NewLeave};
use crate::leave::policy::{self, LeaveOp};
use crate::leave::report;
use crate::model::leave::{DurationUnit, LeaveRequest, LeaveType};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type, start_date, end_date, duration, duration_unit,
    reason, status, admin_comment, rejected_reason, reviewer_id, reviewed_at, applied_at
"#;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeave {
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "2025-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Accepted for client compatibility; the server recomputes and
    /// overrides this value.
    #[schema(example = 3.0)]
    pub duration: Option<f64>,
    #[schema(example = "days")]
    pub duration_unit: Option<DurationUnit>,
    #[schema(example = "Family event out of town")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeave {
    pub leave_type: Option<LeaveType>,
    #[schema(example = "2025-06-10", format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLeave {
    #[schema(example = "ok")]
    pub admin_comment: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectLeave {
    /// Required, minimum 5 characters. Optional on the wire so a missing
    /// field surfaces as a validation message rather than a parse error.
    #[schema(example = "Peak season, team is short-staffed")]
    pub rejected_reason: Option<String>,
    pub admin_comment: Option<String>,
}

async fn fetch_leave(pool: &MySqlPool, id: u64) -> LeaveResult<LeaveRequest> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
    sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(LeaveError::NotFound)
}

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body = ApplyLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ApplyLeave>,
) -> LeaveResult<HttpResponse> {
    let payload = payload.into_inner();

    let input = NewLeave {
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
        duration_unit: payload.duration_unit.unwrap_or_default(),
        reason: payload.reason,
    };
    let validated = input.validate(Utc::now().date_naive())?;

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, duration, duration_unit, reason)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(validated.leave_type)
    .bind(validated.start_date)
    .bind(validated.end_date)
    .bind(validated.duration)
    .bind(validated.duration_unit)
    .bind(&validated.reason)
    .execute(pool.get_ref())
    .await?;

    let leave = fetch_leave(pool.get_ref(), result.last_insert_id()).await?;

    info!(
        leave_id = leave.id,
        employee_id = auth.user_id,
        leave_type = %leave.leave_type,
        "Leave request submitted"
    );

    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Own leave history
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves/my-leaves",
    responses(
        (status = 200, description = "Own leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(auth: AuthUser, pool: web::Data<MySqlPool>) -> LeaveResult<HttpResponse> {
    let sql = format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY applied_at DESC"
    );
    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
All leave requests (HR)
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves/all",
    responses(
        (status = 200, description = "Every leave request, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn all_leaves(auth: AuthUser, pool: web::Data<MySqlPool>) -> LeaveResult<HttpResponse> {
    policy::require_hr(&auth.actor())?;

    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests ORDER BY applied_at DESC");
    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Who is out today
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves/today",
    responses(
        (status = 200, description = "Approved leaves spanning today", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn todays_leaves(_auth: AuthUser, pool: web::Data<MySqlPool>) -> LeaveResult<HttpResponse> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE status = 'approved'");
    let approved = sqlx::query_as::<_, LeaveRequest>(&sql)
        .fetch_all(pool.get_ref())
        .await?;

    let today = report::todays_approved_leaves(&approved, Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(today))
}

/* =========================
Single leave request
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves/{id}",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner and not HR"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> LeaveResult<HttpResponse> {
    let leave = fetch_leave(pool.get_ref(), path.into_inner()).await?;
    policy::authorize(&auth.actor(), &leave, LeaveOp::View)?;

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Edit a pending request (owner)
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{id}",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Validation failed or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeave>,
) -> LeaveResult<HttpResponse> {
    let leave_id = path.into_inner();
    let payload = payload.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id).await?;

    let patch = LeavePatch {
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
        reason: payload.reason,
    };
    let updated = lifecycle::edit(&leave, auth.user_id, patch, Utc::now().date_naive())?;

    // The status guard repeats in SQL so an edit racing a decision
    // cannot overwrite a processed record.
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET leave_type = ?, start_date = ?, end_date = ?, duration = ?, reason = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(updated.leave_type)
    .bind(updated.start_date)
    .bind(updated.end_date)
    .bind(updated.duration)
    .bind(&updated.reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(LeaveError::already_processed());
    }

    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Cancel a pending request (owner)
========================= */
#[utoipa::path(
    delete,
    path = "/api/leaves/{id}",
    params(
        ("id" = u64, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Leave request cancelled"),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> LeaveResult<HttpResponse> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id).await?;
    lifecycle::cancel(&leave, auth.user_id)?;

    let result = sqlx::query(
        r#"
        DELETE FROM leave_requests
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(LeaveError::already_processed());
    }

    info!(leave_id, employee_id = auth.user_id, "Leave request cancelled");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request cancelled"
    })))
}

/// Shared write path for approve/reject. The `status = 'pending'` guard
/// in the UPDATE makes the decision one-shot: of two concurrent
/// reviewers, exactly one affects a row and the other gets
/// `InvalidState`.
async fn persist_decision(
    pool: &MySqlPool,
    auth: &AuthUser,
    leave_id: u64,
    decision: Decision,
) -> LeaveResult<LeaveRequest> {
    let leave = fetch_leave(pool, leave_id).await?;
    let updated = lifecycle::decide(&leave, &auth.actor(), decision, Utc::now())?;

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, admin_comment = ?, rejected_reason = ?, reviewer_id = ?, reviewed_at = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(updated.status)
    .bind(&updated.admin_comment)
    .bind(&updated.rejected_reason)
    .bind(updated.reviewer_id)
    .bind(updated.reviewed_at)
    .bind(leave_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LeaveError::already_processed());
    }

    Ok(updated)
}

/* =========================
Approve leave (HR)
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{id}/approve",
    params(
        ("id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body = ApproveLeave,
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Leave request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR only"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ApproveLeave>,
) -> LeaveResult<HttpResponse> {
    let leave_id = path.into_inner();
    let decision = Decision::Approve {
        admin_comment: payload.into_inner().admin_comment,
    };

    let updated = persist_decision(pool.get_ref(), &auth, leave_id, decision).await?;

    info!(leave_id, reviewer_id = auth.user_id, "Leave approved");

    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Reject leave (HR)
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{id}/reject",
    params(
        ("id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Missing rejection reason or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR only"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RejectLeave>,
) -> LeaveResult<HttpResponse> {
    let leave_id = path.into_inner();
    let payload = payload.into_inner();
    let decision = Decision::Reject {
        rejected_reason: payload.rejected_reason,
        admin_comment: payload.admin_comment,
    };

    let updated = persist_decision(pool.get_ref(), &auth, leave_id, decision).await?;

    info!(leave_id, reviewer_id = auth.user_id, "Leave rejected");

    Ok(HttpResponse::Ok().json(updated))
}
