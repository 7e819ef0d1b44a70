use crate::auth::auth::AuthUser;
use crate::error::LeaveResult;
use crate::leave::policy;
use crate::leave::report;
use crate::model::leave::LeaveRequest;
use crate::model::role::Role;
use crate::model::user::{User, UserPublic};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use sqlx::MySqlPool;

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type, start_date, end_date, duration, duration_unit,
    reason, status, admin_comment, rejected_reason, reviewer_id, reviewed_at, applied_at
"#;

/* =========================
Employee roster (HR)
========================= */
#[utoipa::path(
    get,
    path = "/api/users/employees",
    responses(
        (status = 200, description = "All employees, sorted by name", body = [UserPublic]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> LeaveResult<HttpResponse> {
    policy::require_hr(&auth.actor())?;

    let employees = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role_id, department, position,
               employee_code, phone, joined_at
        FROM users
        WHERE role_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(Role::Employee.as_id())
    .fetch_all(pool.get_ref())
    .await?;

    let public: Vec<UserPublic> = employees.iter().map(User::to_public).collect();

    Ok(HttpResponse::Ok().json(public))
}

/* =========================
Personal leave counters
========================= */
#[utoipa::path(
    get,
    path = "/api/users/stats",
    responses(
        (status = 200, description = "Own leave counters", body = report::PersonalStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn my_stats(auth: AuthUser, pool: web::Data<MySqlPool>) -> LeaveResult<HttpResponse> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ?");
    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await?;

    let stats = report::personal_stats(&leaves, auth.user_id);

    Ok(HttpResponse::Ok().json(stats))
}

/* =========================
Organisation dashboard (HR)
========================= */
#[utoipa::path(
    get,
    path = "/api/users/admin-stats",
    responses(
        (status = 200, description = "Org-wide leave counters and today's leaves", body = report::OrgStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn admin_stats(auth: AuthUser, pool: web::Data<MySqlPool>) -> LeaveResult<HttpResponse> {
    policy::require_hr(&auth.actor())?;

    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests");
    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .fetch_all(pool.get_ref())
        .await?;

    let employee_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = ?")
            .bind(Role::Employee.as_id())
            .fetch_one(pool.get_ref())
            .await?;

    let stats = report::org_stats(&leaves, employee_count, Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(stats))
}
