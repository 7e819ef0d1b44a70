use crate::api::leave::{ApplyLeave, ApproveLeave, RejectLeave, UpdateLeave};
use crate::leave::report::{OrgStats, PersonalStats};
use crate::model::leave::{DurationUnit, LeaveRequest, LeaveStatus, LeaveType};
use crate::model::user::UserPublic;
use crate::models::{LoginReq, RegisterReq};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Leave Tracker

Employees apply for leave, HR reviews and approves or rejects requests,
and dashboards surface aggregate counts.

### Key Features
- **Leave lifecycle**
  - Apply, edit and cancel pending requests; HR approves or rejects once
- **Access control**
  - Owners see their own requests, HR sees everything
- **Reporting**
  - Personal and organisation-wide counters, plus who is out today

### Security
All `/api` endpoints require **JWT Bearer authentication**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::apply_leave,
        crate::api::leave::my_leaves,
        crate::api::leave::all_leaves,
        crate::api::leave::todays_leaves,
        crate::api::leave::get_leave,
        crate::api::leave::update_leave,
        crate::api::leave::cancel_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::stats::list_employees,
        crate::api::stats::my_stats,
        crate::api::stats::admin_stats,

        crate::auth::handlers::me,
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            DurationUnit,
            ApplyLeave,
            UpdateLeave,
            ApproveLeave,
            RejectLeave,
            PersonalStats,
            OrgStats,
            UserPublic,
            RegisterReq,
            LoginReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Users", description = "Roster and dashboard statistics APIs"),
        (name = "Auth", description = "Authentication APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
