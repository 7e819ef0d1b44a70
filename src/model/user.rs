use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    pub department: String,
    pub position: String,
    pub employee_code: String,
    pub phone: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// User shape returned to clients. `employeeId` is the human-readable
/// staff code, not the numeric row id.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    #[schema(example = 1000)]
    pub id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@company.com")]
    pub email: String,
    #[schema(example = "employee")]
    pub role: String,
    pub department: String,
    pub position: String,
    #[serde(rename = "employeeId")]
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    pub phone: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub joined_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn to_public(&self) -> UserPublic {
        let role = Role::from_id(self.role_id)
            .map(Role::as_str)
            .unwrap_or("employee");

        UserPublic {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: role.to_string(),
            department: self.department.clone(),
            position: self.position.clone(),
            employee_code: self.employee_code.clone(),
            phone: self.phone.clone(),
            joined_at: self.joined_at,
        }
    }
}
