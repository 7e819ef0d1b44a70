use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "secret123")]
    pub password: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Developer")]
    pub position: String,
    /// Human-readable staff code, `employeeId` on the wire.
    #[serde(rename = "employeeId")]
    #[schema(example = "EMP-001", value_type = String)]
    pub employee_code: String,
    pub phone: Option<String>,
    /// 1 = hr, 2 = employee. Defaults to employee.
    #[schema(example = 2)]
    pub role_id: Option<u8>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "john@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "secret123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Account email.
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
