use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{role::Role, user::User},
    models::{LoginReq, RegisterReq, TokenType},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

// auth end points

fn validate_registration(payload: &RegisterReq) -> Result<(), &'static str> {
    if payload.name.trim().len() < 2 {
        return Err("Name must be at least 2 characters");
    }
    if !payload.email.contains('@') {
        return Err("Please enter a valid email");
    }
    if payload.password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    if payload.department.trim().is_empty() {
        return Err("Department is required");
    }
    if payload.position.trim().is_empty() {
        return Err("Position is required");
    }
    if payload.employee_code.trim().is_empty() {
        return Err("Employee ID is required");
    }
    Ok(())
}

async fn store_refresh_token(
    pool: &MySqlPool,
    user_id: u64,
    jti: &str,
    exp: usize,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(user_id)
    .bind(jti)
    .bind(exp as i64)
    .execute(pool)
    .await?;
    Ok(())
}

/// Account registration handler
pub async fn register(
    payload: web::Json<RegisterReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    if let Err(msg) = validate_registration(&payload) {
        return HttpResponse::BadRequest().json(json!({ "message": msg }));
    }

    let email = payload.email.trim().to_lowercase();
    let role_id = payload.role_id.unwrap_or(Role::Employee.as_id());
    if Role::from_id(role_id).is_none() {
        return HttpResponse::BadRequest().json(json!({ "message": "Invalid role" }));
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? OR employee_code = ? LIMIT 1)",
    )
    .bind(&email)
    .bind(payload.employee_code.trim())
    .fetch_one(pool.get_ref())
    .await
    .unwrap_or(true); // fail-safe

    if exists {
        return HttpResponse::BadRequest().json(json!({
            "message": "User with this email or employee ID already exists"
        }));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (name, email, password, role_id, department, position, employee_code, phone)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(&email)
    .bind(&hashed)
    .bind(role_id)
    .bind(payload.department.trim())
    .bind(payload.position.trim())
    .bind(payload.employee_code.trim())
    .bind(&payload.phone)
    .execute(pool.get_ref())
    .await;

    let user_id = match result {
        Ok(r) => r.last_insert_id(),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            return HttpResponse::InternalServerError()
                .json(json!({ "message": "Server error" }));
        }
    };

    let user = match fetch_user_by_id(pool.get_ref(), user_id).await {
        Ok(Some(u)) => u,
        _ => {
            return HttpResponse::InternalServerError()
                .json(json!({ "message": "Server error" }));
        }
    };

    let access_token =
        generate_access_token(user_id, email.clone(), role_id, &config.jwt_secret, config.access_token_ttl);
    let (refresh_token, refresh_claims) =
        generate_refresh_token(user_id, email, role_id, &config.jwt_secret, config.refresh_token_ttl);

    if let Err(e) = store_refresh_token(
        pool.get_ref(),
        user_id,
        &refresh_claims.jti,
        refresh_claims.exp,
    )
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().json(json!({ "message": "Server error" }));
    }

    info!(user_id, "User registered");

    HttpResponse::Created().json(json!({
        "token": access_token,
        "refreshToken": refresh_token,
        "user": user.to_public(),
    }))
}

#[instrument(name = "auth_login", skip(pool, config, payload), fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({ "message": "Email and password required" }));
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role_id, department, position,
               employee_code, phone, joined_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&payload.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
    }

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(user_id = db_user.id, jti = %refresh_claims.jti, "Storing refresh token");

    if let Err(e) = store_refresh_token(
        pool.get_ref(),
        db_user.id,
        &refresh_claims.jti,
        refresh_claims.exp,
    )
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    info!("Login successful");

    HttpResponse::Ok().json(json!({
        "token": access_token,
        "refreshToken": refresh_token,
        "user": db_user.to_public(),
    }))
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // The token must still be live in the store.
    let record = match sqlx::query_as::<_, (u64, u64, i8)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(r)) if r.2 == 0 => r,
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Rotate: revoke the old token before issuing a new pair.
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record.0)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) =
        store_refresh_token(pool.get_ref(), record.1, &new_claims.jti, new_claims.exp).await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "token": access_token,
        "refreshToken": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // Only refresh tokens can be revoked.
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // Idempotent: succeeds even if the token was already revoked.
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

async fn fetch_user_by_id(pool: &MySqlPool, id: u64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role_id, department, position,
               employee_code, phone, joined_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Current identity behind the access token.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user profile"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, pool: web::Data<MySqlPool>) -> impl Responder {
    match fetch_user_by_id(pool.get_ref(), auth.user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(json!({ "user": user.to_public() })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "User not found" })),
        Err(e) => {
            error!(error = %e, "Failed to fetch current user");
            HttpResponse::InternalServerError().finish()
        }
    }
}
