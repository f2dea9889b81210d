use serde_json::{json, Value};
use sqlx::MySqlPool;

use crate::actions::{optional_str, require_i64, require_str};
use crate::error::DataError;

// Role and status encodings used by the users table.
pub const ROLE_CARE_NAVIGATOR: i64 = 1;

pub const STATUS_CONFIRMED: i64 = 1;
pub const STATUS_ACTIVE: i64 = 2;
pub const STATUS_CN_PROFILE_INCOMPLETE: i64 = 4;

/// Insert the user row created right after a Cognito signup.
pub async fn create_user(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let username = require_str(data, "username")?;
    let email = require_str(data, "email")?;
    let role = require_i64(data, "role")?;
    let status = require_i64(data, "status")?;
    let created_at = require_str(data, "created_at")?;
    let calendly_name = optional_str(data, "calendly_name");

    sqlx::query(
        "INSERT INTO users (username, email, role, status, calendly_name, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(role)
    .bind(status)
    .bind(calendly_name)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(json!({ "message": "User created", "username": username }))
}

pub async fn get_user_role(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let username = require_str(data, "username")?;

    let role: Option<i64> = sqlx::query_scalar("SELECT role FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    match role {
        Some(role) => Ok(json!({ "role": role })),
        None => Err(DataError::NotFound("User not found")),
    }
}

pub async fn get_user_status(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let username = require_str(data, "username")?;

    let status: Option<i64> = sqlx::query_scalar("SELECT status FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    match status {
        Some(status) => Ok(json!({ "status": status })),
        None => Err(DataError::NotFound("User not found")),
    }
}

/// Calendly link of the navigator assigned to a client.
pub async fn get_client_cn_calendly(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let client_username = require_str(data, "client_username")?;

    let calendly: Option<Option<String>> = sqlx::query_scalar(
        "SELECT u.calendly_name
         FROM users u
         WHERE u.username = (
             SELECT care_navigator_username
             FROM client_details
             WHERE client_username = ?
         )",
    )
    .bind(client_username)
    .fetch_optional(pool)
    .await?;

    match calendly.flatten() {
        Some(name) if !name.is_empty() => Ok(json!({ "calendly_name": name })),
        _ => Err(DataError::NotFound(
            "Care navigator calendly name not found for this client",
        )),
    }
}

pub async fn get_cn_calendly_name(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let cn_username = require_str(data, "cn_username")?;

    let calendly: Option<Option<String>> =
        sqlx::query_scalar("SELECT calendly_name FROM users WHERE username = ?")
            .bind(cn_username)
            .fetch_optional(pool)
            .await?;

    match calendly.flatten() {
        Some(name) if !name.is_empty() => Ok(json!({ "calendly_name": name })),
        _ => Err(DataError::NotFound(
            "Calendly name not found for this care navigator",
        )),
    }
}

async fn set_status(
    pool: &MySqlPool,
    data: &Value,
    status: i64,
    success_message: &str,
) -> Result<Value, DataError> {
    let username = require_str(data, "username")?;

    let result = sqlx::query("UPDATE users SET status = ? WHERE username = ?")
        .bind(status)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        Ok(json!({ "message": success_message }))
    } else {
        Err(DataError::NotFound("User not found"))
    }
}

/// Client verified their email.
pub async fn confirmed_client(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    set_status(
        pool,
        data,
        STATUS_CONFIRMED,
        "Client email verified successfully",
    )
    .await
}

pub async fn active_user(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    set_status(pool, data, STATUS_ACTIVE, "User activated successfully").await
}

/// Navigator replaced their temporary password but has no profile yet.
pub async fn profile_incomplete_cn(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    set_status(
        pool,
        data,
        STATUS_CN_PROFILE_INCOMPLETE,
        "Permanent password created successfully",
    )
    .await
}
