use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::MySqlPool;

use crate::actions::{optional_str, require_str};
use crate::error::DataError;
use crate::types::{iso8601, AppointmentRow, ReadinessRow};

// Appointment lifecycle: active -> cancelled | completed, terminal.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_COMPLETED: &str = "completed";

pub async fn create_appointment(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let client_username = require_str(data, "client_username")?;
    let local_start_time = require_str(data, "local_start_time")?;
    let client_note = optional_str(data, "client_note").unwrap_or("");
    let questionnaire_data = data.get("questionnaire_data").filter(|v| !v.is_null()).cloned();

    let result = sqlx::query(
        "INSERT INTO client_appointments (
             client_username,
             appointment_date_time,
             client_note,
             questionnaire_data
         )
         VALUES (?, ?, ?, ?)",
    )
    .bind(client_username)
    .bind(local_start_time)
    .bind(client_note)
    .bind(questionnaire_data)
    .execute(pool)
    .await?;

    Ok(json!({
        "message": "Appointment created successfully",
        "appointment_id": result.last_insert_id(),
    }))
}

/// Upcoming active appointment for a client. Never a 404: absence is a
/// normal answer, reported as `hasAppointment: false`.
pub async fn get_active_appointment(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    let client_username = require_str(data, "client_username")?;

    let next: Option<chrono::NaiveDateTime> = sqlx::query_scalar(
        "SELECT CONVERT_TZ(appointment_date_time, @@session.time_zone, '+00:00')
         FROM client_appointments
         WHERE client_username = ?
         AND status = ?
         AND appointment_date_time > UTC_TIMESTAMP()
         ORDER BY appointment_date_time ASC
         LIMIT 1",
    )
    .bind(client_username)
    .bind(STATUS_ACTIVE)
    .fetch_optional(pool)
    .await?;

    match next {
        Some(naive) => {
            let utc = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
            Ok(json!({
                "hasAppointment": true,
                "appointmentDateTime": utc.to_rfc3339(),
            }))
        }
        None => Ok(json!({
            "hasAppointment": false,
            "appointmentDateTime": Value::Null,
        })),
    }
}

/// Close the single most-recently-created active appointment. The nested
/// derived table lets MySQL update the table it is selecting from.
async fn close_latest_active(
    pool: &MySqlPool,
    data: &Value,
    new_status: &str,
    success_message: &str,
) -> Result<Value, DataError> {
    let client_username = require_str(data, "client_username")?;

    let result = sqlx::query(
        "UPDATE client_appointments
         SET status = ?
         WHERE appointment_id = (
             SELECT appointment_id FROM (
                 SELECT appointment_id
                 FROM client_appointments
                 WHERE client_username = ? AND status = ?
                 ORDER BY appointment_id DESC
                 LIMIT 1
             ) AS latest
         )",
    )
    .bind(new_status)
    .bind(client_username)
    .bind(STATUS_ACTIVE)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        Ok(json!({ "message": success_message }))
    } else {
        Err(DataError::NotFound(
            "No active appointment found for this client",
        ))
    }
}

pub async fn cancel_appointment(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    close_latest_active(
        pool,
        data,
        STATUS_CANCELLED,
        "Appointment cancelled successfully",
    )
    .await
}

pub async fn complete_appointment(pool: &MySqlPool, data: &Value) -> Result<Value, DataError> {
    close_latest_active(
        pool,
        data,
        STATUS_COMPLETED,
        "Appointment marked as completed successfully",
    )
    .await
}

/// Questionnaire, note and time of the latest active appointment.
pub async fn get_client_readiness_details(
    pool: &MySqlPool,
    data: &Value,
) -> Result<Value, DataError> {
    let client_username = require_str(data, "client_username")?;

    let row: Option<ReadinessRow> = sqlx::query_as(
        "SELECT questionnaire_data, client_note, appointment_date_time
         FROM client_appointments
         WHERE client_username = ? AND status = ?
         ORDER BY created_timestamp DESC
         LIMIT 1",
    )
    .bind(client_username)
    .bind(STATUS_ACTIVE)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(json!({
            "questionnaire_data": row.questionnaire_data,
            "client_note": row.client_note,
            "appointment_date_time": row.appointment_date_time.map(|dt| iso8601(&dt)),
        })),
        None => Err(DataError::NotFound(
            "No active appointment found for this client",
        )),
    }
}

pub async fn get_client_appointment_history(
    pool: &MySqlPool,
    data: &Value,
) -> Result<Value, DataError> {
    let client_username = require_str(data, "client_username")?;

    let rows: Vec<AppointmentRow> = sqlx::query_as(
        "SELECT appointment_id, client_username, appointment_date_time,
                status, created_timestamp, client_note
         FROM client_appointments
         WHERE client_username = ?
         ORDER BY appointment_date_time DESC",
    )
    .bind(client_username)
    .fetch_all(pool)
    .await?;

    // History reports 404 on empty, unlike the client-list queries.
    if rows.is_empty() {
        return Err(DataError::NotFound(
            "No appointment history found for this client",
        ));
    }

    Ok(json!({ "data": rows.iter().map(AppointmentRow::to_json).collect::<Vec<_>>() }))
}

pub async fn get_navigator_appointment_history(
    pool: &MySqlPool,
    data: &Value,
) -> Result<Value, DataError> {
    let care_navigator_username = require_str(data, "care_navigator_username")?;

    let rows: Vec<AppointmentRow> = sqlx::query_as(
        "SELECT ca.appointment_id, ca.client_username, ca.appointment_date_time,
                ca.status, ca.created_timestamp, ca.client_note
         FROM client_appointments ca
         INNER JOIN client_details cd ON ca.client_username = cd.client_username
         WHERE cd.care_navigator_username = ?
         ORDER BY ca.appointment_date_time DESC",
    )
    .bind(care_navigator_username)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Err(DataError::NotFound(
            "No appointment history found for this care navigator",
        ));
    }

    Ok(json!({ "data": rows.iter().map(AppointmentRow::to_json).collect::<Vec<_>>() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::MySqlPool;

    // Integration tests against a dedicated test database: set DATABASE_URL
    // and run `cargo test -- --ignored`. The session time zone is assumed
    // to be UTC, as in the deployed environment.

    async fn test_pool() -> MySqlPool {
        MySqlPool::connect(&std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"))
            .await
            .unwrap()
    }

    async fn reset_client(pool: &MySqlPool, client: &str) {
        sqlx::query("DELETE FROM client_appointments WHERE client_username = ?")
            .bind(client)
            .execute(pool)
            .await
            .unwrap();
    }

    async fn insert_active(pool: &MySqlPool, client: &str, when: &str) -> u64 {
        sqlx::query(
            "INSERT INTO client_appointments (client_username, appointment_date_time, client_note)
             VALUES (?, ?, '')",
        )
        .bind(client)
        .bind(when)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_id()
    }

    async fn status_of(pool: &MySqlPool, appointment_id: u64) -> String {
        sqlx::query_scalar("SELECT status FROM client_appointments WHERE appointment_id = ?")
            .bind(appointment_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn cancel_targets_newest_active_only() {
        let pool = test_pool().await;
        let client = "it-cancel-client";
        reset_client(&pool, client).await;
        let older = insert_active(&pool, client, "2030-01-01 10:00:00").await;
        let newer = insert_active(&pool, client, "2030-01-02 10:00:00").await;

        let data = json!({"client_username": client});
        cancel_appointment(&pool, &data).await.unwrap();
        assert_eq!(status_of(&pool, newer).await, STATUS_CANCELLED);
        assert_eq!(status_of(&pool, older).await, STATUS_ACTIVE);

        complete_appointment(&pool, &data).await.unwrap();
        assert_eq!(status_of(&pool, older).await, STATUS_COMPLETED);

        // nothing active left: 404 and no row changes
        let err = cancel_appointment(&pool, &data).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
        assert_eq!(status_of(&pool, newer).await, STATUS_CANCELLED);
        assert_eq!(status_of(&pool, older).await, STATUS_COMPLETED);

        reset_client(&pool, client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn create_then_get_active_round_trips() {
        let pool = test_pool().await;
        let client = "it-roundtrip-client";
        reset_client(&pool, client).await;

        let start = (Utc::now() + chrono::Duration::days(1))
            .naive_utc()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let created = create_appointment(
            &pool,
            &json!({
                "client_username": client,
                "local_start_time": start,
            }),
        )
        .await
        .unwrap();
        assert!(created["appointment_id"].as_u64().unwrap() > 0);

        let active = get_active_appointment(&pool, &json!({"client_username": client}))
            .await
            .unwrap();
        assert_eq!(active["hasAppointment"], true);

        let naive = chrono::NaiveDateTime::parse_from_str(&start, "%Y-%m-%d %H:%M:%S").unwrap();
        let expected = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).to_rfc3339();
        assert_eq!(active["appointmentDateTime"], expected);

        reset_client(&pool, client).await;
    }
}
