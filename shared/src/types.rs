use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};

// ========== IDENTITY GATEWAY REQUESTS ==========
// Fields are optional so presence/non-emptiness is checked before any
// backend call; a malformed body degrades to "everything missing".

#[derive(Debug, Default, Deserialize)]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignOutRequest {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordRequest {
    pub previous_password: Option<String>,
    pub new_password: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForgotPasswordRequest {
    pub username: Option<String>,
    pub code: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TempPasswordResetRequest {
    pub username: Option<String>,
    pub new_password: Option<String>,
    pub session: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TempPasswordRequest {
    pub username: Option<String>,
    #[serde(rename = "tempPWD")]
    pub temp_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminCreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "userAttributes")]
    pub user_attributes: Option<Value>,
}

// ========== DATA GATEWAY ROWS ==========

/// One row of `client_appointments`, as returned by the history queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppointmentRow {
    pub appointment_id: i64,
    pub client_username: String,
    pub appointment_date_time: NaiveDateTime,
    pub status: String,
    pub created_timestamp: NaiveDateTime,
    pub client_note: Option<String>,
}

impl AppointmentRow {
    pub fn to_json(&self) -> Value {
        json!({
            "appointment_id": self.appointment_id,
            "client_username": self.client_username,
            "appointment_date_time": iso8601(&self.appointment_date_time),
            "status": self.status,
            "created_timestamp": iso8601(&self.created_timestamp),
            "client_note": self.client_note,
        })
    }
}

/// Profile fields shared by `client_details` and `cn_details`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub home_address: Option<String>,
}

impl ProfileRow {
    pub fn to_json(&self) -> Value {
        json!({
            "full_name": self.full_name,
            "date_of_birth": self.date_of_birth.map(|d| d.to_string()),
            "gender": self.gender,
            "contact_number": self.contact_number,
            "home_address": self.home_address,
        })
    }
}

/// Readiness view of the latest active appointment.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadinessRow {
    pub questionnaire_data: Option<Value>,
    pub client_note: Option<String>,
    pub appointment_date_time: Option<NaiveDateTime>,
}

/// ISO-8601 rendering for DATETIME columns (no zone suffix, like the
/// store returns them).
pub fn iso8601(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn appointment_row_serializes_iso8601() {
        let row = AppointmentRow {
            appointment_id: 7,
            client_username: "alice".to_string(),
            appointment_date_time: NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            status: "active".to_string(),
            created_timestamp: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            client_note: None,
        };
        let value = row.to_json();
        assert_eq!(value["appointment_date_time"], "2025-03-14T09:30:00");
        assert_eq!(value["created_timestamp"], "2025-03-01T12:00:00");
        assert_eq!(value["client_note"], Value::Null);
    }

    #[test]
    fn profile_row_serializes_date_of_birth() {
        let row = ProfileRow {
            full_name: Some("Alice A".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 2),
            gender: None,
            contact_number: Some("0400000000".to_string()),
            home_address: None,
        };
        let value = row.to_json();
        assert_eq!(value["date_of_birth"], "1990-01-02");
        assert_eq!(value["gender"], Value::Null);
    }

    #[test]
    fn sign_in_request_tolerates_partial_body() {
        let req: SignInRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("bob"));
        assert!(req.password.is_none());
    }
}
