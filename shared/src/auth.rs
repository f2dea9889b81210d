use aws_sdk_cognitoidentityprovider::types::{
    AttributeType, AuthFlowType, ChallengeNameType, DeliveryMediumType,
};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde_json::json;

use crate::error::IdentityError;
use crate::response::{body_text, failure, json_response};
use crate::types::{
    AdminCreateUserRequest, ChangePasswordRequest, ConfirmForgotPasswordRequest,
    ForgotPasswordRequest, RefreshTokenRequest, SignInRequest, SignOutRequest, SignUpRequest,
    TempPasswordRequest, TempPasswordResetRequest,
};

/// Treat absent, empty and whitespace-only fields alike.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Validation failures are reported before any backend call is made.
fn missing(message: &str) -> Result<Response<Body>, Error> {
    failure(StatusCode::BAD_REQUEST, message, "InvalidParameterException")
}

fn identity_failure(op: &str, kind: &IdentityError) -> Result<Response<Body>, Error> {
    tracing::error!("Cognito {} error: {}", op, kind);
    failure(kind.status(), kind.message(), kind.code())
}

/// Register a new user in the pool; Cognito sends the verification email.
pub async fn sign_up(
    cognito: &CognitoClient,
    client_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: SignUpRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(username), Some(password), Some(email)) = (
        present(&req.username),
        present(&req.password),
        present(&req.email),
    ) else {
        return missing("Username, password, and email are required");
    };

    tracing::info!("Signing up user: {}", username);

    let result = cognito
        .sign_up()
        .client_id(client_id)
        .username(username)
        .password(password)
        .user_attributes(
            AttributeType::builder()
                .name("email")
                .value(email)
                .build()?,
        )
        .send()
        .await;

    match result {
        Ok(out) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "User registration successful",
                "userSub": out.user_sub(),
                "userConfirmed": out.user_confirmed(),
            }),
        ),
        Err(e) => identity_failure("sign-up", &IdentityError::classify(&e)),
    }
}

/// Authenticate with username/password.
///
/// A `NEW_PASSWORD_REQUIRED` challenge (temporary password issued by an
/// admin) is surfaced as 202 with the opaque challenge session; the caller
/// completes it through [`reset_temp_password`]. All state lives in the
/// session token Cognito issued.
pub async fn sign_in(
    cognito: &CognitoClient,
    client_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: SignInRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(username), Some(password)) = (present(&req.username), present(&req.password))
    else {
        return missing("Username and password are required");
    };

    tracing::info!("Authenticating user: {}", username);

    let result = cognito
        .initiate_auth()
        .client_id(client_id)
        .auth_flow(AuthFlowType::UserPasswordAuth)
        .auth_parameters("USERNAME", username)
        .auth_parameters("PASSWORD", password)
        .send()
        .await;

    match result {
        Ok(out) => {
            if let Some(auth) = out.authentication_result() {
                json_response(
                    StatusCode::OK,
                    &json!({
                        "success": true,
                        "message": "Authentication successful",
                        "tokens": {
                            "idToken": auth.id_token().unwrap_or_default(),
                            "accessToken": auth.access_token().unwrap_or_default(),
                            "refreshToken": auth.refresh_token().unwrap_or_default(),
                            "expiresIn": auth.expires_in(),
                        },
                    }),
                )
            } else if matches!(
                out.challenge_name(),
                Some(ChallengeNameType::NewPasswordRequired)
            ) {
                tracing::info!("New password required for user: {}", username);
                json_response(
                    StatusCode::ACCEPTED,
                    &json!({
                        "success": true,
                        "message": "New password required",
                        "challenge": {
                            "name": "NEW_PASSWORD_REQUIRED",
                            "session": out.session().unwrap_or_default(),
                        },
                    }),
                )
            } else {
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "No authentication result returned",
                    "UnknownError",
                )
            }
        }
        Err(e) => identity_failure("sign-in", &IdentityError::classify(&e)),
    }
}

/// Revoke every token issued for the bearer of the access token.
pub async fn sign_out(cognito: &CognitoClient, body: &Body) -> Result<Response<Body>, Error> {
    let req: SignOutRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let Some(access_token) = present(&req.access_token) else {
        return missing("Access token is required");
    };

    let result = cognito
        .global_sign_out()
        .access_token(access_token)
        .send()
        .await;

    match result {
        Ok(_) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "User signed out successfully",
            }),
        ),
        Err(e) => identity_failure("sign-out", &IdentityError::classify(&e)),
    }
}

/// Change password for an authenticated user.
pub async fn change_password(
    cognito: &CognitoClient,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: ChangePasswordRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(previous), Some(new), Some(access_token)) = (
        present(&req.previous_password),
        present(&req.new_password),
        present(&req.access_token),
    ) else {
        return missing("Previous password, new password, and access token are required");
    };

    let result = cognito
        .change_password()
        .previous_password(previous)
        .proposed_password(new)
        .access_token(access_token)
        .send()
        .await;

    match result {
        Ok(_) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "Password changed successfully",
            }),
        ),
        Err(e) => identity_failure("change-password", &IdentityError::classify(&e)),
    }
}

/// Exchange a refresh token for fresh access/id tokens.
pub async fn refresh_token(
    cognito: &CognitoClient,
    client_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: RefreshTokenRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let Some(refresh) = present(&req.refresh_token) else {
        return missing("Refresh token is required");
    };

    let result = cognito
        .initiate_auth()
        .client_id(client_id)
        .auth_flow(AuthFlowType::RefreshTokenAuth)
        .auth_parameters("REFRESH_TOKEN", refresh)
        .send()
        .await;

    match result {
        Ok(out) => match out.authentication_result() {
            Some(auth) => json_response(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "message": "Token refreshed successfully",
                    "tokens": {
                        "accessToken": auth.access_token().unwrap_or_default(),
                        "idToken": auth.id_token().unwrap_or_default(),
                        "expiresIn": auth.expires_in(),
                    },
                }),
            ),
            None => failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "No authentication result returned",
                "UnknownError",
            ),
        },
        Err(e) => identity_failure("token-refresh", &IdentityError::classify(&e)),
    }
}

/// Start the forgot-password flow; Cognito emails a verification code.
pub async fn forgot_password(
    cognito: &CognitoClient,
    client_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: ForgotPasswordRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let Some(username) = present(&req.username) else {
        return missing("Username is required");
    };

    tracing::info!("Forgot password initiated for user: {}", username);

    let result = cognito
        .forgot_password()
        .client_id(client_id)
        .username(username)
        .send()
        .await;

    match result {
        Ok(out) => {
            let (destination, medium) = out
                .code_delivery_details()
                .map(|details| {
                    (
                        details.destination().unwrap_or("your email").to_string(),
                        details
                            .delivery_medium()
                            .map(|m| m.as_str())
                            .unwrap_or("EMAIL")
                            .to_string(),
                    )
                })
                .unwrap_or_else(|| ("your email".to_string(), "EMAIL".to_string()));

            json_response(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "message": "Verification code sent successfully",
                    "delivery": {
                        "destination": destination,
                        "medium": medium,
                    },
                }),
            )
        }
        Err(e) => identity_failure("forgot-password", &IdentityError::classify(&e)),
    }
}

/// Complete the forgot-password flow with the emailed code.
pub async fn confirm_forgot_password(
    cognito: &CognitoClient,
    client_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: ConfirmForgotPasswordRequest =
        serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(username), Some(code), Some(password)) = (
        present(&req.username),
        present(&req.code),
        present(&req.password),
    ) else {
        return missing("Username, confirmation code, and new password are required");
    };

    let result = cognito
        .confirm_forgot_password()
        .client_id(client_id)
        .username(username)
        .confirmation_code(code)
        .password(password)
        .send()
        .await;

    match result {
        Ok(_) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "Password reset successful",
            }),
        ),
        Err(e) => identity_failure("confirm-forgot-password", &IdentityError::classify(&e)),
    }
}

/// Answer the NEW_PASSWORD_REQUIRED challenge issued at sign-in with the
/// session token from the 202 response.
pub async fn reset_temp_password(
    cognito: &CognitoClient,
    client_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: TempPasswordResetRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(new_password), Some(session)) =
        (present(&req.new_password), present(&req.session))
    else {
        return missing("New password and challenge session are required");
    };
    let username = present(&req.username).unwrap_or_default();

    let result = cognito
        .respond_to_auth_challenge()
        .client_id(client_id)
        .challenge_name(ChallengeNameType::NewPasswordRequired)
        .session(session)
        .challenge_responses("USERNAME", username)
        .challenge_responses("NEW_PASSWORD", new_password)
        .challenge_responses("userAttributes.preferred_username", username)
        .send()
        .await;

    match result {
        Ok(out) => match out.authentication_result() {
            Some(auth) => json_response(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "message": "Password changed successfully",
                    "tokens": {
                        "idToken": auth.id_token().unwrap_or_default(),
                        "accessToken": auth.access_token().unwrap_or_default(),
                        "refreshToken": auth.refresh_token().unwrap_or_default(),
                        "expiresIn": auth.expires_in(),
                    },
                }),
            ),
            None => failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "No authentication result returned",
                "UnknownError",
            ),
        },
        Err(e) => identity_failure("temp-password-reset", &IdentityError::classify(&e)),
    }
}

/// Re-issue a temporary password, forcing a change at next sign-in.
pub async fn request_temp_password(
    cognito: &CognitoClient,
    user_pool_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: TempPasswordRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(username), Some(temp_password)) =
        (present(&req.username), present(&req.temp_password))
    else {
        return missing("Username and temporary password are required");
    };

    let result = cognito
        .admin_set_user_password()
        .user_pool_id(user_pool_id)
        .username(username)
        .password(temp_password)
        .permanent(false)
        .send()
        .await;

    match result {
        Ok(_) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "Password reset successful.",
                "username": username,
            }),
        ),
        Err(e) => identity_failure("temp-password-request", &IdentityError::classify(&e)),
    }
}

/// Admin-create a user (care navigator onboarding); Cognito emails the
/// temporary password, email is marked verified up front.
pub async fn admin_create_user(
    cognito: &CognitoClient,
    user_pool_id: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let req: AdminCreateUserRequest = serde_json::from_str(body_text(body)).unwrap_or_default();
    let (Some(username), Some(email)) = (present(&req.username), present(&req.email)) else {
        return missing("Both username and email are required");
    };

    tracing::info!("Admin creating user: {}", username);

    let result = cognito
        .admin_create_user()
        .user_pool_id(user_pool_id)
        .username(username)
        .user_attributes(
            AttributeType::builder()
                .name("email")
                .value(email)
                .build()?,
        )
        .user_attributes(
            AttributeType::builder()
                .name("email_verified")
                .value("true")
                .build()?,
        )
        .desired_delivery_mediums(DeliveryMediumType::Email)
        .send()
        .await;

    match result {
        Ok(out) => {
            let status = out
                .user()
                .and_then(|u| u.user_status())
                .map(|s| s.as_str().to_string())
                .unwrap_or_default();

            json_response(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "message": "User created successfully. Temporary password sent via email.",
                    "user": {
                        "username": username,
                        "email": email,
                        "status": status,
                        "userAttributes": req.user_attributes.unwrap_or_else(|| json!({})),
                    },
                }),
            )
        }
        Err(e) => identity_failure("admin-create-user", &IdentityError::classify(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::config::{BehaviorVersion, Region};
    use serde_json::Value;

    // Offline client; validation failures return before any call is sent.
    fn test_client() -> CognitoClient {
        let conf = aws_sdk_cognitoidentityprovider::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        CognitoClient::from_conf(conf)
    }

    fn body_json(resp: &Response<Body>) -> Value {
        serde_json::from_slice(&resp.body().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn sign_in_rejects_missing_password_before_backend_call() {
        let body = Body::Text(r#"{"username":"alice"}"#.to_string());
        let resp = sign_in(&test_client(), "client-id", &body).await.unwrap();
        assert_eq!(resp.status(), 400);
        let json = body_json(&resp);
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "InvalidParameterException");
    }

    #[tokio::test]
    async fn sign_in_rejects_whitespace_username() {
        let body = Body::Text(r#"{"username":"   ","password":"hunter2"}"#.to_string());
        let resp = sign_in(&test_client(), "client-id", &body).await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn sign_up_rejects_missing_email() {
        let body = Body::Text(r#"{"username":"alice","password":"hunter2"}"#.to_string());
        let resp = sign_up(&test_client(), "client-id", &body).await.unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(
            body_json(&resp)["message"],
            "Username, password, and email are required"
        );
    }

    #[tokio::test]
    async fn sign_out_rejects_empty_body() {
        let resp = sign_out(&test_client(), &Body::Empty).await.unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(body_json(&resp)["message"], "Access token is required");
    }

    #[tokio::test]
    async fn temp_password_reset_requires_session() {
        let body = Body::Text(r#"{"new_password":"S3cret!pw"}"#.to_string());
        let resp = reset_temp_password(&test_client(), "client-id", &body)
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(body_json(&resp)["code"], "InvalidParameterException");
    }

    #[tokio::test]
    async fn refresh_rejects_malformed_body() {
        let body = Body::Text("not json".to_string());
        let resp = refresh_token(&test_client(), "client-id", &body)
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }
}
