use care_shared::response::{json_response, preflight};
use care_shared::{auth, AuthState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use serde_json::json;
use std::sync::Arc;

/// Main Lambda handler - routes requests to the identity operations
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AuthState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    tracing::info!("Auth Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return preflight("POST, OPTIONS");
    }

    let body = event.body();
    let cognito = &state.cognito;
    let client_id = state.client_id.as_str();
    let user_pool_id = state.user_pool_id.as_str();

    match (method, path) {
        (&Method::POST, "/auth/signup") => auth::sign_up(cognito, client_id, body).await,
        (&Method::POST, "/auth/signin") => auth::sign_in(cognito, client_id, body).await,
        (&Method::POST, "/auth/signout") => auth::sign_out(cognito, body).await,
        (&Method::POST, "/auth/change-password") => auth::change_password(cognito, body).await,
        (&Method::POST, "/auth/refresh") => auth::refresh_token(cognito, client_id, body).await,
        (&Method::POST, "/auth/forgot-password") => {
            auth::forgot_password(cognito, client_id, body).await
        }
        (&Method::POST, "/auth/forgot-password/confirm") => {
            auth::confirm_forgot_password(cognito, client_id, body).await
        }
        (&Method::POST, "/auth/temp-password") => {
            auth::reset_temp_password(cognito, client_id, body).await
        }
        (&Method::POST, "/auth/temp-password/request") => {
            auth::request_temp_password(cognito, user_pool_id, body).await
        }
        (&Method::POST, "/auth/admin/users") => {
            auth::admin_create_user(cognito, user_pool_id, body).await
        }
        _ => json_response(StatusCode::NOT_FOUND, &json!({ "error": "Not found" })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::config::{BehaviorVersion, Region};
    use aws_sdk_cognitoidentityprovider::Client as CognitoClient;

    fn test_state() -> Arc<AuthState> {
        let conf = aws_sdk_cognitoidentityprovider::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        AuthState::new(
            CognitoClient::from_conf(conf),
            "client-id".to_string(),
            "pool-id".to_string(),
        )
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let response = function_handler(Request::default(), test_state())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn signin_with_empty_body_is_400() {
        let request = Request::new(Body::Text(r#"{}"#.to_string()));
        let (mut parts, body) = request.into_parts();
        parts.method = Method::POST;
        parts.uri = "/auth/signin".parse().unwrap();
        let request = Request::from_parts(parts, body);

        let response = function_handler(request, test_state()).await.unwrap();
        assert_eq!(response.status(), 400);
    }
}
