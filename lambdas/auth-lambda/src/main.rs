use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use care_shared::AuthState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::env;
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // One Cognito client per process, reused across invocations
    let config = aws_config::load_from_env().await;
    let state = AuthState::new(
        CognitoClient::new(&config),
        env::var("COGNITO_CLIENT_ID").expect("COGNITO_CLIENT_ID must be set"),
        env::var("COGNITO_USER_POOL_ID").expect("COGNITO_USER_POOL_ID must be set"),
    );

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
