pub mod actions;
pub mod appointments;
pub mod assignment;
pub mod auth;
pub mod error;
pub mod profiles;
pub mod response;
pub mod types;
pub mod users;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use std::sync::Arc;

/// Shared state for the identity gateway, built once at startup
pub struct AuthState {
    pub cognito: CognitoClient,
    pub client_id: String,
    pub user_pool_id: String,
}

impl AuthState {
    pub fn new(cognito: CognitoClient, client_id: String, user_pool_id: String) -> Arc<Self> {
        Arc::new(Self {
            cognito,
            client_id,
            user_pool_id,
        })
    }
}
