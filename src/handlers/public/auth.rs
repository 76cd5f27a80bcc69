// handlers/public/auth.rs - Account sign-up and token acquisition

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::{self, Registration};
use crate::database::models::User;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /users/register - Create an agent account (unverified until approved)
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Registration>,
) -> ApiResult<User> {
    let user = auth::register(state.store.as_ref(), payload, false, state.bcrypt_cost).await?;
    Ok(ApiResponse::created(user))
}

/// POST /users/login - Exchange username and password for a bearer token
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let user = auth::authenticate(state.store.as_ref(), &payload.username, &payload.password)
        .await
        .map_err(|err| {
            tracing::debug!("Login refused for {}: {}", payload.username, err);
            err
        })?;

    let access_token = state.tokens.issue(&user)?;
    Ok(ApiResponse::success(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.tokens.expires_in(),
    }))
}
