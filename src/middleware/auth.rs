use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::database::models::User;
use crate::error::ApiError;
use crate::routes::AppState;
use crate::types::Role;

/// Authenticated user context, loaded fresh from the store on every request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            role: user.role(),
            id: user.id,
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins are always active; agents only once an admin has verified them
    pub fn is_active(&self) -> bool {
        self.is_admin() || self.is_verified
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin privileges required"))
        }
    }

    pub fn require_active(&self) -> Result<(), ApiError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "Please contact admin to activate your account",
            ))
        }
    }

    /// Verified agents only; admins do not submit applications themselves
    pub fn require_active_agent(&self) -> Result<(), ApiError> {
        if self.role == Role::Agent && self.is_verified {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only verified agents can do this"))
        }
    }

    pub fn require_owner_or_admin(&self, user_id: i32) -> Result<(), ApiError> {
        if self.is_admin() || self.id == user_id {
            Ok(())
        } else {
            Err(ApiError::forbidden("You can only manage your own profile"))
        }
    }

    /// Agents see only what they submitted
    pub fn can_access_application(&self, agent_id: Option<i32>) -> bool {
        self.is_admin() || agent_id == Some(self.id)
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    // Validate and decode JWT
    let claims = state.tokens.verify(&token)?;

    // The token names the user; the row decides role and verification
    let user = state
        .store
        .find_user_by_username(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    debug!("Authenticated {} ({:?})", user.username, user.role());
    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
