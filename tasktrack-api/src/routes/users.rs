/// Account endpoints
///
/// # Endpoints
///
/// - `POST /users/register` - Create an account and get a token
/// - `POST /users/login` - Exchange credentials for a token
/// - `POST /users/logout` - Symbolic; tokens are not revoked server-side
/// - `GET /users/me` - The caller's identity from the token

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tasktrack_shared::{
    auth::Identity,
    models::user::UserProfile,
    services::{LoginRequest, RegisterRequest},
};
use tracing::info;

use crate::{app::AppState, error::ApiResult};

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The account
    pub user: UserProfile,

    /// Bearer token, valid for 7 days by default
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /users/register
/// Content-Type: application/json
///
/// {
///   "name": "Ann",
///   "email": "a@x.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": 1, "name": "Ann", "email": "a@x.com" },
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields or malformed body
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;

    let user = state.users.register(req).await?;
    let token = state.users.issue_token(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserProfile::from(&user),
            token,
        }),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields or malformed body
/// - `401 Unauthorized`: Invalid credentials (same body whatever the cause)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;

    let (user, token) = state.users.login(req).await?;

    Ok(Json(AuthResponse {
        user: UserProfile::from(&user),
        token,
    }))
}

/// Log out
///
/// Tokens are stateless, so the client discarding its token is the whole
/// logout. This only acknowledges it.
pub async fn logout(identity: Identity) -> Json<Value> {
    info!(user_id = identity.id, "User logged out");

    Json(json!({ "ok": true }))
}

/// The caller's profile, straight from the token claims
pub async fn me(identity: Identity) -> Json<UserProfile> {
    Json(UserProfile {
        id: identity.id,
        name: identity.name,
        email: identity.email,
    })
}
