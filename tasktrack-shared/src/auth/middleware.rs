/// Authentication middleware for Axum
///
/// The auth gate runs in front of every protected route. Each request moves
/// from unauthenticated to exactly one of:
///
/// - **Authenticated**: a valid `Authorization: Bearer <token>` header was
///   presented; the token's [`Identity`] is inserted into the request
///   extensions
/// - **Rejected**: the header is missing ([`AuthError::MissingToken`]) or the
///   token fails verification ([`AuthError::InvalidToken`])
///
/// Both rejections produce the same `401` body so a client cannot tell which
/// check failed. The specific reason is only logged.
///
/// Handlers receive the identity as a typed argument, since [`Identity`]
/// implements `FromRequestParts`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use tasktrack_shared::auth::{jwt::TokenIssuer, middleware::require_bearer, Identity};
///
/// async fn protected_handler(identity: Identity) -> String {
///     format!("Hello, {}!", identity.name)
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = Arc::new(TokenIssuer::new("your-secret-key-at-least-32-bytes")?);
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn_with_state(issuer, require_bearer));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use super::{
    jwt::{JwtError, TokenIssuer},
    Identity,
};

/// Error type for the auth gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Missing bearer token")]
    MissingToken,

    /// Token failed verification
    #[error("Invalid bearer token: {0}")]
    InvalidToken(#[from] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        debug!(reason = %self, "Rejected unauthenticated request");

        let body = Json(json!({
            "error": "unauthorized",
            "message": "Unauthorized",
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the bearer token from the `Authorization` header
///
/// A missing header, a non-UTF-8 header, a scheme other than `Bearer` and an
/// empty token are all treated as "no token".
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller's identity from request headers
///
/// # Errors
///
/// - `AuthError::MissingToken` if no bearer token is present
/// - `AuthError::InvalidToken` if the token fails verification for any reason
pub fn authenticate(headers: &HeaderMap, issuer: &TokenIssuer) -> Result<Identity, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    let claims = issuer.verify(token)?;

    Ok(claims.identity())
}

/// Bearer authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`, passing the shared
/// [`TokenIssuer`]. On success the [`Identity`] is added to the request
/// extensions; no database lookup is performed.
pub async fn require_bearer(
    State(issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate(req.headers(), &issuer)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
