/// User directory
///
/// Registration, lookup and login. Email uniqueness is checked up front for
/// a friendly error, and enforced for real by the store: a unique violation
/// raised by a concurrent registration maps to the same `Conflict`.
///
/// Login failures are uniform. An unknown email and a wrong password both
/// return [`ServiceError::InvalidCredentials`], and the unknown-email path
/// still runs one Argon2 verification against a decoy hash.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::{
    auth::{jwt::TokenIssuer, password::CredentialHasher},
    models::user::{CreateUser, User},
    store::UserStore,
};

/// Registration input
///
/// Missing fields deserialize as empty strings so that they fail
/// validation rather than JSON parsing.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Creates and authenticates users
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenIssuer>,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<CredentialHasher>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is empty or the email is malformed
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<User> {
        req.validate()?;

        if self.store.find_user_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(req.password).await?;

        let user = self
            .store
            .insert_user(CreateUser {
                name: req.name,
                email: req.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered");

        Ok(user)
    }

    /// Exact-match lookup by email
    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.store.find_user_by_email(email).await?)
    }

    /// Authenticates a user and issues a token
    ///
    /// # Errors
    ///
    /// - `Validation` if email or password is empty
    /// - `InvalidCredentials` for an unknown email or a wrong password
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<(User, String)> {
        req.validate()?;

        let user = self.find_by_email(&req.email).await?;

        let hasher = self.hasher.clone();
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let password = req.password;
        let valid = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_decoy(&password),
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("Verification task failed: {}", e)))?;

        let user = match user {
            Some(user) if valid => user,
            _ => {
                warn!("Login failed: invalid credentials");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let token = self.issue_token(&user)?;

        info!(user_id = user.id, "User logged in");

        Ok((user, token))
    }

    /// Issues a bearer token for a user's identity
    pub fn issue_token(&self, user: &User) -> ServiceResult<String> {
        Ok(self.tokens.issue(&user.identity())?)
    }

    async fn hash_password(&self, password: String) -> ServiceResult<String> {
        let hasher = self.hasher.clone();

        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("Hashing task failed: {}", e)))??;

        Ok(hash)
    }
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory").finish_non_exhaustive()
    }
}
