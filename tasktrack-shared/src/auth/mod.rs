/// Authentication and authorization utilities
///
/// This module provides the authentication primitives for Tasktrack:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and verification
/// - [`middleware`]: Axum auth gate that resolves the caller's [`Identity`]
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with a configurable work factor
/// - **Bearer Tokens**: HS256 signing, 7 day lifetime, no server-side state
/// - **Constant-time Comparison**: Password verification is delegated to argon2
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::auth::{
///     jwt::TokenIssuer,
///     password::{CredentialHasher, HashParams},
///     Identity,
/// };
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = CredentialHasher::new(HashParams::default())?;
/// let hash = hasher.hash("secret123")?;
/// assert!(hasher.verify("secret123", &hash));
///
/// let issuer = TokenIssuer::new("a-secret-key-that-is-long-enough-to-use")?;
/// let identity = Identity { id: 1, email: "a@x.com".into(), name: "Ann".into() };
/// let token = issuer.issue(&identity)?;
/// assert_eq!(issuer.verify(&token)?.identity(), identity);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

pub mod jwt;
pub mod middleware;
pub mod password;

/// Resolved identity of an authenticated caller
///
/// Carried inside every bearer token and handed to handlers by the auth
/// gate. Taken verbatim from the token, never re-read from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID
    pub id: i64,

    /// Email address at the time the token was issued
    pub email: String,

    /// Display name at the time the token was issued
    pub name: String,
}
