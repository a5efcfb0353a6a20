/// Bearer token issuance and verification
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256) using a server-held
/// secret. They carry the user's identity claims and expire 7 days after
/// issuance. Nothing is stored server-side: a token is valid for its whole
/// lifetime as long as the signature, issuer and expiry check out.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 7 days by default, zero leeway when checking `exp`
/// - **Validation**: Signature, expiration and issuer checks
/// - **Secret Management**: An issuer cannot be built without a secret
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::{jwt::TokenIssuer, Identity};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("your-secret-key-at-least-32-bytes")?;
/// let identity = Identity { id: 7, email: "a@x.com".into(), name: "Ann".into() };
///
/// let token = issuer.issue(&identity)?;
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.identity(), identity);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Identity;

/// Issuer claim written into and required from every token
pub const ISSUER: &str = "tasktrack";

/// Default token lifetime
pub fn default_ttl() -> Duration {
    Duration::days(7)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// No signing secret configured
    #[error("Token signing secret is not configured")]
    MissingSecret,

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Bad signature or malformed token
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `iss`: Issuer (always "tasktrack")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// # Identity Claims
///
/// - `id`, `email`, `name`: the user the token was issued to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: i64,

    /// User email
    pub email: String,

    /// User display name
    pub name: String,

    /// Issuer - Always "tasktrack"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for an identity expiring `expires_in` from now
    pub fn new(identity: &Identity, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// The identity embedded in these claims
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Signs and verifies bearer tokens with a single HS256 secret
///
/// Construct once at startup from configuration and share it behind an
/// `Arc`.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer with the default 7 day token lifetime
    ///
    /// # Errors
    ///
    /// Returns `JwtError::MissingSecret` if the secret is empty or blank
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        if secret.trim().is_empty() {
            return Err(JwtError::MissingSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: default_ttl(),
        })
    }

    /// Overrides the token lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Token lifetime used by [`issue`](Self::issue)
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed token for an identity
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, identity: &Identity) -> Result<String, JwtError> {
        self.sign(&Claims::new(identity, self.ttl))
    }

    /// Signs arbitrary claims with this issuer's key
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its claims
    ///
    /// Verifies:
    /// - Signature is valid
    /// - Token hasn't expired (no leeway)
    /// - Issuer is "tasktrack"
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` if `exp` has passed
    /// - `JwtError::InvalidIssuer` if `iss` doesn't match
    /// - `JwtError::Invalid` for bad signatures and malformed tokens
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                _ => JwtError::Invalid(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn ann() -> Identity {
        Identity {
            id: 1,
            email: "a@x.com".to_string(),
            name: "Ann".to_string(),
        }
    }

    #[test]
    fn test_missing_secret_fails_closed() {
        assert!(matches!(TokenIssuer::new(""), Err(JwtError::MissingSecret)));
        assert!(matches!(TokenIssuer::new("   "), Err(JwtError::MissingSecret)));
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(&ann(), default_ttl());

        assert_eq!(claims.identity(), ann());
        assert_eq!(claims.iss, "tasktrack");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_issue_and_verify_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();

        let token = issuer.issue(&ann()).expect("Should create token");
        let claims = issuer.verify(&token).expect("Should validate token");

        assert_eq!(claims.identity(), ann());
        assert_eq!(claims.iss, "tasktrack");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_verify_returns_exact_claims() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let claims = Claims::new(&ann(), Duration::hours(1));

        let token = issuer.sign(&claims).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), claims);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = TokenIssuer::new("secret-one-secret-one-secret-one-1")
            .unwrap()
            .issue(&ann())
            .unwrap();

        let result = TokenIssuer::new("secret-two-secret-two-secret-two-2")
            .unwrap()
            .verify(&token);
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_verify_expired_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();

        // Negative duration = already expired
        let claims = Claims::new(&ann(), Duration::seconds(-3600));

        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_verify_just_expired_token_has_no_leeway() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let claims = Claims::new(&ann(), Duration::seconds(-5));

        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_verify_wrong_issuer() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let mut claims = Claims::new(&ann(), Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.verify(&token), Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_verify_malformed_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();

        assert!(matches!(issuer.verify(""), Err(JwtError::Invalid(_))));
        assert!(matches!(issuer.verify("not.a.token"), Err(JwtError::Invalid(_))));
        assert!(matches!(issuer.verify("garbage"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let token = issuer.issue(&ann()).unwrap();

        let other = issuer
            .issue(&Identity {
                id: 2,
                email: "b@x.com".to_string(),
                name: "Bob".to_string(),
            })
            .unwrap();

        // Splice Bob's payload onto Ann's signature
        let ann_parts: Vec<&str> = token.split('.').collect();
        let bob_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", ann_parts[0], bob_parts[1], ann_parts[2]);

        assert!(issuer.verify(&forged).is_err());
    }

    #[test]
    fn test_custom_ttl() {
        let issuer = TokenIssuer::new(SECRET)
            .unwrap()
            .with_ttl(Duration::hours(1));
        assert_eq!(issuer.ttl(), Duration::hours(1));

        let claims = issuer.verify(&issuer.issue(&ann()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}
