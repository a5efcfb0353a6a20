/// Password hashing module using Argon2id
///
/// This module provides salted, one-way password hashing using the Argon2id
/// algorithm (winner of the Password Hashing Competition).
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Work factor**: memory, iterations and lanes are configurable through
///   [`HashParams`]; the default is 19 MiB, 2 passes, 1 lane
/// - **Salt**: 16 random bytes per hash from the OS RNG
/// - **Output**: 32-byte hash in PHC string format
///
/// Verification reads the parameters embedded in the stored hash, so the
/// work factor can be raised without invalidating existing passwords.
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::password::{CredentialHasher, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = CredentialHasher::new(HashParams::default())?;
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash));
/// assert!(!hasher.verify("wrong_password", &hash));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use tracing::debug;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Work factor parameters were rejected by argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Salted password hasher and verifier
///
/// Holds a configured Argon2id instance plus a decoy hash. The decoy lets
/// the login path burn the same amount of work for an unknown email as for
/// a wrong password.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    decoy: String,
}

impl CredentialHasher {
    /// Creates a hasher with the given work factor
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the
    /// parameters (for example memory below `8 * parallelism` KiB).
    pub fn new(params: HashParams) -> Result<Self, PasswordError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(32),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let mut hasher = Self {
            argon2,
            decoy: String::new(),
        };
        hasher.decoy = hasher.hash("tasktrack-decoy-password")?;

        Ok(hasher)
    }

    /// Hashes a password with a fresh random salt
    ///
    /// Returns a PHC string, e.g.
    /// `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored hash
    ///
    /// Comparison is constant-time inside argon2. A hash that cannot be
    /// parsed never matches.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                debug!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// Runs a verification against the decoy hash and always returns false
    pub fn verify_decoy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.decoy);
        false
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
