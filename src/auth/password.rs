//! Password hashing and verification using Argon2id

use crate::error::AppError;
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::Lazy;
use password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

/// Digest used to burn a full verification when there is no real one to check
static TIMING_DIGEST: Lazy<Option<String>> =
    Lazy::new(|| PasswordHasher::new().hash("timing-equalizer").ok());

/// Password hasher with fixed cost parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with the OWASP minimum Argon2id parameters
    /// (m=19MiB, t=2 iterations, p=1 lane)
    pub fn new() -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT);

        Self { argon2 }
    }

    /// Hash a password into a self-describing PHC string with a fresh salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored digest
    ///
    /// Parameters and salt come from the digest itself. Any mismatch, malformed
    /// digest or empty password yields `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.is_empty() {
            return false;
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Build the timing digest up front so the first unknown-email login
    /// does not also pay for a hash. Returns whether a digest is available.
    pub fn prepare_timing_digest() -> bool {
        Lazy::force(&TIMING_DIGEST).is_some()
    }

    /// Spend the same work as a real verification, always returning `false`
    pub fn equalize_timing(&self, password: &str) -> bool {
        if let Some(digest) = TIMING_DIGEST.as_deref() {
            let _ = self.verify(password, digest);
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
