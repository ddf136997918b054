use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::application::interfaces::password_hasher::PasswordHasher;

#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| {
                error!(error = %err, "security: argon2 hash failed");
                anyhow!(err.to_string())
            })?
            .to_string();
        Ok(digest)
    }

    /// `Ok(false)` for a wrong password; `Err` only for an unreadable digest.
    fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest).map_err(|err| {
            error!(error = %err, "security: stored digest is not a PHC string");
            anyhow!(err.to_string())
        })?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
