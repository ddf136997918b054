use anyhow::Result;
use mockall::automock;

/// One-way credential hashing. Cleartext passwords never leave this seam.
#[automock]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    fn verify(&self, password: &str, digest: &str) -> Result<bool>;
}
