// Credential ports: password hashing and bearer-token signing

use crate::domain::Session;
use crate::error::Result;

/// One-way password hashing (adapter picks the algorithm)
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// Ok(false) for a wrong password; Err only for a malformed stored hash
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool>;
}

/// Issues and checks the bearer tokens that carry a `Session`
pub trait SessionSigner: Send + Sync {
    fn sign(&self, session: &Session) -> Result<String>;

    /// Invalid or expired tokens are `AppError::Unauthorized`
    fn verify(&self, token: &str) -> Result<Session>;
}
