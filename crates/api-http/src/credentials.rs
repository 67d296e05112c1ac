//! Credential adapters: Argon2 password hashing and HS256 JWT sessions

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use queueless_core::domain::{Role, Session};
use queueless_core::error::{AppError, Result};
use queueless_core::port::{PasswordHasher, SessionSigner};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Argon2id with the crate's default parameters
#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AppError::Internal(format!("stored password hash is malformed: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// JWT claims carried by a bearer token
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// HS256 bearer tokens
pub struct JwtSessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtSessionSigner {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }
}

impl SessionSigner for JwtSessionSigner {
    fn sign(&self, session: &Session) -> Result<String> {
        let iat = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: session.user_id.clone(),
            role: session.role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<Session> {
        let data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;

        Ok(Session::new(data.claims.sub, data.claims.role))
    }
}
