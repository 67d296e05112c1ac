// Auth Service - registration, login and session checks

use crate::domain::{AuthGrant, LoginRequest, RegisterRequest, Session, User};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, PasswordHasher, SessionSigner, TimeProvider, UserRepository};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use validator::Validate;

const BAD_CREDENTIALS: &str = "invalid email or password";

/// Hashed once and verified against when the email is unknown, so both
/// failed-login paths cost one verification
const DUMMY_PASSWORD: &str = "queueless-unknown-account";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn SessionSigner>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn SessionSigner>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            users,
            hasher,
            signer,
            id_provider,
            time_provider,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Create an account and sign it in
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthGrant> {
        let req = RegisterRequest {
            full_name: req.full_name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            ..req
        };
        req.validate()?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::Conflict(format!("email {} is already registered", req.email)));
        }

        let user = User {
            id: self.id_provider.generate_id(),
            full_name: req.full_name,
            email: req.email,
            password_hash: self.hash_password(req.password).await?,
            role: req.role,
            created_at: self.time_provider.now_millis(),
        };
        self.users.insert(&user).await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        self.grant(&user)
    }

    /// Check credentials and sign in.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthGrant> {
        let req = LoginRequest {
            email: req.email.trim().to_lowercase(),
            ..req
        };
        req.validate()?;

        let user = self.users.find_by_email(&req.email).await?;
        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?.to_string(),
        };
        let verified = self.verify_password(req.password, stored_hash).await?;

        match user {
            Some(user) if verified => {
                info!(user_id = %user.id, "User logged in");
                self.grant(&user)
            }
            Some(user) => {
                warn!(user_id = %user.id, "Login failed: wrong password");
                Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()))
            }
            None => {
                warn!("Login failed: unknown email");
                Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()))
            }
        }
    }

    /// Decode a bearer token into a session
    pub fn authenticate(&self, bearer: &str) -> Result<Session> {
        self.signer.verify(bearer)
    }

    /// Session must belong to an administrator
    pub fn require_admin(session: &Session) -> Result<()> {
        if session.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role {} cannot perform this action",
                session.role
            )))
        }
    }

    // Hashing is CPU-bound; keep it off the async workers
    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, password_hash: String) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("password check task failed: {}", e)))?
    }

    async fn dummy_hash(&self) -> Result<&str> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    fn grant(&self, user: &User) -> Result<AuthGrant> {
        let session = Session::new(user.id.clone(), user.role);
        Ok(AuthGrant {
            token: self.signer.sign(&session)?,
            role: user.role,
        })
    }
}
