// User & Session Domain Model

use super::error::DomainError;
use super::token::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::ValidationError(format!("unknown role: {}", other))),
        }
    }
}

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    /// Always stored lowercase
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
}

/// Authenticated caller, decoded from a bearer token and handed to use cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "full name is required"))]
    pub full_name: String,

    #[validate(email(message = "email is not valid"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Result of a successful register/login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub role: Role,
}
