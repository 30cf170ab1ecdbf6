//! Registered user accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use albumhub_core::{DomainError, DomainResult, Entity, UserId};

use crate::password::PasswordHash;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Validated registration payload (password already hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
}

impl NewUser {
    pub fn register(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> DomainResult<Self> {
        let mut problems = Vec::new();

        let name = name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            problems.push("name is required".to_string());
        }

        let email = email.as_deref().map(normalize_email).unwrap_or_default();
        if email.is_empty() || !email.contains('@') {
            problems.push("a valid email is required".to_string());
        }

        let password = password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            problems.push(format!("password must be at least {MIN_PASSWORD_LEN} characters"));
        }

        if !problems.is_empty() {
            return Err(DomainError::validation(problems.join("; ")));
        }

        Ok(Self {
            name,
            email,
            password_hash: PasswordHash::create(&password)?,
        })
    }

    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: now,
        }
    }
}

/// E-mail addresses are compared trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Public view of a user (never includes the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResource {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}
