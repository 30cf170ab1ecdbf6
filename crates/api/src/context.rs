use chrono::{DateTime, Utc};
use uuid::Uuid;

use albumhub_auth::JwtClaims;
use albumhub_core::UserId;

/// Identity of an authenticated request, derived from its bearer token.
///
/// Inserted as a request extension by the auth middleware; present on every
/// protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
    token_id: Uuid,
    token_expires_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            token_id: claims.jti,
            token_expires_at: claims.expires_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn token_id(&self) -> Uuid {
        self.token_id
    }

    pub fn token_expires_at(&self) -> DateTime<Utc> {
        self.token_expires_at
    }
}
