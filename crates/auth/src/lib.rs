//! `albumhub-auth`: account and bearer-token boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::PasswordHash;
pub use token::{AuthError, Hs256JwtValidator, Hs256TokenIssuer, IssuedToken, JwtValidator};
pub use user::{NewUser, User, UserResource, normalize_email};
