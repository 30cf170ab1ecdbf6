//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=…,t=…,p=…$salt$hash`)
//! with a random per-password salt; the parameters travel with the hash.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use albumhub_core::{DomainError, DomainResult};

/// Well-formed hash of no real password, with the default Argon2id cost.
/// Verifying against it costs as much as verifying a real hash.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$YWxidW1odWItbm91c2VyIQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    pub fn create(password: &str) -> DomainResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::invariant(format!("password hashing failed: {e}")))?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a value previously produced by [`PasswordHash::create`].
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    /// A hash no password verifies against, for equalizing the cost of
    /// rejecting unknown accounts.
    pub fn dummy() -> Self {
        Self(DUMMY_HASH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PhcString::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_password_gets_different_salts() {
        let a = PasswordHash::create("hunter22").unwrap();
        let b = PasswordHash::create("hunter22").unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("$argon2id$"));
        assert!(a.verify("hunter22"));
        assert!(b.verify("hunter22"));
    }

    #[test]
    fn malformed_stored_value_never_verifies() {
        assert!(!PasswordHash::from_stored("").verify(""));
        assert!(!PasswordHash::from_stored("md5$00$00").verify("x"));
        assert!(!PasswordHash::from_stored("sha256$zz$zz").verify("x"));
    }

    #[test]
    fn dummy_hash_parses_and_rejects() {
        assert!(PhcString::new(DUMMY_HASH).is_ok());
        assert!(!PasswordHash::dummy().verify(""));
        assert!(!PasswordHash::dummy().verify("hunter2hunter2"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn only_the_hashed_password_verifies(pw in ".{1,32}", other in ".{1,32}") {
            let hash = PasswordHash::create(&pw).unwrap();
            prop_assert!(hash.verify(&pw));
            prop_assert_eq!(hash.verify(&other), pw == other);
        }
    }
}
