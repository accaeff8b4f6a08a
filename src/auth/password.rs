//! Salted password hashing (Argon2id, PHC strings).

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashingError(String);

const DUMMY_PASSWORD: &str = "feedpulse-dummy-password";

/// Fixed-cost password hasher. The salt and parameters travel inside the
/// returned PHC string, so any instance can verify any hash.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Hasher with the argon2 crate's default cost.
    pub fn new() -> Result<Self, HashingError> {
        Self::from_params(Params::default())
    }

    /// Hasher with explicit Argon2 cost (memory in KiB, passes, lanes).
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashingError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashingError(e.to_string()))?;
        Self::from_params(params)
    }

    // The dummy hash is built here so no login pays for it.
    fn from_params(params: Params) -> Result<Self, HashingError> {
        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = Arc::from(hasher.hash(DUMMY_PASSWORD)?);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashingError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Constant-time check of `password` against a stored hash. Malformed hashes never match.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burn one verification's worth of work. Used when there is no stored hash
    /// to compare against, so the caller's latency does not depend on it.
    pub fn verify_dummy(&self, password: &str) -> bool {
        self.verify(password, &self.dummy_hash);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(1024, 1, 1).unwrap()
    }

    #[test]
    fn hash_and_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("mypassword").unwrap();
        assert!(hasher.verify("mypassword", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn salt_differs_per_call() {
        let hasher = hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(!a.contains("same"));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        let hasher = hasher();
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("anything", "$argon2id$v=19$broken"));
    }

    #[test]
    fn hash_from_other_cost_still_verifies() {
        let cheap = PasswordHasher::with_cost(2048, 2, 1).unwrap();
        let hash = cheap.hash("secret123").unwrap();
        assert!(hasher().verify("secret123", &hash));
    }

    #[test]
    fn dummy_never_matches() {
        let hasher = hasher();
        assert!(!hasher.verify_dummy(DUMMY_PASSWORD));
    }

    #[test]
    fn dummy_hash_is_ready_at_construction() {
        let hasher = hasher();
        assert!(hasher.dummy_hash.starts_with("$argon2id$"));
        assert!(hasher.verify(DUMMY_PASSWORD, &hasher.dummy_hash));
    }

    #[test]
    fn invalid_cost_is_rejected() {
        assert!(PasswordHasher::with_cost(1, 0, 0).is_err());
    }
}
