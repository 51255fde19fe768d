//! One-way password hashing.
//!
//! Hashes are PHC strings, so verification reads the algorithm parameters from
//! the stored hash and keeps working after the configured cost changes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use thiserror::Error;

use crate::services::ServiceError;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// Adaptive one-way hash used for stored credentials
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check a plaintext password against a stored hash. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with configurable cost
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash on the blocking pool so concurrent requests keep the async workers free
pub async fn hash_password(
    hasher: Arc<dyn CredentialHasher>,
    password: String,
) -> Result<String, ServiceError> {
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
    Ok(hash)
}

pub async fn verify_password(
    hasher: Arc<dyn CredentialHasher>,
    password: String,
    hash: String,
) -> Result<bool, ServiceError> {
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?;
    Ok(matches)
}

/// Cheap parameters so tests do not spend seconds per hash
#[cfg(test)]
pub fn test_hasher() -> Arc<dyn CredentialHasher> {
    let params = Params::new(1024, 1, 1, None).unwrap();
    Arc::new(Argon2Hasher::with_params(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_and_differs_from_plaintext() {
        let hasher = test_hasher();
        let hash = hasher.hash("password123").unwrap();
        assert_ne!(hash, "password123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("password123", &hash));
        assert!(!hasher.verify("password124", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = test_hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let hasher = test_hasher();
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("", ""));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hasher = test_hasher();
        let hash = hash_password(hasher.clone(), "s3cret".to_string()).await.unwrap();
        assert!(verify_password(hasher.clone(), "s3cret".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password(hasher, "wrong".to_string(), hash).await.unwrap());
    }
}
