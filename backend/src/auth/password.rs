//! Password hashing
//!
//! New hashes use Argon2id by default (bcrypt is selectable via config).
//! Verification dispatches on the stored hash format, so both bcrypt and
//! Argon2 hashes keep verifying when the configured algorithm changes.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. In async contexts use
//! the `_async` variants, which run on the blocking thread pool.

use super::error::{AuthError, AuthResult};
use crate::config::{HashAlgorithm, PasswordConfig};
use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Plaintext behind the decoy hash used for unknown accounts
const DECOY_PASSWORD: &str = "chirpy-decoy-password";

/// Password hashing service
///
/// Cheap to clone; holds the tuned cost parameters, a decoy hash built with
/// them, and a shared count of verifications performed.
#[derive(Debug, Clone)]
pub struct PasswordService {
    algorithm: HashAlgorithm,
    argon2_params: Params,
    bcrypt_cost: u32,
    decoy_hash: Arc<str>,
    verifications: Arc<AtomicU64>,
}

impl PasswordService {
    /// Build a hasher from config, rejecting out-of-range cost parameters
    pub fn new(config: &PasswordConfig) -> AuthResult<Self> {
        let argon2_params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid argon2 parameters: {}", e)))?;

        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err(AuthError::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                config.bcrypt_cost
            )));
        }

        let mut service = Self {
            algorithm: config.algorithm,
            argon2_params,
            bcrypt_cost: config.bcrypt_cost,
            decoy_hash: Arc::from(""),
            verifications: Arc::new(AtomicU64::new(0)),
        };
        service.decoy_hash = Arc::from(service.hash(DECOY_PASSWORD)?);
        Ok(service)
    }

    /// Hash a password with a fresh random salt (blocking operation)
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        match self.algorithm {
            HashAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let argon2 =
                    Argon2::new(Algorithm::Argon2id, Version::V0x13, self.argon2_params.clone());
                let hash = argon2
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| AuthError::Hashing(e.to_string()))?;
                Ok(hash.to_string())
            }
            HashAlgorithm::Bcrypt => bcrypt::hash(password, self.bcrypt_cost)
                .map_err(|e| AuthError::Hashing(e.to_string())),
        }
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// A mismatch is `Ok(false)`. Only an unreadable stored hash is an error.
    pub fn verify(&self, hash: &str, password: &str) -> AuthResult<bool> {
        self.verifications.fetch_add(1, Ordering::Relaxed);

        if is_bcrypt_hash(hash) {
            return bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()));
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::Hashing(format!("Invalid hash format: {}", e)))?;
        // Cost parameters come from the PHC string, not from `self`
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        }
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, password: String) -> AuthResult<String> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("Task join error: {}", e)))?
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(&self, hash: String, password: String) -> AuthResult<bool> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Hashing(format!("Task join error: {}", e)))?
    }

    /// Spend one full verification on the decoy hash and discard the outcome
    ///
    /// Used when there is no stored hash to check, so that path costs the
    /// same as a real mismatch.
    pub async fn verify_decoy_async(&self, password: String) -> AuthResult<()> {
        self.verify_async(self.decoy_hash.to_string(), password)
            .await
            .map(|_| ())
    }

    /// Number of verifications performed by this service and its clones
    pub fn verifications(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fast_config(algorithm: HashAlgorithm) -> PasswordConfig {
        PasswordConfig {
            algorithm,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new(&PasswordConfig::default()).unwrap();
        let password = "secure_password_123";
        let hash = service.hash(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify(&hash, password).unwrap());
        assert!(!service.verify(&hash, "wrong_password").unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();
        let hash1 = service.hash("test_password").unwrap();
        let hash2 = service.hash("test_password").unwrap();

        // Random salt
        assert_ne!(hash1, hash2);
        assert!(service.verify(&hash1, "test_password").unwrap());
        assert!(service.verify(&hash2, "test_password").unwrap());
    }

    #[test]
    fn test_bcrypt_hashes_verify_under_argon2_config() {
        let bcrypt_service = PasswordService::new(&fast_config(HashAlgorithm::Bcrypt)).unwrap();
        let argon_service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();

        let legacy = bcrypt_service.hash("04234").unwrap();
        assert!(legacy.starts_with("$2b$04$"));
        assert!(argon_service.verify(&legacy, "04234").unwrap());
        assert!(!argon_service.verify(&legacy, "04235").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error_not_a_mismatch() {
        let service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();
        let result = service.verify("not-a-hash", "password");
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }

    #[test]
    fn test_rejects_bad_cost_parameters() {
        let mut config = fast_config(HashAlgorithm::Bcrypt);
        config.bcrypt_cost = 2;
        assert!(matches!(PasswordService::new(&config), Err(AuthError::Config(_))));

        let mut config = fast_config(HashAlgorithm::Argon2);
        config.argon2_iterations = 0;
        assert!(matches!(PasswordService::new(&config), Err(AuthError::Config(_))));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();
        let hash = service.hash_async("async_test_password".to_string()).await.unwrap();

        assert!(service
            .verify_async(hash.clone(), "async_test_password".to_string())
            .await
            .unwrap());
        assert!(!service.verify_async(hash, "wrong".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_decoy_verification_matches_configured_cost() {
        let service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();
        assert!(service.decoy_hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

        let before = service.verifications();
        service.verify_decoy_async("anything".to_string()).await.unwrap();
        assert_eq!(service.verifications(), before + 1);

        let bcrypt_service = PasswordService::new(&fast_config(HashAlgorithm::Bcrypt)).unwrap();
        assert!(bcrypt_service.decoy_hash.starts_with("$2b$04$"));
    }

    #[test]
    fn test_verification_count_is_shared_by_clones() {
        let service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();
        let hash = service.hash("password").unwrap();
        let clone = service.clone();

        clone.verify(&hash, "password").unwrap();
        clone.verify(&hash, "nope").unwrap();
        assert_eq!(service.verifications(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_hash_verifies_only_its_password(password in "[ -~]{1,40}") {
            let service = PasswordService::new(&fast_config(HashAlgorithm::Argon2)).unwrap();
            let hash = service.hash(&password).unwrap();
            prop_assert!(service.verify(&hash, &password).unwrap());
            let wrong = format!("{}x", password);
            prop_assert!(!service.verify(&hash, &wrong).unwrap());
        }
    }
}
