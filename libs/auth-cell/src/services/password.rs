use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use tracing::instrument;

pub struct PasswordService;

impl PasswordService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Burn one verification against a throwaway hash so an unknown email
    /// costs the same as a wrong password.
    pub fn verify_against_dummy(password: &str) {
        static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

        let dummy = DUMMY_HASH.get_or_init(|| Self::hash_password("dummy-password-for-timing").ok());
        if let Some(hash) = dummy {
            let _ = Self::verify_password(password, hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_never_equals_plaintext() {
        for password in ["hunter2", "correct horse battery staple", "x"] {
            let hash = PasswordService::hash_password(password).unwrap();
            assert_ne!(hash, password);
            assert!(hash.starts_with("$argon2"));
        }
    }

    #[test]
    fn test_hash_verifies_original_only() {
        let hash = PasswordService::hash_password("s3cret-pass").unwrap();
        assert!(PasswordService::verify_password("s3cret-pass", &hash).unwrap());
        assert!(!PasswordService::verify_password("s3cret-Pass", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = PasswordService::hash_password("repeat").unwrap();
        let second = PasswordService::hash_password("repeat").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        assert!(PasswordService::verify_password("anything", "not-a-phc-string").is_err());
    }
}
