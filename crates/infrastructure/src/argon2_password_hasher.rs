//! Argon2id credential hashing for usuario accounts.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use panaderia_application::PasswordHasher as PasswordHasherPort;
use panaderia_core::{AppError, AppResult};

// OWASP password-storage baseline for Argon2id.
const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const LANES: u32 = 1;

/// Hashes and verifies the `contrasena` column as Argon2id PHC strings.
///
/// Hashes produced by earlier parameter choices keep verifying: the salt
/// and cost parameters travel inside the stored string.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates the hasher with the baseline cost parameters.
    #[must_use]
    pub fn new() -> Self {
        let params =
            Params::new(MEMORY_KIB, ITERATIONS, LANES, None).unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("argon2 hashing failed: {error}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let stored = PasswordHash::new(hash)
            .map_err(|error| AppError::Internal(format!("stored hash is not PHC: {error}")))?;

        match self.argon2.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "argon2 verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use panaderia_application::PasswordHasher as PasswordHasherPort;
    use panaderia_core::AppResult;

    use super::Argon2PasswordHasher;

    #[test]
    fn hash_and_verify_correct_password() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("pan-dulce-2024")?;
        assert!(hasher.verify_password("pan-dulce-2024", &hash)?);
        Ok(())
    }

    #[test]
    fn wrong_password_fails_verification() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("pan-dulce-2024")?;
        assert!(!hasher.verify_password("otra-clave", &hash)?);
        Ok(())
    }

    #[test]
    fn hashes_are_salted_per_call() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash_password("pan-dulce-2024")?;
        let second = hasher.hash_password("pan-dulce-2024")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = Argon2PasswordHasher::new();
        assert!(hasher.verify_password("x", "not-a-phc-string").is_err());
    }
}
