/// Argon2id password hashing
///
/// Hashes are stored as PHC strings in `users.password_hash`. Verification
/// takes the cost parameters from the stored string, so accounts hashed with
/// older parameters keep working.
///
/// ```
/// use mdnote_shared::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("123456").unwrap();
/// assert!(verify_password("123456", &hash).unwrap());
/// assert!(!verify_password("654321", &hash).unwrap());
/// ```

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::Lazy;

/// Memory cost in KiB
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),

    #[error("password verification failed: {0}")]
    Verify(password_hash::Error),

    /// The stored value is not a PHC string
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| PasswordError::Hash(e.into()))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` under a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string
///
/// A mismatch is `Ok(false)`; only unreadable hashes and internal failures
/// are errors.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e)),
    }
}

/// Hash checked on logins for unknown usernames
static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("decoy-password").ok());

/// Runs one full verification against a fixed hash and discards the result
///
/// Keeps the unknown-username login path as slow as a wrong password.
pub fn verify_decoy(password: &str) {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id_parameters() {
        let hash = hash_password("123456").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains(&format!("m={},t={},p={}", MEMORY_KIB, ITERATIONS, PARALLELISM)));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("correct horse ", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "plaintext"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_non_ascii_password() {
        let hash = hash_password("密码-パスワード").unwrap();
        assert!(verify_password("密码-パスワード", &hash).unwrap());
    }

    #[test]
    fn test_decoy_hash_is_a_real_hash() {
        let hash = DECOY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verify_password("123456", hash).unwrap());

        verify_decoy("123456");
    }
}
