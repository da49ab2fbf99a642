/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: token issuing and verification
/// - [`principal`]: the typed request identity and its axum extractor
/// - [`authorization`]: ownership checks for user-scoped rows
///
/// # Example
///
/// ```no_run
/// use mdnote_shared::auth::jwt::TokenManager;
/// use mdnote_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenManager::new("your-secret-key-at-least-32-bytes", 24);
/// let token = tokens.issue(1, "admin")?;
/// let principal = tokens.verify(&token)?;
/// assert_eq!(principal.user_id, 1);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod password;
pub mod principal;
