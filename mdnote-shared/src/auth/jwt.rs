/// JWT token issuing and verification
///
/// Tokens are signed with HS256 and carry the two identity fields the API
/// needs on every request: the numeric user id and the username. There is no
/// refresh token; once a token expires the user has to log in again.
///
/// # Claims
///
/// - `sub`: user id
/// - `username`: username at the time of issue
/// - `iss`: always `"mdnote"`
/// - `iat` / `nbf`: issue time
/// - `exp`: issue time plus the configured number of hours
///
/// # Example
///
/// ```
/// use mdnote_shared::auth::jwt::TokenManager;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenManager::new("a-secret-that-is-at-least-32-bytes", 24);
///
/// let token = tokens.issue(42, "alice")?;
/// let principal = tokens.verify(&token)?;
/// assert_eq!(principal.user_id, 42);
/// assert_eq!(principal.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// Issuer claim written into and required from every token
pub const ISSUER: &str = "mdnote";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or structure invalid
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer claim did not match
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Username of the subject
    pub username: String,

    /// Issuer - always "mdnote"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims that expire `expires_in` from now
    pub fn new(user_id: i64, username: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies identity tokens with a fixed secret and lifetime
///
/// Cheap to clone; one instance lives in the application state.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("expiry_hours", &self.expiry.num_hours())
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a token manager
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC secret (should be at least 32 bytes)
    /// * `expiry_hours` - token lifetime in hours
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours),
        }
    }

    /// Token lifetime
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issues a signed token for the given identity
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, username, self.expiry);
        self.sign(&claims)
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns the identity it carries
    ///
    /// Verifies:
    /// - Signature is valid
    /// - Structure parses into [`Claims`]
    /// - Issuer is "mdnote"
    /// - Token is not expired and not used before `nbf`
    pub fn verify(&self, token: &str) -> Result<Principal, JwtError> {
        let claims = self.decode_claims(token)?;
        Ok(Principal::new(claims.sub, claims.username))
    }

    /// Verifies a token and returns its full claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Expiry is absolute; no grace period.
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                    _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
                }
            })?;

        Ok(token_data.claims)
    }
}
