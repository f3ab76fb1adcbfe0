/// JWT token generation and validation
///
/// Tokens are signed using HS256 (HMAC-SHA256). Two token realms exist:
/// user tokens (carry the user id and role) and project tokens (carry the
/// project id only). Both realms use the same secret family (one secret for
/// access tokens, one for refresh tokens), but every token carries an
/// explicit `aud` claim, and validation rejects any token presented against
/// the wrong audience. A user refresh token therefore cannot be replayed as
/// a project refresh token even before the stored-column comparison runs.
///
/// # Token Types
///
/// - **Access Token**: short-lived (1 hour), presented as a Bearer credential
/// - **Refresh Token**: long-lived (180 days), persisted on the owning row and
///   compared against the stored value when a new access token is minted
///
/// # Example
///
/// ```
/// use meterdesk_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenAudience};
/// use meterdesk_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::user_access(user_id, UserRole::User);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
///
/// let validated = validate_access_token(&token, "secret-key-at-least-32-bytes-long!!", TokenAudience::User)?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Issuer written into every token
const ISSUER: &str = "meterdesk";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was minted for a different audience (user vs. project realm)
    #[error("Token audience mismatch")]
    InvalidAudience,
}

/// Token audience, separating the user and project auth realms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenAudience {
    /// End-user session token
    User,

    /// Per-project session token
    Project,
}

impl TokenAudience {
    /// Gets audience as string (matches the serialized `aud` claim)
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAudience::User => "user",
            TokenAudience::Project => "project",
        }
    }
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived, 1 hour)
    Access,

    /// Refresh token (long-lived, 180 days)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(1),
            TokenType::Refresh => Duration::days(180),
        }
    }
}

/// JWT claims structure
///
/// `sub` is the user id for user-realm tokens and the project id for
/// project-realm tokens. `role` is present only on user access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id or project id depending on audience
    pub sub: Uuid,

    /// Issuer - always "meterdesk"
    pub iss: String,

    /// Audience - user or project realm
    pub aud: TokenAudience,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,

    /// User role (only present on user access tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl Claims {
    fn new(
        subject: Uuid,
        aud: TokenAudience,
        token_type: TokenType,
        role: Option<UserRole>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: subject,
            iss: ISSUER.to_string(),
            aud,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
            role,
        }
    }

    /// Creates user access-token claims (1 hour, carries the role)
    pub fn user_access(user_id: Uuid, role: UserRole) -> Self {
        Self::new(
            user_id,
            TokenAudience::User,
            TokenType::Access,
            Some(role),
            TokenType::Access.default_expiration(),
        )
    }

    /// Creates user refresh-token claims (180 days)
    pub fn user_refresh(user_id: Uuid) -> Self {
        Self::new(
            user_id,
            TokenAudience::User,
            TokenType::Refresh,
            None,
            TokenType::Refresh.default_expiration(),
        )
    }

    /// Creates project access-token claims (1 hour, project id only)
    pub fn project_access(project_id: Uuid) -> Self {
        Self::new(
            project_id,
            TokenAudience::Project,
            TokenType::Access,
            None,
            TokenType::Access.default_expiration(),
        )
    }

    /// Creates project refresh-token claims (180 days)
    pub fn project_refresh(project_id: Uuid) -> Self {
        Self::new(
            project_id,
            TokenAudience::Project,
            TokenType::Refresh,
            None,
            TokenType::Refresh.default_expiration(),
        )
    }

    /// Creates claims with a custom expiration (used by tests)
    pub fn with_expiration(
        subject: Uuid,
        aud: TokenAudience,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        Self::new(subject, aud, token_type, None, expires_in)
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret. The secret should be
/// at least 32 bytes, randomly generated, and rotated periodically.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token against an expected audience and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired and is not used before its nbf time
/// - Issuer is "meterdesk"
/// - The `aud` claim matches the expected realm
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens, `JwtError::InvalidAudience`
/// for cross-realm tokens, and `JwtError::ValidationError` otherwise.
pub fn validate_token(
    token: &str,
    secret: &str,
    audience: TokenAudience,
) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[audience.as_str()]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks it is an access token for the given realm
pub fn validate_access_token(
    token: &str,
    secret: &str,
    audience: TokenAudience,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret, audience)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::ValidationError(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

/// Validates a token and checks it is a refresh token for the given realm
pub fn validate_refresh_token(
    token: &str,
    secret: &str,
    audience: TokenAudience,
) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret, audience)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::ValidationError(
            "Expected refresh token, got access token".to_string(),
        ));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::hours(1));
        assert_eq!(TokenType::Refresh.default_expiration(), Duration::days(180));
    }

    #[test]
    fn test_user_access_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::user_access(user_id, UserRole::Admin);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "meterdesk");
        assert_eq!(claims.aud, TokenAudience::User);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.role, Some(UserRole::Admin));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_project_claims_carry_no_role() {
        let project_id = Uuid::new_v4();
        let claims = Claims::project_access(project_id);

        assert_eq!(claims.sub, project_id);
        assert_eq!(claims.aud, TokenAudience::Project);
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::user_access(user_id, UserRole::User);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated =
            validate_token(&token, SECRET, TokenAudience::User).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.role, Some(UserRole::User));
        assert_eq!(validated.iss, "meterdesk");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::user_access(Uuid::new_v4(), UserRole::User);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "wrong-secret-that-is-also-32-bytes!!", TokenAudience::User);
        assert!(result.is_err());
    }

    #[test]
    fn test_cross_audience_token_rejected() {
        // A user refresh token must not validate in the project realm
        let claims = Claims::user_refresh(Uuid::new_v4());
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_refresh_token(&token, SECRET, TokenAudience::Project);
        assert!(matches!(result, Err(JwtError::InvalidAudience)));

        // And the reverse
        let claims = Claims::project_refresh(Uuid::new_v4());
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_refresh_token(&token, SECRET, TokenAudience::User);
        assert!(matches!(result, Err(JwtError::InvalidAudience)));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            TokenAudience::User,
            TokenType::Access,
            Duration::seconds(-3600),
        );

        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET, TokenAudience::User);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_access_refresh_type_mismatch() {
        let refresh_claims = Claims::user_refresh(Uuid::new_v4());
        let refresh_token = create_token(&refresh_claims, SECRET).unwrap();
        assert!(validate_access_token(&refresh_token, SECRET, TokenAudience::User).is_err());

        let access_claims = Claims::user_access(Uuid::new_v4(), UserRole::User);
        let access_token = create_token(&access_claims, SECRET).unwrap();
        assert!(validate_refresh_token(&access_token, SECRET, TokenAudience::User).is_err());
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let refresh_claims = Claims::user_refresh(user_id);
        let refresh_token = create_token(&refresh_claims, SECRET).unwrap();

        let validated =
            validate_refresh_token(&refresh_token, SECRET, TokenAudience::User).unwrap();
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.token_type, TokenType::Refresh);
    }
}
