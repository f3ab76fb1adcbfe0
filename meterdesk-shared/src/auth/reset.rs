/// Password-reset token lifecycle
///
/// A reset token is 32 random bytes, hex-encoded and handed to the user in
/// an emailed link. Only the SHA-256 digest of the token is persisted, along
/// with an expiry 15 minutes out. Verification hashes the presented token and
/// looks the digest up with an `expires > now` guard, so an expired token is
/// indistinguishable from an unknown one.
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// How long a reset token stays valid
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// A freshly generated reset token
///
/// `token` goes to the user; `digest` and `expires_at` go to storage.
#[derive(Debug, Clone)]
pub struct ResetToken {
    /// Hex-encoded plaintext token (never persisted)
    pub token: String,

    /// Hex-encoded SHA-256 digest of the token
    pub digest: String,

    /// Expiry timestamp (now + 15 minutes)
    pub expires_at: DateTime<Utc>,
}

/// Generates a new password-reset token
///
/// # Example
///
/// ```
/// use meterdesk_shared::auth::reset::{generate_reset_token, digest_token};
///
/// let reset = generate_reset_token();
/// assert_eq!(reset.token.len(), 64); // 32 bytes, hex-encoded
/// assert_eq!(digest_token(&reset.token), reset.digest);
/// ```
pub fn generate_reset_token() -> ResetToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let digest = digest_token(&token);

    ResetToken {
        token,
        digest,
        expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    }
}

/// Computes the hex-encoded SHA-256 digest of a presented token
pub fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_random() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a.token, b.token);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_digest_matches_token() {
        let reset = generate_reset_token();
        assert_eq!(digest_token(&reset.token), reset.digest);
    }

    #[test]
    fn test_digest_differs_for_wrong_token() {
        let reset = generate_reset_token();
        assert_ne!(digest_token("some-other-token"), reset.digest);
    }

    #[test]
    fn test_expiry_window() {
        let reset = generate_reset_token();
        let delta = reset.expires_at - Utc::now();
        assert!(delta <= Duration::minutes(RESET_TOKEN_TTL_MINUTES));
        assert!(delta > Duration::minutes(RESET_TOKEN_TTL_MINUTES - 1));
    }
}
