/// Session token utilities
///
/// Session tokens are opaque random strings handed to the browser in an
/// HttpOnly cookie. Only the SHA-256 digest of a token is stored in the
/// sessions table, so a leaked database dump does not yield usable
/// cookies.
///
/// # Token Format
///
/// 32 random bytes, hex-encoded: 64 lowercase hex characters.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::session::{generate_session_token, hash_session_token};
///
/// let (token, digest) = generate_session_token();
/// assert_eq!(token.len(), 64);
/// assert_eq!(hash_session_token(&token), digest);
/// ```
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a session token
const TOKEN_BYTES: usize = 32;

/// Generates a new session token
///
/// Returns the plaintext token (for the cookie) and its SHA-256 hex
/// digest (for the database).
pub fn generate_session_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = hex::encode(bytes);
    let digest = hash_session_token(&token);

    (token, digest)
}

/// Hashes a session token for storage or lookup
///
/// Deterministic: the same token always yields the same digest.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let (token, digest) = generate_session_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert_eq!(digest.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_session_token();
        let (b, _) = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let (token, digest) = generate_session_token();
        assert_eq!(hash_session_token(&token), digest);
        assert_ne!(hash_session_token("other"), digest);
    }
}
