use super::claims::Claims;
use super::member::User;
use gf_core::ID;
use std::time::Duration;

const DEFAULT_SESSION_HOURS: u64 = 24;

/// Why a presented bearer token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expired => write!(f, "session expired, sign in again"),
            Self::Invalid => write!(f, "invalid session token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Session token minting and verification.
///
/// A token is an HMAC JWT binding an account id to the wallet that signed
/// the login message. Sessions must outlive a long table session, so the
/// TTL defaults to a full day and is tunable per deployment via
/// `SESSION_TTL_HOURS`. Expiry is enforced here, at verification; callers
/// never see stale claims.
pub struct Tokens {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    ttl: Duration,
}

impl Tokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        let hours = std::env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(DEFAULT_SESSION_HOURS);
        Self::new(secret.as_bytes(), Duration::from_secs(hours * 60 * 60))
    }

    /// Mint a session token for a wallet that just passed signature login.
    pub fn grant(&self, user: ID<User>, wallet: &str) -> Result<String, TokenError> {
        let now = unix_now();
        let claims = Claims {
            sub: user.inner(),
            wlt: wallet.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify a presented bearer token and surface its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &jsonwebtoken::Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Short stable fingerprint so logs can correlate a session without
    /// ever holding the token itself.
    pub fn fingerprint(token: &str) -> String {
        use sha2::Digest;
        sha2::Sha256::digest(token.as_bytes())
            .iter()
            .take(4)
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Tokens {
        Tokens::new(b"test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn grant_and_verify_round_trip() {
        let tokens = tokens();
        let user = ID::<User>::fresh();
        let token = tokens
            .grant(user, "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin")
            .expect("grant");
        let claims = tokens.verify(&token).expect("verify");
        assert_eq!(claims.user(), user);
        assert_eq!(
            claims.wallet(),
            "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"
        );
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn foreign_secret_rejected_as_invalid() {
        let ours = tokens();
        let theirs = Tokens::new(b"other-secret", Duration::from_secs(3600));
        let token = theirs.grant(ID::fresh(), "wallet").expect("grant");
        assert!(matches!(ours.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn stale_token_rejected_as_expired() {
        let tokens = tokens();
        // hand-craft claims that died an hour ago, beyond any leeway
        let now = unix_now();
        let stale = Claims {
            sub: uuid::Uuid::now_v7(),
            wlt: "wallet".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &stale,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode");
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = Tokens::fingerprint("some.jwt.token");
        let b = Tokens::fingerprint("some.jwt.token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert_ne!(a, Tokens::fingerprint("other.jwt.token"));
    }
}
