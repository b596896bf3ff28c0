use super::member::User;
use gf_core::ID;

/// Contents of a session bearer token: which account, which wallet
/// proved ownership, minted when, dies when. Construction and expiry
/// both live in [`Tokens`](super::Tokens); this is just the payload.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub wlt: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user(&self) -> ID<User> {
        ID::from(self.sub)
    }
    pub fn wallet(&self) -> &str {
        &self.wlt
    }
}
