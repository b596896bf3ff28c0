//! Wallet-signature authentication.
//!
//! Login is a two-step nonce flow: the client requests a single-use nonce
//! for its wallet, signs the canonical login message with the wallet's
//! ed25519 key, and exchanges the signature for a bearer token.
//!
//! - [`Nonces`] — single-use, TTL-bounded login nonces
//! - [`Tokens`] — session token minting and verification
//! - [`Claims`] — bearer token contents
//! - [`User`] — durable account keyed by wallet address
//! - [`handlers`] — actix-web route handlers for the REST surface

mod claims;
mod identity;
mod member;
mod nonce;
mod tokens;

pub mod handlers;

pub use claims::*;
pub use identity::*;
pub use member::*;
pub use nonce::*;
pub use tokens::*;
