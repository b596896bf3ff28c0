use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

const NONCE_TTL: Duration = Duration::from_secs(5 * 60);
const NONCE_LEN: usize = 24;

/// Single-use login nonces keyed by wallet address.
///
/// A nonce is consumed by the first verification attempt against it,
/// success or failure, so a captured signature can never be replayed.
/// Expired entries are dropped lazily on issue and consume.
#[derive(Default)]
pub struct Nonces {
    inner: Mutex<HashMap<String, (String, Instant)>>,
}

impl Nonces {
    /// Issue a fresh nonce for a wallet, superseding any outstanding one.
    pub fn issue(&self, wallet: &str) -> String {
        let nonce = rand::rng()
            .sample_iter(Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect::<String>();
        let mut inner = self.inner.lock().expect("nonce lock");
        inner.retain(|_, (_, born)| born.elapsed() < NONCE_TTL);
        inner.insert(wallet.to_string(), (nonce.clone(), Instant::now()));
        nonce
    }

    /// Take the wallet's outstanding nonce if it matches and is fresh.
    /// The entry is removed regardless of the outcome.
    pub fn consume(&self, wallet: &str, nonce: &str) -> bool {
        let mut inner = self.inner.lock().expect("nonce lock");
        match inner.remove(wallet) {
            Some((expected, born)) => expected == nonce && born.elapsed() < NONCE_TTL,
            None => false,
        }
    }
}

/// The canonical message a wallet signs to log in.
pub fn login_message(nonce: &str) -> String {
    format!("Sign this message to login to Golden Flop. Nonce: {}", nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_single_use() {
        let nonces = Nonces::default();
        let nonce = nonces.issue("wallet-a");
        assert!(nonces.consume("wallet-a", &nonce));
        assert!(!nonces.consume("wallet-a", &nonce));
    }

    #[test]
    fn wrong_nonce_burns_the_entry() {
        let nonces = Nonces::default();
        let nonce = nonces.issue("wallet-a");
        assert!(!nonces.consume("wallet-a", "forged"));
        // the real nonce is gone too
        assert!(!nonces.consume("wallet-a", &nonce));
    }

    #[test]
    fn reissue_supersedes() {
        let nonces = Nonces::default();
        let first = nonces.issue("wallet-a");
        let second = nonces.issue("wallet-a");
        assert!(!nonces.consume("wallet-a", &first));
        let third = nonces.issue("wallet-a");
        assert_ne!(second, third);
        assert!(nonces.consume("wallet-a", &third));
    }

    #[test]
    fn message_embeds_the_nonce() {
        assert_eq!(
            login_message("abc123"),
            "Sign this message to login to Golden Flop. Nonce: abc123"
        );
    }
}
