use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::str::FromStr;

/// Verify an ed25519 wallet signature over the login message.
///
/// `wallet` and `signature` arrive base58-encoded from the client. Any
/// malformed input verifies false rather than erroring, since the caller only
/// cares whether this wallet signed this exact message.
pub fn verify_signature(wallet: &str, signature: &str, message: &str) -> bool {
    let Ok(pubkey) = Pubkey::from_str(wallet) else {
        return false;
    };
    let Ok(signature) = Signature::from_str(signature) else {
        return false;
    };
    signature.verify(pubkey.as_ref(), message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    #[test]
    fn valid_signature_verifies() {
        let keypair = Keypair::new();
        let message = crate::login_message("abc123");
        let signature = keypair.sign_message(message.as_bytes());
        assert!(verify_signature(
            &keypair.pubkey().to_string(),
            &signature.to_string(),
            &message,
        ));
    }

    #[test]
    fn wrong_message_fails() {
        let keypair = Keypair::new();
        let signature = keypair.sign_message(b"something else entirely");
        assert!(!verify_signature(
            &keypair.pubkey().to_string(),
            &signature.to_string(),
            &crate::login_message("abc123"),
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let signer = Keypair::new();
        let imposter = Keypair::new();
        let message = crate::login_message("abc123");
        let signature = signer.sign_message(message.as_bytes());
        assert!(!verify_signature(
            &imposter.pubkey().to_string(),
            &signature.to_string(),
            &message,
        ));
    }

    #[test]
    fn malformed_inputs_fail_closed() {
        assert!(!verify_signature("not-a-key", "not-a-sig", "message"));
    }
}
