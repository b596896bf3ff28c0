use gf_core::RoomId;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::signer::keypair::read_keypair_file;

/// A room's escrow keypair. The public key is the deposit destination;
/// the private half signs every outbound transfer for that room.
pub struct Vault {
    room: RoomId,
    keypair: Keypair,
}

impl Vault {
    pub fn new(room: RoomId, keypair: Keypair) -> Self {
        Self { room, keypair }
    }

    /// Load the room's key from secure configuration.
    ///
    /// Looks for `$VAULT_KEYS_DIR/<room>.json` first; falls back to the
    /// shared `$VAULT_KEY_FILE`, acceptable in development only, so the
    /// fallback is logged loudly.
    pub fn load(room: &str) -> anyhow::Result<Self> {
        if let Ok(dir) = std::env::var("VAULT_KEYS_DIR") {
            let path = format!("{}/{}.json", dir, room);
            if std::path::Path::new(&path).exists() {
                let keypair = read_keypair_file(&path)
                    .map_err(|e| anyhow::anyhow!("read {}: {}", path, e))?;
                return Ok(Self::new(room.to_string(), keypair));
            }
        }
        let path = std::env::var("VAULT_KEY_FILE")
            .map_err(|_| anyhow::anyhow!("no vault key configured for room {}", room))?;
        let keypair =
            read_keypair_file(&path).map_err(|e| anyhow::anyhow!("read {}: {}", path, e))?;
        log::warn!(
            "room {} using shared fallback vault key, development only",
            room
        );
        Ok(Self::new(room.to_string(), keypair))
    }

    pub fn room(&self) -> &str {
        &self.room
    }
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}
