use super::chain::Chain;
use super::chain::Transfer;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

/// In-memory [`Chain`] for tests: instant transfers, scripted failures.
#[derive(Default)]
pub struct MockChain {
    balances: Mutex<HashMap<Pubkey, u64>>,
    transfers: Mutex<HashMap<Signature, Transfer>>,
    rent_exempt: u64,
    failures: AtomicU32,
}

impl MockChain {
    pub fn with_rent_exempt(rent_exempt: u64) -> Self {
        Self {
            rent_exempt,
            ..Self::default()
        }
    }
    pub fn fund(&self, address: Pubkey, lamports: u64) {
        *self
            .balances
            .lock()
            .expect("balances lock")
            .entry(address)
            .or_default() += lamports;
    }
    /// Make the next `n` transfer attempts fail with a transient error.
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }
    /// Record a confirmed inbound transfer as if observed on chain.
    pub fn seed_transfer(&self, transfer: Transfer) -> Signature {
        let signature = Signature::new_unique();
        self.transfers
            .lock()
            .expect("transfers lock")
            .insert(signature, transfer);
        if transfer.succeeded {
            self.fund(transfer.destination, transfer.lamports);
        }
        signature
    }
}

impl Chain for MockChain {
    async fn balance(&self, address: &Pubkey) -> anyhow::Result<u64> {
        Ok(self
            .balances
            .lock()
            .expect("balances lock")
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn transfer(
        &self,
        from: &Keypair,
        to: &Pubkey,
        lamports: u64,
    ) -> anyhow::Result<Signature> {
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("transient rpc failure");
        }
        let source = from.pubkey();
        let mut balances = self.balances.lock().expect("balances lock");
        let available = balances.get(&source).copied().unwrap_or(0);
        if available < lamports {
            anyhow::bail!("insufficient lamports");
        }
        balances.insert(source, available - lamports);
        *balances.entry(*to).or_default() += lamports;
        drop(balances);
        Ok(self.seed_transfer_unfunded(Transfer {
            source,
            destination: *to,
            lamports,
            succeeded: true,
        }))
    }

    async fn lookup(&self, signature: &Signature) -> anyhow::Result<Option<Transfer>> {
        Ok(self
            .transfers
            .lock()
            .expect("transfers lock")
            .get(signature)
            .copied())
    }

    async fn rent_exempt_minimum(&self) -> anyhow::Result<u64> {
        Ok(self.rent_exempt)
    }
}

impl MockChain {
    /// Record without moving balances (the caller already did).
    fn seed_transfer_unfunded(&self, transfer: Transfer) -> Signature {
        let signature = Signature::new_unique();
        self.transfers
            .lock()
            .expect("transfers lock")
            .insert(signature, transfer);
        signature
    }
}
