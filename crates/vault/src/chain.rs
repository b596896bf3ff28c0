use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signature::Signature;

/// A confirmed lamport movement observed on chain.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub lamports: u64,
    pub succeeded: bool,
}

/// The seam between the payout engine and the RPC node.
///
/// Kept deliberately narrow: balances, signed system transfers, confirmed
/// transaction lookups, and the rent floor. Everything else the engine
/// needs is policy, not chain state.
#[allow(async_fn_in_trait)]
pub trait Chain {
    async fn balance(&self, address: &Pubkey) -> anyhow::Result<u64>;
    async fn transfer(
        &self,
        from: &Keypair,
        to: &Pubkey,
        lamports: u64,
    ) -> anyhow::Result<Signature>;
    /// Look up a confirmed transaction. `None` when the signature is
    /// unknown to the cluster.
    async fn lookup(&self, signature: &Signature) -> anyhow::Result<Option<Transfer>>;
    async fn rent_exempt_minimum(&self) -> anyhow::Result<u64>;
}
