use super::chain::Chain;
use super::chain::Transfer;
use super::keys::Vault;
use super::payout::Payout;
use super::payout::PayoutKind;
use super::payout::PayoutStatus;
use super::payout::PayoutStore;
use gf_auth::User;
use gf_core::Chips;
use gf_core::ID;
use gf_core::RoomId;
use gf_core::Unique;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

const SEND_ATTEMPTS: u32 = 3;
const SEND_BACKOFF: Duration = Duration::from_millis(250);

/// How much a vault must retain: the chain's rent-exempt minimum plus a
/// fee buffer for future signatures. A policy argument, not a constant.
#[derive(Debug, Clone, Copy)]
pub struct ReservePolicy {
    pub fee_buffer: Chips,
}

impl ReservePolicy {
    pub fn reserve(&self, rent_exempt: Chips) -> Chips {
        rent_exempt + self.fee_buffer
    }
}

impl Default for ReservePolicy {
    fn default() -> Self {
        Self { fee_buffer: 10_000 }
    }
}

/// Outcome of a cash-out request.
#[derive(Debug, Clone)]
pub struct CashOut {
    pub requested: Chips,
    pub paid: Chips,
    pub txid: Option<String>,
    pub capped: bool,
}

/// One room's entry in an admin sweep.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub room: RoomId,
    pub balance: Chips,
    pub swept: Chips,
    pub txid: Option<String>,
}

/// Serialized, idempotent outbound transfers from room vaults.
///
/// A per-room mutex is held for the full record-sign-broadcast-update
/// cycle, so concurrent cash-outs against one vault queue in arrival
/// order. Records are written PENDING before signing; the table is the
/// source of truth for exposure.
pub struct PayoutEngine<C, S> {
    chain: C,
    store: S,
    policy: ReservePolicy,
    treasury: Pubkey,
    vaults: HashMap<RoomId, Vault>,
    locks: HashMap<RoomId, Mutex<()>>,
}

impl<C: Chain, S: PayoutStore> PayoutEngine<C, S> {
    pub fn new(chain: C, store: S, treasury: Pubkey, policy: ReservePolicy) -> Self {
        Self {
            chain,
            store,
            policy,
            treasury,
            vaults: HashMap::new(),
            locks: HashMap::new(),
        }
    }

    pub fn add_vault(&mut self, vault: Vault) {
        self.locks.insert(vault.room().to_string(), Mutex::new(()));
        self.vaults.insert(vault.room().to_string(), vault);
    }

    pub fn vault_address(&self, room: &str) -> Option<Pubkey> {
        self.vaults.get(room).map(Vault::address)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Verify a claimed buy-in transfer on chain: confirmed, error-free,
    /// from the declared wallet, into this room's vault, for at least the
    /// declared amount.
    pub async fn verify_buy_in(
        &self,
        room: &str,
        wallet: &str,
        txid: &str,
        min_amount: Chips,
    ) -> anyhow::Result<Transfer> {
        let vault = self
            .vaults
            .get(room)
            .ok_or_else(|| anyhow::anyhow!("room {} has no vault", room))?;
        let signature =
            Signature::from_str(txid).map_err(|_| anyhow::anyhow!("malformed transaction id"))?;
        let transfer = self
            .chain
            .lookup(&signature)
            .await?
            .ok_or_else(|| anyhow::anyhow!("transaction not found on chain"))?;
        if !transfer.succeeded {
            anyhow::bail!("transaction failed on chain");
        }
        if transfer.source.to_string() != wallet {
            anyhow::bail!("transaction source does not match wallet");
        }
        if transfer.destination != vault.address() {
            anyhow::bail!("transaction destination is not the room vault");
        }
        if transfer.lamports < min_amount {
            anyhow::bail!(
                "transferred {} below declared buy-in {}",
                transfer.lamports,
                min_amount
            );
        }
        Ok(transfer)
    }

    /// Verify a deposit straight to the treasury (the non-vault path):
    /// confirmed, error-free, from the declared wallet, into the treasury.
    /// Returns the observed transfer so the caller can credit its amount.
    pub async fn verify_treasury_transfer(
        &self,
        wallet: &str,
        txid: &str,
    ) -> anyhow::Result<Transfer> {
        let signature =
            Signature::from_str(txid).map_err(|_| anyhow::anyhow!("malformed transaction id"))?;
        let transfer = self
            .chain
            .lookup(&signature)
            .await?
            .ok_or_else(|| anyhow::anyhow!("transaction not found on chain"))?;
        if !transfer.succeeded {
            anyhow::bail!("transaction failed on chain");
        }
        if transfer.source.to_string() != wallet {
            anyhow::bail!("transaction source does not match wallet");
        }
        if transfer.destination != self.treasury {
            anyhow::bail!("transaction destination is not the treasury");
        }
        Ok(transfer)
    }

    /// Pay a player's remaining chips back to their wallet.
    ///
    /// Idempotent per (room, user): an open cash-out short-circuits with
    /// its own txid rather than double-paying. Amounts above the payable
    /// balance are capped to `balance - reserve`.
    pub async fn cash_out(
        &self,
        room: &str,
        user: ID<User>,
        destination: Pubkey,
        amount: Chips,
    ) -> anyhow::Result<CashOut> {
        let vault = self
            .vaults
            .get(room)
            .ok_or_else(|| anyhow::anyhow!("room {} has no vault", room))?;
        let _guard = self.locks.get(room).expect("lock per vault").lock().await;
        if let Some(open) = self.store.find_open_cash_out(room, user).await? {
            log::info!(
                "[vault {}] cash-out for {} already open as {}, reusing",
                room,
                user,
                open.id()
            );
            return Ok(CashOut {
                requested: amount,
                paid: open.amount,
                txid: open.txid,
                capped: false,
            });
        }
        let (paid, capped) = self.payable(vault, amount).await?;
        let payout = Payout::new(room, Some(user), PayoutKind::CashOut, paid);
        if paid == 0 {
            self.store.create_payout(&payout).await?;
            self.store
                .update_payout(payout.id(), PayoutStatus::Failed, None)
                .await?;
            log::error!("[vault {}] cash-out for {} unpayable, marked failed", room, user);
            return Ok(CashOut {
                requested: amount,
                paid: 0,
                txid: None,
                capped,
            });
        }
        let txid = self.dispatch(vault, payout, destination).await?;
        Ok(CashOut {
            requested: amount,
            paid,
            txid,
            capped,
        })
    }

    /// Move collected rake to the treasury. Amounts below the rent-exempt
    /// minimum stay in the vault for the sweep path.
    pub async fn rake_transfer(&self, room: &str, amount: Chips) -> anyhow::Result<Option<String>> {
        let vault = self
            .vaults
            .get(room)
            .ok_or_else(|| anyhow::anyhow!("room {} has no vault", room))?;
        let _guard = self.locks.get(room).expect("lock per vault").lock().await;
        let rent = self.chain.rent_exempt_minimum().await?;
        if amount < rent {
            log::debug!(
                "[vault {}] rake {} below rent floor {}, accumulating",
                room,
                amount,
                rent
            );
            return Ok(None);
        }
        let (paid, _) = self.payable(vault, amount).await?;
        if paid == 0 {
            return Ok(None);
        }
        let payout = Payout::new(room, None, PayoutKind::Rake, paid);
        self.dispatch(vault, payout, self.treasury).await
    }

    /// Return a verified deposit to its wallet (join failed after funding).
    pub async fn refund(
        &self,
        room: &str,
        user: ID<User>,
        destination: Pubkey,
        amount: Chips,
    ) -> anyhow::Result<Option<String>> {
        let vault = self
            .vaults
            .get(room)
            .ok_or_else(|| anyhow::anyhow!("room {} has no vault", room))?;
        let _guard = self.locks.get(room).expect("lock per vault").lock().await;
        let (paid, _) = self.payable(vault, amount).await?;
        if paid == 0 {
            anyhow::bail!("vault cannot cover refund of {}", amount);
        }
        let payout = Payout::new(room, Some(user), PayoutKind::Refund, paid);
        self.dispatch(vault, payout, destination).await
    }

    /// Sweep every vault's balance less the reserve to the treasury.
    pub async fn sweep(&self) -> anyhow::Result<Vec<SweepEntry>> {
        let mut entries = Vec::new();
        for (room, vault) in &self.vaults {
            let _guard = self.locks.get(room).expect("lock per vault").lock().await;
            let balance = self.chain.balance(&vault.address()).await?;
            let rent = self.chain.rent_exempt_minimum().await?;
            let swept = balance.saturating_sub(self.policy.reserve(rent));
            let txid = match swept {
                0 => None,
                _ => {
                    let payout = Payout::new(room, None, PayoutKind::Rake, swept);
                    self.dispatch(vault, payout, self.treasury).await?
                }
            };
            entries.push(SweepEntry {
                room: room.clone(),
                balance,
                swept,
                txid,
            });
        }
        Ok(entries)
    }

    /// Boot-time scan: open payouts need operator attention. Automatic
    /// resumption belongs to a background job, not the serving path.
    pub async fn recover(&self) -> anyhow::Result<()> {
        for payout in self.store.find_open_payouts().await? {
            log::warn!(
                "open payout {} in room {}: {} {} ({})",
                payout.id(),
                payout.room,
                payout.kind.as_str(),
                payout.amount,
                payout.status.as_str(),
            );
        }
        Ok(())
    }

    /// Cap an amount at what the vault can pay without breaking reserve.
    async fn payable(&self, vault: &Vault, amount: Chips) -> anyhow::Result<(Chips, bool)> {
        let balance = self.chain.balance(&vault.address()).await?;
        let rent = self.chain.rent_exempt_minimum().await?;
        let payable = balance.saturating_sub(self.policy.reserve(rent));
        if amount > payable {
            log::warn!(
                "[vault {}] capping transfer {} to payable {}",
                vault.room(),
                amount,
                payable
            );
            return Ok((payable, true));
        }
        Ok((amount, false))
    }

    /// Record, sign, broadcast, and settle one payout under the caller's
    /// room lock. A store failure before signing aborts; a chain failure
    /// after retries marks the record FAILED and reports no txid.
    async fn dispatch(
        &self,
        vault: &Vault,
        payout: Payout,
        destination: Pubkey,
    ) -> anyhow::Result<Option<String>> {
        self.store.create_payout(&payout).await?;
        self.store
            .update_payout(payout.id(), PayoutStatus::Sent, None)
            .await?;
        match self.send_with_retry(vault, destination, payout.amount).await {
            Ok(signature) => {
                let txid = signature.to_string();
                self.store
                    .update_payout(payout.id(), PayoutStatus::Confirmed, Some(&txid))
                    .await?;
                log::info!(
                    "[vault {}] {} {} confirmed as {}",
                    vault.room(),
                    payout.kind.as_str(),
                    payout.amount,
                    txid
                );
                Ok(Some(txid))
            }
            Err(e) => {
                self.store
                    .update_payout(payout.id(), PayoutStatus::Failed, None)
                    .await?;
                log::error!(
                    "[vault {}] {} {} failed after retries: {}",
                    vault.room(),
                    payout.kind.as_str(),
                    payout.amount,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn send_with_retry(
        &self,
        vault: &Vault,
        destination: Pubkey,
        amount: Chips,
    ) -> anyhow::Result<Signature> {
        let mut delay = SEND_BACKOFF;
        for attempt in 1..=SEND_ATTEMPTS {
            match self.chain.transfer(vault.keypair(), &destination, amount).await {
                Ok(signature) => return Ok(signature),
                Err(e) if attempt < SEND_ATTEMPTS => {
                    log::warn!(
                        "[vault {}] transfer attempt {} failed: {}, retrying",
                        vault.room(),
                        attempt,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
        unreachable!("loop returns on final attempt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use crate::payout::MemoryPayouts;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    const RENT: u64 = 890_880;

    fn engine(room: &str) -> (PayoutEngine<MockChain, MemoryPayouts>, Pubkey) {
        let chain = MockChain::with_rent_exempt(RENT);
        let treasury = Keypair::new().pubkey();
        let mut engine =
            PayoutEngine::new(chain, MemoryPayouts::default(), treasury, ReservePolicy::default());
        let vault = Vault::new(room.to_string(), Keypair::new());
        let address = vault.address();
        engine.add_vault(vault);
        (engine, address)
    }

    #[tokio::test]
    async fn cash_out_confirms_and_debits_the_vault() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 2_000_000);
        let user = ID::default();
        let wallet = Keypair::new().pubkey();
        let result = engine
            .cash_out("table-low-1", user, wallet, 750_000)
            .await
            .expect("cash out");
        assert_eq!(result.paid, 750_000);
        assert!(!result.capped);
        assert!(result.txid.is_some());
        assert_eq!(engine.chain.balance(&vault).await.unwrap(), 1_250_000);
        assert_eq!(engine.chain.balance(&wallet).await.unwrap(), 750_000);
        let records = engine.store.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, PayoutStatus::Confirmed);
        assert_eq!(records[0].amount, 750_000);
    }

    #[tokio::test]
    async fn cash_out_caps_at_reserve() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 1_000_000);
        let user = ID::default();
        let wallet = Keypair::new().pubkey();
        let result = engine
            .cash_out("table-low-1", user, wallet, 5_000_000)
            .await
            .expect("cash out");
        let payable = 1_000_000 - RENT - ReservePolicy::default().fee_buffer;
        assert!(result.capped);
        assert_eq!(result.paid, payable);
        // the record carries the capped amount, not the request
        assert_eq!(engine.store.all()[0].amount, payable);
        // the vault keeps exactly the reserve
        assert_eq!(
            engine.chain.balance(&vault).await.unwrap(),
            RENT + ReservePolicy::default().fee_buffer
        );
    }

    #[tokio::test]
    async fn concurrent_cash_out_is_idempotent() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 2_000_000);
        let user = ID::default();
        let wallet = Keypair::new().pubkey();
        // an open record exists: the second request reuses it
        let open = Payout::new("table-low-1", Some(user), PayoutKind::CashOut, 300_000);
        engine.store.create_payout(&open).await.expect("seed");
        let result = engine
            .cash_out("table-low-1", user, wallet, 300_000)
            .await
            .expect("cash out");
        assert_eq!(result.paid, 300_000);
        assert!(result.txid.is_none());
        assert_eq!(engine.store.all().len(), 1);
        // nothing moved on chain
        assert_eq!(engine.chain.balance(&vault).await.unwrap(), 2_000_000);
    }

    #[tokio::test]
    async fn transient_failures_retry_through() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 2_000_000);
        engine.chain.fail_next(2);
        let result = engine
            .cash_out("table-low-1", ID::default(), Keypair::new().pubkey(), 100_000)
            .await
            .expect("cash out");
        assert!(result.txid.is_some());
        assert_eq!(engine.store.all()[0].status, PayoutStatus::Confirmed);
    }

    #[tokio::test]
    async fn exhausted_retries_mark_failed() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 2_000_000);
        engine.chain.fail_next(3);
        let result = engine
            .cash_out("table-low-1", ID::default(), Keypair::new().pubkey(), 100_000)
            .await
            .expect("cash out resolves");
        assert!(result.txid.is_none());
        let records = engine.store.all();
        assert_eq!(records[0].status, PayoutStatus::Failed);
        assert!(records[0].txid.is_none());
    }

    #[tokio::test]
    async fn rake_below_rent_floor_accumulates() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 2_000_000);
        let txid = engine
            .rake_transfer("table-low-1", RENT - 1)
            .await
            .expect("rake");
        assert!(txid.is_none());
        assert!(engine.store.all().is_empty());
        assert_eq!(engine.chain.balance(&vault).await.unwrap(), 2_000_000);
    }

    #[tokio::test]
    async fn rake_above_floor_moves_to_treasury() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 5_000_000);
        let txid = engine
            .rake_transfer("table-low-1", 1_000_000)
            .await
            .expect("rake");
        assert!(txid.is_some());
        assert_eq!(
            engine.chain.balance(&engine.treasury).await.unwrap(),
            1_000_000
        );
    }

    #[tokio::test]
    async fn sweep_drains_to_reserve() {
        let (engine, vault) = engine("table-low-1");
        engine.chain.fund(vault, 3_000_000);
        let entries = engine.sweep().await.expect("sweep");
        assert_eq!(entries.len(), 1);
        let reserve = RENT + ReservePolicy::default().fee_buffer;
        assert_eq!(entries[0].swept, 3_000_000 - reserve);
        assert!(entries[0].txid.is_some());
        assert_eq!(engine.chain.balance(&vault).await.unwrap(), reserve);
    }

    #[tokio::test]
    async fn verify_buy_in_accepts_exact_transfer() {
        let (engine, vault) = engine("table-low-1");
        let wallet = Keypair::new().pubkey();
        let signature = engine.chain.seed_transfer(Transfer {
            source: wallet,
            destination: vault,
            lamports: 1_000_000,
            succeeded: true,
        });
        let transfer = engine
            .verify_buy_in(
                "table-low-1",
                &wallet.to_string(),
                &signature.to_string(),
                1_000_000,
            )
            .await
            .expect("verify");
        assert_eq!(transfer.lamports, 1_000_000);
    }

    #[tokio::test]
    async fn verify_buy_in_rejects_wrong_destination() {
        let (engine, _) = engine("table-low-1");
        let wallet = Keypair::new().pubkey();
        let elsewhere = Keypair::new().pubkey();
        let signature = engine.chain.seed_transfer(Transfer {
            source: wallet,
            destination: elsewhere,
            lamports: 1_000_000,
            succeeded: true,
        });
        assert!(engine
            .verify_buy_in(
                "table-low-1",
                &wallet.to_string(),
                &signature.to_string(),
                1_000_000,
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn verify_buy_in_rejects_short_amount_and_wrong_source() {
        let (engine, vault) = engine("table-low-1");
        let wallet = Keypair::new().pubkey();
        let short = engine.chain.seed_transfer(Transfer {
            source: wallet,
            destination: vault,
            lamports: 999_999,
            succeeded: true,
        });
        assert!(engine
            .verify_buy_in("table-low-1", &wallet.to_string(), &short.to_string(), 1_000_000)
            .await
            .is_err());
        let imposter = Keypair::new().pubkey();
        let wrong = engine.chain.seed_transfer(Transfer {
            source: imposter,
            destination: vault,
            lamports: 1_000_000,
            succeeded: true,
        });
        assert!(engine
            .verify_buy_in("table-low-1", &wallet.to_string(), &wrong.to_string(), 1_000_000)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn verify_buy_in_rejects_failed_and_unknown_transactions() {
        let (engine, vault) = engine("table-low-1");
        let wallet = Keypair::new().pubkey();
        let failed = engine.chain.seed_transfer(Transfer {
            source: wallet,
            destination: vault,
            lamports: 1_000_000,
            succeeded: false,
        });
        assert!(engine
            .verify_buy_in("table-low-1", &wallet.to_string(), &failed.to_string(), 1_000_000)
            .await
            .is_err());
        let unknown = Signature::new_unique();
        assert!(engine
            .verify_buy_in("table-low-1", &wallet.to_string(), &unknown.to_string(), 1_000_000)
            .await
            .is_err());
    }
}
