//! The room runtime's wiring into durable storage and settlement.

use crate::Engine;
use crate::store::RoomStore;
use gf_core::Chips;
use gf_core::DEFAULT_TOKEN;
use gf_core::RoomId;
use gf_engine::HandResult;
use gf_ledger::BalanceLedger;
use gf_room::CashOutTicket;
use gf_room::PersistedSeat;
use gf_room::RoomHooks;
use gf_room::RoomPlayer;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use tokio_postgres::Client;

pub struct ServerHooks {
    db: Arc<Client>,
    engine: Arc<Engine>,
}

impl ServerHooks {
    pub fn new(db: Arc<Client>, engine: Arc<Engine>) -> Self {
        Self { db, engine }
    }
}

#[async_trait::async_trait]
impl RoomHooks for ServerHooks {
    /// Vault players settle on chain; everyone else credits the ledger.
    /// Failures surface as a ticket with no txid; gameplay never blocks.
    async fn cash_out(&self, room: &RoomId, player: &RoomPlayer, chips: Chips) -> CashOutTicket {
        if player.vault_settled {
            let destination = player.wallet.as_deref().and_then(|w| Pubkey::from_str(w).ok());
            let (Some(user), Some(destination)) = (player.user, destination) else {
                log::error!(
                    "[room {}] vault player {} missing wallet or user, cash-out stranded",
                    room,
                    player.id
                );
                return CashOutTicket {
                    amount: chips,
                    txid: None,
                };
            };
            match self.engine.cash_out(room, user, destination, chips).await {
                Ok(result) => CashOutTicket {
                    amount: result.paid,
                    txid: result.txid,
                },
                Err(e) => {
                    log::error!("[room {}] cash-out for {} failed: {}", room, player.id, e);
                    CashOutTicket {
                        amount: chips,
                        txid: None,
                    }
                }
            }
        } else {
            match player.user {
                Some(user) => {
                    if let Err(e) = self.db.credit(user, DEFAULT_TOKEN, chips).await {
                        log::error!("[room {}] ledger credit for {} failed: {}", room, player.id, e);
                    }
                }
                None => log::warn!(
                    "[room {}] {} left with {} chips and no account to credit",
                    room,
                    player.id,
                    chips
                ),
            }
            CashOutTicket {
                amount: chips,
                txid: None,
            }
        }
    }

    async fn collect_rake(&self, room: &RoomId, amount: Chips) {
        if self.engine.vault_address(room).is_none() {
            log::debug!("[room {}] rake {} accrues off-chain", room, amount);
            return;
        }
        if let Err(e) = self.engine.rake_transfer(room, amount).await {
            log::error!("[room {}] rake transfer failed: {}", room, e);
        }
    }

    async fn persist_seats(&self, room: &RoomId, seats: Vec<PersistedSeat>) {
        if let Err(e) = self.db.save_seats(room, &seats).await {
            log::error!("[room {}] seat persistence failed: {}", room, e);
        }
    }

    async fn restore_seats(&self, room: &RoomId) -> Vec<PersistedSeat> {
        match self.db.load_seats(room).await {
            Ok(seats) => seats,
            Err(e) => {
                log::error!("[room {}] seat restore failed: {}", room, e);
                Vec::new()
            }
        }
    }

    async fn record_result(&self, room: &RoomId, result: &HandResult) {
        if let Err(e) = self.db.save_hand(room, result).await {
            log::error!("[room {}] hand record failed: {}", room, e);
        }
    }
}
