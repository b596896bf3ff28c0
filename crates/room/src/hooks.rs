use super::seat::PersistedSeat;
use super::seat::RoomPlayer;
use gf_core::Chips;
use gf_core::RoomId;
use gf_engine::HandResult;

/// What a completed cash-out looked like. An absent txid means the
/// payout failed and the client should tell the user.
#[derive(Debug, Clone)]
pub struct CashOutTicket {
    pub amount: Chips,
    pub txid: Option<String>,
}

/// Persistence and settlement seams for the room runtime.
///
/// Rooms never talk to the database or the chain directly; the server
/// wires one implementation over gf-database and gf-vault. Implementations
/// own the error policy: seat persistence and hand recording are
/// best-effort (log and swallow), settlement failures surface in the
/// returned ticket.
#[async_trait::async_trait]
pub trait RoomHooks: Send + Sync {
    /// Settle a leaver's remaining chips: vault payout for vault-settled
    /// players, ledger credit otherwise.
    async fn cash_out(&self, room: &RoomId, player: &RoomPlayer, chips: Chips) -> CashOutTicket;
    /// Bank the rake taken from a pot.
    async fn collect_rake(&self, room: &RoomId, amount: Chips);
    /// Persist the room's seat map.
    async fn persist_seats(&self, room: &RoomId, seats: Vec<PersistedSeat>);
    /// Load the room's persisted seat map at boot.
    async fn restore_seats(&self, room: &RoomId) -> Vec<PersistedSeat>;
    /// Record a completed hand for the audit trail.
    async fn record_result(&self, room: &RoomId, result: &HandResult);
}

/// No-op hooks for tests and rooms with nothing durable behind them.
pub struct NullHooks;

#[async_trait::async_trait]
impl RoomHooks for NullHooks {
    async fn cash_out(&self, _: &RoomId, _: &RoomPlayer, chips: Chips) -> CashOutTicket {
        CashOutTicket {
            amount: chips,
            txid: None,
        }
    }
    async fn collect_rake(&self, _: &RoomId, _: Chips) {}
    async fn persist_seats(&self, _: &RoomId, _: Vec<PersistedSeat>) {}
    async fn restore_seats(&self, _: &RoomId) -> Vec<PersistedSeat> {
        Vec::new()
    }
    async fn record_result(&self, _: &RoomId, _: &HandResult) {}
}
