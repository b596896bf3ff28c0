use gf_auth::User;
use gf_core::Chips;
use gf_core::ID;
use gf_core::RoomId;
use gf_core::Unique;
use gf_database::PAYOUTS;
use gf_database::PgErr;
use gf_database::Schema;
use std::sync::Arc;
use tokio_postgres::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutKind {
    CashOut,
    Rake,
    Refund,
}

impl PayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOut => "CASH_OUT",
            Self::Rake => "RAKE",
            Self::Refund => "REFUND",
        }
    }
    pub fn parse(s: &str) -> Self {
        match s {
            "RAKE" => Self::Rake,
            "REFUND" => Self::Refund,
            _ => Self::CashOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutStatus {
    Pending,
    Sent,
    Confirmed,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
        }
    }
    pub fn parse(s: &str) -> Self {
        match s {
            "SENT" => Self::Sent,
            "CONFIRMED" => Self::Confirmed,
            "FAILED" => Self::Failed,
            _ => Self::Pending,
        }
    }
    /// Still in flight: the chips may or may not have moved yet.
    pub fn open(&self) -> bool {
        matches!(self, Self::Pending | Self::Sent)
    }
}

/// An outbound transfer from a room's vault.
///
/// The record is written PENDING before anything is signed and updated
/// after the broadcast resolves, so an operator can reconstruct the
/// house's exposure from this table alone.
#[derive(Debug, Clone)]
pub struct Payout {
    id: ID<Self>,
    pub room: RoomId,
    pub user: Option<ID<User>>,
    pub kind: PayoutKind,
    pub amount: Chips,
    pub txid: Option<String>,
    pub status: PayoutStatus,
}

impl Payout {
    pub fn new(room: &str, user: Option<ID<User>>, kind: PayoutKind, amount: Chips) -> Self {
        Self {
            id: ID::fresh(),
            room: room.to_string(),
            user,
            kind,
            amount,
            txid: None,
            status: PayoutStatus::Pending,
        }
    }
}

impl Unique for Payout {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Schema for Payout {
    fn name() -> &'static str {
        PAYOUTS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            PAYOUTS,
            " (
                id          UUID PRIMARY KEY,
                room        TEXT NOT NULL,
                user_id     UUID,
                kind        TEXT NOT NULL,
                amount      BIGINT NOT NULL,
                txid        TEXT,
                status      TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_payouts_room_user ON ",
            PAYOUTS,
            " (room, user_id);
             CREATE INDEX IF NOT EXISTS idx_payouts_open ON ",
            PAYOUTS,
            " (status) WHERE status IN ('PENDING', 'SENT');"
        )
    }
}

/// Durable payout records. The engine writes through this seam so tests
/// can swap in memory.
#[allow(async_fn_in_trait)]
pub trait PayoutStore {
    async fn create_payout(&self, payout: &Payout) -> anyhow::Result<()>;
    async fn update_payout(
        &self,
        id: ID<Payout>,
        status: PayoutStatus,
        txid: Option<&str>,
    ) -> anyhow::Result<()>;
    /// An open (PENDING or SENT) cash-out for this (room, user), if any.
    async fn find_open_cash_out(
        &self,
        room: &str,
        user: ID<User>,
    ) -> anyhow::Result<Option<Payout>>;
    /// Every open payout, for the boot-time recovery scan.
    async fn find_open_payouts(&self) -> anyhow::Result<Vec<Payout>>;
}

fn payout_from_row(row: &tokio_postgres::Row) -> Payout {
    let mut payout = Payout::new(
        &row.get::<_, String>(1),
        row.get::<_, Option<uuid::Uuid>>(2).map(ID::from),
        PayoutKind::parse(&row.get::<_, String>(3)),
        row.get::<_, i64>(4) as Chips,
    );
    payout.txid = row.get::<_, Option<String>>(5);
    payout.status = PayoutStatus::parse(&row.get::<_, String>(6));
    Payout {
        id: ID::from(row.get::<_, uuid::Uuid>(0)),
        ..payout
    }
}

impl PayoutStore for Arc<Client> {
    async fn create_payout(&self, payout: &Payout) -> anyhow::Result<()> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                PAYOUTS,
                " (id, room, user_id, kind, amount, txid, status)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ),
            &[
                &payout.id().inner(),
                &payout.room,
                &payout.user.map(|id| id.inner()),
                &payout.kind.as_str(),
                &(payout.amount as i64),
                &payout.txid,
                &payout.status.as_str(),
            ],
        )
        .await
        .map(|_| ())
        .map_err(anyhow::Error::from)
    }

    async fn update_payout(
        &self,
        id: ID<Payout>,
        status: PayoutStatus,
        txid: Option<&str>,
    ) -> anyhow::Result<()> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                PAYOUTS,
                " SET status = $2, txid = COALESCE($3, txid) WHERE id = $1"
            ),
            &[&id.inner(), &status.as_str(), &txid],
        )
        .await
        .map(|_| ())
        .map_err(anyhow::Error::from)
    }

    async fn find_open_cash_out(
        &self,
        room: &str,
        user: ID<User>,
    ) -> anyhow::Result<Option<Payout>> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, room, user_id, kind, amount, txid, status FROM ",
                PAYOUTS,
                " WHERE room = $1 AND user_id = $2 AND kind = 'CASH_OUT'
                   AND status IN ('PENDING', 'SENT')
                 ORDER BY created_at LIMIT 1"
            ),
            &[&room, &user.inner()],
        )
        .await
        .map(|opt| opt.map(|row| payout_from_row(&row)))
        .map_err(anyhow::Error::from)
    }

    async fn find_open_payouts(&self) -> anyhow::Result<Vec<Payout>> {
        self.query(
            const_format::concatcp!(
                "SELECT id, room, user_id, kind, amount, txid, status FROM ",
                PAYOUTS,
                " WHERE status IN ('PENDING', 'SENT') ORDER BY created_at"
            ),
            &[],
        )
        .await
        .map(|rows| rows.iter().map(payout_from_row).collect())
        .map_err(anyhow::Error::from)
    }
}

/// In-memory payout store for engine tests.
#[derive(Default)]
pub struct MemoryPayouts {
    inner: std::sync::Mutex<Vec<Payout>>,
}

impl MemoryPayouts {
    pub fn all(&self) -> Vec<Payout> {
        self.inner.lock().expect("payout lock").clone()
    }
}

impl PayoutStore for MemoryPayouts {
    async fn create_payout(&self, payout: &Payout) -> anyhow::Result<()> {
        self.inner.lock().expect("payout lock").push(payout.clone());
        Ok(())
    }
    async fn update_payout(
        &self,
        id: ID<Payout>,
        status: PayoutStatus,
        txid: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().expect("payout lock");
        for payout in inner.iter_mut().filter(|p| p.id() == id) {
            payout.status = status;
            if let Some(txid) = txid {
                payout.txid = Some(txid.to_string());
            }
        }
        Ok(())
    }
    async fn find_open_cash_out(
        &self,
        room: &str,
        user: ID<User>,
    ) -> anyhow::Result<Option<Payout>> {
        Ok(self
            .inner
            .lock()
            .expect("payout lock")
            .iter()
            .find(|p| {
                p.room == room
                    && p.user == Some(user)
                    && p.kind == PayoutKind::CashOut
                    && p.status.open()
            })
            .cloned())
    }
    async fn find_open_payouts(&self) -> anyhow::Result<Vec<Payout>> {
        Ok(self
            .inner
            .lock()
            .expect("payout lock")
            .iter()
            .filter(|p| p.status.open())
            .cloned()
            .collect())
    }
}
