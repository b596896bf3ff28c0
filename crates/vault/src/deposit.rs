use gf_auth::User;
use gf_core::ID;
use gf_database::DEPOSITS;
use gf_database::PgErr;
use gf_database::Schema;
use std::sync::Arc;
use tokio_postgres::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositStatus {
    Pending,
    Confirmed,
    Failed,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
        }
    }
    pub fn parse(s: &str) -> Self {
        match s {
            "CONFIRMED" => Self::Confirmed,
            "FAILED" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// A verified on-chain deposit. The transaction id is globally unique and
/// doubles as the idempotency key: one txid, one credit, ever.
#[derive(Debug, Clone)]
pub struct Deposit {
    pub user: ID<User>,
    pub token: String,
    pub amount: i64,
    pub txid: String,
    pub status: DepositStatus,
}

impl Schema for Deposit {
    fn name() -> &'static str {
        DEPOSITS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            DEPOSITS,
            " (
                txid        TEXT PRIMARY KEY,
                user_id     UUID NOT NULL,
                token       TEXT NOT NULL,
                amount      BIGINT NOT NULL,
                status      TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_deposits_user ON ",
            DEPOSITS,
            " (user_id);"
        )
    }
}

#[allow(async_fn_in_trait)]
pub trait DepositStore {
    async fn find_deposit(&self, txid: &str) -> Result<Option<Deposit>, PgErr>;
    /// Insert-if-absent keyed by txid. Returns false when the txid was
    /// already consumed, leaving the existing record untouched.
    async fn record_deposit(&self, deposit: &Deposit) -> Result<bool, PgErr>;
    async fn fail_deposit(&self, txid: &str, user: ID<User>, token: &str) -> Result<(), PgErr>;
}

impl DepositStore for Arc<Client> {
    async fn find_deposit(&self, txid: &str) -> Result<Option<Deposit>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT txid, user_id, token, amount, status FROM ",
                DEPOSITS,
                " WHERE txid = $1"
            ),
            &[&txid],
        )
        .await
        .map(|opt| {
            opt.map(|row| Deposit {
                txid: row.get::<_, String>(0),
                user: ID::from(row.get::<_, uuid::Uuid>(1)),
                token: row.get::<_, String>(2),
                amount: row.get::<_, i64>(3),
                status: DepositStatus::parse(&row.get::<_, String>(4)),
            })
        })
    }

    async fn record_deposit(&self, deposit: &Deposit) -> Result<bool, PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                DEPOSITS,
                " (txid, user_id, token, amount, status) VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (txid) DO NOTHING"
            ),
            &[
                &deposit.txid,
                &deposit.user.inner(),
                &deposit.token,
                &deposit.amount,
                &deposit.status.as_str(),
            ],
        )
        .await
        .map(|rows| rows == 1)
    }

    async fn fail_deposit(&self, txid: &str, user: ID<User>, token: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                DEPOSITS,
                " (txid, user_id, token, amount, status) VALUES ($1, $2, $3, 0, 'FAILED')
                 ON CONFLICT (txid) DO UPDATE SET status = 'FAILED'
                 WHERE ",
                DEPOSITS,
                ".status = 'PENDING'"
            ),
            &[&txid, &user.inner(), &token],
        )
        .await
        .map(|_| ())
    }
}
