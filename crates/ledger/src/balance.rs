use gf_auth::User;
use gf_core::Chips;
use gf_core::ID;
use gf_database::BALANCES;
use gf_database::PgErr;
use gf_database::Schema;
use std::sync::Arc;
use tokio_postgres::Client;

/// One (user, token) balance row.
///
/// Amounts live in the database as BIGINT; the service treats them as
/// unsigned and the conditional debit keeps them non-negative.
#[derive(Debug, Clone)]
pub struct Balance {
    pub user: ID<User>,
    pub token: String,
    pub amount: Chips,
}

impl Schema for Balance {
    fn name() -> &'static str {
        BALANCES
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            BALANCES,
            " (
                user_id  UUID NOT NULL,
                token    TEXT NOT NULL,
                amount   BIGINT NOT NULL DEFAULT 0 CHECK (amount >= 0),
                PRIMARY KEY (user_id, token)
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

/// Ledger operations. The debit is the load-bearing one: it mutates only
/// when the current balance is sufficient and reports whether it did.
#[allow(async_fn_in_trait)]
pub trait BalanceLedger {
    async fn balance(&self, user: ID<User>, token: &str) -> Result<Chips, PgErr>;
    async fn credit(&self, user: ID<User>, token: &str, amount: Chips) -> Result<(), PgErr>;
    async fn debit(&self, user: ID<User>, token: &str, amount: Chips) -> Result<bool, PgErr>;
}

impl BalanceLedger for Arc<Client> {
    async fn balance(&self, user: ID<User>, token: &str) -> Result<Chips, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT amount FROM ",
                BALANCES,
                " WHERE user_id = $1 AND token = $2"
            ),
            &[&user.inner(), &token],
        )
        .await
        .map(|opt| opt.map(|row| row.get::<_, i64>(0) as Chips).unwrap_or(0))
    }

    async fn credit(&self, user: ID<User>, token: &str, amount: Chips) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                BALANCES,
                " (user_id, token, amount) VALUES ($1, $2, $3)
                 ON CONFLICT (user_id, token)
                 DO UPDATE SET amount = ",
                BALANCES,
                ".amount + EXCLUDED.amount"
            ),
            &[&user.inner(), &token, &(amount as i64)],
        )
        .await
        .map(|_| ())
    }

    async fn debit(&self, user: ID<User>, token: &str, amount: Chips) -> Result<bool, PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                BALANCES,
                " SET amount = amount - $3
                 WHERE user_id = $1 AND token = $2 AND amount >= $3"
            ),
            &[&user.inner(), &token, &(amount as i64)],
        )
        .await
        .map(|rows| rows == 1)
    }
}
