use super::BalanceLedger;
use gf_auth::User;
use gf_core::Chips;
use gf_core::ID;
use gf_core::Unique;
use gf_database::PgErr;
use gf_database::Schema;
use gf_database::WITHDRAWALS;
use std::sync::Arc;
use tokio_postgres::Client;

/// A withdrawal request against the off-chain ledger.
///
/// Creation is atomic with the debit: the record exists only if the chips
/// left the balance. Settlement to the chain happens out of band and flips
/// the status.
#[derive(Debug, Clone)]
pub struct Withdrawal {
    id: ID<Self>,
    pub user: ID<User>,
    pub token: String,
    pub amount: Chips,
    pub destination: String,
    pub status: String,
}

impl Withdrawal {
    pub const PENDING: &'static str = "PENDING";

    pub fn new(user: ID<User>, token: &str, amount: Chips, destination: &str) -> Self {
        Self {
            id: ID::fresh(),
            user,
            token: token.to_string(),
            amount,
            destination: destination.to_string(),
            status: Self::PENDING.to_string(),
        }
    }
}

impl Unique for Withdrawal {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Schema for Withdrawal {
    fn name() -> &'static str {
        WITHDRAWALS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            WITHDRAWALS,
            " (
                id           UUID PRIMARY KEY,
                user_id      UUID NOT NULL,
                token        TEXT NOT NULL,
                amount       BIGINT NOT NULL,
                destination  TEXT NOT NULL,
                status       TEXT NOT NULL DEFAULT 'PENDING',
                created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_withdrawals_user ON ",
            WITHDRAWALS,
            " (user_id);
             CREATE INDEX IF NOT EXISTS idx_withdrawals_status ON ",
            WITHDRAWALS,
            " (status) WHERE status = 'PENDING';"
        )
    }
}

#[allow(async_fn_in_trait)]
pub trait WithdrawalRepository {
    /// Debit the ledger and record a PENDING withdrawal in one motion.
    /// Returns `None` without mutation when the balance falls short.
    async fn request_withdrawal(
        &self,
        user: ID<User>,
        token: &str,
        amount: Chips,
        destination: &str,
    ) -> Result<Option<Withdrawal>, PgErr>;
}

impl WithdrawalRepository for Arc<Client> {
    async fn request_withdrawal(
        &self,
        user: ID<User>,
        token: &str,
        amount: Chips,
        destination: &str,
    ) -> Result<Option<Withdrawal>, PgErr> {
        if !self.debit(user, token, amount).await? {
            return Ok(None);
        }
        let withdrawal = Withdrawal::new(user, token, amount, destination);
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                WITHDRAWALS,
                " (id, user_id, token, amount, destination, status)
                 VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &withdrawal.id().inner(),
                &withdrawal.user.inner(),
                &withdrawal.token,
                &(withdrawal.amount as i64),
                &withdrawal.destination,
                &withdrawal.status,
            ],
        )
        .await?;
        log::info!(
            "withdrawal {} of {} {} queued for user {}",
            withdrawal.id(),
            withdrawal.amount,
            withdrawal.token,
            withdrawal.user,
        );
        Ok(Some(withdrawal))
    }
}
