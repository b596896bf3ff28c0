//! PostgreSQL connectivity for the Golden Flop backend.
//!
//! ## Connectivity
//!
//! - [`db()`] — Connects from `DB_URL`, retrying while postgres comes up
//!
//! ## Serialization Traits
//!
//! - [`Schema`] — Table metadata and DDL generation
//!
//! ## Table Names
//!
//! Constants for all persistent entities: users, balances, deposits,
//! payouts, withdrawals, seats, and hand history.
mod traits;

pub use traits::*;

use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::Client;

/// How many times to try reaching postgres before giving up. The backend
/// and its database usually start together; a short retry window keeps
/// boot ordering out of the deployment's hands.
const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Connect to PostgreSQL using the `DB_URL` environment variable.
///
/// Retries a handful of times with a flat backoff, then gives up: the
/// service is useless without its durable store, so exhaustion is fatal.
pub async fn db() -> Arc<Client> {
    let url = std::env::var("DB_URL").expect("DB_URL must be set");
    let mut attempt = 1;
    let client = loop {
        match open(&url).await {
            Ok(client) => break client,
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                log::warn!("database unreachable (attempt {}): {}", attempt, e);
                tokio::time::sleep(CONNECT_BACKOFF).await;
                attempt += 1;
            }
            Err(e) => panic!("database unreachable after {} attempts: {}", attempt, e),
        }
    };
    log::info!("database connected");
    Arc::new(client)
}

/// One connection attempt. The connection driver runs as its own task;
/// if it dies the next query surfaces the break.
async fn open(url: &str) -> Result<Client, PgErr> {
    let (client, connection) = tokio_postgres::connect(url, tokio_postgres::tls::NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection task ended: {}", e);
        }
    });
    Ok(client)
}

/// Creates a table and its indices if they do not exist.
pub async fn ensure<S: Schema>(client: &Client) -> Result<(), PgErr> {
    client.batch_execute(S::creates()).await?;
    let indices = S::indices();
    if !indices.is_empty() {
        client.batch_execute(indices).await?;
    }
    Ok(())
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for registered user accounts keyed by wallet address.
#[rustfmt::skip]
pub const USERS:       &str = "users";
/// Table for off-chain chip balances keyed by (user, token).
#[rustfmt::skip]
pub const BALANCES:    &str = "balances";
/// Table for verified on-chain deposits keyed by transaction id.
#[rustfmt::skip]
pub const DEPOSITS:    &str = "deposits";
/// Table for on-chain payouts (cash-outs, rake, refunds).
#[rustfmt::skip]
pub const PAYOUTS:     &str = "payouts";
/// Table for withdrawal requests against the off-chain ledger.
#[rustfmt::skip]
pub const WITHDRAWALS: &str = "withdrawals";
/// Table for persisted room seats that revive on reconnect.
#[rustfmt::skip]
pub const SEATS:       &str = "seats";
/// Table for completed hand results (audit trail, not a ledger).
#[rustfmt::skip]
pub const HANDS:       &str = "hands";
