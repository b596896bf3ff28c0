//! The reserve → deposit → sit coordination flow.
//!
//! The reservation was taken earlier over the socket; by the time a sit
//! request arrives the player claims to have funded the room's vault on
//! chain. Verification happens here, outside any room lock, and only a
//! verified deposit reaches `room.join`. On failure the reservation is
//! deliberately left to its release timer: the player may retry from
//! another device without losing the seat to a race.

use crate::AppState;
use gf_auth::Claims;
use gf_auth::UserRepository;
use gf_core::Chips;
use gf_core::DEFAULT_TOKEN;
use gf_core::Position;
use gf_core::RoomId;
use gf_core::Unique;
use gf_ledger::BalanceLedger;
use gf_room::Outbox;
use gf_room::Profile;
use gf_room::RoomCmd;
use gf_room::RoomHandle;
use gf_vault::Deposit;
use gf_vault::DepositStatus;
use gf_vault::DepositStore;
use tokio::sync::oneshot;

pub struct SitRequest {
    pub table_id: RoomId,
    pub buy_in: Chips,
    pub seat: Option<Position>,
    pub profile: Profile,
    pub tx_id: Option<String>,
    pub wallet: Option<String>,
}

/// Seat a player, holding the per-(player, room) join guard throughout.
pub async fn sit_at_seat(
    state: &AppState,
    session: &str,
    outbox: Outbox,
    claims: Option<&Claims>,
    request: SitRequest,
) -> Result<Position, String> {
    let key = (request.profile.id.clone(), request.table_id.clone());
    if !state.joining.lock().await.insert(key.clone()) {
        return Err("join already in progress".to_string());
    }
    let result = sit(state, session, outbox, claims, &request).await;
    state.joining.lock().await.remove(&key);
    result
}

async fn sit(
    state: &AppState,
    session: &str,
    outbox: Outbox,
    claims: Option<&Claims>,
    request: &SitRequest,
) -> Result<Position, String> {
    let handle = state
        .registry
        .handle(&request.table_id)
        .await
        .ok_or("table not found")?;
    match (&request.tx_id, &request.wallet) {
        (Some(txid), Some(wallet)) => {
            if state.engine.vault_address(&request.table_id).is_none() {
                return Err("table has no vault configured".to_string());
            }
            let user = state
                .db
                .find_or_create_by_wallet(wallet)
                .await
                .map_err(|e| e.to_string())?;
            // txid is the idempotency key: a re-seat by the same user is
            // allowed, anyone else's claim on it is rejected
            let fresh = match state.db.find_deposit(txid).await.map_err(|e| e.to_string())? {
                Some(existing)
                    if existing.user == user.id()
                        && existing.status == DepositStatus::Confirmed =>
                {
                    log::info!("re-seating {} on deposit {}", request.profile.id, txid);
                    false
                }
                Some(_) => return Err("transaction already claimed".to_string()),
                None => true,
            };
            if fresh {
                if let Err(e) = state
                    .engine
                    .verify_buy_in(&request.table_id, wallet, txid, request.buy_in)
                    .await
                {
                    let db = state.db.clone();
                    let txid = txid.clone();
                    let user_id = user.id();
                    tokio::spawn(async move {
                        let _ = db.fail_deposit(&txid, user_id, DEFAULT_TOKEN).await;
                    });
                    return Err(e.to_string());
                }
                let deposit = Deposit {
                    user: user.id(),
                    token: DEFAULT_TOKEN.to_string(),
                    amount: request.buy_in as i64,
                    txid: txid.clone(),
                    status: DepositStatus::Confirmed,
                };
                state
                    .db
                    .record_deposit(&deposit)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            join(
                &handle,
                request,
                session,
                outbox,
                true,
                Some(user.id()),
                Some(wallet.clone()),
            )
            .await
        }
        _ => {
            // off-chain path: the internal ledger funds the buy-in
            let claims = claims.ok_or("login required for ledger buy-ins")?;
            let funded = state
                .db
                .debit(claims.user(), DEFAULT_TOKEN, request.buy_in)
                .await
                .map_err(|e| e.to_string())?;
            if !funded {
                return Err("insufficient balance".to_string());
            }
            let seated = join(
                &handle,
                request,
                session,
                outbox,
                false,
                Some(claims.user()),
                None,
            )
            .await;
            if seated.is_err() {
                // the debit must not stick when the join bounced
                if let Err(e) = state
                    .db
                    .credit(claims.user(), DEFAULT_TOKEN, request.buy_in)
                    .await
                {
                    log::error!("refund after failed join lost: {}", e);
                }
            }
            seated
        }
    }
}

async fn join(
    handle: &RoomHandle,
    request: &SitRequest,
    session: &str,
    outbox: Outbox,
    vault_settled: bool,
    user: Option<gf_core::ID<gf_auth::User>>,
    wallet: Option<String>,
) -> Result<Position, String> {
    let (reply, confirm) = oneshot::channel();
    handle
        .tx
        .send(RoomCmd::Join {
            player: request.profile.clone(),
            session: session.to_string(),
            outbox,
            buy_in: request.buy_in,
            seat: request.seat,
            vault_settled,
            user,
            wallet,
            reply,
        })
        .map_err(|_| "table closed".to_string())?;
    confirm.await.map_err(|_| "table closed".to_string())?
}
