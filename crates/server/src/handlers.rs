//! REST surface: deposits, withdrawals, vault lookups, admin sweep.

use crate::AppState;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use gf_auth::Claims;
use gf_auth::UserRepository;
use gf_core::Chips;
use gf_core::DEFAULT_TOKEN;
use gf_core::Unique;
use gf_ledger::BalanceLedger;
use gf_ledger::WithdrawalRepository;
use gf_vault::Deposit;
use gf_vault::DepositStatus;
use gf_vault::DepositStore;

#[derive(serde::Deserialize)]
pub struct DepositRequest {
    #[serde(rename = "txId")]
    pub tx_id: String,
    #[serde(rename = "walletAddress")]
    pub wallet: String,
}

#[derive(serde::Deserialize)]
pub struct WithdrawRequest {
    pub amount: Chips,
    pub destination: String,
}

fn bearer(state: &AppState, req: &HttpRequest) -> Option<Claims> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .and_then(|token| state.tokens.verify(token).ok())
}

/// Notify the server of an on-chain transfer to the treasury; credits the
/// internal balance. Idempotent by transaction id: the insert-if-absent
/// on the deposit record gates the credit, so one txid credits once.
pub async fn deposit(
    state: web::Data<AppState>,
    req: web::Json<DepositRequest>,
) -> impl Responder {
    let user = match state.db.find_or_create_by_wallet(&req.wallet).await {
        Ok(user) => user,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    match state.db.find_deposit(&req.tx_id).await {
        Ok(Some(existing)) if existing.status == DepositStatus::Confirmed => {
            return HttpResponse::Ok().json(serde_json::json!({
                "credited": 0,
                "duplicate": true,
            }));
        }
        Ok(_) => {}
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    }
    let transfer = match state
        .engine
        .verify_treasury_transfer(&req.wallet, &req.tx_id)
        .await
    {
        Ok(transfer) => transfer,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    let record = Deposit {
        user: user.id(),
        token: DEFAULT_TOKEN.to_string(),
        amount: transfer.lamports as i64,
        txid: req.tx_id.clone(),
        status: DepositStatus::Confirmed,
    };
    match state.db.record_deposit(&record).await {
        Ok(true) => {}
        Ok(false) => {
            // lost a race with an identical notification: already credited
            return HttpResponse::Ok().json(serde_json::json!({
                "credited": 0,
                "duplicate": true,
            }));
        }
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    }
    if let Err(e) = state
        .db
        .credit(user.id(), DEFAULT_TOKEN, transfer.lamports)
        .await
    {
        log::error!("deposit {} recorded but credit failed: {}", req.tx_id, e);
        return HttpResponse::InternalServerError().body(e.to_string());
    }
    log::info!(
        "deposit {} credited {} to {}",
        req.tx_id,
        transfer.lamports,
        user.wallet()
    );
    HttpResponse::Ok().json(serde_json::json!({ "credited": transfer.lamports }))
}

/// Atomic debit plus PENDING withdrawal record.
pub async fn withdraw(
    state: web::Data<AppState>,
    http: HttpRequest,
    req: web::Json<WithdrawRequest>,
) -> impl Responder {
    let Some(claims) = bearer(&state, &http) else {
        return HttpResponse::Unauthorized().body("bearer token required");
    };
    if req.amount == 0 {
        return HttpResponse::BadRequest().body("amount must be positive");
    }
    match state
        .db
        .request_withdrawal(claims.user(), DEFAULT_TOKEN, req.amount, &req.destination)
        .await
    {
        Ok(Some(withdrawal)) => HttpResponse::Ok().json(serde_json::json!({
            "withdrawalId": withdrawal.id().to_string(),
            "amount": withdrawal.amount,
            "status": withdrawal.status,
        })),
        Ok(None) => HttpResponse::BadRequest().body("insufficient balance"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// The deposit destination for a room's vault.
pub async fn vault_address(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let room = path.into_inner();
    match state.engine.vault_address(&room) {
        Some(address) => HttpResponse::Ok().json(serde_json::json!({
            "tableId": room,
            "address": address.to_string(),
        })),
        None => HttpResponse::NotFound().body("no vault for room"),
    }
}

/// Sweep every vault's balance less the fee buffer to the treasury.
/// Guarded by the operator key.
pub async fn sweep(state: web::Data<AppState>, http: HttpRequest) -> impl Responder {
    let presented = http
        .headers()
        .get("X-Admin-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let expected = std::env::var("ADMIN_KEY").unwrap_or_default();
    if expected.is_empty() || presented != expected {
        return HttpResponse::Unauthorized().body("admin key required");
    }
    match state.engine.sweep().await {
        Ok(entries) => HttpResponse::Ok().json(
            entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "room": entry.room,
                        "balance": entry.balance,
                        "swept": entry.swept,
                        "txId": entry.txid,
                    })
                })
                .collect::<Vec<serde_json::Value>>(),
        ),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
