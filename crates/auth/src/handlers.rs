use super::*;
use gf_core::Unique;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

#[derive(serde::Deserialize)]
pub struct NonceRequest {
    pub wallet: String,
}

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    pub wallet: String,
    pub nonce: String,
    pub signature: String,
}

#[derive(serde::Serialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "userId")]
    user_id: String,
    wallet: String,
}

/// Issue a single-use login nonce for a wallet.
pub async fn nonce(nonces: web::Data<Nonces>, req: web::Json<NonceRequest>) -> impl Responder {
    if req.wallet.is_empty() || req.wallet.len() > 64 {
        return HttpResponse::BadRequest().body("invalid wallet address");
    }
    let nonce = nonces.issue(&req.wallet);
    HttpResponse::Ok().json(serde_json::json!({ "nonce": nonce }))
}

/// Verify a signed login message and issue a bearer token.
pub async fn login(
    db: web::Data<Arc<Client>>,
    nonces: web::Data<Nonces>,
    tokens: web::Data<Tokens>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    if !nonces.consume(&req.wallet, &req.nonce) {
        return HttpResponse::Unauthorized().body("unknown or expired nonce");
    }
    let message = login_message(&req.nonce);
    if !verify_signature(&req.wallet, &req.signature, &message) {
        return HttpResponse::Unauthorized().body("signature verification failed");
    }
    let user = match db.find_or_create_by_wallet(&req.wallet).await {
        Ok(user) => user,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    let token = match tokens.grant(user.id(), user.wallet()) {
        Ok(token) => token,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    log::info!(
        "wallet {} logged in as {} (session {})",
        user.wallet(),
        user.id(),
        Tokens::fingerprint(&token)
    );
    HttpResponse::Ok().json(LoginResponse {
        token,
        user_id: user.id().to_string(),
        wallet: user.wallet().to_string(),
    })
}
