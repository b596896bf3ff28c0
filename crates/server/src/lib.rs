//! Unified Backend Server
//!
//! One actix-web process serving the WebSocket table transport and the
//! auxiliary REST surface (login, deposits, withdrawals, vault lookups,
//! admin sweep).
//!
//! ## Submodules
//!
//! - [`session`] — WebSocket attach handshake and per-connection loop
//! - [`sit`] — the reserve → deposit → sit coordination flow
//! - [`handlers`] — REST route handlers
//! - [`hooks`] — the room runtime's persistence and settlement wiring
//! - [`store`] — seat-map and hand-history persistence

pub mod handlers;
pub mod hooks;
pub mod session;
pub mod sit;
pub mod store;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use gf_room::Registry;
use gf_room::TableDef;
use gf_vault::PayoutEngine;
use gf_vault::ReservePolicy;
use gf_vault::RpcChain;
use gf_vault::Vault;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::Client;

/// The production payout engine: RPC chain, postgres records.
pub type Engine = PayoutEngine<RpcChain, Arc<Client>>;

/// Shared server state behind `web::Data`.
pub struct AppState {
    pub db: Arc<Client>,
    pub registry: Arc<Registry>,
    pub engine: Arc<Engine>,
    pub tokens: Arc<gf_auth::Tokens>,
    /// Guards against concurrent join attempts per (player, room).
    pub joining: Mutex<HashSet<(String, String)>>,
}

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

async fn migrate(client: &Client) {
    gf_database::ensure::<gf_auth::User>(client).await.expect("users table");
    gf_database::ensure::<gf_ledger::Balance>(client).await.expect("balances table");
    gf_database::ensure::<gf_ledger::Withdrawal>(client).await.expect("withdrawals table");
    gf_database::ensure::<gf_vault::Deposit>(client).await.expect("deposits table");
    gf_database::ensure::<gf_vault::Payout>(client).await.expect("payouts table");
    gf_database::ensure::<store::SeatMap>(client).await.expect("seats table");
    gf_database::ensure::<store::HandRecord>(client).await.expect("hands table");
}

#[rustfmt::skip]
pub async fn run() -> Result<(), std::io::Error> {
    let client = gf_database::db().await;
    migrate(&client).await;
    let treasury = std::env::var("TREASURY_ADDRESS")
        .ok()
        .and_then(|s| Pubkey::from_str(&s).ok())
        .expect("TREASURY_ADDRESS must be a valid pubkey");
    let mut engine = PayoutEngine::new(
        RpcChain::from_env(),
        client.clone(),
        treasury,
        ReservePolicy::default(),
    );
    let defs = TableDef::house_tables();
    for def in &defs {
        match Vault::load(&def.id) {
            Ok(vault) => {
                log::info!("room {} vault {}", def.id, vault.address());
                engine.add_vault(vault);
            }
            Err(e) => log::warn!("room {} has no vault: {}", def.id, e),
        }
    }
    if let Err(e) = engine.recover().await {
        log::error!("payout recovery scan failed: {}", e);
    }
    let engine = Arc::new(engine);
    let hooks = Arc::new(hooks::ServerHooks::new(client.clone(), engine.clone()));
    let registry = Arc::new(Registry::boot(hooks, defs).await);
    let tokens = Arc::new(gf_auth::Tokens::from_env());
    let state = web::Data::new(AppState {
        db: client.clone(),
        registry,
        engine,
        tokens: tokens.clone(),
        joining: Mutex::new(HashSet::new()),
    });
    let nonces = web::Data::new(gf_auth::Nonces::default());
    let tokens = web::Data::from(tokens);
    let client = web::Data::new(client);
    log::info!("starting unified server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(state.clone())
            .app_data(nonces.clone())
            .app_data(tokens.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .route("/ws", web::get().to(session::enter))
            .service(
                web::scope("/auth")
                    .route("/nonce", web::post().to(gf_auth::handlers::nonce))
                    .route("/login", web::post().to(gf_auth::handlers::login)),
            )
            .service(
                web::scope("/api")
                    .route("/deposit", web::post().to(handlers::deposit))
                    .route("/withdraw", web::post().to(handlers::withdraw))
                    .route("/vault/{room_id}", web::get().to(handlers::vault_address))
                    .route("/admin/sweep", web::post().to(handlers::sweep)),
            )
    })
    .workers(6)
    .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
    .run()
    .await
}
