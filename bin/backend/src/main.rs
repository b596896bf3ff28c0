//! Golden Flop Backend Binary
//!
//! Serves the WebSocket table transport and REST surface on BIND_ADDR
//! (e.g. 0.0.0.0:8888).

#[tokio::main]
async fn main() {
    gf_core::log();
    gf_core::interrupt();
    gf_server::run().await.unwrap();
}
