//! Per-room on-chain escrow.
//!
//! Every persistent room may carry a dedicated keypair whose public key is
//! the deposit destination for buy-ins. Outbound transfers (cash-outs,
//! rake, sweeps) are serialized per room, recorded durably before signing,
//! and bounded by a reserve policy that never drains a vault below the
//! rent-exempt minimum plus a fee buffer.
//!
//! - [`Chain`] — the thin seam over the RPC node ([`RpcChain`] in
//!   production, [`MockChain`] in tests)
//! - [`Vault`] — a room's keypair, loaded from secure configuration
//! - [`Deposit`], [`Payout`] — durable records; the payout table alone
//!   reconstructs the house's exposure
//! - [`PayoutEngine`] — serialized, idempotent, reserve-capped transfers

mod chain;
mod deposit;
mod engine;
mod keys;
mod mock;
mod payout;
mod rpc;

pub use chain::*;
pub use deposit::*;
pub use engine::*;
pub use keys::*;
pub use mock::*;
pub use payout::*;
pub use rpc::*;
