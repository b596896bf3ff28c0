//! Atomic off-chain chip ledger.
//!
//! Balances are integers in the chain's smallest unit, keyed by
//! (user, token). Debits are conditional updates that touch the row only
//! when the balance covers the amount; credits upsert. Buy-ins for
//! non-vault rooms debit here, cash-outs credit here.

mod balance;
mod withdrawal;

pub use balance::*;
pub use withdrawal::*;
