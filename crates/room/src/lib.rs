//! Async runtime for live poker rooms.
//!
//! Each room is a single task draining an inbox of [`RoomCmd`] messages:
//! player commands, its own timer ticks, and registry queries all land in
//! one queue, so every mutation of a room's seats, reservations, and hand
//! state is serialized by construction.
//!
//! ## Architecture
//!
//! - [`Room`] — per-table actor: seats, reservations, timers, hand driving
//! - [`Registry`] — catalog of persistent and ephemeral rooms, lobby
//! - [`RoomHooks`] — persistence and settlement seams (database, vault)
//!
//! ## Wire types
//!
//! - [`ClientMessage`] — commands from connections
//! - [`ServerMessage`] — acks and broadcasts to connections
//! - [`TableSnapshot`] — whole per-recipient table state

mod client;
mod hooks;
mod inbox;
mod message;
mod registry;
mod reservation;
mod room;
mod seat;
mod snapshot;

pub use client::*;
pub use hooks::*;
pub use inbox::*;
pub use message::*;
pub use registry::*;
pub use reservation::*;
pub use room::*;
pub use seat::*;
pub use snapshot::*;
