//! Core type aliases, traits, and constants for the Golden Flop backend.
//!
//! Every chip quantity in the system is an integer count of the chain's
//! smallest monetary unit (lamports), so blinds, stacks, pots, and payouts
//! never touch floating point.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Chip amounts in the chain's smallest unit (lamports).
pub type Chips = u64;
/// Seat index around the table.
pub type Position = usize;
/// Stable client-supplied player identity. Outlives any one connection.
pub type PlayerId = String;
/// Transport-session identity. One per live connection.
pub type SessionId = String;
/// Room identity. Predefined rooms carry stable ids like `table-low-1`.
pub type RoomId = String;

// ============================================================================
// IDENTITY
// ============================================================================
use std::marker::PhantomData;

/// Unique identifier trait for durable entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

/// A UUID that remembers which entity it names.
///
/// Accounts, payouts, and withdrawals all key on UUIDs; the phantom tag
/// stops a payout id from ever being handed to an account lookup. The tag
/// is `fn() -> T` so an `ID<T>` stays `Send + Sync + Copy` no matter what
/// `T` itself is.
pub struct ID<T> {
    value: uuid::Uuid,
    tag: PhantomData<fn() -> T>,
}

impl<T> ID<T> {
    /// Mint a fresh identifier. v7, so ids sort by creation time and the
    /// payout and withdrawal tables get useful index locality for free.
    pub fn fresh() -> Self {
        Self::from(uuid::Uuid::now_v7())
    }
    pub fn inner(&self) -> uuid::Uuid {
        self.value
    }
}

impl<T> From<uuid::Uuid> for ID<T> {
    fn from(value: uuid::Uuid) -> Self {
        Self {
            value,
            tag: PhantomData,
        }
    }
}
impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> uuid::Uuid {
        id.value
    }
}
impl<T> Default for ID<T> {
    fn default() -> Self {
        Self::fresh()
    }
}

// deriving these would wrongly bound them on T, which is only a tag
impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> std::hash::Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}
impl<T> std::fmt::Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID({})", self.value)
    }
}
impl<T> std::fmt::Display for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.value, f)
    }
}

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Fewest seats a table may be created with.
pub const MIN_SEATS: usize = 2;
/// Most seats a table may be created with.
pub const MAX_SEATS: usize = 9;
/// Seat count used when a table creator does not specify one.
pub const DEFAULT_SEATS: usize = 6;

// ============================================================================
// TIMING PARAMETERS
// All wall-clock driven; rooms broadcast deadlines, never countdowns.
// ============================================================================
/// Seconds a seat reservation is held before automatic release.
pub const RESERVATION_RELEASE_SECS: u64 = 30;
/// Seconds the acting player has before an automatic fold.
pub const TURN_TIMEOUT_SECS: u64 = 30;
/// Seconds between the second player sitting down and the first deal.
pub const COUNTDOWN_SECS: u32 = 3;
/// Seconds between one hand ending and the next being dealt.
pub const INTER_HAND_DELAY_SECS: u64 = 5;
/// Seconds a disconnected player's seat survives before removal.
pub const DISCONNECT_GRACE_SECS: u64 = 60;
/// Milliseconds between streets when every live player is all-in.
pub const RUNOUT_PAUSE_MS: u64 = 900;
/// Milliseconds clients get to observe final river bets before results.
pub const SHOWDOWN_PAUSE_MS: u64 = 1500;

// ============================================================================
// ECONOMY PARAMETERS
// ============================================================================
/// Token denomination rooms and the ledger default to.
pub const DEFAULT_TOKEN: &str = "SOL";
/// House share of each pot, in percent.
pub const RAKE_PERCENT: u64 = 5;
/// Upper bound on the rake taken from a single pot, in smallest units.
pub const RAKE_CAP: Chips = 50_000_000;

/// Install logging: terminal always, plus a per-boot debug file when
/// `LOG_DIR` is set. Deployments that only want stdout set nothing.
pub fn log() {
    let config = simplelog::ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .set_location_level(log::LevelFilter::Off)
        .build();
    let mut sinks: Vec<Box<dyn simplelog::SharedLogger>> = vec![simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];
    if let Ok(dir) = std::env::var("LOG_DIR") {
        std::fs::create_dir_all(&dir).expect("create LOG_DIR");
        let boot = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_secs();
        let file = std::fs::File::create(format!("{}/backend-{}.log", dir, boot))
            .expect("create log file");
        sinks.push(simplelog::WriteLogger::new(
            log::LevelFilter::Debug,
            config,
            file,
        ));
    }
    simplelog::CombinedLogger::init(sinks).expect("install logger");
}

/// Exit on ctrl-c. Rooms hold no durable mid-hand state (interrupted
/// hands cancel and refund on the next boot's seat restore), so a hard
/// exit loses nothing.
pub fn interrupt() {
    tokio::spawn(async {
        tokio::signal::ctrl_c().await.expect("listen for ctrl-c");
        log::warn!("interrupt received, shutting down");
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account;
    struct Receipt;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = ID::<Account>::fresh();
        let b = ID::<Account>::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn id_survives_the_uuid_round_trip() {
        let id = ID::<Receipt>::fresh();
        let raw: uuid::Uuid = id.into();
        assert_eq!(ID::<Receipt>::from(raw), id);
        assert_eq!(id.to_string(), raw.to_string());
    }
}
