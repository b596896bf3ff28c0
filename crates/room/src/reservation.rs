use gf_core::PlayerId;
use gf_core::Position;

/// A short-lived server-side lock on an empty seat, held by one player
/// while their on-chain deposit completes. At most one per seat and one
/// per player per room. The stamp guards against stale release timers:
/// a timer fires with the stamp it was scheduled under, and a newer
/// reservation of the same seat carries a newer stamp.
#[derive(Debug, Clone)]
pub struct SeatReservation {
    pub seat: Position,
    pub player: PlayerId,
    pub name: String,
    pub avatar_seed: String,
    pub stamp: u64,
}
