use super::message::Outbox;
use super::seat::Profile;
use super::snapshot::LobbyEntry;
use gf_auth::User;
use gf_core::Chips;
use gf_core::ID;
use gf_core::PlayerId;
use gf_core::Position;
use gf_core::SessionId;
use gf_engine::Action;
use tokio::sync::oneshot;

/// Everything a room can be asked to do, including its own timer ticks.
///
/// The tick variants carry the epoch or stamp they were scheduled under;
/// the room ignores any tick whose epoch no longer matches, which is how
/// cancelled timers die without being tracked.
pub enum RoomCmd {
    Watch {
        session: SessionId,
        outbox: Outbox,
    },
    Unwatch {
        session: SessionId,
    },
    Reserve {
        seat: Position,
        player: Profile,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Release {
        seat: Position,
        player: Option<PlayerId>,
    },
    Join {
        player: Profile,
        session: SessionId,
        outbox: Outbox,
        buy_in: Chips,
        seat: Option<Position>,
        vault_settled: bool,
        user: Option<ID<User>>,
        wallet: Option<String>,
        reply: oneshot::Sender<Result<Position, String>>,
    },
    Leave {
        session: SessionId,
    },
    Action {
        session: SessionId,
        action: Action,
    },
    Reconnect {
        player: PlayerId,
        session: SessionId,
        outbox: Outbox,
    },
    Disconnect {
        session: SessionId,
    },
    LobbyInfo {
        reply: oneshot::Sender<LobbyEntry>,
    },
    // timer ticks
    TurnTimeout { epoch: u64 },
    ReservationExpiry { seat: Position, stamp: u64 },
    CountdownTick { epoch: u64 },
    StartHand { epoch: u64 },
    RunoutStep { epoch: u64 },
    ShowdownFinish { epoch: u64 },
    GraceExpiry { player: PlayerId, stamp: u64 },
    DestroyCheck,
}
