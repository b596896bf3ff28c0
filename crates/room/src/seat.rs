use gf_auth::User;
use gf_core::Chips;
use gf_core::ID;
use gf_core::PlayerId;
use gf_core::Position;
use gf_core::SessionId;
use serde::Deserialize;
use serde::Serialize;

/// Client-supplied identity attached to a connection or a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub avatar_seed: String,
}

/// A seated player. Outlives any single hand and any single connection;
/// the session id is empty between reconnects.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: PlayerId,
    pub session: SessionId,
    pub name: String,
    pub avatar_seed: String,
    pub chips: Chips,
    pub seat: Position,
    pub connected: bool,
    pub user: Option<ID<User>>,
    pub wallet: Option<String>,
    pub vault_settled: bool,
}

impl RoomPlayer {
    pub fn new(profile: &Profile, session: &str, seat: Position, chips: Chips) -> Self {
        Self {
            id: profile.id.clone(),
            session: session.to_string(),
            name: profile.name.clone(),
            avatar_seed: profile.avatar_seed.clone(),
            chips,
            seat,
            connected: true,
            user: None,
            wallet: None,
            vault_settled: false,
        }
    }
}

/// The durable form of a seat, as persisted per room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSeat {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub seat_index: Position,
}

impl From<&RoomPlayer> for PersistedSeat {
    fn from(player: &RoomPlayer) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            chips: player.chips,
            seat_index: player.seat,
        }
    }
}

impl From<&PersistedSeat> for RoomPlayer {
    /// A revived seat: occupied, disconnected, waiting for its player.
    fn from(seat: &PersistedSeat) -> Self {
        Self {
            id: seat.id.clone(),
            session: String::new(),
            name: seat.name.clone(),
            avatar_seed: String::new(),
            chips: seat.chips,
            seat: seat.seat_index,
            connected: false,
            user: None,
            wallet: None,
            vault_settled: false,
        }
    }
}
