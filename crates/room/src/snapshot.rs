use gf_cards::Card;
use gf_core::Chips;
use gf_core::PlayerId;
use gf_core::Position;
use gf_core::RoomId;
use gf_engine::HandPhase;
use gf_engine::SidePot;
use serde::Deserialize;
use serde::Serialize;

/// One seat as a recipient sees it. Hole cards obey the filtering rule:
/// present only for the recipient's own seat, or for unfolded seats at
/// showdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub seat_index: Position,
    pub player_id: PlayerId,
    pub name: String,
    pub avatar_seed: String,
    pub chips: Chips,
    pub current_bet: Chips,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub folded: bool,
    pub all_in: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_cards: Option<[Card; 2]>,
}

/// A whole per-recipient table snapshot. No deltas: every broadcast
/// carries the full state so client reconciliation is trivial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub table_id: RoomId,
    pub phase: HandPhase,
    pub countdown_seconds: Option<u32>,
    pub seats: Vec<Option<SeatView>>,
    pub community_cards: Vec<Option<Card>>,
    pub pot: Chips,
    pub side_pots: Vec<SidePot>,
    pub current_bet: Chips,
    pub reserved_seats: Vec<Position>,
    pub min_raise: Chips,
    pub max_raise: Chips,
    pub active_player_seat_index: Option<Position>,
    pub dealer_seat_index: Option<Position>,
    pub small_blind_seat_index: Option<Position>,
    pub big_blind_seat_index: Option<Position>,
    /// Unix millis deadline; present only in the acting player's snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_timeout_at: Option<u64>,
    pub my_seat_index: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_hand: Option<[Card; 2]>,
    pub is_my_turn: bool,
    pub my_chips: Option<Chips>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
}

/// One room's line in the lobby.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEntry {
    pub id: RoomId,
    pub name: String,
    pub creator: PlayerId,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub seated: usize,
    pub max_seats: usize,
    pub phase: HandPhase,
    pub occupied_seats: Vec<Position>,
    pub reserved_seats: Vec<Position>,
    pub token: String,
    pub premium: bool,
}
