/// One entry in a hand's append-only action log.
///
/// Only player decisions are logged; blind posts and street deals are
/// reconstructible from the revealed seed and the config. Sequence numbers
/// are monotonic across the whole hand and survive betting-round resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub sequence: u64,
    pub seat: Position,
    pub player: PlayerId,
    pub phase: HandPhase,
    pub action: Action,
}

use super::action::Action;
use super::phase::HandPhase;
use gf_core::PlayerId;
use gf_core::Position;
use serde::{Deserialize, Serialize};
