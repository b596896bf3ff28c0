/// A winner's share of the pot at hand end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub seat: Position,
    pub player: PlayerId,
    pub amount: Chips,
}

/// One player's evaluated hand, revealed at showdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revealed {
    pub seat: Position,
    pub player: PlayerId,
    pub name: String,
    pub hand_name: String,
    pub hole: [Card; 2],
    pub best: [Card; 5],
}

/// Published resolution of a completed hand.
///
/// The seed and shuffle algorithm are revealed here so players can rebuild
/// the exact deck permutation and audit every card dealt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandResult {
    pub hand_id: String,
    pub winners: Vec<Winner>,
    pub revealed: Vec<Revealed>,
    pub win_label: String,
    pub pot: Chips,
    pub side_pots: Vec<SidePot>,
    pub seed: String,
    pub shuffle: String,
    pub actions: Vec<ActionRecord>,
}

use super::pots::SidePot;
use super::record::ActionRecord;
use gf_cards::Card;
use gf_core::Chips;
use gf_core::PlayerId;
use gf_core::Position;
use serde::{Deserialize, Serialize};
