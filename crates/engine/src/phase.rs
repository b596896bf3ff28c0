/// Where a table is in its lifecycle. `Waiting` and `Countdown` mean no
/// hand is in progress; the engine itself only ever occupies
/// `Preflop..=Showdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandPhase {
    Waiting,
    Countdown,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl HandPhase {
    /// The next street, if any. Betting phases only.
    pub fn next(&self) -> Option<HandPhase> {
        match self {
            HandPhase::Preflop => Some(HandPhase::Flop),
            HandPhase::Flop => Some(HandPhase::Turn),
            HandPhase::Turn => Some(HandPhase::River),
            HandPhase::River => Some(HandPhase::Showdown),
            _ => None,
        }
    }
    /// How many community cards this street reveals on entry.
    pub fn reveals(&self) -> usize {
        match self {
            HandPhase::Flop => 3,
            HandPhase::Turn | HandPhase::River => 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for HandPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HandPhase::Waiting => write!(f, "waiting"),
            HandPhase::Countdown => write!(f, "countdown"),
            HandPhase::Preflop => write!(f, "preflop"),
            HandPhase::Flop => write!(f, "flop"),
            HandPhase::Turn => write!(f, "turn"),
            HandPhase::River => write!(f, "river"),
            HandPhase::Showdown => write!(f, "showdown"),
        }
    }
}

use serde::{Deserialize, Serialize};
