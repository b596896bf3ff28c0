/// Per-hand state for one seated player.
///
/// Invariants the state machine maintains: `current_bet <= total_contributed`,
/// a folded player never acts again, and `has_acted` drops back to false for
/// live non-all-in players only when a full raise reopens the round.
#[derive(Debug, Clone, PartialEq)]
pub struct HandPlayer {
    pub id: PlayerId,
    pub seat: Position,
    pub name: String,
    pub chips: Chips,
    pub hole: Option<[Card; 2]>,
    pub current_bet: Chips,
    pub total_contributed: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub has_acted: bool,
    pub connected: bool,
}

impl HandPlayer {
    pub fn new(id: PlayerId, seat: Position, name: String, chips: Chips) -> Self {
        Self {
            id,
            seat,
            name,
            chips,
            hole: None,
            current_bet: 0,
            total_contributed: 0,
            folded: false,
            all_in: false,
            has_acted: false,
            connected: true,
        }
    }
    /// Still contesting the pot.
    pub fn live(&self) -> bool {
        !self.folded
    }
    /// Can still make betting decisions.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }
    /// Move chips from stack into the current round's bet.
    /// Caps at the remaining stack and flips `all_in` at zero.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.current_bet += paid;
        self.total_contributed += paid;
        if self.chips == 0 {
            self.all_in = true;
        }
        paid
    }
}

use gf_cards::Card;
use gf_core::Chips;
use gf_core::PlayerId;
use gf_core::Position;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_caps_at_stack_and_flags_all_in() {
        let mut player = HandPlayer::new("p1".to_string(), 0, "P1".to_string(), 50);
        assert_eq!(player.commit(80), 50);
        assert_eq!(player.chips, 0);
        assert!(player.all_in);
        assert_eq!(player.current_bet, 50);
        assert_eq!(player.total_contributed, 50);
    }

    #[test]
    fn partial_commit_stays_live() {
        let mut player = HandPlayer::new("p1".to_string(), 0, "P1".to_string(), 100);
        assert_eq!(player.commit(40), 40);
        assert!(player.can_act());
        assert_eq!(player.chips, 60);
    }
}
