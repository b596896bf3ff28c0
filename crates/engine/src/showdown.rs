/// Showdown resolution over a complete hand.
///
/// Walks each side pot independently: restrict to eligible seats, find the
/// best strength, split equally among ties. Odd chips from an uneven split
/// go to the tied winner closest to the dealer's left.
impl HandState {
    pub fn resolve(&self) -> HandResult {
        let live = self
            .players()
            .iter()
            .filter(|p| p.live())
            .collect::<Vec<&HandPlayer>>();
        if live.len() == 1 {
            // everyone else folded: the pot moves without a reveal
            let winner = live[0];
            return HandResult {
                hand_id: self.id().to_string(),
                winners: vec![Winner {
                    seat: winner.seat,
                    player: winner.id.clone(),
                    amount: self.pot(),
                }],
                revealed: Vec::new(),
                win_label: "Last Player Standing".to_string(),
                pot: self.pot(),
                side_pots: self.side_pots().to_vec(),
                seed: self.seed().to_string(),
                shuffle: Deck::ALGORITHM.to_string(),
                actions: self.log().to_vec(),
            };
        }
        let strengths = live
            .iter()
            .map(|p| {
                let hole = p.hole.expect("live player holds cards at showdown");
                let mut cards = hole.to_vec();
                cards.extend_from_slice(self.community());
                (p.seat, Strength::evaluate(&cards))
            })
            .collect::<HashMap<Position, Strength>>();
        let mut totals: BTreeMap<Position, Chips> = BTreeMap::new();
        // a layer can lose all its eligible seats when its top contributor
        // folds; that money rolls into the next contested layer down
        let mut contested: Vec<SidePot> = Vec::new();
        let mut carry: Chips = 0;
        for pot in self.side_pots().iter().rev() {
            if pot.eligible.is_empty() {
                carry += pot.amount;
            } else {
                contested.push(SidePot {
                    amount: pot.amount + carry,
                    eligible: pot.eligible.clone(),
                });
                carry = 0;
            }
        }
        contested.reverse();
        for pot in &contested {
            let best = pot
                .eligible
                .iter()
                .filter_map(|seat| strengths.get(seat))
                .max()
                .expect("every pot has at least one eligible seat");
            let mut tied = pot
                .eligible
                .iter()
                .filter(|seat| strengths.get(seat) == Some(best))
                .copied()
                .collect::<Vec<Position>>();
            tied.sort_by_key(|seat| self.rotation_distance(*seat));
            let share = pot.amount / tied.len() as Chips;
            let remainder = pot.amount % tied.len() as Chips;
            for (i, seat) in tied.iter().enumerate() {
                let extra = if i == 0 { remainder } else { 0 };
                *totals.entry(*seat).or_default() += share + extra;
            }
        }
        let winners = totals
            .into_iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(seat, amount)| Winner {
                seat,
                player: self.player_at(seat).id.clone(),
                amount,
            })
            .collect();
        let revealed = live
            .iter()
            .map(|p| {
                let strength = &strengths[&p.seat];
                Revealed {
                    seat: p.seat,
                    player: p.id.clone(),
                    name: p.name.clone(),
                    hand_name: strength.name().to_string(),
                    hole: p.hole.expect("live player holds cards at showdown"),
                    best: *strength.cards(),
                }
            })
            .collect();
        HandResult {
            hand_id: self.id().to_string(),
            winners,
            revealed,
            win_label: "Showdown".to_string(),
            pot: self.pot(),
            side_pots: self.side_pots().to_vec(),
            seed: self.seed().to_string(),
            shuffle: Deck::ALGORITHM.to_string(),
            actions: self.log().to_vec(),
        }
    }

    /// Seats ranked by how soon they come after the dealer.
    fn rotation_distance(&self, seat: Position) -> usize {
        let n = self.players().len();
        let index = self
            .players()
            .iter()
            .position(|p| p.seat == seat)
            .expect("eligible seat is in the hand");
        (index + n - (self.dealer() + 1) % n) % n
    }

    fn player_at(&self, seat: Position) -> &HandPlayer {
        self.players()
            .iter()
            .find(|p| p.seat == seat)
            .expect("winner seat is in the hand")
    }
}

use super::player::HandPlayer;
use super::pots::SidePot;
use super::result::HandResult;
use super::result::Revealed;
use super::result::Winner;
use super::state::HandState;
use gf_cards::Deck;
use gf_cards::Strength;
use gf_core::Chips;
use gf_core::Position;
use std::collections::BTreeMap;
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::config::TableConfig;
    use crate::state::HandState;

    fn open(stacks: &[Chips], dealer: usize, seed: &str) -> HandState {
        let players = stacks
            .iter()
            .enumerate()
            .map(|(i, s)| HandPlayer::new(format!("p{}", i + 1), i, format!("P{}", i + 1), *s))
            .collect();
        let config = TableConfig {
            small_blind: 10,
            big_blind: 20,
            min_buy_in: 200,
            max_buy_in: 10_000,
            ..TableConfig::default()
        };
        HandState::open(players, config, dealer, "hand-t".to_string(), seed.to_string())
            .expect("open")
    }

    fn check_down(mut hand: HandState) -> HandState {
        while !hand.is_complete() {
            if hand.needs_runout() {
                hand = hand.runout().expect("runout");
            } else {
                let actor = hand.actor().expect("actor").clone();
                let owed = hand.current_bet().saturating_sub(actor.current_bet);
                let next = if owed == 0 {
                    hand.act(Action::Check)
                } else {
                    hand.act(Action::Call)
                };
                hand = next.expect("passive line");
            }
        }
        hand
    }

    #[test]
    fn showdown_awards_the_whole_pot() {
        let hand = check_down(open(&[1_000, 1_000], 0, "seed-a"));
        let result = hand.resolve();
        assert_eq!(result.pot, 40);
        assert_eq!(
            result.winners.iter().map(|w| w.amount).sum::<Chips>(),
            40
        );
        assert_eq!(result.revealed.len(), 2);
        assert_eq!(result.seed, "seed-a");
        assert_eq!(result.shuffle, "fnv1a-mulberry32");
    }

    #[test]
    fn fold_out_reveals_nothing() {
        let hand = open(&[1_000, 1_000], 0, "seed-b");
        let hand = hand.act(Action::Fold).expect("fold");
        let result = hand.resolve();
        assert_eq!(result.win_label, "Last Player Standing");
        assert!(result.revealed.is_empty());
        assert_eq!(result.winners[0].amount, 30);
    }

    #[test]
    fn side_pot_winners_respect_eligibility() {
        // the short stack can never win more than the capped layer
        let mut hand = open(&[30, 1_000, 1_000], 0, "seed-c");
        hand = hand.act(Action::AllIn).expect("short shove");
        hand = hand.act(Action::Raise(100)).expect("raise");
        hand = hand.act(Action::Call).expect("call");
        let hand = check_down(hand);
        let result = hand.resolve();
        let short_winnings = result
            .winners
            .iter()
            .filter(|w| w.seat == 0)
            .map(|w| w.amount)
            .sum::<Chips>();
        assert!(short_winnings <= 90);
        assert_eq!(
            result.winners.iter().map(|w| w.amount).sum::<Chips>(),
            result.pot
        );
    }

    #[test]
    fn folded_overbet_rolls_into_contested_pot() {
        use crate::phase::HandPhase;
        // the overbettor folds, leaving a top layer with no eligible seats
        let mut hand = open(&[30, 1_000, 150], 0, "seed-f");
        hand = hand.act(Action::AllIn).expect("short shove");
        hand = hand.act(Action::Raise(200)).expect("overbet");
        hand = hand.act(Action::AllIn).expect("call for less");
        assert_eq!(hand.phase(), HandPhase::Flop);
        hand = hand.act(Action::Fold).expect("fold the overbet");
        while hand.needs_runout() {
            hand = hand.runout().expect("runout");
        }
        assert!(hand.is_complete());
        let result = hand.resolve();
        assert_eq!(result.pot, 380);
        assert_eq!(
            result.winners.iter().map(|w| w.amount).sum::<Chips>(),
            result.pot
        );
    }

    #[test]
    fn resolution_is_deterministic_for_a_seed() {
        let a = check_down(open(&[500, 500, 500], 1, "seed-d")).resolve();
        let b = check_down(open(&[500, 500, 500], 1, "seed-d")).resolve();
        assert_eq!(a.winners.len(), b.winners.len());
        for (x, y) in a.winners.iter().zip(b.winners.iter()) {
            assert_eq!(x.seat, y.seat);
            assert_eq!(x.amount, y.amount);
        }
    }

    #[test]
    fn every_reveal_names_a_ranked_hand() {
        let hand = check_down(open(&[800, 800, 800], 2, "seed-e"));
        let result = hand.resolve();
        assert_eq!(result.revealed.len(), 3);
        for reveal in &result.revealed {
            assert!(!reveal.hand_name.is_empty());
            assert_eq!(reveal.best.len(), 5);
        }
    }
}
