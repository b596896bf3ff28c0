/// One partition of the pot. Eligibility is by seat index and is limited to
/// live players who contributed at least the pot's cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePot {
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

impl SidePot {
    /// Partition the players' contributions at each distinct all-in cap.
    ///
    /// Caps walk ascending; each layer collects every player's contribution
    /// between the previous cap and this one (folded contributions included
    /// in the amount, excluded from eligibility). Whatever sits above the
    /// last cap forms the final pot for the live players still unbounded.
    /// The returned pots always sum to the total contributed.
    pub fn build(players: &[HandPlayer]) -> Vec<SidePot> {
        let mut caps = players
            .iter()
            .filter(|p| p.all_in && p.live())
            .map(|p| p.total_contributed)
            .filter(|cap| *cap > 0)
            .collect::<Vec<Chips>>();
        caps.sort_unstable();
        caps.dedup();
        let mut pots = Vec::new();
        let mut prev: Chips = 0;
        for cap in caps {
            let amount = players
                .iter()
                .map(|p| p.total_contributed.min(cap).saturating_sub(prev))
                .sum::<Chips>();
            let eligible = players
                .iter()
                .filter(|p| p.live() && p.total_contributed >= cap)
                .map(|p| p.seat)
                .collect::<Vec<Position>>();
            if amount > 0 {
                pots.push(SidePot { amount, eligible });
            }
            prev = cap;
        }
        let remainder = players
            .iter()
            .map(|p| p.total_contributed.saturating_sub(prev))
            .sum::<Chips>();
        if remainder > 0 {
            let eligible = players
                .iter()
                .filter(|p| p.live() && p.total_contributed > prev)
                .map(|p| p.seat)
                .collect::<Vec<Position>>();
            pots.push(SidePot {
                amount: remainder,
                eligible,
            });
        }
        pots
    }
}

use super::player::HandPlayer;
use gf_core::Chips;
use gf_core::Position;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests {
    use super::*;

    fn player(seat: Position, contributed: Chips, all_in: bool, folded: bool) -> HandPlayer {
        let mut p = HandPlayer::new(format!("p{}", seat), seat, format!("P{}", seat), 1_000);
        p.total_contributed = contributed;
        p.all_in = all_in;
        p.folded = folded;
        p
    }

    #[test]
    fn no_all_ins_single_pot() {
        let players = vec![
            player(0, 40, false, false),
            player(1, 40, false, false),
            player(2, 40, false, true),
        ];
        let pots = SidePot::build(&players);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 120);
        assert_eq!(pots[0].eligible, vec![0, 1]);
    }

    #[test]
    fn short_stack_splits_main_and_side() {
        // 30 all-in vs two players at 100: 90 main, 140 side
        let players = vec![
            player(0, 30, true, false),
            player(1, 100, false, false),
            player(2, 100, false, false),
        ];
        let pots = SidePot::build(&players);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 90);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 140);
        assert_eq!(pots[1].eligible, vec![1, 2]);
    }

    #[test]
    fn equal_all_in_contributions_collapse_to_one_pot() {
        let players = vec![
            player(0, 100, true, false),
            player(1, 100, false, false),
            player(2, 100, false, false),
        ];
        let pots = SidePot::build(&players);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
    }

    #[test]
    fn cascading_all_ins_layer_the_pot() {
        let players = vec![
            player(0, 100, true, false),
            player(1, 200, true, false),
            player(2, 300, false, false),
        ];
        let pots = SidePot::build(&players);
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 200);
        assert_eq!(pots[1].eligible, vec![1, 2]);
        assert_eq!(pots[2].amount, 100);
        assert_eq!(pots[2].eligible, vec![2]);
    }

    #[test]
    fn folded_chips_feed_the_pot_but_not_eligibility() {
        let players = vec![
            player(0, 50, true, false),
            player(1, 80, false, true),
            player(2, 80, false, false),
        ];
        let pots = SidePot::build(&players);
        assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), 210);
        assert_eq!(pots[0].eligible, vec![0, 2]);
        assert_eq!(pots[1].eligible, vec![2]);
    }

    #[test]
    fn pots_partition_exactly() {
        let players = vec![
            player(0, 17, true, false),
            player(1, 60, true, false),
            player(2, 88, false, false),
            player(3, 42, false, true),
        ];
        let total = players.iter().map(|p| p.total_contributed).sum::<Chips>();
        let pots = SidePot::build(&players);
        assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), total);
    }
}
