/// A hand's evaluated strength.
///
/// Built by exhaustive enumeration of every five-card subset of the five to
/// seven cards available, categorizing each subset and keeping the maximum.
/// Hand sizes are tiny (C(7,5) = 21 subsets) so brute force beats cleverness.
///
/// Ordering is total modulo exact ties: category first, then the tiebreak
/// vector element-wise. Two hands with equal category and tiebreaks are an
/// exact tie even when their five cards differ in suit.
#[derive(Debug, Clone)]
pub struct Strength {
    ranking: Ranking,
    cards: [Card; 5],
    tiebreak: Vec<Rank>,
}

impl Strength {
    /// Evaluate the best five-card hand from 5..=7 cards.
    pub fn evaluate(cards: &[Card]) -> Self {
        assert!(
            (5..=7).contains(&cards.len()),
            "evaluation takes five to seven cards"
        );
        let n = cards.len();
        let mut best: Option<Strength> = None;
        for a in 0..n - 4 {
            for b in a + 1..n - 3 {
                for c in b + 1..n - 2 {
                    for d in c + 1..n - 1 {
                        for e in d + 1..n {
                            let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                            let candidate = Self::categorize(five);
                            match best {
                                Some(ref strongest) if candidate <= *strongest => {}
                                _ => best = Some(candidate),
                            }
                        }
                    }
                }
            }
        }
        best.expect("at least one five-card subset")
    }

    pub fn ranking(&self) -> Ranking {
        self.ranking
    }
    /// The five cards forming the hand, strongest rank first.
    pub fn cards(&self) -> &[Card; 5] {
        &self.cards
    }
    pub fn tiebreak(&self) -> &[Rank] {
        &self.tiebreak
    }
    pub fn name(&self) -> &'static str {
        self.ranking.name()
    }

    /// Categorize exactly five cards.
    fn categorize(mut five: [Card; 5]) -> Self {
        five.sort_unstable_by(|a, b| b.rank().cmp(&a.rank()));
        let ranks = five.map(|c| c.rank());
        let flush = five.iter().all(|c| c.suit() == five[0].suit());
        let straight = Self::straight_high(&ranks);
        let groups = Self::groups(&ranks);
        let (ranking, tiebreak) = match groups.as_slice() {
            [(4, quad), (1, kick)] => (Ranking::FourOfAKind, vec![*quad, *kick]),
            [(3, trip), (2, pair)] => (Ranking::FullHouse, vec![*trip, *pair]),
            [(3, trip), (1, k1), (1, k2)] => (Ranking::ThreeOfAKind, vec![*trip, *k1, *k2]),
            [(2, hi), (2, lo), (1, kick)] => (Ranking::TwoPair, vec![*hi, *lo, *kick]),
            [(2, pair), (1, k1), (1, k2), (1, k3)] => {
                (Ranking::OnePair, vec![*pair, *k1, *k2, *k3])
            }
            _ => match (flush, straight) {
                (true, Some(Rank::Ace)) => (Ranking::RoyalFlush, vec![]),
                (true, Some(high)) => (Ranking::StraightFlush, vec![high]),
                (true, None) => (Ranking::Flush, ranks.to_vec()),
                (false, Some(high)) => (Ranking::Straight, vec![high]),
                (false, None) => (Ranking::HighCard, ranks.to_vec()),
            },
        };
        Self {
            ranking,
            cards: five,
            tiebreak,
        }
    }

    /// Straight high card over five distinct descending ranks, if any.
    /// The wheel A-2-3-4-5 plays with high card Five.
    fn straight_high(ranks: &[Rank; 5]) -> Option<Rank> {
        let distinct = ranks.windows(2).all(|w| w[0] != w[1]);
        if !distinct {
            return None;
        }
        if u8::from(ranks[0]) - u8::from(ranks[4]) == 4 {
            Some(ranks[0])
        } else if ranks[0] == Rank::Ace && ranks[1] == Rank::Five && ranks[4] == Rank::Two {
            Some(Rank::Five)
        } else {
            None
        }
    }

    /// (count, rank) groups sorted by count then rank, both descending.
    fn groups(ranks: &[Rank; 5]) -> Vec<(u8, Rank)> {
        let mut counts = [0u8; 13];
        for rank in ranks {
            counts[u8::from(*rank) as usize] += 1;
        }
        let mut groups = counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(i, n)| (*n, Rank::from(i as u8)))
            .collect::<Vec<_>>();
        groups.sort_unstable_by(|a, b| b.cmp(a));
        groups
    }
}

impl PartialEq for Strength {
    fn eq(&self, other: &Self) -> bool {
        self.ranking == other.ranking && self.tiebreak == other.tiebreak
    }
}
impl Eq for Strength {}
impl PartialOrd for Strength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Strength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranking
            .cmp(&other.ranking)
            .then_with(|| self.tiebreak.cmp(&other.tiebreak))
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.ranking)
    }
}

use super::card::Card;
use super::rank::Rank;
use super::ranking::Ranking;
use std::cmp::Ordering;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suit::Suit;

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace()
            .map(|c| c.parse().expect("card"))
            .collect()
    }

    fn strength(s: &str) -> Strength {
        Strength::evaluate(&cards(s))
    }

    #[test]
    fn high_card() {
        let s = strength("As Kh Qd Jc 9s");
        assert_eq!(s.ranking(), Ranking::HighCard);
        assert_eq!(s.tiebreak()[0], Rank::Ace);
    }

    #[test]
    fn one_pair_kickers_descend() {
        let s = strength("As Ah Kd Qc Js");
        assert_eq!(s.ranking(), Ranking::OnePair);
        assert_eq!(
            s.tiebreak(),
            &[Rank::Ace, Rank::King, Rank::Queen, Rank::Jack]
        );
    }

    #[test]
    fn two_pair_orders_high_low_kicker() {
        let s = strength("Ks Kh Ad Ac Qs");
        assert_eq!(s.ranking(), Ranking::TwoPair);
        assert_eq!(s.tiebreak(), &[Rank::Ace, Rank::King, Rank::Queen]);
    }

    #[test]
    fn three_of_a_kind() {
        assert_eq!(strength("As Ah Ad Kc Qs").ranking(), Ranking::ThreeOfAKind);
    }

    #[test]
    fn straight_broadway() {
        let s = strength("Ts Jh Qd Kc As");
        assert_eq!(s.ranking(), Ranking::Straight);
        assert_eq!(s.tiebreak(), &[Rank::Ace]);
    }

    #[test]
    fn wheel_straight_high_card_is_five() {
        let s = strength("As 2h 3d 4c 5s");
        assert_eq!(s.ranking(), Ranking::Straight);
        assert_eq!(s.tiebreak(), &[Rank::Five]);
    }

    #[test]
    fn wheel_loses_to_six_high() {
        assert!(strength("As 2h 3d 4c 5s") < strength("2s 3h 4d 5c 6s"));
    }

    #[test]
    fn flush_beats_straight() {
        assert!(strength("As Ks Qs Js 9s") > strength("Ts Jh Qd Kc As"));
    }

    #[test]
    fn full_house() {
        let s = strength("As Ah Ad Kc Ks");
        assert_eq!(s.ranking(), Ranking::FullHouse);
        assert_eq!(s.tiebreak(), &[Rank::Ace, Rank::King]);
    }

    #[test]
    fn four_of_a_kind() {
        assert_eq!(strength("As Ah Ad Ac Ks").ranking(), Ranking::FourOfAKind);
    }

    #[test]
    fn straight_flush_and_wheel_variant() {
        assert_eq!(strength("9s Ts Js Qs Ks").ranking(), Ranking::StraightFlush);
        let wheel = strength("As 2s 3s 4s 5s");
        assert_eq!(wheel.ranking(), Ranking::StraightFlush);
        assert_eq!(wheel.tiebreak(), &[Rank::Five]);
    }

    #[test]
    fn royal_flush() {
        assert_eq!(strength("Ts Js Qs Ks As").ranking(), Ranking::RoyalFlush);
    }

    #[test]
    fn seven_cards_pick_best_five() {
        // two pair plus stray cards
        let s = strength("As Ah Kd Kc Qs Jh 9d");
        assert_eq!(s.ranking(), Ranking::TwoPair);
        assert_eq!(s.tiebreak(), &[Rank::Ace, Rank::King, Rank::Queen]);
    }

    #[test]
    fn three_pairs_keep_best_two() {
        let s = strength("As Ah Kd Kc Qs Qh Jd");
        assert_eq!(s.ranking(), Ranking::TwoPair);
        assert_eq!(s.tiebreak(), &[Rank::Ace, Rank::King, Rank::Queen]);
    }

    #[test]
    fn royal_flush_beats_aces_on_board() {
        // community Kh Qh Jh Th 9h; Ah 2c makes royal, AcAd makes a straight
        let p1 = strength("Ah 2c Kh Qh Jh Th 9h");
        let p2 = strength("Ac Ad Kh Qh Jh Th 9h");
        assert_eq!(p1.ranking(), Ranking::RoyalFlush);
        assert_eq!(p2.ranking(), Ranking::StraightFlush);
        assert!(p1 > p2);
    }

    #[test]
    fn exact_ties_ignore_suits() {
        let a = strength("As Kh Qd Jc 9s");
        let b = strength("Ad Ks Qh Jd 9c");
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn suit_order_never_breaks_ties() {
        let spades = strength("2s 7h 9d Jc Ks");
        let clubs = strength("2c 7d 9h Js Kc");
        assert_eq!(spades.cmp(&clubs), Ordering::Equal);
    }

    #[test]
    fn total_over_any_six_card_input() {
        let s = strength("4h 6h 7h 8h 9h Ts");
        assert_eq!(s.ranking(), Ranking::Flush);
    }
}
