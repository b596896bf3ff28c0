/// Split a pot into the winners' share and the house share.
///
/// `percent` is whole percentage points; `cap` bounds the take when given.
/// Integer floor division; the house never rounds up.
pub fn rake(pot: Chips, percent: u64, cap: Option<Chips>) -> (Chips, Chips) {
    let take = (pot * percent / 100).min(cap.unwrap_or(Chips::MAX));
    (pot - take, take)
}

/// Deduct the rake proportionally from winner payouts.
///
/// Each winner loses `floor(share * rake / total)`; flooring shortfall
/// comes off the largest remaining share so the house take is exact.
/// Returns the adjusted winners and the amount actually collected.
pub fn prorate(
    winners: &[Winner],
    pot: Chips,
    percent: u64,
    cap: Option<Chips>,
) -> (Vec<Winner>, Chips) {
    let (_, take) = rake(pot, percent, cap);
    let total = winners.iter().map(|w| w.amount).sum::<Chips>();
    if take == 0 || total == 0 {
        return (winners.to_vec(), 0);
    }
    let mut adjusted = winners.to_vec();
    let mut collected: Chips = 0;
    for winner in adjusted.iter_mut() {
        let cut = take * winner.amount / total;
        winner.amount -= cut;
        collected += cut;
    }
    let leftover = take - collected;
    if leftover > 0 {
        if let Some(winner) = adjusted.iter_mut().max_by_key(|w| w.amount) {
            let cut = leftover.min(winner.amount);
            winner.amount -= cut;
            collected += cut;
        }
    }
    (adjusted, collected)
}

use super::result::Winner;
use gf_core::Chips;

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(seat: usize, amount: Chips) -> Winner {
        Winner {
            seat,
            player: format!("p{}", seat),
            amount,
        }
    }

    #[test]
    fn five_percent_uncapped() {
        assert_eq!(rake(1_000, 5, None), (950, 50));
    }

    #[test]
    fn cap_binds() {
        assert_eq!(rake(10_000, 5, Some(100)), (9_900, 100));
    }

    #[test]
    fn floor_division_favors_players() {
        assert_eq!(rake(99, 5, None), (95, 4));
    }

    #[test]
    fn zero_pot_zero_rake() {
        assert_eq!(rake(0, 5, Some(100)), (0, 0));
    }

    #[test]
    fn prorate_splits_the_take_across_winners() {
        let winners = vec![winner(0, 600), winner(1, 400)];
        let (adjusted, collected) = prorate(&winners, 1_000, 5, None);
        assert_eq!(collected, 50);
        assert_eq!(adjusted[0].amount, 570);
        assert_eq!(adjusted[1].amount, 380);
    }

    #[test]
    fn prorate_collects_flooring_leftover_exactly() {
        let winners = vec![winner(0, 333), winner(1, 333), winner(2, 333)];
        let (adjusted, collected) = prorate(&winners, 999, 5, None);
        let (_, take) = rake(999, 5, None);
        assert_eq!(collected, take);
        assert_eq!(
            adjusted.iter().map(|w| w.amount).sum::<Chips>(),
            999 - take
        );
    }

    #[test]
    fn prorate_with_no_winners_is_a_no_op() {
        let (adjusted, collected) = prorate(&[], 1_000, 5, None);
        assert!(adjusted.is_empty());
        assert_eq!(collected, 0);
    }
}
