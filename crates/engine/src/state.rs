/// The immutable per-hand value.
///
/// Transitions clone the state, mutate the clone, and return it; callers
/// that hit a validation error keep their original untouched. Hands are
/// tiny, so the clone per transition is noise.
#[derive(Debug, Clone, PartialEq)]
pub struct HandState {
    id: String,
    seed: String,
    phase: HandPhase,
    deck: Deck,
    players: Vec<HandPlayer>,
    community: Vec<Card>,
    pot: Chips,
    side_pots: Vec<SidePot>,
    current_bet: Chips,
    last_raise: Chips,
    active: Position,
    dealer: Position,
    small_blind: Position,
    big_blind: Position,
    config: TableConfig,
    log: Vec<ActionRecord>,
    sequence: u64,
    complete: bool,
}

impl HandState {
    /// Open a fresh hand: shuffle from the seed, post blinds, deal holes.
    ///
    /// `players` must be seat-ordered with positive stacks; `dealer` indexes
    /// into that vector. Heads-up the dealer posts the small blind,
    /// otherwise the seat to the dealer's left does. The first preflop
    /// actor is the seat after the big blind.
    pub fn open(
        players: Vec<HandPlayer>,
        config: TableConfig,
        dealer: Position,
        id: String,
        seed: String,
    ) -> Result<Self, EngineError> {
        if players.len() < 2 || players.iter().any(|p| p.chips == 0) {
            return Err(EngineError::NotEnoughPlayers);
        }
        let n = players.len();
        let dealer = dealer % n;
        let (small_blind, big_blind) = match n {
            2 => (dealer, (dealer + 1) % n),
            _ => ((dealer + 1) % n, (dealer + 2) % n),
        };
        let mut hand = Self {
            id,
            deck: Deck::shuffled(&seed),
            seed,
            phase: HandPhase::Preflop,
            players,
            community: Vec::new(),
            pot: 0,
            side_pots: Vec::new(),
            current_bet: config.big_blind,
            last_raise: config.big_blind,
            active: 0,
            dealer,
            small_blind,
            big_blind,
            config,
            log: Vec::new(),
            sequence: 0,
            complete: false,
        };
        let sb = hand.config.small_blind;
        let bb = hand.config.big_blind;
        hand.pot += hand.players[small_blind].commit(sb);
        hand.pot += hand.players[big_blind].commit(bb);
        for i in 0..n {
            let first = hand.deck.draw().ok_or(EngineError::EmptyDeck)?;
            let second = hand.deck.draw().ok_or(EngineError::EmptyDeck)?;
            hand.players[i].hole = Some([first, second]);
        }
        hand.side_pots = SidePot::build(&hand.players);
        hand.active = hand.next_actor_from(big_blind).unwrap_or(big_blind);
        Ok(hand)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn seed(&self) -> &str {
        &self.seed
    }
    pub fn phase(&self) -> HandPhase {
        self.phase
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn players(&self) -> &[HandPlayer] {
        &self.players
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn side_pots(&self) -> &[SidePot] {
        &self.side_pots
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn dealer(&self) -> Position {
        self.dealer
    }
    pub fn small_blind(&self) -> Position {
        self.small_blind
    }
    pub fn big_blind(&self) -> Position {
        self.big_blind
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn log(&self) -> &[ActionRecord] {
        &self.log
    }
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
    pub fn is_complete(&self) -> bool {
        self.complete
    }
    /// Smallest legal raise-to amount.
    pub fn min_raise_to(&self) -> Chips {
        self.current_bet + self.last_raise
    }
    /// The player whose turn it is, if anyone can still act.
    pub fn actor(&self) -> Option<&HandPlayer> {
        if self.complete {
            return None;
        }
        self.players.get(self.active).filter(|p| p.can_act())
    }
    pub fn player_index(&self, id: &str) -> Option<Position> {
        self.players.iter().position(|p| p.id == id)
    }
    /// True once every live player is all-in and streets must auto-run.
    pub fn needs_runout(&self) -> bool {
        !self.complete && self.players.iter().filter(|p| p.can_act()).count() == 0
    }

    /// Apply one action by the active player.
    pub fn act(&self, action: Action) -> Result<Self, EngineError> {
        if self.complete {
            return Err(EngineError::HandComplete);
        }
        let actor = self
            .players
            .get(self.active)
            .filter(|p| p.can_act())
            .ok_or(EngineError::OutOfChips)?;
        if actor.chips == 0 {
            return Err(EngineError::OutOfChips);
        }
        let mut next = self.clone();
        let idx = self.active;
        match action {
            Action::Fold => {
                next.players[idx].folded = true;
            }
            Action::Check => {
                if self.current_bet != actor.current_bet {
                    return Err(EngineError::IllegalCheck {
                        owed: self.current_bet - actor.current_bet,
                    });
                }
            }
            Action::Call => {
                let owed = self.current_bet.saturating_sub(actor.current_bet);
                if owed == 0 {
                    return Err(EngineError::NothingToCall);
                }
                let paid = next.players[idx].commit(owed);
                next.pot += paid;
            }
            Action::Raise(to) => {
                if to <= self.current_bet {
                    return Err(EngineError::RaiseTooSmall {
                        minimum: self.min_raise_to(),
                    });
                }
                let needed = to - actor.current_bet;
                if needed > actor.chips {
                    return Err(EngineError::InsufficientChips { stack: actor.chips });
                }
                let full = to >= self.min_raise_to();
                if !full && needed < actor.chips {
                    return Err(EngineError::RaiseTooSmall {
                        minimum: self.min_raise_to(),
                    });
                }
                let paid = next.players[idx].commit(needed);
                next.pot += paid;
                if full {
                    next.last_raise = to - self.current_bet;
                    next.reopen(idx);
                }
                next.current_bet = to;
            }
            Action::AllIn => {
                let to = actor.current_bet + actor.chips;
                let paid = next.players[idx].commit(actor.chips);
                next.pot += paid;
                if to > self.current_bet {
                    // a short all-in raises the amount to match without
                    // reopening action for players already in at the level
                    if to >= self.min_raise_to() {
                        next.last_raise = to - self.current_bet;
                        next.reopen(idx);
                    }
                    next.current_bet = to;
                }
            }
        }
        next.players[idx].has_acted = true;
        next.sequence += 1;
        next.log.push(ActionRecord {
            sequence: next.sequence,
            seat: next.players[idx].seat,
            player: next.players[idx].id.clone(),
            phase: next.phase,
            action,
        });
        next.side_pots = SidePot::build(&next.players);
        next.settle_round()?;
        next.audit();
        Ok(next)
    }

    /// Fold on behalf of the active player. Same post-state as an explicit
    /// fold submitted by that player; used on turn-timer expiry.
    pub fn auto_fold(&self) -> Result<Self, EngineError> {
        self.act(Action::Fold)
    }

    /// Advance one street of an all-in runout.
    pub fn runout(&self) -> Result<Self, EngineError> {
        if self.complete {
            return Err(EngineError::HandComplete);
        }
        if !self.needs_runout() {
            return Err(EngineError::BettingOpen);
        }
        let mut next = self.clone();
        next.advance()?;
        next.audit();
        Ok(next)
    }

    /// Fold a player out of turn, for a seat that leaves mid-hand.
    ///
    /// The actor's own leave routes through [`auto_fold`](Self::auto_fold);
    /// anyone else is marked folded in place, which may close the round or
    /// end the hand. Already-folded and departed-hand cases are no-ops.
    pub fn withdraw(&self, id: &str) -> Result<Self, EngineError> {
        if self.complete {
            return Ok(self.clone());
        }
        let index = self
            .player_index(id)
            .ok_or_else(|| EngineError::UnknownPlayer(id.to_string()))?;
        if self.players[index].folded {
            return Ok(self.clone());
        }
        if self.actor().map(|p| p.id == id).unwrap_or(false) {
            return self.auto_fold();
        }
        let mut next = self.clone();
        next.players[index].folded = true;
        next.sequence += 1;
        next.log.push(ActionRecord {
            sequence: next.sequence,
            seat: next.players[index].seat,
            player: next.players[index].id.clone(),
            phase: next.phase,
            action: Action::Fold,
        });
        next.side_pots = SidePot::build(&next.players);
        // unlike an in-turn action this must not move the active player,
        // who still owes a decision unless the fold closed the round
        if next.players.iter().filter(|p| p.live()).count() == 1 {
            next.complete = true;
        } else if next.round_complete() {
            next.advance()?;
        }
        next.audit();
        Ok(next)
    }

    /// Dissolve the hand: every player's contribution returns to their
    /// stack. Used when seated count collapses mid-hand and on internal
    /// invariant faults.
    pub fn cancel(&self) -> Self {
        let mut next = self.clone();
        for player in next.players.iter_mut() {
            player.chips += player.total_contributed;
            player.total_contributed = 0;
            player.current_bet = 0;
            player.all_in = false;
        }
        next.pot = 0;
        next.side_pots.clear();
        next.complete = true;
        next
    }

    /// Round-completion check and phase advancement after an action.
    fn settle_round(&mut self) -> Result<(), EngineError> {
        if self.players.iter().filter(|p| p.live()).count() == 1 {
            self.complete = true;
            return Ok(());
        }
        if self.round_complete() {
            self.advance()
        } else {
            self.active = self.next_actor_from(self.active).unwrap_or(self.active);
            Ok(())
        }
    }

    /// A betting round is complete when every player who can still act has
    /// acted at the current bet level. Vacuously complete when nobody can.
    fn round_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.has_acted && p.current_bet == self.current_bet)
    }

    /// Reset round state and deal the next street; rivers fall through to
    /// showdown. Post-flop the first actor is the seat after the dealer.
    fn advance(&mut self) -> Result<(), EngineError> {
        for player in self.players.iter_mut() {
            player.current_bet = 0;
            player.has_acted = false;
        }
        self.current_bet = 0;
        self.last_raise = self.config.big_blind;
        let phase = self.phase.next().expect("advance from a betting phase");
        self.phase = phase;
        if phase == HandPhase::Showdown {
            self.complete = true;
            return Ok(());
        }
        self.deck.draw().ok_or(EngineError::EmptyDeck)?; // burn
        for _ in 0..phase.reveals() {
            let card = self.deck.draw().ok_or(EngineError::EmptyDeck)?;
            self.community.push(card);
        }
        self.active = self.next_actor_from(self.dealer).unwrap_or(self.dealer);
        Ok(())
    }

    /// A full raise puts everyone else back on the clock.
    fn reopen(&mut self, raiser: Position) {
        for (i, player) in self.players.iter_mut().enumerate() {
            if i != raiser && player.can_act() {
                player.has_acted = false;
            }
        }
    }

    /// First player after `from` (wrapping) who can still act.
    fn next_actor_from(&self, from: Position) -> Option<Position> {
        let n = self.players.len();
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|i| self.players[*i].can_act())
    }

    /// Money-conservation checks, debug builds only.
    fn audit(&self) {
        debug_assert_eq!(
            self.pot,
            self.players.iter().map(|p| p.total_contributed).sum::<Chips>(),
            "pot must equal total contributions"
        );
        debug_assert_eq!(
            self.pot,
            self.side_pots.iter().map(|p| p.amount).sum::<Chips>(),
            "side pots must partition the pot"
        );
    }
}

use super::action::Action;
use super::config::TableConfig;
use super::error::EngineError;
use super::phase::HandPhase;
use super::player::HandPlayer;
use super::pots::SidePot;
use super::record::ActionRecord;
use gf_cards::Card;
use gf_cards::Deck;
use gf_core::Chips;
use gf_core::Position;

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sb: Chips, bb: Chips) -> TableConfig {
        TableConfig {
            small_blind: sb,
            big_blind: bb,
            min_buy_in: bb * 10,
            max_buy_in: bb * 200,
            ..TableConfig::default()
        }
    }

    fn players(stacks: &[Chips]) -> Vec<HandPlayer> {
        stacks
            .iter()
            .enumerate()
            .map(|(i, stack)| HandPlayer::new(format!("p{}", i + 1), i, format!("P{}", i + 1), *stack))
            .collect()
    }

    fn open(stacks: &[Chips], sb: Chips, bb: Chips, dealer: usize) -> HandState {
        HandState::open(
            players(stacks),
            config(sb, bb),
            dealer,
            "hand-1".to_string(),
            "seed-1".to_string(),
        )
        .expect("open hand")
    }

    fn total_chips(hand: &HandState) -> Chips {
        hand.players().iter().map(|p| p.chips).sum::<Chips>() + hand.pot()
    }

    #[test]
    fn heads_up_dealer_posts_small_blind() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        assert_eq!(hand.small_blind(), 0);
        assert_eq!(hand.big_blind(), 1);
        assert_eq!(hand.pot(), 30);
        assert_eq!(hand.current_bet(), 20);
        // first preflop actor is the seat after the big blind: the dealer
        assert_eq!(hand.actor().expect("actor").seat, 0);
    }

    #[test]
    fn three_handed_blind_positions() {
        let hand = open(&[1_000, 1_000, 1_000], 10, 20, 0);
        assert_eq!(hand.small_blind(), 1);
        assert_eq!(hand.big_blind(), 2);
        assert_eq!(hand.actor().expect("actor").seat, 0);
    }

    #[test]
    fn every_player_dealt_two_cards() {
        let hand = open(&[1_000, 1_000, 1_000], 10, 20, 0);
        assert!(hand.players().iter().all(|p| p.hole.is_some()));
    }

    #[test]
    fn seed_reproduces_the_deal() {
        let a = open(&[1_000, 1_000], 10, 20, 0);
        let b = open(&[1_000, 1_000], 10, 20, 0);
        assert_eq!(a.players()[0].hole, b.players()[0].hole);
        assert_eq!(a.players()[1].hole, b.players()[1].hole);
    }

    #[test]
    fn zero_stack_player_rejected() {
        let result = HandState::open(
            players(&[1_000, 0]),
            config(10, 20),
            0,
            "h".to_string(),
            "s".to_string(),
        );
        assert_eq!(result.unwrap_err(), EngineError::NotEnoughPlayers);
    }

    #[test]
    fn check_facing_bet_rejected() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        // small blind owes 10 into the 20
        assert!(matches!(
            hand.act(Action::Check),
            Err(EngineError::IllegalCheck { owed: 10 })
        ));
    }

    #[test]
    fn raise_below_minimum_rejected() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        // min raise-to preflop is 40 (big blind + big blind)
        assert!(matches!(
            hand.act(Action::Raise(30)),
            Err(EngineError::RaiseTooSmall { minimum: 40 })
        ));
        assert!(hand.act(Action::Raise(40)).is_ok());
    }

    #[test]
    fn raise_beyond_stack_rejected() {
        let hand = open(&[100, 1_000], 10, 20, 0);
        assert!(matches!(
            hand.act(Action::Raise(200)),
            Err(EngineError::InsufficientChips { stack: 90 })
        ));
    }

    #[test]
    fn big_blind_keeps_the_option() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Call).expect("sb calls");
        // the big blind has not acted: the round is still open
        assert_eq!(hand.phase(), HandPhase::Preflop);
        assert_eq!(hand.actor().expect("actor").seat, 1);
        let hand = hand.act(Action::Check).expect("bb checks");
        assert_eq!(hand.phase(), HandPhase::Flop);
        assert_eq!(hand.community().len(), 3);
    }

    #[test]
    fn postflop_first_actor_is_left_of_dealer() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Call).expect("call");
        let hand = hand.act(Action::Check).expect("check");
        // heads-up: dealer is small blind, so the other seat opens the flop
        assert_eq!(hand.actor().expect("actor").seat, 1);
    }

    #[test]
    fn heads_up_fold_ends_hand() {
        // call, check, flop bet 40, fold
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Call).expect("P1 calls");
        let hand = hand.act(Action::Check).expect("P2 checks");
        let hand = hand.act(Action::Raise(40)).expect("P2 bets 40");
        let hand = hand.act(Action::Fold).expect("P1 folds");
        assert!(hand.is_complete());
        assert_eq!(hand.pot(), 80);
        assert_eq!(hand.log().len(), 4);
        let result = hand.resolve();
        assert_eq!(result.win_label, "Last Player Standing");
        assert_eq!(result.winners.len(), 1);
        assert_eq!(result.winners[0].seat, 1);
        assert_eq!(result.winners[0].amount, 80);
        assert!(result.revealed.is_empty());
        // P1 is down exactly the 20 they called off
        assert_eq!(hand.players()[0].chips, 980);
    }

    #[test]
    fn full_raise_reopens_action() {
        let hand = open(&[1_000, 1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Call).expect("dealer calls");
        let hand = hand.act(Action::Call).expect("sb completes");
        let hand = hand.act(Action::Raise(60)).expect("bb raises");
        // both callers owe again
        assert!(!hand.players()[0].has_acted);
        assert!(!hand.players()[1].has_acted);
        assert!(hand.players()[2].has_acted);
        assert_eq!(hand.min_raise_to(), 100);
    }

    #[test]
    fn short_all_in_does_not_reopen() {
        // dealer raises to 60; sb shoves 75 total, below the min re-raise of 100
        let hand = open(&[1_000, 75, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Raise(60)).expect("dealer raises");
        let hand = hand.act(Action::AllIn).expect("sb shoves short");
        assert_eq!(hand.current_bet(), 75);
        // the dealer already acted at 60 and the short shove does not
        // reopen, so after the bb folds the dealer owes only the call
        assert!(hand.players()[0].has_acted);
        let hand = hand.act(Action::Fold).expect("bb folds");
        assert_eq!(hand.actor().expect("actor").seat, 0);
        let hand = hand.act(Action::Call).expect("dealer calls 15 more");
        // betting round closed without offering a re-raise
        assert!(hand.phase() > HandPhase::Preflop || hand.needs_runout());
    }

    #[test]
    fn raise_one_unit_above_short_threshold_reopens() {
        // same shape but the shove is a full raise: 100 >= 60 + 40
        let hand = open(&[1_000, 100, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Raise(60)).expect("dealer raises");
        let hand = hand.act(Action::AllIn).expect("sb shoves full");
        assert_eq!(hand.current_bet(), 100);
        assert!(!hand.players()[0].has_acted);
        assert_eq!(hand.min_raise_to(), 140);
    }

    #[test]
    fn all_in_call_is_implicit() {
        let hand = open(&[1_000, 50, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Raise(200)).expect("dealer raises big");
        let hand = hand.act(Action::Call).expect("sb calls for less");
        let short = &hand.players()[1];
        assert!(short.all_in);
        assert_eq!(short.chips, 0);
        assert_eq!(short.total_contributed, 50);
    }

    #[test]
    fn all_in_cascade_runs_out() {
        // three stacks, everyone all-in preflop
        let mut hand = open(&[100, 200, 300], 10, 20, 0);
        hand = hand.act(Action::AllIn).expect("dealer shoves 100");
        hand = hand.act(Action::AllIn).expect("sb shoves 200");
        hand = hand.act(Action::AllIn).expect("bb calls all-in 300");
        assert!(hand.needs_runout());
        assert_eq!(hand.pot(), 600);
        let mut streets = 0;
        while hand.needs_runout() {
            hand = hand.runout().expect("runout");
            streets += 1;
        }
        assert_eq!(streets, 3);
        assert!(hand.is_complete());
        assert_eq!(hand.community().len(), 5);
        // pots layer at 100 and 200
        assert_eq!(hand.side_pots().len(), 3);
        assert_eq!(hand.side_pots()[0].amount, 300);
        assert_eq!(hand.side_pots()[1].amount, 200);
        assert_eq!(hand.side_pots()[2].amount, 100);
    }

    #[test]
    fn equal_all_in_contributions_single_pot() {
        // shove 100, called by two deeper stacks,
        // who then check the hand down
        let mut hand = open(&[100, 200, 300], 10, 20, 0);
        hand = hand.act(Action::AllIn).expect("P1 shoves 100");
        hand = hand.act(Action::Call).expect("P2 calls 100");
        hand = hand.act(Action::Call).expect("P3 calls 100");
        assert_eq!(hand.pot(), 300);
        assert_eq!(hand.phase(), HandPhase::Flop);
        for _ in 0..2 {
            // two live players check each remaining street
            hand = hand.act(Action::Check).expect("check");
        }
        for _ in 0..2 {
            hand = hand.act(Action::Check).expect("check");
        }
        for _ in 0..2 {
            hand = hand.act(Action::Check).expect("check");
        }
        assert!(hand.is_complete());
        assert_eq!(hand.side_pots().len(), 1);
        assert_eq!(hand.side_pots()[0].amount, 300);
        assert_eq!(hand.side_pots()[0].eligible, vec![0, 1, 2]);
        let result = hand.resolve();
        assert_eq!(
            result.winners.iter().map(|w| w.amount).sum::<Chips>(),
            300
        );
    }

    #[test]
    fn short_stack_side_pot_scenario() {
        // P1 30 all-in; P2 and P3 bet 70 more between them
        let mut hand = open(&[30, 1_000, 1_000], 10, 20, 0);
        hand = hand.act(Action::AllIn).expect("P1 all-in 30");
        hand = hand.act(Action::Raise(100)).expect("P2 raises to 100");
        hand = hand.act(Action::Call).expect("P3 calls 100");
        assert_eq!(hand.phase(), HandPhase::Flop);
        assert_eq!(hand.pot(), 230);
        assert_eq!(hand.side_pots().len(), 2);
        assert_eq!(hand.side_pots()[0].amount, 90);
        assert_eq!(hand.side_pots()[0].eligible, vec![0, 1, 2]);
        assert_eq!(hand.side_pots()[1].amount, 140);
        assert_eq!(hand.side_pots()[1].eligible, vec![1, 2]);
    }

    #[test]
    fn auto_fold_matches_explicit_fold() {
        let hand = open(&[1_000, 1_000, 1_000], 10, 20, 0);
        let folded = hand.act(Action::Fold).expect("fold");
        let auto = hand.auto_fold().expect("auto fold");
        assert_eq!(folded.players()[0].folded, auto.players()[0].folded);
        assert_eq!(folded.pot(), auto.pot());
        assert_eq!(folded.sequence(), auto.sequence());
        assert_eq!(folded.log(), auto.log());
        assert_eq!(
            folded.actor().map(|p| p.seat),
            auto.actor().map(|p| p.seat)
        );
    }

    #[test]
    fn chips_conserved_across_a_full_hand() {
        let mut hand = open(&[500, 700, 900], 25, 50, 1);
        let before = total_chips(&hand);
        hand = hand.act(Action::Raise(150)).expect("raise");
        hand = hand.act(Action::Call).expect("call");
        hand = hand.act(Action::Fold).expect("fold");
        assert_eq!(total_chips(&hand), before);
        hand = hand.act(Action::Check).expect("check");
        hand = hand.act(Action::Raise(100)).expect("bet");
        hand = hand.act(Action::Call).expect("call");
        assert_eq!(total_chips(&hand), before);
        let result = hand.clone();
        assert!(!result.is_complete());
    }

    #[test]
    fn sequence_survives_round_reset() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Call).expect("call");
        let hand = hand.act(Action::Check).expect("check");
        assert_eq!(hand.phase(), HandPhase::Flop);
        assert_eq!(hand.sequence(), 2);
        let hand = hand.act(Action::Check).expect("check flop");
        assert_eq!(hand.sequence(), 3);
    }

    #[test]
    fn cancel_refunds_contributions() {
        let hand = open(&[1_000, 1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Raise(100)).expect("raise");
        let cancelled = hand.cancel();
        assert!(cancelled.is_complete());
        assert_eq!(cancelled.pot(), 0);
        assert!(cancelled.players().iter().all(|p| p.chips == 1_000));
    }

    #[test]
    fn acting_on_complete_hand_rejected() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        let hand = hand.act(Action::Fold).expect("fold ends it");
        assert!(hand.is_complete());
        assert_eq!(hand.act(Action::Check), Err(EngineError::HandComplete));
    }

    #[test]
    fn runout_rejected_while_betting_open() {
        let hand = open(&[1_000, 1_000], 10, 20, 0);
        assert_eq!(hand.runout().unwrap_err(), EngineError::BettingOpen);
    }
}
