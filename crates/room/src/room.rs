use super::hooks::RoomHooks;
use super::inbox::RoomCmd;
use super::message::Outbox;
use super::message::ServerMessage;
use super::reservation::SeatReservation;
use super::seat::PersistedSeat;
use super::seat::Profile;
use super::seat::RoomPlayer;
use super::snapshot::LobbyEntry;
use super::snapshot::SeatView;
use super::snapshot::TableSnapshot;
use gf_core::COUNTDOWN_SECS;
use gf_core::Chips;
use gf_core::DISCONNECT_GRACE_SECS;
use gf_core::INTER_HAND_DELAY_SECS;
use gf_core::PlayerId;
use gf_core::Position;
use gf_core::RAKE_CAP;
use gf_core::RAKE_PERCENT;
use gf_core::RESERVATION_RELEASE_SECS;
use gf_core::RUNOUT_PAUSE_MS;
use gf_core::RoomId;
use gf_core::SHOWDOWN_PAUSE_MS;
use gf_core::SessionId;
use gf_engine::HandPhase;
use gf_engine::HandPlayer;
use gf_engine::HandState;
use gf_engine::TableConfig;
use gf_engine::prorate;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Handle to a spawned room task.
#[derive(Clone)]
pub struct RoomHandle {
    pub tx: UnboundedSender<RoomCmd>,
}

/// Timer durations, adjustable for tests.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timers {
    pub reservation: Duration,
    pub countdown_tick: Duration,
    pub inter_hand: Duration,
    pub runout: Duration,
    pub showdown: Duration,
    pub grace: Duration,
}

impl Default for Timers {
    fn default() -> Self {
        Self {
            reservation: Duration::from_secs(RESERVATION_RELEASE_SECS),
            countdown_tick: Duration::from_secs(1),
            inter_hand: Duration::from_secs(INTER_HAND_DELAY_SECS),
            runout: Duration::from_millis(RUNOUT_PAUSE_MS),
            showdown: Duration::from_millis(SHOWDOWN_PAUSE_MS),
            grace: Duration::from_secs(DISCONNECT_GRACE_SECS),
        }
    }
}

/// One live table. Owns its seats, reservations, timers, and hand state;
/// every mutation flows through [`handle`](Room::handle) off a single
/// inbox, so the room is a single-writer domain by construction.
pub struct Room {
    id: RoomId,
    name: String,
    creator: PlayerId,
    config: TableConfig,
    persistent: bool,
    hooks: Arc<dyn RoomHooks>,
    seats: BTreeMap<Position, RoomPlayer>,
    reservations: HashMap<Position, SeatReservation>,
    sessions: HashMap<SessionId, Outbox>,
    grace_stamps: HashMap<PlayerId, u64>,
    hand: Option<HandState>,
    last_dealer_seat: Option<Position>,
    countdown: Option<u32>,
    turn_deadline: Option<u64>,
    turn_epoch: u64,
    countdown_epoch: u64,
    hand_epoch: u64,
    stamp: u64,
    pub(crate) timers: Timers,
    dead: bool,
    tx: UnboundedSender<RoomCmd>,
}

impl Room {
    pub fn new(
        id: RoomId,
        name: String,
        creator: PlayerId,
        config: TableConfig,
        persistent: bool,
        hooks: Arc<dyn RoomHooks>,
        restored: Vec<PersistedSeat>,
    ) -> (Self, UnboundedReceiver<RoomCmd>) {
        let (tx, rx) = unbounded_channel();
        let seats = restored
            .iter()
            .filter(|seat| seat.seat_index < config.max_seats)
            .map(|seat| (seat.seat_index, RoomPlayer::from(seat)))
            .collect::<BTreeMap<Position, RoomPlayer>>();
        let room = Self {
            id,
            name,
            creator,
            config,
            persistent,
            hooks,
            seats,
            reservations: HashMap::new(),
            sessions: HashMap::new(),
            grace_stamps: HashMap::new(),
            hand: None,
            last_dealer_seat: None,
            countdown: None,
            turn_deadline: None,
            turn_epoch: 0,
            countdown_epoch: 0,
            hand_epoch: 0,
            stamp: 0,
            timers: Timers::default(),
            dead: false,
            tx,
        };
        (room, rx)
    }

    pub fn spawn(
        id: RoomId,
        name: String,
        creator: PlayerId,
        config: TableConfig,
        persistent: bool,
        hooks: Arc<dyn RoomHooks>,
        restored: Vec<PersistedSeat>,
    ) -> RoomHandle {
        let (room, rx) = Self::new(id, name, creator, config, persistent, hooks, restored);
        let handle = RoomHandle {
            tx: room.tx.clone(),
        };
        tokio::spawn(room.run(rx));
        handle
    }

    async fn run(mut self, mut rx: UnboundedReceiver<RoomCmd>) {
        log::info!("[room {}] open", self.id);
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd).await;
            if self.dead {
                break;
            }
        }
        log::info!("[room {}] closed", self.id);
    }

    pub async fn handle(&mut self, cmd: RoomCmd) {
        match cmd {
            RoomCmd::Watch { session, outbox } => self.watch(session, outbox),
            RoomCmd::Unwatch { session } => {
                self.sessions.remove(&session);
            }
            RoomCmd::Reserve {
                seat,
                player,
                reply,
            } => {
                let _ = reply.send(self.reserve(seat, player));
            }
            RoomCmd::Release { seat, player } => self.release(seat, player.as_deref()),
            RoomCmd::Join {
                player,
                session,
                outbox,
                buy_in,
                seat,
                vault_settled,
                user,
                wallet,
                reply,
            } => {
                let result = self.join(player, session, outbox, buy_in, seat, vault_settled, user, wallet);
                let _ = reply.send(result);
            }
            RoomCmd::Leave { session } => {
                if let Some(seat) = self.seat_by_session(&session) {
                    self.remove_seat(seat, false).await;
                }
            }
            RoomCmd::Action { session, action } => self.action(session, action),
            RoomCmd::Reconnect {
                player,
                session,
                outbox,
            } => self.reconnect(player, session, outbox),
            RoomCmd::Disconnect { session } => self.disconnect(session),
            RoomCmd::LobbyInfo { reply } => {
                let _ = reply.send(self.lobby_entry());
            }
            RoomCmd::TurnTimeout { epoch } => self.turn_timeout(epoch),
            RoomCmd::ReservationExpiry { seat, stamp } => self.reservation_expiry(seat, stamp),
            RoomCmd::CountdownTick { epoch } => self.countdown_tick(epoch),
            RoomCmd::StartHand { epoch } => {
                if epoch == self.hand_epoch && self.hand.is_none() && self.countdown.is_none() {
                    self.begin_hand();
                }
            }
            RoomCmd::RunoutStep { epoch } => self.runout_step(epoch),
            RoomCmd::ShowdownFinish { epoch } => self.finish_hand(epoch).await,
            RoomCmd::GraceExpiry { player, stamp } => self.grace_expiry(player, stamp).await,
            RoomCmd::DestroyCheck => {
                if !self.persistent
                    && self.seats.is_empty()
                    && self.sessions.is_empty()
                    && self.reservations.is_empty()
                {
                    self.dead = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // seat lifecycle
    // ------------------------------------------------------------------

    fn reserve(&mut self, seat: Position, player: Profile) -> Result<(), String> {
        if seat >= self.config.max_seats {
            return Err("no such seat".to_string());
        }
        if self.seats.contains_key(&seat) {
            return Err("seat occupied".to_string());
        }
        if let Some(held) = self.reservations.get(&seat) {
            if held.player != player.id {
                return Err("seat reserved by another player".to_string());
            }
        }
        // one reservation per player: release any other seat they hold
        let released = self
            .reservations
            .iter()
            .filter(|(s, r)| r.player == player.id && **s != seat)
            .map(|(s, _)| *s)
            .collect::<Vec<Position>>();
        for s in released {
            self.reservations.remove(&s);
            self.broadcast(ServerMessage::SeatReleased {
                table_id: self.id.clone(),
                seat: s,
            });
        }
        self.stamp += 1;
        let stamp = self.stamp;
        self.reservations.insert(
            seat,
            SeatReservation {
                seat,
                player: player.id.clone(),
                name: player.name.clone(),
                avatar_seed: player.avatar_seed.clone(),
                stamp,
            },
        );
        self.broadcast(ServerMessage::SeatReserved {
            table_id: self.id.clone(),
            seat,
            player_id: player.id,
        });
        self.broadcast_state();
        self.schedule(self.timers.reservation, RoomCmd::ReservationExpiry { seat, stamp });
        Ok(())
    }

    /// Idempotent release; with a player given, only that player's hold.
    fn release(&mut self, seat: Position, player: Option<&str>) {
        let matches = self
            .reservations
            .get(&seat)
            .map(|r| player.is_none() || player == Some(r.player.as_str()))
            .unwrap_or(false);
        if matches {
            self.reservations.remove(&seat);
            self.broadcast(ServerMessage::SeatReleased {
                table_id: self.id.clone(),
                seat,
            });
            self.broadcast_state();
        }
    }

    fn reservation_expiry(&mut self, seat: Position, stamp: u64) {
        let expired = self
            .reservations
            .get(&seat)
            .map(|r| r.stamp == stamp)
            .unwrap_or(false);
        if expired {
            log::debug!("[room {}] reservation on seat {} expired", self.id, seat);
            self.reservations.remove(&seat);
            self.broadcast(ServerMessage::SeatReleased {
                table_id: self.id.clone(),
                seat,
            });
            self.broadcast_state();
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn join(
        &mut self,
        player: Profile,
        session: SessionId,
        outbox: Outbox,
        buy_in: Chips,
        preferred: Option<Position>,
        vault_settled: bool,
        user: Option<gf_core::ID<gf_auth::User>>,
        wallet: Option<String>,
    ) -> Result<Position, String> {
        if self.seats.values().any(|p| p.id == player.id) {
            return Err("already seated at this table".to_string());
        }
        if self.seats.len() >= self.config.max_seats {
            return Err("table full".to_string());
        }
        if buy_in < self.config.min_buy_in || buy_in > self.config.max_buy_in {
            return Err("buy-in out of range".to_string());
        }
        let seat = match preferred {
            Some(seat) => {
                if seat >= self.config.max_seats {
                    return Err("no such seat".to_string());
                }
                if self.seats.contains_key(&seat) {
                    return Err("seat occupied".to_string());
                }
                if let Some(held) = self.reservations.get(&seat) {
                    if held.player != player.id {
                        return Err("seat reserved by another player".to_string());
                    }
                }
                seat
            }
            None => self.lowest_free_seat(&player.id).ok_or("table full")?,
        };
        // any reservation the player held is consumed by sitting
        let held = self
            .reservations
            .iter()
            .filter(|(_, r)| r.player == player.id)
            .map(|(s, _)| *s)
            .collect::<Vec<Position>>();
        for s in held {
            self.reservations.remove(&s);
            if s != seat {
                self.broadcast(ServerMessage::SeatReleased {
                    table_id: self.id.clone(),
                    seat: s,
                });
            }
        }
        let mut seated = RoomPlayer::new(&player, &session, seat, buy_in);
        seated.vault_settled = vault_settled;
        seated.user = user;
        seated.wallet = wallet;
        self.seats.insert(seat, seated);
        self.sessions.insert(session, outbox);
        log::info!(
            "[room {}] {} sat at seat {} with {}",
            self.id,
            player.id,
            seat,
            buy_in
        );
        self.broadcast(ServerMessage::PlayerJoined {
            table_id: self.id.clone(),
            seat,
            player_id: player.id,
            name: player.name,
        });
        self.broadcast_state();
        self.persist();
        self.start_countdown();
        Ok(seat)
    }

    fn lowest_free_seat(&self, player: &str) -> Option<Position> {
        (0..self.config.max_seats).find(|seat| {
            !self.seats.contains_key(seat)
                && self
                    .reservations
                    .get(seat)
                    .map(|r| r.player == player)
                    .unwrap_or(true)
        })
    }

    /// Remove a seat: auto-fold if they hold the action, cancel the hand
    /// if the table collapses below two, then settle their chips.
    async fn remove_seat(&mut self, seat: Position, kicked: bool) {
        let Some(player) = self.seats.remove(&seat) else {
            return;
        };
        self.grace_stamps.remove(&player.id);
        let mut chips = player.chips;
        if let Some(hand) = self.hand.take() {
            if !hand.is_complete() && hand.player_index(&player.id).is_some() {
                match hand.withdraw(&player.id) {
                    Ok(next) => {
                        if self.seats.len() < 2 {
                            // table collapsed mid-hand: dissolve the pot
                            let cancelled = next.cancel();
                            for p in cancelled.players() {
                                if p.id == player.id {
                                    chips = p.chips;
                                } else if let Some(seated) = self.seats.get_mut(&p.seat) {
                                    seated.chips = p.chips;
                                }
                            }
                            log::info!("[room {}] hand cancelled, pot dissolved", self.id);
                            self.clear_hand();
                        } else {
                            chips = next
                                .players()
                                .iter()
                                .find(|p| p.id == player.id)
                                .map(|p| p.chips)
                                .unwrap_or(chips);
                            self.apply_transition(next);
                        }
                    }
                    Err(e) => {
                        log::error!("[room {}] withdraw fault: {}, cancelling hand", self.id, e);
                        let cancelled = hand.cancel();
                        for p in cancelled.players() {
                            if p.id == player.id {
                                chips = p.chips;
                            } else if let Some(seated) = self.seats.get_mut(&p.seat) {
                                seated.chips = p.chips;
                            }
                        }
                        self.clear_hand();
                    }
                }
            } else {
                self.hand = Some(hand);
            }
        }
        let message = match kicked {
            true => ServerMessage::PlayerKicked {
                table_id: self.id.clone(),
                seat,
                player_id: player.id.clone(),
            },
            false => ServerMessage::PlayerLeft {
                table_id: self.id.clone(),
                seat,
                player_id: player.id.clone(),
            },
        };
        self.broadcast(message);
        self.broadcast_state();
        self.persist();
        if chips > 0 {
            self.settle(player, chips);
        }
        if self.countdown.is_some() && self.playable_count() < 2 {
            self.countdown = None;
            self.countdown_epoch += 1;
            self.broadcast_state();
        }
        if !self.persistent && self.seats.is_empty() && self.reservations.is_empty() {
            self.schedule(self.timers.grace, RoomCmd::DestroyCheck);
        }
    }

    /// Cash a leaver out off the room task; the result lands back on
    /// their connection when the settlement finishes.
    fn settle(&self, player: RoomPlayer, chips: Chips) {
        let hooks = self.hooks.clone();
        let room = self.id.clone();
        let outbox = self.sessions.get(&player.session).cloned();
        tokio::spawn(async move {
            let ticket = hooks.cash_out(&room, &player, chips).await;
            if let Some(outbox) = outbox {
                let _ = outbox.send(ServerMessage::CashOutComplete {
                    table_id: room,
                    amount: ticket.amount,
                    txid: ticket.txid,
                });
            }
        });
    }

    // ------------------------------------------------------------------
    // connections
    // ------------------------------------------------------------------

    fn watch(&mut self, session: SessionId, outbox: Outbox) {
        let snapshot = self.snapshot_for(self.player_by_session(&session));
        let _ = outbox.send(ServerMessage::TableState {
            state: Box::new(snapshot),
        });
        self.sessions.insert(session, outbox);
    }

    fn reconnect(&mut self, player: PlayerId, session: SessionId, outbox: Outbox) {
        // the registry fans reconnects to every room; only rooms actually
        // holding this player take the session
        if !self.seats.values().any(|p| p.id == player) {
            return;
        }
        self.sessions.insert(session.clone(), outbox.clone());
        let mut found = false;
        for seated in self.seats.values_mut() {
            if seated.id == player {
                seated.session = session.clone();
                seated.connected = true;
                found = true;
            }
        }
        if found {
            self.grace_stamps.remove(&player);
            log::info!("[room {}] {} reconnected", self.id, player);
            let snapshot = self.snapshot_for(self.player_by_session(&session));
            let _ = outbox.send(ServerMessage::ReconnectState {
                state: Box::new(snapshot),
            });
            self.broadcast_state();
        }
    }

    fn disconnect(&mut self, session: SessionId) {
        self.sessions.remove(&session);
        let player = self
            .seats
            .values_mut()
            .find(|p| p.session == session)
            .map(|p| {
                p.connected = false;
                p.session.clear();
                p.id.clone()
            });
        if let Some(player) = player {
            self.stamp += 1;
            let stamp = self.stamp;
            self.grace_stamps.insert(player.clone(), stamp);
            log::info!("[room {}] {} disconnected, grace running", self.id, player);
            self.schedule(self.timers.grace, RoomCmd::GraceExpiry { player, stamp });
            self.broadcast_state();
        }
        if !self.persistent && self.sessions.is_empty() && self.seats.is_empty() {
            self.schedule(self.timers.grace, RoomCmd::DestroyCheck);
        }
    }

    async fn grace_expiry(&mut self, player: PlayerId, stamp: u64) {
        if self.grace_stamps.get(&player) != Some(&stamp) {
            return;
        }
        self.grace_stamps.remove(&player);
        let seat = self
            .seats
            .iter()
            .find(|(_, p)| p.id == player && !p.connected)
            .map(|(seat, _)| *seat);
        if let Some(seat) = seat {
            log::info!("[room {}] {} grace expired, removing seat", self.id, player);
            self.remove_seat(seat, false).await;
        }
    }

    // ------------------------------------------------------------------
    // hand driving
    // ------------------------------------------------------------------

    fn start_countdown(&mut self) {
        if self.hand.is_some() || self.countdown.is_some() || self.playable_count() < 2 {
            return;
        }
        self.countdown = Some(COUNTDOWN_SECS);
        self.countdown_epoch += 1;
        let epoch = self.countdown_epoch;
        self.broadcast_state();
        self.schedule(self.timers.countdown_tick, RoomCmd::CountdownTick { epoch });
    }

    fn countdown_tick(&mut self, epoch: u64) {
        if epoch != self.countdown_epoch {
            return;
        }
        let Some(remaining) = self.countdown else {
            return;
        };
        if self.playable_count() < 2 {
            self.countdown = None;
            self.broadcast_state();
            return;
        }
        if remaining <= 1 {
            self.countdown = None;
            self.begin_hand();
        } else {
            self.countdown = Some(remaining - 1);
            self.broadcast_state();
            self.schedule(self.timers.countdown_tick, RoomCmd::CountdownTick { epoch });
        }
    }

    /// Seats that would be dealt into a hand right now.
    fn playable_count(&self) -> usize {
        self.seats
            .values()
            .filter(|p| p.connected && p.chips > 0)
            .count()
    }

    fn begin_hand(&mut self) {
        let funded = self
            .seats
            .values()
            .filter(|p| p.connected && p.chips > 0)
            .cloned()
            .collect::<Vec<RoomPlayer>>();
        if funded.len() < 2 {
            return;
        }
        let dealer_seat = self.rotate_dealer(&funded);
        let players = funded
            .iter()
            .map(|p| HandPlayer::new(p.id.clone(), p.seat, p.name.clone(), p.chips))
            .collect::<Vec<HandPlayer>>();
        let dealer = players
            .iter()
            .position(|p| p.seat == dealer_seat)
            .expect("dealer seat is funded");
        let hand_id = uuid::Uuid::now_v7().to_string();
        let seed = rand::rng()
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect::<String>();
        match HandState::open(players, self.config.clone(), dealer, hand_id.clone(), seed) {
            Ok(hand) => {
                log::info!("[room {}] hand {} dealt", self.id, hand_id);
                self.last_dealer_seat = Some(dealer_seat);
                self.hand_epoch += 1;
                self.hand = Some(hand);
                self.broadcast(ServerMessage::GameStarted {
                    table_id: self.id.clone(),
                    hand_id,
                });
                self.start_turn_timer();
            }
            Err(e) => log::error!("[room {}] failed to open hand: {}", self.id, e),
        }
    }

    fn rotate_dealer(&self, funded: &[RoomPlayer]) -> Position {
        let previous = self.last_dealer_seat.unwrap_or(usize::MAX);
        funded
            .iter()
            .map(|p| p.seat)
            .find(|seat| *seat > previous)
            .unwrap_or_else(|| funded[0].seat)
    }

    fn action(&mut self, session: SessionId, action: gf_engine::Action) {
        let Some(player) = self.player_by_session(&session).cloned() else {
            return;
        };
        let Some(hand) = &self.hand else {
            return;
        };
        // wrong actor or dead seat: silently ignore
        let is_actor = hand.actor().map(|p| p.id == player.id).unwrap_or(false);
        if !is_actor {
            return;
        }
        match hand.act(action) {
            Ok(next) => {
                let _ = self.session_outbox(&session).map(|outbox| {
                    outbox.send(ServerMessage::ActionAck {
                        table_id: self.id.clone(),
                        sequence: next.sequence(),
                        action: action.to_string(),
                    })
                });
                self.apply_transition(next);
            }
            Err(e) if e.is_fault() => {
                log::error!("[room {}] engine fault: {}, cancelling hand", self.id, e);
                self.cancel_hand();
            }
            Err(e) => {
                let _ = self.session_outbox(&session).map(|outbox| {
                    outbox.send(ServerMessage::Error {
                        message: e.to_string(),
                    })
                });
            }
        }
    }

    fn turn_timeout(&mut self, epoch: u64) {
        if epoch != self.turn_epoch {
            return;
        }
        let Some(hand) = &self.hand else {
            return;
        };
        let Some(actor) = hand.actor() else {
            return;
        };
        log::info!(
            "[room {}] seat {} timed out, auto-folding",
            self.id,
            actor.seat
        );
        match hand.auto_fold() {
            Ok(next) => self.apply_transition(next),
            Err(e) => log::error!("[room {}] auto-fold failed: {}", self.id, e),
        }
    }

    /// Install the post-action state and branch: showdown pause, all-in
    /// runout, or the next turn. Always invalidates the pending turn timer.
    fn apply_transition(&mut self, next: HandState) {
        self.turn_epoch += 1;
        self.turn_deadline = None;
        self.hand = Some(next);
        let hand = self.hand.as_ref().expect("hand just installed");
        if hand.is_complete() {
            self.broadcast_state();
            let epoch = self.hand_epoch;
            self.schedule(self.timers.showdown, RoomCmd::ShowdownFinish { epoch });
        } else if hand.needs_runout() {
            self.broadcast_state();
            let epoch = self.hand_epoch;
            self.schedule(self.timers.runout, RoomCmd::RunoutStep { epoch });
        } else {
            self.start_turn_timer();
        }
    }

    fn runout_step(&mut self, epoch: u64) {
        if epoch != self.hand_epoch {
            return;
        }
        let Some(hand) = &self.hand else {
            return;
        };
        if !hand.needs_runout() {
            return;
        }
        match hand.runout() {
            Ok(next) => {
                self.hand = Some(next);
                self.broadcast_state();
                let hand = self.hand.as_ref().expect("hand present");
                let cmd = match hand.is_complete() {
                    true => RoomCmd::ShowdownFinish { epoch },
                    false => RoomCmd::RunoutStep { epoch },
                };
                let delay = match hand.is_complete() {
                    true => self.timers.showdown,
                    false => self.timers.runout,
                };
                self.schedule(delay, cmd);
            }
            Err(e) => {
                log::error!("[room {}] runout fault: {}, cancelling hand", self.id, e);
                self.cancel_hand();
            }
        }
    }

    async fn finish_hand(&mut self, epoch: u64) {
        if epoch != self.hand_epoch {
            return;
        }
        let Some(hand) = self.hand.take() else {
            return;
        };
        if !hand.is_complete() {
            self.hand = Some(hand);
            return;
        }
        let mut result = hand.resolve();
        let (winners, rake) = prorate(&result.winners, result.pot, RAKE_PERCENT, Some(RAKE_CAP));
        result.winners = winners;
        // final engine stacks flow back into the seats, then winnings land
        for p in hand.players() {
            if let Some(seated) = self.seats.get_mut(&p.seat) {
                if seated.id == p.id {
                    seated.chips = p.chips;
                }
            }
        }
        for winner in &result.winners {
            if let Some(seated) = self.seats.get_mut(&winner.seat) {
                if seated.id == winner.player {
                    seated.chips += winner.amount;
                }
            }
        }
        log::info!(
            "[room {}] hand {} complete, pot {} rake {}",
            self.id,
            result.hand_id,
            result.pot,
            rake
        );
        self.broadcast(ServerMessage::HandResult {
            table_id: self.id.clone(),
            rake,
            result: result.clone(),
        });
        self.clear_hand();
        {
            let hooks = self.hooks.clone();
            let room = self.id.clone();
            tokio::spawn(async move {
                hooks.record_result(&room, &result).await;
                if rake > 0 {
                    hooks.collect_rake(&room, rake).await;
                }
            });
        }
        let busted = self
            .seats
            .iter()
            .filter(|(_, p)| p.chips == 0)
            .map(|(seat, _)| *seat)
            .collect::<Vec<Position>>();
        for seat in busted {
            self.remove_seat(seat, true).await;
        }
        self.persist();
        self.broadcast_state();
        if self.playable_count() >= 2 {
            let epoch = self.hand_epoch;
            self.schedule(self.timers.inter_hand, RoomCmd::StartHand { epoch });
        }
    }

    fn cancel_hand(&mut self) {
        let Some(hand) = self.hand.take() else {
            return;
        };
        let cancelled = hand.cancel();
        for p in cancelled.players() {
            if let Some(seated) = self.seats.get_mut(&p.seat) {
                if seated.id == p.id {
                    seated.chips = p.chips;
                }
            }
        }
        self.clear_hand();
        self.broadcast_state();
        self.persist();
        if self.playable_count() >= 2 {
            let epoch = self.hand_epoch;
            self.schedule(self.timers.inter_hand, RoomCmd::StartHand { epoch });
        }
    }

    fn clear_hand(&mut self) {
        self.hand = None;
        self.turn_deadline = None;
        self.turn_epoch += 1;
        self.hand_epoch += 1;
    }

    fn start_turn_timer(&mut self) {
        self.turn_epoch += 1;
        let epoch = self.turn_epoch;
        let timeout = Duration::from_secs(self.config.turn_timeout_secs);
        self.turn_deadline = Some(now_millis() + timeout.as_millis() as u64);
        self.broadcast_state();
        if let Some(hand) = &self.hand {
            if let Some(actor) = hand.actor() {
                let deadline = self.turn_deadline.expect("deadline just set");
                let message = ServerMessage::TurnStart {
                    table_id: self.id.clone(),
                    seat: actor.seat,
                    turn_timeout_at: deadline,
                };
                self.send_to_player(&actor.id.clone(), message);
            }
        }
        self.schedule(timeout, RoomCmd::TurnTimeout { epoch });
    }

    // ------------------------------------------------------------------
    // snapshots and fan-out
    // ------------------------------------------------------------------

    fn lobby_entry(&self) -> LobbyEntry {
        let phase = match (&self.hand, self.countdown) {
            (Some(hand), _) => hand.phase(),
            (None, Some(_)) => HandPhase::Countdown,
            (None, None) => HandPhase::Waiting,
        };
        let mut reserved = self.reservations.keys().copied().collect::<Vec<Position>>();
        reserved.sort_unstable();
        LobbyEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            creator: self.creator.clone(),
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            min_buy_in: self.config.min_buy_in,
            max_buy_in: self.config.max_buy_in,
            seated: self.seats.len(),
            max_seats: self.config.max_seats,
            phase,
            occupied_seats: self.seats.keys().copied().collect(),
            reserved_seats: reserved,
            token: self.config.token.clone(),
            premium: self.config.premium,
        }
    }

    fn snapshot_for(&self, recipient: Option<&RoomPlayer>) -> TableSnapshot {
        let hand = self.hand.as_ref();
        let phase = match (hand, self.countdown) {
            (Some(hand), _) => hand.phase(),
            (None, Some(_)) => HandPhase::Countdown,
            (None, None) => HandPhase::Waiting,
        };
        let showdown = phase == HandPhase::Showdown;
        let seat_of = |index: Option<Position>| {
            index.and_then(|i| hand.and_then(|h| h.players().get(i)).map(|p| p.seat))
        };
        let mut seats: Vec<Option<SeatView>> = vec![None; self.config.max_seats];
        for (position, player) in &self.seats {
            let engine = hand.and_then(|h| {
                h.players()
                    .iter()
                    .find(|p| p.seat == *position && p.id == player.id)
            });
            let mine = recipient.map(|r| r.id == player.id).unwrap_or(false);
            let folded = engine.map(|p| p.folded).unwrap_or(false);
            let hole = engine
                .and_then(|p| p.hole)
                .filter(|_| mine || (showdown && !folded));
            seats[*position] = Some(SeatView {
                seat_index: *position,
                player_id: player.id.clone(),
                name: player.name.clone(),
                avatar_seed: player.avatar_seed.clone(),
                chips: engine.map(|p| p.chips).unwrap_or(player.chips),
                current_bet: engine.map(|p| p.current_bet).unwrap_or(0),
                is_dealer: seat_of(hand.map(|h| h.dealer())) == Some(*position),
                is_small_blind: seat_of(hand.map(|h| h.small_blind())) == Some(*position),
                is_big_blind: seat_of(hand.map(|h| h.big_blind())) == Some(*position),
                folded,
                all_in: engine.map(|p| p.all_in).unwrap_or(false),
                connected: player.connected,
                hole_cards: hole,
            });
        }
        let mut community: Vec<Option<gf_cards::Card>> = hand
            .map(|h| h.community().iter().copied().map(Some).collect())
            .unwrap_or_default();
        community.resize(5, None);
        let actor = hand.and_then(|h| h.actor());
        let my_seat = recipient.map(|r| r.seat);
        let is_my_turn = match (actor, recipient) {
            (Some(actor), Some(recipient)) => actor.id == recipient.id,
            _ => false,
        };
        let my_engine = recipient.and_then(|r| {
            hand.and_then(|h| h.players().iter().find(|p| p.id == r.id))
        });
        let mut reserved = self.reservations.keys().copied().collect::<Vec<Position>>();
        reserved.sort_unstable();
        TableSnapshot {
            table_id: self.id.clone(),
            phase,
            countdown_seconds: self.countdown,
            seats,
            community_cards: community,
            pot: hand.map(|h| h.pot()).unwrap_or(0),
            side_pots: hand.map(|h| h.side_pots().to_vec()).unwrap_or_default(),
            current_bet: hand.map(|h| h.current_bet()).unwrap_or(0),
            reserved_seats: reserved,
            min_raise: hand.map(|h| h.min_raise_to()).unwrap_or(0),
            max_raise: actor.map(|p| p.current_bet + p.chips).unwrap_or(0),
            active_player_seat_index: actor.map(|p| p.seat),
            dealer_seat_index: seat_of(hand.map(|h| h.dealer())),
            small_blind_seat_index: seat_of(hand.map(|h| h.small_blind())),
            big_blind_seat_index: seat_of(hand.map(|h| h.big_blind())),
            turn_timeout_at: self.turn_deadline.filter(|_| is_my_turn),
            my_seat_index: my_seat,
            my_hand: my_engine.and_then(|p| p.hole),
            is_my_turn,
            my_chips: recipient.map(|r| {
                my_engine.map(|p| p.chips).unwrap_or(r.chips)
            }),
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            min_buy_in: self.config.min_buy_in,
            max_buy_in: self.config.max_buy_in,
        }
    }

    /// Fresh whole snapshot to every connected session, each filtered for
    /// its recipient.
    fn broadcast_state(&self) {
        for (session, outbox) in &self.sessions {
            let recipient = self.seats.values().find(|p| &p.session == session);
            let snapshot = self.snapshot_for(recipient);
            let _ = outbox.send(ServerMessage::TableState {
                state: Box::new(snapshot),
            });
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for outbox in self.sessions.values() {
            let _ = outbox.send(message.clone());
        }
    }

    fn send_to_player(&self, player: &str, message: ServerMessage) {
        let outbox = self
            .seats
            .values()
            .find(|p| p.id == player)
            .and_then(|p| self.sessions.get(&p.session));
        if let Some(outbox) = outbox {
            let _ = outbox.send(message);
        }
    }

    fn persist(&self) {
        let hooks = self.hooks.clone();
        let room = self.id.clone();
        let seats = self
            .seats
            .values()
            .map(PersistedSeat::from)
            .collect::<Vec<PersistedSeat>>();
        tokio::spawn(async move {
            hooks.persist_seats(&room, seats).await;
        });
    }

    fn schedule(&self, delay: Duration, cmd: RoomCmd) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(cmd);
        });
    }

    fn seat_by_session(&self, session: &str) -> Option<Position> {
        self.seats
            .iter()
            .find(|(_, p)| p.session == session)
            .map(|(seat, _)| *seat)
    }

    fn player_by_session(&self, session: &str) -> Option<&RoomPlayer> {
        self.seats.values().find(|p| p.session == session)
    }

    fn session_outbox(&self, session: &str) -> Option<&Outbox> {
        self.sessions.get(session)
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_millis() as u64
}
