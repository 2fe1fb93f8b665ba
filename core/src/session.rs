use chrono::{DateTime, Utc};
use core::time::Duration;
use rand::prelude::*;

use crate::*;

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// How long both faces of a pair stay visible before the pair is resolved.
    pub resolve_delay: Duration,
    /// Period of the elapsed-time display refresh.
    pub tick_interval: Duration,
    pub symbols: Vec<String>,
}

impl SessionConfig {
    pub const DEFAULT_RESOLVE_DELAY: Duration = Duration::from_millis(600);
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolve_delay: Self::DEFAULT_RESOLVE_DELAY,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Identifies the game a deferred resolution was scheduled for. A ticket for a game that has since been replaced
/// is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolveTicket {
    pub mode: Mode,
    pub game_id: u64,
}

/// Inputs the session accepts, from the player or from timers it asked for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Intent {
    FlipCard(CardId),
    StartNewGame(Mode),
    SwitchMode(Mode),
    RequestShare,
    Tick,
    Resolve(ResolveTicket),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub mode: Mode,
    pub score: Score,
    pub is_new_best: bool,
    pub ledger: Ledger,
}

/// Work the session hands back to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Render(Snapshot),
    /// Send [`Intent::Resolve`] with `ticket` after `delay`.
    ScheduleResolve {
        ticket: ResolveTicket,
        delay: Duration,
    },
    /// Send [`Intent::Tick`] every `interval` until [`Effect::StopTicker`].
    StartTicker {
        interval: Duration,
    },
    StopTicker,
    Completed(Completion),
    Share(String),
}

/// Receiving side of the session's effects.
pub trait Presenter {
    fn present(&mut self, effect: Effect);
}

impl<F: FnMut(Effect)> Presenter for F {
    fn present(&mut self, effect: Effect) {
        self(effect)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ModeSlot {
    game: GameState,
    game_id: u64,
    ledger: Ledger,
    last_score: Option<Score>,
}

/// Owns both modes' games and ledgers, the current mode, and the persistence store.
#[derive(Debug)]
pub struct Session<S> {
    config: SessionConfig,
    store: S,
    mode: Mode,
    slots: [ModeSlot; 2],
    next_game_id: u64,
    rng: SmallRng,
    ticker_running: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Restores the session from `store`. Missing or unreadable entries are replaced with fresh defaults.
    ///
    /// A pair left face up when the store was written is resolved right away; the returned effects carry what that
    /// produced, including a completion if it was the last pair.
    pub fn load(config: SessionConfig, store: S, seed: u64, now: DateTime<Utc>) -> (Self, Vec<Effect>) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mode = store.load_or_else(keys::MODE, Mode::default);

        let mut next_game_id = 0;
        let slots = Mode::ALL.map(|slot_mode| {
            let game = Self::load_game(&store, slot_mode, &config, &mut rng);
            next_game_id += 1;
            ModeSlot {
                game,
                game_id: next_game_id,
                ledger: store.load_or_else(keys::ledger(slot_mode), Ledger::default),
                last_score: store.load_or_else(keys::last_score(slot_mode), || None),
            }
        });

        let mut session = Self {
            config,
            store,
            mode,
            slots,
            next_game_id,
            rng,
            ticker_running: false,
        };

        let mut effects = Vec::new();
        for slot_mode in Mode::ALL {
            if session.slot(slot_mode).game.is_processing() {
                log::debug!("resolving pair left pending in {} mode", slot_mode.name());
                session.finish_pair(slot_mode, now, &mut effects);
            }
            session.save_game(slot_mode);
        }
        session.store.save_or_log(keys::MODE, &session.mode);

        (session, effects)
    }

    fn load_game(
        store: &S,
        mode: Mode,
        config: &SessionConfig,
        rng: &mut SmallRng,
    ) -> GameState {
        let key = keys::game(mode);
        match store.load::<GameState>(key) {
            Ok(Some(game)) => match game.validate() {
                Ok(()) if !game.is_complete() => return game,
                Ok(()) => log::debug!("stored {} game already complete, dealing a new one", mode.name()),
                Err(source) => {
                    let err = StoreError::Invalid {
                        key: key.to_string(),
                        source,
                    };
                    log::warn!("{}, using a fresh default", err);
                }
            },
            Ok(None) => {}
            Err(err) => log::warn!("{}, using a fresh default", err),
        }
        Self::deal(config, rng)
    }

    fn deal(config: &SessionConfig, rng: &mut SmallRng) -> GameState {
        let cards = ShuffledDeckGenerator::new(rng.random()).generate(&config.symbols);
        GameState::new(cards)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn game(&self, mode: Mode) -> &GameState {
        &self.slot(mode).game
    }

    pub fn ledger(&self, mode: Mode) -> &Ledger {
        &self.slot(mode).ledger
    }

    pub fn last_score(&self, mode: Mode) -> Option<Score> {
        self.slot(mode).last_score
    }

    pub fn is_ticker_running(&self) -> bool {
        self.ticker_running
    }

    pub fn snapshot(&self) -> Snapshot {
        let slot = self.slot(self.mode);
        Snapshot::new(self.mode, &slot.game, &slot.ledger, slot.last_score)
    }

    /// Applies one intent and returns the effects the presentation layer has to carry out, in order.
    pub fn apply(&mut self, intent: Intent, now: DateTime<Utc>) -> Vec<Effect> {
        use Intent::*;

        if !matches!(intent, Tick) {
            log::debug!("intent: {:?}", intent);
        }

        let mut effects = Vec::new();
        match intent {
            FlipCard(id) => self.flip_card(id, now, &mut effects),
            Resolve(ticket) => self.resolve(ticket, now, &mut effects),
            Tick => self.tick(now, &mut effects),
            StartNewGame(mode) => self.start_new_game(mode, &mut effects),
            SwitchMode(mode) => self.switch_mode(mode, &mut effects),
            RequestShare => self.request_share(&mut effects),
        }
        effects
    }

    /// Same as [`Session::apply`], handing each effect to `presenter`.
    pub fn dispatch(&mut self, intent: Intent, now: DateTime<Utc>, presenter: &mut impl Presenter) {
        for effect in self.apply(intent, now) {
            presenter.present(effect);
        }
    }

    fn flip_card(&mut self, id: CardId, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        let mode = self.mode;
        let slot = self.slot_mut(mode);
        let outcome = slot.game.flip(id, now);
        if !outcome.has_update() {
            log::trace!("flip of card {} ignored", id);
            return;
        }

        let ticket = ResolveTicket {
            mode,
            game_id: slot.game_id,
        };
        self.save_game(mode);
        self.start_ticker(effects);

        if outcome == FlipOutcome::PairFlipped {
            effects.push(Effect::ScheduleResolve {
                ticket,
                delay: self.config.resolve_delay,
            });
        }
        effects.push(Effect::Render(self.snapshot()));
    }

    fn resolve(&mut self, ticket: ResolveTicket, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        if self.slot(ticket.mode).game_id != ticket.game_id {
            log::debug!("stale resolution ignored: {:?}", ticket);
            return;
        }
        self.finish_pair(ticket.mode, now, effects);
    }

    fn finish_pair(&mut self, mode: Mode, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        use ResolveOutcome::*;

        match self.slot_mut(mode).game.resolve(now) {
            NoChange => return,
            Mismatch | Matched => self.save_game(mode),
            Completed => self.complete(mode, now, effects),
        }

        if mode == self.mode {
            effects.push(Effect::Render(self.snapshot()));
        }
    }

    fn complete(&mut self, mode: Mode, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        let slot = self.slot_mut(mode);
        let score = Score::new(slot.game.moves(), slot.game.elapsed_secs(), now);
        let is_new_best = slot.ledger.record_score(score);
        slot.last_score = Some(score);
        let ledger = slot.ledger.clone();

        log::info!(
            "{} game complete: {} moves in {}s{}",
            mode.name(),
            score.moves,
            score.time,
            if is_new_best { ", new best" } else { "" }
        );

        self.store.save_or_log(keys::ledger(mode), &ledger);
        self.store.save_or_log(keys::last_score(mode), &Some(score));

        if mode == self.mode {
            self.stop_ticker(effects);
        }
        self.reset_game(mode);

        effects.push(Effect::Completed(Completion {
            mode,
            score,
            is_new_best,
            ledger,
        }));
    }

    fn tick(&mut self, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        if !self.ticker_running {
            return;
        }

        let mode = self.mode;
        if self.slot_mut(mode).game.tick(now) {
            self.save_game(mode);
            effects.push(Effect::Render(self.snapshot()));
        }
    }

    fn start_new_game(&mut self, mode: Mode, effects: &mut Vec<Effect>) {
        self.stop_ticker(effects);
        if mode != self.mode {
            self.mode = mode;
            self.store.save_or_log(keys::MODE, &mode);
        }
        self.reset_game(mode);
        effects.push(Effect::Render(self.snapshot()));
    }

    fn switch_mode(&mut self, mode: Mode, effects: &mut Vec<Effect>) {
        if mode != self.mode {
            self.stop_ticker(effects);
            self.mode = mode;
            self.store.save_or_log(keys::MODE, &mode);
        }
        effects.push(Effect::Render(self.snapshot()));
    }

    fn request_share(&mut self, effects: &mut Vec<Effect>) {
        match self.slot(self.mode).last_score {
            Some(score) => effects.push(Effect::Share(share_text(&score, self.mode))),
            None => log::debug!("nothing to share in {} mode yet", self.mode.name()),
        }
    }

    /// Replaces the mode's game with a freshly dealt one, which invalidates any pending resolution for it.
    fn reset_game(&mut self, mode: Mode) {
        let game = Self::deal(&self.config, &mut self.rng);
        self.next_game_id += 1;
        let game_id = self.next_game_id;

        let slot = self.slot_mut(mode);
        slot.game = game;
        slot.game_id = game_id;
        self.save_game(mode);
    }

    fn start_ticker(&mut self, effects: &mut Vec<Effect>) {
        if !self.ticker_running {
            self.ticker_running = true;
            effects.push(Effect::StartTicker {
                interval: self.config.tick_interval,
            });
        }
    }

    fn stop_ticker(&mut self, effects: &mut Vec<Effect>) {
        if self.ticker_running {
            self.ticker_running = false;
            effects.push(Effect::StopTicker);
        }
    }

    fn save_game(&mut self, mode: Mode) {
        let Self { store, slots, .. } = self;
        store.save_or_log(keys::game(mode), &slots[mode.index()].game);
    }

    fn slot(&self, mode: Mode) -> &ModeSlot {
        &self.slots[mode.index()]
    }

    fn slot_mut(&mut self, mode: Mode) -> &mut ModeSlot {
        &mut self.slots[mode.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + TimeDelta::seconds(secs)
    }

    fn new_session() -> Session<MemoryStore> {
        Session::load(SessionConfig::default(), MemoryStore::new(), 1, t0()).0
    }

    fn matching_pairs(game: &GameState) -> Vec<(CardId, CardId)> {
        let cards = game.cards();
        let mut pairs = Vec::new();
        for (i, a) in cards.iter().enumerate() {
            for b in &cards[i + 1..] {
                if a.symbol == b.symbol {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    fn mismatched_pair(game: &GameState) -> (CardId, CardId) {
        let cards = game.cards();
        let other = cards
            .iter()
            .find(|card| card.symbol != cards[0].symbol)
            .unwrap();
        (cards[0].id, other.id)
    }

    fn scheduled_ticket(effects: &[Effect]) -> Option<ResolveTicket> {
        effects.iter().find_map(|effect| match effect {
            Effect::ScheduleResolve { ticket, .. } => Some(*ticket),
            _ => None,
        })
    }

    fn completion(effects: &[Effect]) -> Option<&Completion> {
        effects.iter().find_map(|effect| match effect {
            Effect::Completed(completion) => Some(completion),
            _ => None,
        })
    }

    /// Flips both cards at `flip_at` and runs the scheduled resolution at `resolve_at`.
    fn play_pair(
        session: &mut Session<MemoryStore>,
        (a, b): (CardId, CardId),
        flip_at: DateTime<Utc>,
        resolve_at: DateTime<Utc>,
    ) -> Vec<Effect> {
        session.apply(Intent::FlipCard(a), flip_at);
        let effects = session.apply(Intent::FlipCard(b), flip_at);
        let ticket = scheduled_ticket(&effects).expect("second flip schedules a resolution");
        session.apply(Intent::Resolve(ticket), resolve_at)
    }

    #[test]
    fn fresh_session_starts_in_normal_mode_with_empty_ledgers() {
        let session = new_session();

        assert_eq!(session.mode(), Mode::Normal);
        for mode in Mode::ALL {
            assert_eq!(session.game(mode).cards().len(), 16);
            assert!(session.ledger(mode).is_empty());
            assert_eq!(session.last_score(mode), None);
        }
        assert!(!session.is_ticker_running());
    }

    #[test]
    fn first_flip_starts_ticker_and_renders() {
        let mut session = new_session();
        let id = session.game(Mode::Normal).cards()[0].id;

        let effects = session.apply(Intent::FlipCard(id), t0());

        assert_eq!(
            effects[0],
            Effect::StartTicker {
                interval: SessionConfig::DEFAULT_TICK_INTERVAL
            }
        );
        assert!(matches!(effects[1], Effect::Render(_)));
        assert!(session.is_ticker_running());
        assert_eq!(session.game(Mode::Normal).started_at(), Some(t0()));
    }

    #[test]
    fn second_flip_schedules_resolution_with_configured_delay() {
        let config = SessionConfig {
            resolve_delay: Duration::from_millis(1500),
            ..SessionConfig::default()
        };
        let (mut session, _) = Session::load(config, MemoryStore::new(), 3, t0());
        let (a, b) = mismatched_pair(session.game(Mode::Normal));

        session.apply(Intent::FlipCard(a), t0());
        let effects = session.apply(Intent::FlipCard(b), t0());

        assert!(effects.contains(&Effect::ScheduleResolve {
            ticket: ResolveTicket {
                mode: Mode::Normal,
                game_id: 1,
            },
            delay: Duration::from_millis(1500),
        }));
        assert!(!effects.contains(&Effect::StartTicker {
            interval: SessionConfig::DEFAULT_TICK_INTERVAL
        }));
    }

    #[test]
    fn third_flip_during_resolution_delay_is_rejected() {
        let mut session = new_session();
        let (a, b) = mismatched_pair(session.game(Mode::Normal));
        session.apply(Intent::FlipCard(a), t0());
        session.apply(Intent::FlipCard(b), t0());
        let before = session.game(Mode::Normal).clone();

        let third = session
            .game(Mode::Normal)
            .cards()
            .iter()
            .find(|card| card.id != a && card.id != b)
            .unwrap()
            .id;
        let effects = session.apply(Intent::FlipCard(third), t0());

        assert!(effects.is_empty());
        assert_eq!(session.game(Mode::Normal), &before);
    }

    #[test]
    fn mismatch_resolution_hides_cards_again() {
        let mut session = new_session();
        let pair = mismatched_pair(session.game(Mode::Normal));

        let effects = play_pair(&mut session, pair, t0(), t0());

        let Some(Effect::Render(snapshot)) = effects.last() else {
            panic!("resolution renders: {:?}", effects);
        };
        assert!(snapshot.cards.iter().all(|card| card.face == CardFace::Hidden));
        assert_eq!(snapshot.moves, 1);
        assert_eq!(snapshot.matches, 0);
        assert!(!snapshot.processing);
    }

    #[test]
    fn completing_a_game_records_score_and_deals_new_board() {
        let mut session = new_session();
        let pairs = matching_pairs(session.game(Mode::Normal));
        assert_eq!(pairs.len(), 8);

        let mut effects = Vec::new();
        for (i, &pair) in pairs.iter().enumerate() {
            let resolve_at = if i + 1 == pairs.len() { at(45) } else { t0() };
            effects = play_pair(&mut session, pair, t0(), resolve_at);
        }

        let completion = completion(&effects).expect("last pair completes the game");
        assert_eq!(completion.mode, Mode::Normal);
        assert!(completion.is_new_best);
        assert_eq!(completion.score.moves, 8);
        assert_eq!(completion.score.time, 45);
        assert_eq!(completion.ledger.scores(), [completion.score]);
        assert!(effects.contains(&Effect::StopTicker));
        assert!(!session.is_ticker_running());

        let fresh = session.game(Mode::Normal);
        assert_eq!(fresh.moves(), 0);
        assert_eq!(fresh.matches(), 0);
        assert_eq!(fresh.started_at(), None);
        assert_eq!(session.ledger(Mode::Normal).len(), 1);
        assert_eq!(session.last_score(Mode::Normal), Some(completion.score));
        assert!(session.ledger(Mode::Hard).is_empty());

        let Some(Effect::Render(snapshot)) = effects.last() else {
            panic!("board is rendered after completion");
        };
        assert_eq!(snapshot.moves, 0);
        assert!(snapshot.ledger[0].highlighted);
    }

    #[test]
    fn slower_second_game_is_not_a_new_best() {
        let mut session = new_session();
        for round in 0..2 {
            let pairs = matching_pairs(session.game(Mode::Normal));
            let mut effects = Vec::new();
            for &pair in &pairs {
                effects = play_pair(&mut session, pair, t0(), at(30 + round * 10));
            }
            let completion = completion(&effects).unwrap();
            assert_eq!(completion.is_new_best, round == 0);
        }
        assert_eq!(session.ledger(Mode::Normal).len(), 2);
    }

    #[test]
    fn stale_resolution_after_new_game_is_ignored() {
        let mut session = new_session();
        let pair = matching_pairs(session.game(Mode::Normal))[0];
        session.apply(Intent::FlipCard(pair.0), t0());
        let effects = session.apply(Intent::FlipCard(pair.1), t0());
        let stale = scheduled_ticket(&effects).unwrap();

        let effects = session.apply(Intent::StartNewGame(Mode::Normal), t0());
        assert!(effects.contains(&Effect::StopTicker));
        let fresh = session.game(Mode::Normal).clone();

        let effects = session.apply(Intent::Resolve(stale), at(1));

        assert!(effects.is_empty());
        assert_eq!(session.game(Mode::Normal), &fresh);
        assert!(!session.game(Mode::Normal).is_processing());
    }

    #[test]
    fn switching_mode_preserves_other_game_and_stops_ticker() {
        let mut session = new_session();
        let id = session.game(Mode::Normal).cards()[3].id;
        session.apply(Intent::FlipCard(id), t0());
        let normal = session.game(Mode::Normal).clone();

        let effects = session.apply(Intent::SwitchMode(Mode::Hard), at(2));

        assert_eq!(effects[0], Effect::StopTicker);
        let Effect::Render(snapshot) = &effects[1] else {
            panic!("switch renders the new mode");
        };
        assert_eq!(snapshot.mode, Mode::Hard);
        assert!(!session.is_ticker_running());
        assert_eq!(session.mode(), Mode::Hard);
        assert_eq!(session.game(Mode::Normal), &normal);

        session.apply(Intent::SwitchMode(Mode::Normal), at(3));
        assert_eq!(session.game(Mode::Normal), &normal);
        assert_eq!(session.game(Mode::Normal).flipped(), [id]);
    }

    #[test]
    fn switching_to_current_mode_only_renders() {
        let mut session = new_session();
        let id = session.game(Mode::Normal).cards()[0].id;
        session.apply(Intent::FlipCard(id), t0());

        let effects = session.apply(Intent::SwitchMode(Mode::Normal), t0());

        assert_eq!(effects.len(), 1);
        assert!(session.is_ticker_running());
    }

    #[test]
    fn pending_pair_of_inactive_mode_still_resolves() {
        let mut session = new_session();
        let pair = matching_pairs(session.game(Mode::Normal))[0];
        session.apply(Intent::FlipCard(pair.0), t0());
        let effects = session.apply(Intent::FlipCard(pair.1), t0());
        let ticket = scheduled_ticket(&effects).unwrap();
        session.apply(Intent::SwitchMode(Mode::Hard), t0());

        let effects = session.apply(Intent::Resolve(ticket), at(1));

        assert!(effects.is_empty());
        assert_eq!(session.game(Mode::Normal).matches(), 1);
        assert!(!session.game(Mode::Normal).is_processing());
        assert_eq!(session.game(Mode::Hard).moves(), 0);
    }

    #[test]
    fn final_pair_resolving_after_mode_switch_completes_off_screen() {
        let mut session = new_session();
        let mut pairs = matching_pairs(session.game(Mode::Normal));
        let last = pairs.pop().unwrap();
        for &pair in &pairs {
            play_pair(&mut session, pair, t0(), at(30));
        }
        session.apply(Intent::FlipCard(last.0), at(40));
        let effects = session.apply(Intent::FlipCard(last.1), at(40));
        let ticket = scheduled_ticket(&effects).unwrap();
        session.apply(Intent::SwitchMode(Mode::Hard), at(40));

        let effects = session.apply(Intent::Resolve(ticket), at(41));

        let [Effect::Completed(completion)] = effects.as_slice() else {
            panic!("expected only a completion, got {:?}", effects);
        };
        assert_eq!(completion.mode, Mode::Normal);
        assert!(completion.is_new_best);
        assert_eq!(completion.ledger.len(), 1);
        assert_eq!(session.mode(), Mode::Hard);
        assert_eq!(session.ledger(Mode::Normal), &completion.ledger);
        assert_eq!(session.last_score(Mode::Normal), Some(completion.score));
        assert!(session.ledger(Mode::Hard).is_empty());
        assert!(session.snapshot().ledger.is_empty());
        assert_eq!(session.game(Mode::Normal).moves(), 0);
    }

    #[test]
    fn hard_mode_snapshot_hides_repeat_reveals() {
        let mut session = new_session();
        session.apply(Intent::SwitchMode(Mode::Hard), t0());
        let pair = mismatched_pair(session.game(Mode::Hard));
        play_pair(&mut session, pair, t0(), t0());

        let effects = session.apply(Intent::FlipCard(pair.0), at(1));

        let Some(Effect::Render(snapshot)) = effects.last() else {
            panic!("flip renders");
        };
        let card = snapshot.cards.iter().find(|card| card.id == pair.0).unwrap();
        assert_eq!(card.face, CardFace::FaceUpRepeat);
        assert_eq!(card.symbol, None);
        let game = session.game(Mode::Hard);
        assert!(game.card(pair.0).unwrap().revealed);
        assert!(game.card(pair.1).unwrap().revealed);
    }

    #[test]
    fn tick_updates_display_only_while_running() {
        let mut session = new_session();
        assert!(session.apply(Intent::Tick, at(5)).is_empty());

        let id = session.game(Mode::Normal).cards()[0].id;
        session.apply(Intent::FlipCard(id), t0());
        let effects = session.apply(Intent::Tick, at(3));

        let [Effect::Render(snapshot)] = effects.as_slice() else {
            panic!("tick renders once: {:?}", effects);
        };
        assert_eq!(snapshot.elapsed_secs, 3);
        assert!(session.apply(Intent::Tick, at(3)).is_empty());
    }

    #[test]
    fn share_needs_a_completed_game() {
        let mut session = new_session();
        assert!(session.apply(Intent::RequestShare, t0()).is_empty());

        for pair in matching_pairs(session.game(Mode::Normal)) {
            play_pair(&mut session, pair, t0(), at(20));
        }
        let effects = session.apply(Intent::RequestShare, at(21));

        let score = session.last_score(Mode::Normal).unwrap();
        assert_eq!(
            effects,
            [Effect::Share(share_text(&score, Mode::Normal))]
        );

        session.apply(Intent::SwitchMode(Mode::Hard), at(22));
        assert!(session.apply(Intent::RequestShare, at(22)).is_empty());
    }

    #[test]
    fn new_game_in_other_mode_switches_to_it() {
        let mut session = new_session();
        let normal = session.game(Mode::Normal).clone();

        session.apply(Intent::StartNewGame(Mode::Hard), t0());

        assert_eq!(session.mode(), Mode::Hard);
        assert_eq!(session.game(Mode::Normal), &normal);
        assert_eq!(session.store().get(keys::MODE).as_deref(), Some("\"hard\""));
    }

    #[test]
    fn session_survives_reload_from_store() {
        let mut session = new_session();
        let pairs = matching_pairs(session.game(Mode::Normal));
        for &pair in &pairs {
            play_pair(&mut session, pair, t0(), at(40));
        }
        let (a, _) = mismatched_pair(session.game(Mode::Normal));
        session.apply(Intent::FlipCard(a), at(50));
        session.apply(Intent::SwitchMode(Mode::Hard), at(51));
        let normal = session.game(Mode::Normal).clone();
        let ledger = session.ledger(Mode::Normal).clone();

        let (reloaded, _) = Session::load(SessionConfig::default(), session.into_store(), 9, at(60));

        assert_eq!(reloaded.mode(), Mode::Hard);
        assert_eq!(reloaded.game(Mode::Normal), &normal);
        assert_eq!(reloaded.ledger(Mode::Normal), &ledger);
        assert_eq!(reloaded.last_score(Mode::Normal), ledger.best().copied());
    }

    #[test]
    fn corrupt_store_entries_fall_back_to_fresh_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::MODE, "\"sideways\"").unwrap();
        store.set(keys::game(Mode::Normal), "[1, 2").unwrap();
        store.set(keys::ledger(Mode::Normal), "{}").unwrap();
        store.set(keys::game(Mode::Hard), r#"{"cards":[]}"#).unwrap();
        store.set(keys::last_score(Mode::Hard), "12").unwrap();

        let (session, _) = Session::load(SessionConfig::default(), store, 5, t0());

        assert_eq!(session.mode(), Mode::Normal);
        for mode in Mode::ALL {
            assert_eq!(session.game(mode).cards().len(), 16);
            assert_eq!(session.game(mode).validate(), Ok(()));
            assert!(session.ledger(mode).is_empty());
            assert_eq!(session.last_score(mode), None);
        }
        let repaired: GameState = session.store().load(keys::game(Mode::Normal)).unwrap().unwrap();
        assert_eq!(&repaired, session.game(Mode::Normal));
    }

    #[test]
    fn inconsistent_stored_game_is_replaced() {
        let mut store = MemoryStore::new();
        let mut game = GameState::new(ShuffledDeckGenerator::new(4).generate(&DEFAULT_SYMBOLS));
        game.flip(game.cards()[0].id, t0());
        let mut json: serde_json::Value = serde_json::to_value(&game).unwrap();
        json["processing"] = serde_json::Value::Bool(true);
        store.set(keys::game(Mode::Normal), &json.to_string()).unwrap();

        let (session, _) = Session::load(SessionConfig::default(), store, 5, t0());

        assert_eq!(session.game(Mode::Normal).started_at(), None);
    }

    #[test]
    fn pair_pending_at_save_time_is_resolved_on_load() {
        let mut session = new_session();
        let (a, b) = mismatched_pair(session.game(Mode::Normal));
        session.apply(Intent::FlipCard(a), t0());
        session.apply(Intent::FlipCard(b), t0());
        assert!(session.game(Mode::Normal).is_processing());

        let (reloaded, effects) = Session::load(SessionConfig::default(), session.into_store(), 2, at(10));

        assert!(matches!(effects.as_slice(), [Effect::Render(_)]));
        let game = reloaded.game(Mode::Normal);
        assert!(!game.is_processing());
        assert!(game.flipped().is_empty());
        assert_eq!(game.moves(), 1);
        assert!(game.card(a).unwrap().revealed);
    }

    #[test]
    fn last_pair_pending_at_save_time_completes_on_load() {
        let mut session = new_session();
        let mut pairs = matching_pairs(session.game(Mode::Normal));
        let last = pairs.pop().unwrap();
        for &pair in &pairs {
            play_pair(&mut session, pair, t0(), at(20));
        }
        session.apply(Intent::FlipCard(last.0), at(25));
        session.apply(Intent::FlipCard(last.1), at(25));

        let (reloaded, effects) = Session::load(SessionConfig::default(), session.into_store(), 4, at(26));

        let completion = completion(&effects).expect("load announces the finished game");
        assert_eq!(completion.mode, Mode::Normal);
        assert!(completion.is_new_best);
        assert!(matches!(effects.last(), Some(Effect::Render(_))));
        assert_eq!(reloaded.ledger(Mode::Normal).len(), 1);
        assert_eq!(reloaded.game(Mode::Normal).moves(), 0);
    }

    #[test]
    fn dispatch_forwards_effects_to_presenter() {
        let mut session = new_session();
        let mut seen = Vec::new();

        session.dispatch(Intent::StartNewGame(Mode::Normal), t0(), &mut |effect: Effect| {
            seen.push(effect)
        });

        assert_eq!(seen.len(), 1);
        assert!(matches!(seen[0], Effect::Render(_)));
    }
}
