use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, SystemTime};

use log::{debug, info, trace, warn};
use rand::RngCore;
use uuid::Uuid;

use super::randomizer::session_rng;
use super::round_timer::RoundTimer;
use super::rules::{Classification, GameRules, ResolutionPolicy, Scoring};
use super::scheduler::{Scheduler, TaskHandle, TaskScope};
use super::stats_manager::ScoreStore;
use crate::destroyable::Destroyable;
use crate::events::EventEmitter;
use crate::model::{
    Difficulty, Feedback, GameEvent, GameId, GameOutcome, PlayerInput, ResultActionsFactory, ResultCard,
    ResultMetric, SessionPhase, SessionState,
};
use crate::ui::ResultPresenter;

#[derive(Clone)]
pub struct SessionContext {
    pub scheduler: Scheduler,
    pub store: Rc<RefCell<ScoreStore>>,
    pub presenter: Rc<dyn ResultPresenter>,
    pub events: EventEmitter<GameEvent>,
    /// Fixed seed for every play-through; a fresh seed per play-through when `None`.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Locked, finished or disposed; the input was dropped.
    Ignored,
    Unrecognized,
    Classified(Classification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Advance,
    Recover,
}

/// Round lifecycle shared by every game: generate, classify, lock, transition, finish.
pub struct GameSession<R: GameRules> {
    rules: R,
    context: SessionContext,
    rng: Box<dyn RngCore>,
    seed: u64,
    session: SessionState,
    round: Option<R::Round>,
    forfeited: bool,
    timer: RoundTimer,
    tasks: TaskScope,
    transition: Option<TaskHandle>,
    actions: Option<ResultActionsFactory>,
    outcome: Option<GameOutcome>,
    self_ref: Weak<RefCell<Self>>,
    disposed: bool,
}

impl<R: GameRules> Destroyable for GameSession<R> {
    fn destroy(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let cancelled = self.cancel_pending();
        self.timer.stop();
        self.actions = None;
        debug!(
            target: "game_state",
            "Session {} of {} disposed in {:?}; {cancelled} task(s) cancelled",
            self.session.session_id,
            self.rules.game_id(),
            self.session.phase
        );
    }
}

impl<R: GameRules> GameSession<R> {
    pub fn new(rules: R, context: SessionContext) -> Rc<RefCell<Self>> {
        let (rng, seed) = session_rng(context.seed);
        let now = context.scheduler.now();
        Rc::new_cyclic(|self_ref| {
            RefCell::new(Self {
                timer: Self::build_timer(&context),
                tasks: TaskScope::new(context.scheduler.clone()),
                session: SessionState::new(rules.total_rounds(), now),
                rules,
                context,
                rng,
                seed,
                round: None,
                forfeited: false,
                transition: None,
                actions: None,
                outcome: None,
                self_ref: self_ref.clone(),
                disposed: false,
            })
        })
    }

    fn build_timer(context: &SessionContext) -> RoundTimer {
        let events = context.events.clone();
        RoundTimer::with_display(
            context.scheduler.clone(),
            Rc::new(move |elapsed| events.emit(GameEvent::TimerTick(elapsed))),
        )
    }

    /// Called on every finish for the actions of that result card.
    pub fn set_result_actions(&mut self, actions: ResultActionsFactory) {
        self.actions = Some(actions);
    }

    /// Starts a fresh play-through. Anything pending from an earlier play-through is cancelled
    /// before the new state exists.
    pub fn start(&mut self) {
        self.cancel_pending();
        self.timer = Self::build_timer(&self.context);
        if self.context.seed.is_none() && self.session.phase != SessionPhase::Idle {
            let (rng, seed) = session_rng(None);
            self.rng = rng;
            self.seed = seed;
        }
        self.session = SessionState::new(self.rules.total_rounds(), self.context.scheduler.now());
        self.round = None;
        self.forfeited = false;
        self.outcome = None;
        self.disposed = false;

        info!(
            target: "game_state",
            "New game; game: {}; difficulty: {}; seed: {}",
            self.rules.game_id(),
            self.rules.difficulty(),
            self.seed
        );
        self.rules.start_session(self.rng.as_mut());
        self.context.events.emit(GameEvent::SessionStarted {
            game_id: self.rules.game_id(),
            difficulty: self.rules.difficulty(),
            session_id: self.session.session_id,
        });
        self.timer.start();
        self.begin_round();
    }

    pub fn restart(&mut self) {
        trace!(target: "game_state", "Restarting session {}", self.session.session_id);
        self.start();
    }

    fn begin_round(&mut self) {
        match self.rules.generate_round(self.rng.as_mut()) {
            Some(round) => {
                let prompt = self.rules.describe_round(&round);
                self.round = Some(round);
                self.session.round_had_error = false;
                self.session.input_locked = false;
                self.session.phase = SessionPhase::RoundActive;
                self.context.events.emit(GameEvent::RoundStarted {
                    round_index: self.session.round_index,
                    total_rounds: self.session.total_rounds,
                    prompt,
                });
            }
            None => {
                info!(target: "game_state", "No round could be generated; session ends by forfeit");
                self.forfeited = true;
                self.finish();
            }
        }
    }

    pub fn handle_input(&mut self, input: PlayerInput) -> InputOutcome {
        if self.disposed || !self.session.accepts_input() {
            trace!(target: "game_state", "Ignoring {input:?} in {:?}", self.session.phase);
            return InputOutcome::Ignored;
        }
        let Some(parsed) = self.rules.parse_input(input) else {
            return InputOutcome::Unrecognized;
        };
        let Some(round) = self.round.as_mut() else {
            return InputOutcome::Ignored;
        };
        trace!(target: "game_state", "Classifying {parsed:?}");
        let classification = self.rules.classify(round, parsed);
        let prompt = self.rules.describe_round(round);

        match &classification {
            Classification::Pending => {
                self.context.events.emit(GameEvent::RoundUpdated { prompt });
            }
            Classification::Rejected(reason) => {
                self.context
                    .events
                    .emit(GameEvent::Feedback(Feedback::Rejected(reason.clone())));
            }
            Classification::Correct => self.resolve_correct(),
            Classification::Incorrect => self.resolve_incorrect(),
        }
        InputOutcome::Classified(classification)
    }

    fn resolve_correct(&mut self) {
        let session = &mut self.session;
        session.attempts += 1;
        session.rounds_resolved += 1;
        if !session.round_had_error {
            session.first_try_correct += 1;
        }
        session.input_locked = true;
        session.phase = SessionPhase::Resolving;

        let message = self.rules.success_message(self.rng.as_mut());
        self.context
            .events
            .emit(GameEvent::Feedback(Feedback::Success(message)));

        let finishing = self.rules.is_complete(&self.session);
        let delay = self.rules.success_delay(finishing);
        self.schedule_transition(delay, Transition::Advance);
    }

    fn resolve_incorrect(&mut self) {
        let penalty_seconds = self.rules.penalty_seconds();
        let session = &mut self.session;
        session.attempts += 1;
        session.wrong_count += 1;
        session.round_had_error = true;
        session.penalty_seconds += penalty_seconds;
        session.input_locked = true;
        session.phase = SessionPhase::Resolving;
        if penalty_seconds > 0 {
            self.timer.add_penalty(penalty_seconds);
        }

        let message = match &self.round {
            Some(round) => self.rules.error_message(round, self.rng.as_mut()),
            None => String::new(),
        };
        self.context.events.emit(GameEvent::Feedback(Feedback::Error {
            message,
            penalty_seconds,
        }));
        let delay = self.rules.error_delay();
        self.schedule_transition(delay, Transition::Recover);
    }

    /// At most one transition is pending at a time; it is bound to the current play-through.
    fn schedule_transition(&mut self, delay: Duration, transition: Transition) {
        if let Some(pending) = self.transition.take() {
            warn!(target: "game_state", "Replacing pending transition {:?}", pending.id());
            pending.cancel();
        }
        if delay.is_zero() {
            self.run_transition(transition);
            return;
        }
        let session = self.self_ref.clone();
        let session_id = self.session.session_id;
        let handle = self.tasks.schedule_once(delay, move || {
            if let Some(session) = session.upgrade() {
                session.borrow_mut().on_transition_due(session_id, transition);
            }
        });
        self.transition = Some(handle);
    }

    fn on_transition_due(&mut self, session_id: Uuid, transition: Transition) {
        if self.disposed || session_id != self.session.session_id {
            warn!(target: "game_state", "Dropping stale {transition:?} for session {session_id}");
            return;
        }
        self.transition = None;
        self.run_transition(transition);
    }

    fn run_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Advance => self.advance(),
            Transition::Recover => self.recover(),
        }
    }

    fn advance(&mut self) {
        if self.rules.is_complete(&self.session) {
            self.finish();
        } else {
            self.session.round_index += 1;
            self.begin_round();
        }
    }

    fn recover(&mut self) {
        let policy = self.rules.resolution_policy();
        let prompt = match self.round.as_mut() {
            Some(round) => {
                match policy {
                    ResolutionPolicy::RetrySameRound => {}
                    ResolutionPolicy::ClearInput | ResolutionPolicy::RevertPair => {
                        self.rules.recover(round)
                    }
                }
                self.rules.describe_round(round)
            }
            None => String::new(),
        };
        trace!(target: "game_state", "Recovered with {policy:?}");
        self.session.input_locked = false;
        self.session.phase = SessionPhase::RoundActive;
        self.context.events.emit(GameEvent::RoundUpdated { prompt });
    }

    fn finish(&mut self) {
        self.session.phase = SessionPhase::Finished;
        self.session.input_locked = true;
        self.timer.stop();
        self.cancel_pending();

        let outcome = self.record_outcome();
        info!(
            target: "game_state",
            "Finished {} ({}): {:?}, best: {}",
            outcome.game_id,
            outcome.difficulty,
            outcome.metric,
            outcome.is_best
        );
        self.outcome = Some(outcome.clone());
        self.context.events.emit(GameEvent::Finished(outcome.clone()));

        let actions = self
            .actions
            .as_ref()
            .map(|make_actions| make_actions())
            .unwrap_or_default();
        self.context
            .presenter
            .present(ResultCard::new(outcome, actions));
    }

    fn record_outcome(&mut self) -> GameOutcome {
        let game_id = self.rules.game_id();
        let difficulty = self.rules.difficulty();
        let (metric, current_best, is_best) = match self.rules.scoring() {
            Scoring::Timed => {
                let seconds = self.timer.elapsed_seconds();
                let record = self
                    .context
                    .store
                    .borrow_mut()
                    .record_timed_result(game_id, difficulty, seconds);
                (ResultMetric::TimeSeconds(seconds), record.previous_best, record.is_best)
            }
            Scoring::Accuracy => {
                let score = self.rules.accuracy_score(&self.session, self.forfeited);
                let mut store = self.context.store.borrow_mut();
                let previous = store.best_score(game_id, difficulty);
                store.record_score(game_id, difficulty, score);
                let current_best = (previous > 0).then_some(previous);
                (ResultMetric::Score(score), current_best, score > previous)
            }
        };

        GameOutcome {
            game_id,
            difficulty,
            metric,
            current_best,
            is_best,
            details: self.rules.result_details(&self.session),
            wrong_count: self.session.wrong_count,
            attempts: self.session.attempts,
            session_id: self.session.session_id,
            finished_at: SystemTime::now(),
        }
    }

    fn cancel_pending(&mut self) -> usize {
        self.transition = None;
        self.tasks.cancel_all()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn round(&self) -> Option<&R::Round> {
        self.round.as_ref()
    }

    pub fn prompt(&self) -> Option<String> {
        self.round.as_ref().map(|round| self.rules.describe_round(round))
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.pending_count()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn cleanup(&mut self) {
        self.destroy();
    }
}

pub trait MountedGame {
    fn game_id(&self) -> GameId;
    fn difficulty(&self) -> Difficulty;
    fn start(&self);
    fn dispatch(&self, input: PlayerInput) -> InputOutcome;
    fn set_result_actions(&self, actions: ResultActionsFactory);
    fn session(&self) -> SessionState;
    fn prompt(&self) -> Option<String>;
    fn elapsed_seconds(&self) -> u32;
    fn cleanup(&self);

    fn is_input_locked(&self) -> bool {
        !self.session().accepts_input()
    }

    fn is_finished(&self) -> bool {
        self.session().phase == SessionPhase::Finished
    }
}

pub struct SessionHandle<R: GameRules> {
    session: Rc<RefCell<GameSession<R>>>,
}

impl<R: GameRules> SessionHandle<R> {
    pub fn new(rules: R, context: SessionContext) -> Self {
        Self {
            session: GameSession::new(rules, context),
        }
    }

    pub fn inner(&self) -> &Rc<RefCell<GameSession<R>>> {
        &self.session
    }
}

impl<R: GameRules> MountedGame for SessionHandle<R> {
    fn game_id(&self) -> GameId {
        self.session.borrow().rules.game_id()
    }

    fn difficulty(&self) -> Difficulty {
        self.session.borrow().rules.difficulty()
    }

    fn start(&self) {
        self.session.borrow_mut().start();
    }

    fn dispatch(&self, input: PlayerInput) -> InputOutcome {
        self.session.borrow_mut().handle_input(input)
    }

    fn set_result_actions(&self, actions: ResultActionsFactory) {
        self.session.borrow_mut().set_result_actions(actions);
    }

    fn session(&self) -> SessionState {
        self.session.borrow().session.clone()
    }

    fn prompt(&self) -> Option<String> {
        self.session.borrow().prompt()
    }

    fn elapsed_seconds(&self) -> u32 {
        self.session.borrow().elapsed_seconds()
    }

    fn cleanup(&self) {
        self.session.borrow_mut().cleanup();
    }
}
