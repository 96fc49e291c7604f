use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{debug, info};

use super::analytics::{Analytics, AnalyticsBridge, AnalyticsEvent, GAME_EXIT, GAME_REPLAY};
use crate::destroyable::Destroyable;
use crate::events::{EventHandler, EventObserver, Unsubscriber};
use crate::game::game_engine::{InputOutcome, MountedGame, SessionContext};
use crate::game::scheduler::TaskScope;
use crate::game::variants;
use crate::model::{Difficulty, GameEvent, GameId, PlayerInput, ResultActions, Route};
use crate::ui::{game_select_screen, home_screen, not_found_screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultAction {
    Replay,
    Exit,
}

/// Owns whatever screen is showing. At most one game is mounted; it is cleaned up before the
/// next route renders.
pub struct Router {
    context: SessionContext,
    analytics: Rc<dyn Analytics>,
    tasks: Rc<TaskScope>,
    current: Option<Box<dyn MountedGame>>,
    route: Route,
    // bumped on every unmount; result actions from an older mount are ignored
    generation: u64,
    bridge: Option<Unsubscriber<GameEvent>>,
    self_ref: Weak<RefCell<Router>>,
}

impl Router {
    pub fn new(
        context: SessionContext,
        observer: &EventObserver<GameEvent>,
        analytics: Rc<dyn Analytics>,
    ) -> Rc<RefCell<Self>> {
        let bridge = AnalyticsBridge::new(Rc::clone(&analytics), Rc::clone(&context.store));
        let subscription = observer.subscribe(move |event| bridge.handle_event(event));
        Rc::new_cyclic(|self_ref| {
            RefCell::new(Self {
                tasks: Rc::new(TaskScope::new(context.scheduler.clone())),
                context,
                analytics,
                current: None,
                route: Route::Home,
                generation: 0,
                bridge: Some(subscription),
                self_ref: self_ref.clone(),
            })
        })
    }

    /// Parses `location` and shows it; returns the route that is now showing.
    pub fn navigate(&mut self, location: &str) -> Route {
        let route = Route::parse(location);
        self.show(route.clone());
        route
    }

    pub fn show(&mut self, route: Route) {
        self.unmount();
        debug!(target: "router", "Showing {route}");
        if let Route::Play {
            game_id,
            difficulty,
        } = route
        {
            self.mount(game_id, difficulty);
        }
        self.route = route;
    }

    fn mount(&mut self, game_id: GameId, difficulty: Difficulty) {
        let game = variants::mount(game_id, difficulty, self.context.clone());
        let generation = self.generation;
        let router = self.self_ref.clone();
        let tasks = Rc::downgrade(&self.tasks);
        game.set_result_actions(Rc::new(move || {
            ResultActions::new(
                deferred(router.clone(), tasks.clone(), generation, ResultAction::Replay),
                deferred(router.clone(), tasks.clone(), generation, ResultAction::Exit),
            )
        }));
        game.start();
        info!(target: "router", "Mounted {game_id} ({difficulty})");
        self.current = Some(game);
    }

    fn unmount(&mut self) {
        self.tasks.cancel_all();
        if let Some(game) = self.current.take() {
            debug!(target: "router", "Unmounting {}", game.game_id());
            game.cleanup();
        }
        self.generation += 1;
    }

    fn on_result_action(&mut self, generation: u64, action: ResultAction) {
        if generation != self.generation {
            debug!(target: "router", "Ignoring stale {action:?}");
            return;
        }
        let Route::Play {
            game_id,
            difficulty,
        } = self.route
        else {
            return;
        };
        match action {
            ResultAction::Replay => {
                self.analytics
                    .track(AnalyticsEvent::for_game(GAME_REPLAY, game_id, difficulty));
                self.show(self.route.clone());
            }
            ResultAction::Exit => {
                self.analytics
                    .track(AnalyticsEvent::for_game(GAME_EXIT, game_id, difficulty));
                self.show(Route::GameSelect);
            }
        }
    }

    pub fn dispatch(&self, input: PlayerInput) -> InputOutcome {
        match &self.current {
            Some(game) => game.dispatch(input),
            None => InputOutcome::Ignored,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn current_game(&self) -> Option<&dyn MountedGame> {
        self.current.as_deref()
    }

    /// Text for the screen that is showing; the prompt while a game is mounted.
    pub fn screen(&self) -> String {
        match &self.route {
            Route::Home => home_screen(&self.context.store.borrow()),
            Route::GameSelect => game_select_screen(&self.context.store.borrow()),
            Route::GameNotFound(slug) => not_found_screen(slug),
            Route::Play { .. } => self
                .current
                .as_ref()
                .and_then(|game| game.prompt())
                .unwrap_or_default(),
        }
    }
}

// result actions fire from the presenter; they run on the next tick so the finished
// session is no longer borrowed when it gets torn down
fn deferred(
    router: Weak<RefCell<Router>>,
    tasks: Weak<TaskScope>,
    generation: u64,
    action: ResultAction,
) -> impl FnOnce() + 'static {
    move || {
        let Some(tasks) = tasks.upgrade() else {
            return;
        };
        tasks.schedule_once(Duration::ZERO, move || {
            if let Some(router) = router.upgrade() {
                router.borrow_mut().on_result_action(generation, action);
            }
        });
    }
}

impl Destroyable for Router {
    fn destroy(&mut self) {
        self.unmount();
        if let Some(bridge) = self.bridge.take() {
            bridge.unsubscribe();
        }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::analytics::{MemoryAnalytics, GAME_COMPLETE, GAME_START};
    use crate::events::{Channel, EventEmitter};
    use crate::game::scheduler::Scheduler;
    use crate::game::stats_manager::ScoreStore;
    use crate::model::{ResultMetric, SessionPhase};
    use crate::ui::RecordingPresenter;

    struct Fixture {
        scheduler: Scheduler,
        presenter: Rc<RecordingPresenter>,
        analytics: MemoryAnalytics,
        router: Rc<RefCell<Router>>,
        _events: EventEmitter<GameEvent>,
    }

    fn fixture() -> Fixture {
        let (scheduler, _) = Scheduler::manual();
        let presenter = Rc::new(RecordingPresenter::default());
        let analytics = MemoryAnalytics::default();
        let (events, observer) = Channel::new();
        let context = SessionContext {
            scheduler: scheduler.clone(),
            store: Rc::new(RefCell::new(ScoreStore::in_memory())),
            presenter: presenter.clone(),
            events: events.clone(),
            seed: Some(3),
        };
        let router = Router::new(context, &observer, Rc::new(analytics.clone()));
        Fixture {
            scheduler,
            presenter,
            analytics,
            router,
            _events: events,
        }
    }

    /// Reads `a op b = ?` off the prompt.
    fn solve(prompt: &str) -> i64 {
        let parts: Vec<&str> = prompt.split_whitespace().collect();
        let left: i64 = parts[0].parse().unwrap();
        let right: i64 = parts[2].parse().unwrap();
        match parts[1] {
            "+" => left + right,
            "-" => left - right,
            "×" => left * right,
            other => panic!("unexpected operator {other}"),
        }
    }

    fn play_math_perfectly(f: &Fixture) {
        for _ in 0..20 {
            let prompt = {
                let router = f.router.borrow();
                let game = router.current_game().unwrap();
                if game.is_finished() {
                    return;
                }
                game.prompt().unwrap()
            };
            for digit in solve(&prompt).to_string().bytes() {
                f.router
                    .borrow()
                    .dispatch(PlayerInput::Digit(digit - b'0'));
            }
            f.scheduler.advance(Duration::from_secs(2));
        }
        panic!("math session never finished");
    }

    #[test]
    fn test_navigate_mounts_and_remount_cleans_up() {
        let f = fixture();
        let route = f.router.borrow_mut().navigate("#/play/color-find/normal");
        assert_eq!(
            route,
            Route::Play {
                game_id: GameId::ColorFind,
                difficulty: Difficulty::Normal
            }
        );
        {
            let router = f.router.borrow();
            let game = router.current_game().unwrap();
            assert_eq!(game.game_id(), GameId::ColorFind);
            assert_eq!(game.session().phase, SessionPhase::RoundActive);
        }
        assert!(f.scheduler.pending_count() > 0);
        assert_eq!(f.analytics.names(), vec![GAME_START]);

        f.router.borrow_mut().navigate("#/games");
        assert!(f.router.borrow().current_game().is_none());
        assert_eq!(f.scheduler.pending_count(), 0);
        assert_eq!(
            f.router.borrow().dispatch(PlayerInput::Pick(0)),
            InputOutcome::Ignored
        );
    }

    #[test]
    fn test_unknown_game_shows_not_found() {
        let f = fixture();
        let route = f.router.borrow_mut().navigate("#/play/chess/hard");
        assert_eq!(route, Route::GameNotFound("chess".to_string()));
        assert!(f.router.borrow().current_game().is_none());
        assert!(f.router.borrow().screen().contains("Game not found: chess"));
        assert!(f.analytics.names().is_empty());
    }

    #[test]
    fn test_perfect_math_run_scores_full_marks() {
        let f = fixture();
        f.router.borrow_mut().navigate("#/play/math-challenge/easy");
        play_math_perfectly(&f);

        let outcomes = f.presenter.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].metric, ResultMetric::Score(100));
        assert_eq!(outcomes[0].wrong_count, 0);
        assert_eq!(outcomes[0].attempts, 5);
        assert_eq!(
            f.router.borrow().current_game().unwrap().session().penalty_seconds,
            0
        );
        assert!(outcomes[0].details.contains(&"Solved first try: 5/5".to_string()));
        assert_eq!(f.analytics.names(), vec![GAME_START, GAME_COMPLETE]);
        assert_eq!(f.analytics.events()[1].properties["score"], 100);
    }

    #[test]
    fn test_replay_is_deferred_and_remounts_same_game() {
        let f = fixture();
        f.router.borrow_mut().navigate("#/play/math-challenge/easy");
        play_math_perfectly(&f);
        let card = f.presenter.take_card().unwrap();

        card.replay();
        assert!(f.router.borrow().current_game().unwrap().is_finished());
        f.scheduler.run_due();

        let router = f.router.borrow();
        let game = router.current_game().unwrap();
        assert_eq!(game.game_id(), GameId::MathChallenge);
        assert!(!game.is_finished());
        assert_eq!(
            f.analytics.names(),
            vec![GAME_START, GAME_COMPLETE, GAME_REPLAY, GAME_START]
        );
    }

    #[test]
    fn test_exit_returns_to_game_select() {
        let f = fixture();
        f.router.borrow_mut().navigate("#/play/math-challenge/easy");
        play_math_perfectly(&f);
        f.presenter.take_card().unwrap().exit();
        f.scheduler.run_due();

        assert_eq!(*f.router.borrow().route(), Route::GameSelect);
        assert!(f.router.borrow().current_game().is_none());
        assert_eq!(f.analytics.names().last().unwrap(), GAME_EXIT);
        assert!(f.router.borrow().screen().contains("(1 played)"));
    }

    #[test]
    fn test_result_action_after_navigation_is_ignored() {
        let f = fixture();
        f.router.borrow_mut().navigate("#/play/math-challenge/easy");
        play_math_perfectly(&f);
        let card = f.presenter.take_card().unwrap();

        f.router.borrow_mut().navigate("#/");
        card.replay();
        f.scheduler.run_due();

        assert_eq!(*f.router.borrow().route(), Route::Home);
        assert!(f.router.borrow().current_game().is_none());
        assert!(!f.analytics.names().contains(&GAME_REPLAY.to_string()));
    }

    #[test]
    fn test_destroy_unmounts_and_stops_reporting() {
        let f = fixture();
        f.router.borrow_mut().navigate("#/play/word-chain/easy");
        f.router.borrow_mut().destroy();
        assert_eq!(f.scheduler.pending_count(), 0);
        assert!(f.router.borrow().current_game().is_none());
    }
}
