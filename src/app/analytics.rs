use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::events::EventHandler;
use crate::game::stats_manager::ScoreStore;
use crate::model::{Difficulty, GameEvent, GameId};

pub const GAME_START: &str = "game_start";
pub const GAME_COMPLETE: &str = "game_complete";
pub const GAME_REPLAY: &str = "game_replay";
pub const GAME_EXIT: &str = "game_exit";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: BTreeMap<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn for_game(name: &str, game_id: GameId, difficulty: Difficulty) -> Self {
        Self::new(name)
            .with("game_id", game_id.slug())
            .with("difficulty", difficulty.slug())
    }
}

/// Fire-and-forget sink; delivery failures never reach the caller.
pub trait Analytics {
    fn track(&self, event: AnalyticsEvent);
}

#[derive(Debug, Default)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => info!(target: "analytics", "{line}"),
            Err(err) => warn!(target: "analytics", "Dropping {}: {err}", event.name),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn track(&self, _event: AnalyticsEvent) {}
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAnalytics {
    events: Rc<RefCell<Vec<AnalyticsEvent>>>,
}

impl MemoryAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.name.clone()).collect()
    }
}

impl Analytics for MemoryAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Turns session events into `game_start` and `game_complete`.
pub struct AnalyticsBridge {
    sink: Rc<dyn Analytics>,
    store: Rc<RefCell<ScoreStore>>,
}

impl AnalyticsBridge {
    pub fn new(sink: Rc<dyn Analytics>, store: Rc<RefCell<ScoreStore>>) -> Self {
        Self { sink, store }
    }
}

impl EventHandler<GameEvent> for AnalyticsBridge {
    fn handle_event(&self, event: &GameEvent) {
        match event {
            GameEvent::SessionStarted {
                game_id,
                difficulty,
                ..
            } => self
                .sink
                .track(AnalyticsEvent::for_game(GAME_START, *game_id, *difficulty)),
            GameEvent::Finished(outcome) => {
                let mut event =
                    AnalyticsEvent::for_game(GAME_COMPLETE, outcome.game_id, outcome.difficulty)
                        .with("score", outcome.metric.value())
                        .with("wrong_count", outcome.wrong_count)
                        .with("attempt_count", outcome.attempts)
                        .with("total_plays", self.store.borrow().total_plays());
                if outcome.game_id == GameId::CardMatch {
                    event = event.with("mismatch_count", outcome.wrong_count);
                }
                self.sink.track(event);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use test_context::test_context;
    use uuid::Uuid;

    use crate::model::{GameOutcome, ResultMetric};
    use crate::tests::UsingLogger;

    #[test]
    fn test_event_properties_are_flat() {
        let event = AnalyticsEvent::for_game(GAME_START, GameId::WordChain, Difficulty::Hard)
            .with("extra", 3);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "game_start");
        assert_eq!(json["properties"]["game_id"], "word-chain");
        assert_eq!(json["properties"]["difficulty"], "hard");
        assert_eq!(json["properties"]["extra"], 3);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_log_and_noop_sinks_accept_events(_: &mut UsingLogger) {
        LogAnalytics.track(AnalyticsEvent::new(GAME_EXIT).with("game_id", "card-match"));
        NoopAnalytics.track(AnalyticsEvent::new(GAME_EXIT));
    }

    #[test]
    fn test_bridge_reports_start_and_completion() {
        let sink = MemoryAnalytics::default();
        let store = Rc::new(RefCell::new(ScoreStore::in_memory()));
        store
            .borrow_mut()
            .record_timed_result(GameId::CardMatch, Difficulty::Easy, 30);
        let bridge = AnalyticsBridge::new(Rc::new(sink.clone()), store);

        bridge.handle_event(&GameEvent::SessionStarted {
            game_id: GameId::CardMatch,
            difficulty: Difficulty::Easy,
            session_id: Uuid::new_v4(),
        });
        bridge.handle_event(&GameEvent::TimerTick(4));
        bridge.handle_event(&GameEvent::Finished(GameOutcome {
            game_id: GameId::CardMatch,
            difficulty: Difficulty::Easy,
            metric: ResultMetric::TimeSeconds(30),
            current_best: None,
            is_best: true,
            details: Vec::new(),
            wrong_count: 2,
            attempts: 5,
            session_id: Uuid::new_v4(),
            finished_at: SystemTime::now(),
        }));

        assert_eq!(sink.names(), vec![GAME_START, GAME_COMPLETE]);
        let complete = &sink.events()[1];
        assert_eq!(complete.properties["score"], 30);
        assert_eq!(complete.properties["mismatch_count"], 2);
        assert_eq!(complete.properties["total_plays"], 1);
    }
}
