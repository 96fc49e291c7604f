use std::time::SystemTime;

use serde::Serialize;
use serde_with::{serde_as, TimestampSeconds};
use uuid::Uuid;

use super::{Difficulty, GameId};

/// The single metric a game is ranked by.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ResultMetric {
    TimeSeconds(u32),
    Score(u32),
}

impl ResultMetric {
    pub fn value(&self) -> u32 {
        match self {
            ResultMetric::TimeSeconds(v) | ResultMetric::Score(v) => *v,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub game_id: GameId,
    pub difficulty: Difficulty,
    pub metric: ResultMetric,
    /// Best before this session was recorded; `None` when there was none.
    pub current_best: Option<u32>,
    pub is_best: bool,
    pub details: Vec<String>,
    pub wrong_count: u32,
    pub attempts: u32,
    pub session_id: Uuid,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub finished_at: SystemTime,
}

impl GameOutcome {
    /// Seconds (or points) between this result and the previous best, zero when it is a record.
    pub fn distance_to_best(&self) -> Option<u32> {
        let best = self.current_best?;
        Some(match self.metric {
            ResultMetric::TimeSeconds(seconds) => seconds.saturating_sub(best),
            ResultMetric::Score(score) => best.saturating_sub(score),
        })
    }
}

/// Navigation callbacks handed to the presenter together with the outcome.
pub struct ResultActions {
    on_replay: Box<dyn FnOnce()>,
    on_exit: Box<dyn FnOnce()>,
}

impl Default for ResultActions {
    fn default() -> Self {
        Self {
            on_replay: Box::new(|| ()),
            on_exit: Box::new(|| ()),
        }
    }
}

impl ResultActions {
    pub fn new(on_replay: impl FnOnce() + 'static, on_exit: impl FnOnce() + 'static) -> Self {
        Self {
            on_replay: Box::new(on_replay),
            on_exit: Box::new(on_exit),
        }
    }
}

/// Builds fresh actions for each finished play-through of a session.
pub type ResultActionsFactory = std::rc::Rc<dyn Fn() -> ResultActions>;

pub struct ResultCard {
    pub outcome: GameOutcome,
    actions: ResultActions,
}

impl std::fmt::Debug for ResultCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResultCard {{ outcome: {:?} }}", self.outcome)
    }
}

impl ResultCard {
    pub fn new(outcome: GameOutcome, actions: ResultActions) -> Self {
        Self { outcome, actions }
    }

    pub fn replay(self) {
        (self.actions.on_replay)();
    }

    pub fn exit(self) {
        (self.actions.on_exit)();
    }
}
