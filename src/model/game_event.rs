use uuid::Uuid;

use super::{Difficulty, GameId, GameOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error { message: String, penalty_seconds: u32 },
    /// Input failed validation; nothing was counted.
    Rejected(String),
}

#[derive(Debug, Clone)]
pub enum GameEvent {
    SessionStarted {
        game_id: GameId,
        difficulty: Difficulty,
        session_id: Uuid,
    },
    RoundStarted {
        round_index: u32,
        total_rounds: Option<u32>,
        prompt: String,
    },
    /// Same round, new presentation: partial input, a re-prompt or a reverted pair.
    RoundUpdated {
        prompt: String,
    },
    Feedback(Feedback),
    TimerTick(u32),
    Finished(GameOutcome),
}
