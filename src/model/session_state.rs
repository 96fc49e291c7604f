use std::time::Duration;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    RoundActive,
    /// A success or error transition is pending; input is locked.
    Resolving,
    Finished,
}

/// Counters of one play-through, owned by exactly one controller.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub round_index: u32,
    /// `None` when the game ends on its own condition rather than a round count.
    pub total_rounds: Option<u32>,
    pub wrong_count: u32,
    pub penalty_seconds: u32,
    /// Resolved inputs, correct or not. For card matching this is the move count.
    pub attempts: u32,
    pub first_try_correct: u32,
    pub rounds_resolved: u32,
    pub round_had_error: bool,
    pub started_at: Duration,
    pub input_locked: bool,
    pub phase: SessionPhase,
}

impl SessionState {
    pub fn new(total_rounds: Option<u32>, started_at: Duration) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            round_index: 1,
            total_rounds,
            wrong_count: 0,
            penalty_seconds: 0,
            attempts: 0,
            first_try_correct: 0,
            rounds_resolved: 0,
            round_had_error: false,
            started_at,
            input_locked: false,
            phase: SessionPhase::Idle,
        }
    }

    pub fn accepts_input(&self) -> bool {
        self.phase == SessionPhase::RoundActive && !self.input_locked
    }
}
