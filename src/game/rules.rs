use std::fmt::Debug;
use std::time::Duration;

use rand::RngCore;

use super::variants::{encouragement, retry_message};
use crate::model::{Difficulty, GameId, PlayerInput, SessionState};

/// Verdict on one player input against the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Accepted but the round is not decided yet (first card of a pair, partial digits).
    Pending,
    /// Failed validation; nothing is counted and the round stays open.
    Rejected(String),
    Correct,
    Incorrect,
}

/// What happens to the round once the error delay after an incorrect answer has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    RetrySameRound,
    ClearInput,
    RevertPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    Timed,
    Accuracy,
}

/// Per-game content and tuning for [`super::game_engine::GameSession`]. One value per session.
pub trait GameRules: 'static {
    type Round: Debug + Clone;
    type Input: Debug;

    fn game_id(&self) -> GameId;

    fn difficulty(&self) -> Difficulty;

    /// `None` when the session ends on its own condition (see [`GameRules::is_complete`]).
    fn total_rounds(&self) -> Option<u32>;

    fn scoring(&self) -> Scoring;

    fn resolution_policy(&self) -> ResolutionPolicy;

    fn penalty_seconds(&self) -> u32 {
        0
    }

    fn success_delay(&self, finishing: bool) -> Duration;

    /// Delay between an incorrect input and [`GameRules::recover`].
    fn error_delay(&self) -> Duration;

    fn start_session(&mut self, _rng: &mut dyn RngCore) {}

    /// `None` means the game cannot go on and the player wins outright.
    fn generate_round(&mut self, rng: &mut dyn RngCore) -> Option<Self::Round>;

    fn parse_input(&self, input: PlayerInput) -> Option<Self::Input>;

    fn classify(&mut self, round: &mut Self::Round, input: Self::Input) -> Classification;

    /// Resets the round after an error under `ClearInput` and `RevertPair`; never called for
    /// `RetrySameRound`.
    fn recover(&mut self, _round: &mut Self::Round) {}

    fn is_complete(&self, session: &SessionState) -> bool {
        match session.total_rounds {
            Some(total) => session.rounds_resolved >= total,
            None => false,
        }
    }

    /// Score for [`Scoring::Accuracy`] games; `forfeited` is set when the opponent gave up.
    fn accuracy_score(&self, session: &SessionState, _forfeited: bool) -> u32 {
        let total = session.total_rounds.unwrap_or(session.rounds_resolved).max(1);
        ((session.first_try_correct as f64 / total as f64) * 100.0).round() as u32
    }

    fn describe_round(&self, round: &Self::Round) -> String;

    fn success_message(&self, rng: &mut dyn RngCore) -> String {
        encouragement(rng)
    }

    fn error_message(&self, _round: &Self::Round, rng: &mut dyn RngCore) -> String {
        let retry = retry_message(rng);
        match self.penalty_seconds() {
            0 => retry,
            penalty => format!("{retry} +{penalty}s"),
        }
    }

    fn result_details(&self, session: &SessionState) -> Vec<String>;
}
