mod difficulty;
mod game_event;
mod game_id;
mod game_outcome;
mod game_stats;
mod input_event;
mod route;
mod session_state;
mod timer_state;

pub use difficulty::Difficulty;
pub use game_event::{Feedback, GameEvent};
pub use game_id::{CatalogEntry, GameId};
pub use game_outcome::{
    GameOutcome, ResultActions, ResultActionsFactory, ResultCard, ResultMetric,
};
pub use game_stats::{GameRecord, PerDifficulty, PersistedState, TimedRecord};
pub use input_event::PlayerInput;
pub use route::Route;
pub use session_state::{SessionPhase, SessionState};
pub use timer_state::TimerState;
