pub mod game_engine;
pub mod randomizer;
pub mod round_timer;
pub mod rules;
pub mod scheduler;
pub mod settings;
pub mod stats_manager;
pub mod variants;

pub use game_engine::{GameSession, InputOutcome, MountedGame, SessionContext, SessionHandle};
pub use scheduler::{Scheduler, TaskScope};
pub use stats_manager::ScoreStore;
