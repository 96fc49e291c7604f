use std::cell::{Cell, RefCell};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::PersistenceError;
use crate::model::{Difficulty, GameId, GameRecord, PersistedState, TimedRecord};

pub const STATE_FILE_NAME: &str = "morimori_state.json";

/// Where the state document lives. Reads of a missing document return `Ok(None)`.
pub trait StateStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError>;
    fn write(&self, contents: &str) -> Result<(), PersistenceError>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, contents: &str) -> Result<(), PersistenceError> {
        let io_error = |source: std::io::Error| PersistenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(&io_error)?;
        }
        fs::write(&self.path, contents).map_err(&io_error)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Rc<RefCell<Option<String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        let storage = Self::new();
        *storage.contents.borrow_mut() = Some(contents.to_string());
        storage
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(ErrorKind::StorageFull, "quota exceeded"),
            });
        }
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

pub struct ScoreStore {
    storage: Box<dyn StateStorage>,
    state: PersistedState,
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStore")
            .field("storage", &self.storage.describe())
            .field("state", &self.state)
            .finish()
    }
}

impl ScoreStore {
    /// Never fails: unreadable or corrupt documents start from defaults.
    pub fn load(storage: Box<dyn StateStorage>) -> Self {
        let state = match storage.read() {
            Ok(Some(raw)) => Self::parse_state(&raw, &storage.describe()),
            Ok(None) => {
                debug!(target: "stats", "No saved state in {}", storage.describe());
                PersistedState::default()
            }
            Err(err) => {
                warn!(target: "stats", "Could not read saved state: {err}");
                PersistedState::default()
            }
        };
        Self { storage, state }
    }

    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    fn parse_state(raw: &str, source: &str) -> PersistedState {
        match serde_json::from_str::<PersistedState>(raw) {
            Ok(mut state) => {
                state.fill_defaults();
                state
            }
            Err(err) => {
                warn!(target: "stats", "Ignoring corrupt state in {source}: {err}");
                PersistedState::default()
            }
        }
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn total_plays(&self) -> u32 {
        self.state.total_plays
    }

    pub fn game_record(&self, game_id: GameId) -> GameRecord {
        self.state.game(game_id).cloned().unwrap_or_default()
    }

    pub fn plays(&self, game_id: GameId) -> u32 {
        self.state.game(game_id).map(|record| record.plays).unwrap_or(0)
    }

    pub fn best_score(&self, game_id: GameId, difficulty: Difficulty) -> u32 {
        self.state
            .game(game_id)
            .map(|record| *record.best_scores.get(difficulty))
            .unwrap_or(0)
    }

    pub fn best_time(&self, game_id: GameId, difficulty: Difficulty) -> Option<u32> {
        self.state
            .game(game_id)
            .and_then(|record| *record.best_times.get(difficulty))
    }

    fn count_play(&mut self, game_id: GameId) {
        self.state.total_plays += 1;
        self.state.game_mut(game_id).plays += 1;
    }

    /// Higher-is-better record. Counts the play, keeps the maximum, saves.
    pub fn record_score(&mut self, game_id: GameId, difficulty: Difficulty, score: u32) {
        self.count_play(game_id);
        let best = self.state.game_mut(game_id).best_scores.get_mut(difficulty);
        if score > *best {
            info!(target: "stats", "New best score for {game_id}/{difficulty}: {score} (was {best})");
            *best = score;
        }
        self.persist();
    }

    /// Lower-is-better record. Counts the play, keeps the minimum, saves, and reports the
    /// best as it was before this result.
    pub fn record_timed_result(
        &mut self,
        game_id: GameId,
        difficulty: Difficulty,
        seconds: u32,
    ) -> TimedRecord {
        self.count_play(game_id);
        let best = self.state.game_mut(game_id).best_times.get_mut(difficulty);
        let previous_best = *best;
        let is_best = match previous_best {
            Some(previous) => seconds < previous,
            None => true,
        };
        if is_best {
            info!(target: "stats", "New best time for {game_id}/{difficulty}: {seconds}s (was {previous_best:?})");
            *best = Some(seconds);
        }
        self.persist();
        TimedRecord {
            previous_best,
            is_best,
        }
    }

    pub fn save(&self) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string(&self.state)?;
        self.storage.write(&contents)
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!(target: "stats", "Dropping state write to {}: {err}", self.storage.describe());
        }
    }
}
