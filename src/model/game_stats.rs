use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DefaultOnNull};

use super::{Difficulty, GameId};

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct PerDifficulty<T: Default> {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub easy: T,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub normal: T,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub hard: T,
}

impl<T: Default> PerDifficulty<T> {
    pub fn get(&self, difficulty: Difficulty) -> &T {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn get_mut(&mut self, difficulty: Difficulty) -> &mut T {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Per-game counters and bests. A game only ever fills one of the two best maps.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub plays: u32,
    #[serde(default)]
    pub best_scores: PerDifficulty<u32>,
    #[serde(default)]
    pub best_times: PerDifficulty<Option<u32>>,
    /// Fields written by other versions, carried through saves untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole persisted document, keyed by game slug so unknown games survive a save.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub total_plays: u32,
    #[serde(default)]
    pub games: BTreeMap<String, GameRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PersistedState {
    fn default() -> Self {
        let mut state = PersistedState {
            total_plays: 0,
            games: BTreeMap::new(),
            extra: Map::new(),
        };
        state.fill_defaults();
        state
    }
}

impl PersistedState {
    pub fn fill_defaults(&mut self) {
        for game_id in GameId::all() {
            self.games.entry(game_id.slug().to_string()).or_default();
        }
    }

    pub fn game(&self, game_id: GameId) -> Option<&GameRecord> {
        self.games.get(game_id.slug())
    }

    pub fn game_mut(&mut self, game_id: GameId) -> &mut GameRecord {
        self.games.entry(game_id.slug().to_string()).or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedRecord {
    pub previous_best: Option<u32>,
    pub is_best: bool,
}
