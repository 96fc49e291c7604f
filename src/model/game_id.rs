use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    CardMatch,
    NumberSequence,
    ColorFind,
    MathChallenge,
    WordChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: GameId,
    pub title: &'static str,
    pub description: &'static str,
    pub area: &'static str,
}

impl GameId {
    pub fn all() -> [GameId; 5] {
        [
            GameId::CardMatch,
            GameId::NumberSequence,
            GameId::ColorFind,
            GameId::MathChallenge,
            GameId::WordChain,
        ]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            GameId::CardMatch => "card-match",
            GameId::NumberSequence => "number-sequence",
            GameId::ColorFind => "color-find",
            GameId::MathChallenge => "math-challenge",
            GameId::WordChain => "word-chain",
        }
    }

    pub fn catalog_entry(&self) -> CatalogEntry {
        let (title, description, area) = match self {
            GameId::CardMatch => ("Card Match", "Find the pairs among the face-down cards", "memory"),
            GameId::NumberSequence => ("Number Sequence", "Fill in the missing number", "logic"),
            GameId::ColorFind => ("Color Find", "Spot the one tile with a different color", "attention"),
            GameId::MathChallenge => ("Mental Math", "Solve quick arithmetic problems", "calculation"),
            GameId::WordChain => ("Word Chain", "Chain words against the computer", "language"),
        };
        CatalogEntry {
            id: *self,
            title,
            description,
            area,
        }
    }

    pub fn title(&self) -> &'static str {
        self.catalog_entry().title
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for GameId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameId::all()
            .into_iter()
            .find(|id| id.slug() == s)
            .ok_or_else(|| format!("unknown game: {s}"))
    }
}
