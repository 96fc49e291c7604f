use std::fmt;
use std::time::Duration;

use itertools::Itertools;
use rand::RngCore;

use crate::game::randomizer::{coin_flip, pick_or_default, uniform_int};
use crate::game::rules::{Classification, GameRules, ResolutionPolicy, Scoring};
use crate::model::{Difficulty, GameId, PlayerInput, SessionState};

const PENALTY_SECONDS: u32 = 3;
const SUCCESS_DELAY: Duration = Duration::from_millis(800);
const ERROR_DELAY: Duration = Duration::from_millis(300);
const MIN_LIGHTNESS: i32 = 25;
const MAX_LIGHTNESS: i32 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsl {
    pub hue: i32,
    pub saturation: i32,
    pub lightness: i32,
}

impl Hsl {
    pub const fn new(hue: i32, saturation: i32, lightness: i32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    pub fn shift_hue(self, delta: i32) -> Self {
        Self {
            hue: (self.hue + delta).rem_euclid(360),
            ..self
        }
    }

    /// Lightness moves by half of `delta`, rounded away from zero, and stays within the
    /// readable band.
    pub fn shift_lightness(self, delta: i32) -> Self {
        let half = (f64::from(delta) / 2.0).round() as i32;
        Self {
            lightness: (self.lightness + half).clamp(MIN_LIGHTNESS, MAX_LIGHTNESS),
            ..self
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

pub const BASE_COLORS: [Hsl; 7] = [
    Hsl::new(0, 70, 60),
    Hsl::new(30, 80, 55),
    Hsl::new(60, 70, 50),
    Hsl::new(120, 50, 50),
    Hsl::new(200, 60, 55),
    Hsl::new(260, 50, 60),
    Hsl::new(340, 60, 60),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorProfile {
    pub grid_size: usize,
    pub columns: usize,
    pub color_delta: i32,
    pub rounds: u32,
}

impl ColorProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (grid_size, columns, color_delta, rounds) = match difficulty {
            Difficulty::Easy => (9, 3, 60, 5),
            Difficulty::Normal => (16, 4, 35, 7),
            Difficulty::Hard => (25, 5, 20, 10),
        };
        Self {
            grid_size,
            columns,
            color_delta,
            rounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGrid {
    pub base: Hsl,
    pub odd: Hsl,
    pub odd_index: usize,
    pub grid_size: usize,
    pub columns: usize,
}

impl ColorGrid {
    pub fn generate(profile: ColorProfile, rng: &mut dyn RngCore) -> Self {
        let base = pick_or_default(rng, &BASE_COLORS);
        let delta = if coin_flip(rng) {
            profile.color_delta
        } else {
            -profile.color_delta
        };
        let odd = if coin_flip(rng) {
            base.shift_hue(delta)
        } else {
            base.shift_lightness(delta)
        };
        let odd_index = uniform_int(rng, 0, profile.grid_size as i64 - 1) as usize;
        Self {
            base,
            odd,
            odd_index,
            grid_size: profile.grid_size,
            columns: profile.columns,
        }
    }

    pub fn color_at(&self, index: usize) -> Hsl {
        if index == self.odd_index {
            self.odd
        } else {
            self.base
        }
    }
}

#[derive(Debug)]
pub struct ColorFind {
    difficulty: Difficulty,
    profile: ColorProfile,
}

impl ColorFind {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: ColorProfile::for_difficulty(difficulty),
        }
    }
}

impl GameRules for ColorFind {
    type Round = ColorGrid;
    type Input = usize;

    fn game_id(&self) -> GameId {
        GameId::ColorFind
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn total_rounds(&self) -> Option<u32> {
        Some(self.profile.rounds)
    }

    fn scoring(&self) -> Scoring {
        Scoring::Timed
    }

    fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy::RetrySameRound
    }

    fn penalty_seconds(&self) -> u32 {
        PENALTY_SECONDS
    }

    fn success_delay(&self, _finishing: bool) -> Duration {
        SUCCESS_DELAY
    }

    fn error_delay(&self) -> Duration {
        ERROR_DELAY
    }

    fn generate_round(&mut self, rng: &mut dyn RngCore) -> Option<ColorGrid> {
        Some(ColorGrid::generate(self.profile, rng))
    }

    fn parse_input(&self, input: PlayerInput) -> Option<usize> {
        match input {
            PlayerInput::Pick(index) => Some(index),
            _ => None,
        }
    }

    fn classify(&mut self, grid: &mut ColorGrid, index: usize) -> Classification {
        if index >= grid.grid_size {
            Classification::Rejected(format!("Pick a cell from 0 to {}", grid.grid_size - 1))
        } else if index == grid.odd_index {
            Classification::Correct
        } else {
            Classification::Incorrect
        }
    }

    fn describe_round(&self, grid: &ColorGrid) -> String {
        let cells = (0..grid.grid_size)
            .map(|index| format!("{index:>2} {}", grid.color_at(index)))
            .chunks(grid.columns)
            .into_iter()
            .map(|mut row| row.join("  "))
            .join("\n");
        format!("Find the one cell with a different color\n{cells}")
    }

    fn result_details(&self, session: &SessionState) -> Vec<String> {
        vec![
            format!("Wrong picks: {}", session.wrong_count),
            format!("Penalty: +{}s", session.penalty_seconds),
        ]
    }
}
