use std::collections::BTreeSet;
use std::time::Duration;

use itertools::Itertools;
use rand::RngCore;

use crate::game::randomizer::{coin_flip, pick_or_default, shuffle, uniform_int};
use crate::game::rules::{Classification, GameRules, ResolutionPolicy, Scoring};
use crate::model::{Difficulty, GameId, PlayerInput, SessionState};

const PENALTY_SECONDS: u32 = 5;
const SUCCESS_DELAY: Duration = Duration::from_millis(800);
const ERROR_DELAY: Duration = Duration::from_millis(650);
const SEQUENCE_LENGTH: usize = 5;
const DISTRACTORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Progression {
    #[default]
    Add,
    Subtract,
    Multiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceProfile {
    pub rounds: u32,
    pub max_step: i64,
    pub progressions: &'static [Progression],
}

impl SequenceProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => SequenceProfile {
                rounds: 5,
                max_step: 5,
                progressions: &[Progression::Add],
            },
            Difficulty::Normal => SequenceProfile {
                rounds: 7,
                max_step: 10,
                progressions: &[Progression::Add, Progression::Subtract],
            },
            Difficulty::Hard => SequenceProfile {
                rounds: 10,
                max_step: 15,
                progressions: &[Progression::Add, Progression::Subtract, Progression::Multiply],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRound {
    pub terms: Vec<i64>,
    pub blank: usize,
    pub answer: i64,
    pub options: Vec<i64>,
}

impl SequenceRound {
    pub fn generate(profile: SequenceProfile, rng: &mut dyn RngCore) -> Self {
        let progression = pick_or_default(rng, profile.progressions);
        let terms = Self::terms(progression, profile.max_step, rng);
        let blank = uniform_int(rng, 1, SEQUENCE_LENGTH as i64 - 2) as usize;
        let answer = terms[blank];
        let step = (terms[1] - terms[0]).abs().max(1);
        let mut options = distractors(answer, step, rng);
        options.push(answer);
        Self {
            terms,
            blank,
            answer,
            options: shuffle(rng, &options),
        }
    }

    fn terms(progression: Progression, max_step: i64, rng: &mut dyn RngCore) -> Vec<i64> {
        let positions = 0..SEQUENCE_LENGTH as u32;
        match progression {
            Progression::Add => {
                let start = uniform_int(rng, 1, 20);
                let step = uniform_int(rng, 1, max_step);
                positions.map(|i| start + step * i as i64).collect()
            }
            Progression::Subtract => {
                let step = uniform_int(rng, 1, max_step);
                let start = uniform_int(rng, step * 5, step * 5 + 30);
                positions.map(|i| start - step * i as i64).collect()
            }
            Progression::Multiply => {
                let base = uniform_int(rng, 1, 5);
                let ratio = uniform_int(rng, 2, 4);
                positions.map(|i| base * ratio.pow(i)).collect()
            }
        }
    }
}

/// Three distinct positive wrong answers within `3 * step` of `answer`.
pub fn distractors(answer: i64, step: i64, rng: &mut dyn RngCore) -> Vec<i64> {
    let mut wrong = BTreeSet::new();
    // answer >= 1 and the band is at least [1, 3], so answer + offset always has candidates
    while wrong.len() < DISTRACTORS {
        let offset = uniform_int(rng, 1, step * 3);
        let candidate = if coin_flip(rng) {
            answer + offset
        } else {
            answer - offset
        };
        if candidate > 0 && candidate != answer {
            wrong.insert(candidate);
        }
    }
    wrong.into_iter().collect()
}

#[derive(Debug)]
pub struct NumberSequence {
    difficulty: Difficulty,
    profile: SequenceProfile,
}

impl NumberSequence {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: SequenceProfile::for_difficulty(difficulty),
        }
    }
}

impl GameRules for NumberSequence {
    type Round = SequenceRound;
    type Input = usize;

    fn game_id(&self) -> GameId {
        GameId::NumberSequence
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

    fn generate_round(&mut self, rng: &mut dyn RngCore) -> Option<SequenceRound> {
        Some(SequenceRound::generate(self.profile, rng))
    }

    fn parse_input(&self, input: PlayerInput) -> Option<usize> {
        match input {
            PlayerInput::Pick(index) => Some(index),
            _ => None,
        }
    }

    fn classify(&mut self, round: &mut SequenceRound, index: usize) -> Classification {
        match round.options.get(index) {
            None => Classification::Rejected(format!(
                "Choose an option from #0 to #{}",
                round.options.len() - 1
            )),
            Some(value) if *value == round.answer => Classification::Correct,
            Some(_) => Classification::Incorrect,
        }
    }

    fn describe_round(&self, round: &SequenceRound) -> String {
        let sequence = round
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                if i == round.blank {
                    "?".to_string()
                } else {
                    term.to_string()
                }
            })
            .join(" → ");
        let options = round
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("#{i}: {option}"))
            .join("   ");
        format!("{sequence}\n{options}")
    }

    fn result_details(&self, session: &SessionState) -> Vec<String> {
        vec![
            format!("Wrong answers: {}", session.wrong_count),
            format!("Penalty: +{}s", session.penalty_seconds),
        ]
    }
}
