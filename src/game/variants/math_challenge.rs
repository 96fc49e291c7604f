use std::fmt;
use std::time::Duration;

use rand::RngCore;

use crate::game::randomizer::{pick_or_default, uniform_int};
use crate::game::rules::{Classification, GameRules, ResolutionPolicy, Scoring};
use crate::helpers::digit_count;
use crate::model::{Difficulty, GameId, PlayerInput, SessionState};

const PENALTY_SECONDS: u32 = 3;
const SUCCESS_DELAY: Duration = Duration::from_millis(1200);
const ERROR_DELAY: Duration = Duration::from_millis(600);
pub const MAX_TYPED_DIGITS: usize = 6;
const MAX_FACTOR: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Add,
    Subtract,
    Multiply,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathProfile {
    pub rounds: u32,
    pub max_operand: u32,
    pub operators: &'static [Operator],
}

impl MathProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => MathProfile {
                rounds: 5,
                max_operand: 20,
                operators: &[Operator::Add],
            },
            Difficulty::Normal => MathProfile {
                rounds: 7,
                max_operand: 50,
                operators: &[Operator::Add, Operator::Subtract],
            },
            Difficulty::Hard => MathProfile {
                rounds: 10,
                max_operand: 99,
                operators: &[Operator::Add, Operator::Subtract, Operator::Multiply],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub left: u32,
    pub right: u32,
    pub operator: Operator,
    pub answer: u32,
    pub typed: String,
}

impl Problem {
    pub fn generate(profile: MathProfile, rng: &mut dyn RngCore) -> Self {
        let operator = pick_or_default(rng, profile.operators);
        let max = profile.max_operand as i64;
        let (left, right) = match operator {
            Operator::Add => (uniform_int(rng, 1, max), uniform_int(rng, 1, max)),
            Operator::Subtract => {
                let left = uniform_int(rng, 1, max);
                (left, uniform_int(rng, 1, left))
            }
            Operator::Multiply => {
                let max_factor = MAX_FACTOR.min(profile.max_operand / 3).max(2) as i64;
                (uniform_int(rng, 2, max_factor), uniform_int(rng, 2, max_factor))
            }
        };
        Self::new(left as u32, operator, right as u32)
    }

    pub fn new(left: u32, operator: Operator, right: u32) -> Self {
        let answer = match operator {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
        };
        Self {
            left,
            right,
            operator,
            answer,
            typed: String::new(),
        }
    }

    fn check(&self) -> Classification {
        match self.typed.parse::<u32>() {
            Ok(value) if value == self.answer => Classification::Correct,
            _ => Classification::Incorrect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keypad {
    Digit(u8),
    Backspace,
    Submit,
}

/// Typed arithmetic. A wrong answer clears the typed digits and the same problem stays up, so
/// the score counts problems solved on the first try.
#[derive(Debug)]
pub struct MathChallenge {
    difficulty: Difficulty,
    profile: MathProfile,
}

impl MathChallenge {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: MathProfile::for_difficulty(difficulty),
        }
    }
}

impl GameRules for MathChallenge {
    type Round = Problem;
    type Input = Keypad;

    fn game_id(&self) -> GameId {
        GameId::MathChallenge
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn total_rounds(&self) -> Option<u32> {
        Some(self.profile.rounds)
    }

    fn scoring(&self) -> Scoring {
        Scoring::Accuracy
    }

    fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy::ClearInput
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

    fn generate_round(&mut self, rng: &mut dyn RngCore) -> Option<Problem> {
        Some(Problem::generate(self.profile, rng))
    }

    fn parse_input(&self, input: PlayerInput) -> Option<Keypad> {
        match input {
            PlayerInput::Digit(digit) if digit <= 9 => Some(Keypad::Digit(digit)),
            PlayerInput::Backspace => Some(Keypad::Backspace),
            PlayerInput::Submit => Some(Keypad::Submit),
            _ => None,
        }
    }

    fn classify(&mut self, problem: &mut Problem, key: Keypad) -> Classification {
        match key {
            Keypad::Digit(digit) => {
                if problem.typed.len() >= MAX_TYPED_DIGITS {
                    return Classification::Rejected(format!(
                        "At most {MAX_TYPED_DIGITS} digits"
                    ));
                }
                problem.typed.push(char::from(b'0' + digit));
                if problem.typed.len() == digit_count(problem.answer) {
                    problem.check()
                } else {
                    Classification::Pending
                }
            }
            Keypad::Backspace => {
                problem.typed.pop();
                Classification::Pending
            }
            Keypad::Submit if problem.typed.is_empty() => {
                Classification::Rejected("Type an answer first".to_string())
            }
            Keypad::Submit => problem.check(),
        }
    }

    fn recover(&mut self, problem: &mut Problem) {
        problem.typed.clear();
    }

    fn describe_round(&self, problem: &Problem) -> String {
        let typed = if problem.typed.is_empty() {
            "_"
        } else {
            problem.typed.as_str()
        };
        format!(
            "{} {} {} = ?   [{typed}]",
            problem.left, problem.operator, problem.right
        )
    }

    fn error_message(&self, problem: &Problem, _rng: &mut dyn RngCore) -> String {
        format!("{} is not right, try again", problem.typed)
    }

    fn result_details(&self, session: &SessionState) -> Vec<String> {
        let total = session.total_rounds.unwrap_or(self.profile.rounds);
        vec![
            format!("Solved first try: {}/{total}", session.first_try_correct),
            format!("Wrong answers: {}", session.wrong_count),
        ]
    }
}
