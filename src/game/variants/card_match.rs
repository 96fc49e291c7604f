use std::time::Duration;

use itertools::Itertools;
use rand::RngCore;

use crate::game::randomizer::shuffle;
use crate::game::rules::{Classification, GameRules, ResolutionPolicy, Scoring};
use crate::model::{Difficulty, GameId, PlayerInput, SessionState};

pub const SYMBOL_POOL: [&str; 16] = [
    "🍎", "🍊", "🍋", "🍇", "🍓", "🌸", "🌻", "⭐", "🌈", "🎵", "🐶", "🐱", "🐸", "🦋", "🐢", "🐘",
];

const FINAL_PAIR_DELAY: Duration = Duration::from_millis(500);
const MISMATCH_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardProfile {
    pub pairs: usize,
    pub columns: usize,
}

impl CardProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => CardProfile { pairs: 3, columns: 3 },
            Difficulty::Normal => CardProfile { pairs: 6, columns: 4 },
            Difficulty::Hard => CardProfile { pairs: 8, columns: 4 },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairPick {
    pub revealed: Vec<usize>,
}

/// The deck is dealt once per session; every round is one attempt at a pair.
#[derive(Debug)]
pub struct CardMatch {
    difficulty: Difficulty,
    profile: CardProfile,
    deck: Vec<&'static str>,
    matched: Vec<bool>,
}

impl CardMatch {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: CardProfile::for_difficulty(difficulty),
            deck: Vec::new(),
            matched: Vec::new(),
        }
    }

    pub fn deal(profile: CardProfile, rng: &mut dyn RngCore) -> Vec<&'static str> {
        let symbols = shuffle(rng, &SYMBOL_POOL)
            .into_iter()
            .take(profile.pairs)
            .collect_vec();
        let doubled = symbols.iter().chain(symbols.iter()).copied().collect_vec();
        shuffle(rng, &doubled)
    }

    pub fn deck(&self) -> &[&'static str] {
        &self.deck
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched.iter().filter(|matched| **matched).count() / 2
    }

    pub fn mismatches(&self, session: &SessionState) -> u32 {
        session.attempts.saturating_sub(self.profile.pairs as u32)
    }
}

impl GameRules for CardMatch {
    type Round = PairPick;
    type Input = usize;

    fn game_id(&self) -> GameId {
        GameId::CardMatch
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn total_rounds(&self) -> Option<u32> {
        None
    }

    fn scoring(&self) -> Scoring {
        Scoring::Timed
    }

    fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy::RevertPair
    }

    fn success_delay(&self, finishing: bool) -> Duration {
        if finishing {
            FINAL_PAIR_DELAY
        } else {
            Duration::ZERO
        }
    }

    fn error_delay(&self) -> Duration {
        MISMATCH_DELAY
    }

    fn start_session(&mut self, rng: &mut dyn RngCore) {
        self.deck = Self::deal(self.profile, rng);
        self.matched = vec![false; self.deck.len()];
    }

    fn generate_round(&mut self, _rng: &mut dyn RngCore) -> Option<PairPick> {
        Some(PairPick::default())
    }

    fn parse_input(&self, input: PlayerInput) -> Option<usize> {
        match input {
            PlayerInput::Pick(index) => Some(index),
            _ => None,
        }
    }

    fn classify(&mut self, round: &mut PairPick, index: usize) -> Classification {
        if index >= self.deck.len() {
            return Classification::Rejected(format!("There is no card #{index}"));
        }
        if self.matched[index] || round.revealed.contains(&index) {
            return Classification::Rejected("That card is already face up".to_string());
        }
        round.revealed.push(index);
        let [first, second] = round.revealed[..] else {
            return Classification::Pending;
        };
        if self.deck[first] == self.deck[second] {
            self.matched[first] = true;
            self.matched[second] = true;
            Classification::Correct
        } else {
            Classification::Incorrect
        }
    }

    fn recover(&mut self, round: &mut PairPick) {
        round.revealed.clear();
    }

    fn is_complete(&self, _session: &SessionState) -> bool {
        !self.matched.is_empty() && self.matched.iter().all(|matched| *matched)
    }

    fn describe_round(&self, round: &PairPick) -> String {
        let remaining = self.profile.pairs - self.matched_pairs();
        let grid = self
            .deck
            .iter()
            .enumerate()
            .map(|(index, symbol)| {
                if self.matched[index] || round.revealed.contains(&index) {
                    format!("{symbol:>3}")
                } else {
                    format!("{index:>3}")
                }
            })
            .chunks(self.profile.columns)
            .into_iter()
            .map(|mut row| row.join(" "))
            .join("\n");
        format!("{grid}\nPairs left: {remaining}")
    }

    fn error_message(&self, _round: &PairPick, _rng: &mut dyn RngCore) -> String {
        "Not a match".to_string()
    }

    fn result_details(&self, session: &SessionState) -> Vec<String> {
        vec![
            format!("Moves: {}", session.attempts),
            format!("Mismatches: {}", self.mismatches(session)),
        ]
    }
}
