pub mod card_match;
pub mod color_find;
pub mod math_challenge;
pub mod number_sequence;
pub mod word_chain;

use rand::RngCore;

use super::game_engine::{MountedGame, SessionContext, SessionHandle};
use super::randomizer::pick_or_default;
use crate::model::{Difficulty, GameId};

pub use card_match::CardMatch;
pub use color_find::ColorFind;
pub use math_challenge::MathChallenge;
pub use number_sequence::NumberSequence;
pub use word_chain::WordChain;

const ENCOURAGEMENTS: [&str; 6] = [
    "Well done! 👏",
    "Amazing! ✨",
    "Excellent! 🌟",
    "Great job! 💪",
    "That's right! 🎉",
    "The best! 🏆",
];

const RETRY_MESSAGES: [&str; 4] = [
    "So close, want to try again? 😊",
    "That's okay, one more time! 💪",
    "Keep going, you've got this! 🌈",
    "You'll get it next time! ⭐",
];

pub fn encouragement(rng: &mut dyn RngCore) -> String {
    pick_or_default(rng, &ENCOURAGEMENTS).to_string()
}

pub fn retry_message(rng: &mut dyn RngCore) -> String {
    pick_or_default(rng, &RETRY_MESSAGES).to_string()
}

/// Builds a session for `game_id` with the profile for `difficulty`. The session is not
/// started.
pub fn mount(
    game_id: GameId,
    difficulty: Difficulty,
    context: SessionContext,
) -> Box<dyn MountedGame> {
    match game_id {
        GameId::CardMatch => Box::new(SessionHandle::new(CardMatch::new(difficulty), context)),
        GameId::NumberSequence => {
            Box::new(SessionHandle::new(NumberSequence::new(difficulty), context))
        }
        GameId::ColorFind => Box::new(SessionHandle::new(ColorFind::new(difficulty), context)),
        GameId::MathChallenge => {
            Box::new(SessionHandle::new(MathChallenge::new(difficulty), context))
        }
        GameId::WordChain => Box::new(SessionHandle::new(WordChain::new(difficulty), context)),
    }
}
