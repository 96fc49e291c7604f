use rand::RngCore;

use crate::game::randomizer::pick_or_default;
use crate::helpers::format_seconds;
use crate::model::{GameOutcome, ResultMetric};

/// Within this many seconds of the best, a result counts as close.
pub const CLOSE_TO_BEST_SECONDS: u32 = 5;

const BEST_MESSAGES: [&str; 3] = [
    "With a record like this you can take on the hardest tier.",
    "A great time. At this pace you can cut it even further.",
    "You're doing really well. This one is worth bragging about.",
];

const CLOSE_MESSAGES: [&str; 3] = [
    "Almost there. One more go and the record is yours.",
    "Already good. You'll be faster on the next try.",
    "You're finding the rhythm. Shall we try once more?",
];

const RETRY_MESSAGES: [&str; 3] = [
    "Everyone takes their time at first. It gets familiar quickly.",
    "You're doing fine. Take it one step at a time and the time will drop.",
    "Your skills are building up. The next round will feel easier.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncouragementTier {
    Best,
    Close,
    Retry,
}

impl EncouragementTier {
    /// `distance` is how far the result is from the previous best; `None` when there is none.
    pub fn for_result(is_best: bool, distance: Option<u32>) -> Self {
        match (is_best, distance) {
            (true, _) => EncouragementTier::Best,
            (false, Some(distance)) if distance <= CLOSE_TO_BEST_SECONDS => EncouragementTier::Close,
            _ => EncouragementTier::Retry,
        }
    }

    fn messages(&self) -> &'static [&'static str] {
        match self {
            EncouragementTier::Best => &BEST_MESSAGES,
            EncouragementTier::Close => &CLOSE_MESSAGES,
            EncouragementTier::Retry => &RETRY_MESSAGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub title: String,
    pub record_line: String,
    pub tier: EncouragementTier,
    pub encouragement: String,
    pub details: Vec<String>,
}

impl ResultSummary {
    pub fn from_outcome(outcome: &GameOutcome, rng: &mut dyn RngCore) -> Self {
        let distance = outcome.distance_to_best();
        let tier = EncouragementTier::for_result(outcome.is_best, distance);
        let title = match outcome.metric {
            ResultMetric::TimeSeconds(seconds) => format_seconds(seconds),
            ResultMetric::Score(score) => format!("{score} points"),
        };
        let record_line = match (outcome.is_best, outcome.metric, distance) {
            (true, _, _) => "New record!".to_string(),
            (false, ResultMetric::TimeSeconds(_), Some(distance)) => {
                format!("{} away from your personal best.", format_seconds(distance))
            }
            (false, ResultMetric::Score(_), Some(distance)) => {
                format!("{distance} points away from your personal best.")
            }
            (false, _, None) => "No record yet.".to_string(),
        };
        Self {
            title,
            record_line,
            tier,
            encouragement: pick_or_default(rng, tier.messages()).to_string(),
            details: outcome.details.clone(),
        }
    }

    /// Details, the record line, a blank line, then the encouragement.
    pub fn message(&self) -> String {
        let mut lines = self.details.clone();
        lines.push(self.record_line.clone());
        lines.push(String::new());
        lines.push(self.encouragement.clone());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::SystemTime;
    use uuid::Uuid;

    use crate::model::{Difficulty, GameId};

    fn outcome(metric: ResultMetric, current_best: Option<u32>, is_best: bool) -> GameOutcome {
        GameOutcome {
            game_id: GameId::ColorFind,
            difficulty: Difficulty::Normal,
            metric,
            current_best,
            is_best,
            details: vec!["Wrong picks: 1".to_string()],
            wrong_count: 1,
            attempts: 8,
            session_id: Uuid::new_v4(),
            finished_at: SystemTime::now(),
        }
    }

    #[test]
    fn test_new_record() {
        let mut rng = StdRng::seed_from_u64(0);
        let summary =
            ResultSummary::from_outcome(&outcome(ResultMetric::TimeSeconds(75), Some(80), true), &mut rng);
        assert_eq!(summary.title, "01:15");
        assert_eq!(summary.record_line, "New record!");
        assert_eq!(summary.tier, EncouragementTier::Best);
        assert!(BEST_MESSAGES.contains(&summary.encouragement.as_str()));
    }

    #[test]
    fn test_close_and_far_from_best() {
        let mut rng = StdRng::seed_from_u64(0);
        let close =
            ResultSummary::from_outcome(&outcome(ResultMetric::TimeSeconds(45), Some(40), false), &mut rng);
        assert_eq!(close.tier, EncouragementTier::Close);
        assert_eq!(close.record_line, "00:05 away from your personal best.");

        let far =
            ResultSummary::from_outcome(&outcome(ResultMetric::TimeSeconds(46), Some(40), false), &mut rng);
        assert_eq!(far.tier, EncouragementTier::Retry);
    }

    #[test]
    fn test_score_summary() {
        let mut rng = StdRng::seed_from_u64(0);
        let summary =
            ResultSummary::from_outcome(&outcome(ResultMetric::Score(60), Some(80), false), &mut rng);
        assert_eq!(summary.title, "60 points");
        assert_eq!(summary.record_line, "20 points away from your personal best.");
        let message = summary.message();
        assert!(message.starts_with("Wrong picks: 1\n20 points"));
        assert!(message.contains("\n\n"));
    }
}
