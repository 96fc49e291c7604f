use log::{debug, warn};

use crate::error::ShareError;
use crate::helpers::format_seconds;
use crate::model::{GameOutcome, ResultMetric};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub url: String,
    pub text: String,
}

impl SharePayload {
    pub fn for_outcome(outcome: &GameOutcome, base_url: &str) -> Self {
        let url = format!(
            "{}#/play/{}/{}",
            base_url.trim_end_matches('#'),
            outcome.game_id.slug(),
            outcome.difficulty.slug()
        );
        let result = match outcome.metric {
            ResultMetric::TimeSeconds(seconds) => format_seconds(seconds),
            ResultMetric::Score(score) => format!("{score} points"),
        };
        let mut lines = vec![format!(
            "morimori · {} ({})",
            outcome.game_id.title(),
            outcome.difficulty.label()
        )];
        lines.push(result);
        lines.extend(outcome.details.iter().cloned());
        Self {
            url,
            text: lines.join("\n"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareDelivery {
    Shared,
    CopiedLink,
    Printed,
}

pub trait ShareTarget {
    fn share(&self, payload: &SharePayload) -> Result<ShareDelivery, ShareError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Shares `payload` and returns the notice to show, if any. A dismissed share sheet shows
/// nothing.
pub fn share_result(target: &dyn ShareTarget, payload: &SharePayload) -> Option<Notice> {
    match target.share(payload) {
        Ok(ShareDelivery::Shared) => None,
        Ok(ShareDelivery::CopiedLink) => Some(Notice::Info(
            "Sharing isn't available here, so the link was copied.".to_string(),
        )),
        Ok(ShareDelivery::Printed) => Some(Notice::Info(
            "Copy the link above to share your result.".to_string(),
        )),
        Err(ShareError::Aborted) => {
            debug!(target: "share", "Share dismissed");
            None
        }
        Err(err @ ShareError::Failed(_)) => {
            warn!(target: "share", "{err}");
            Some(Notice::Error(
                "Couldn't open sharing. Please try again.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::SystemTime;
    use uuid::Uuid;

    use crate::model::{Difficulty, GameId};

    struct FakeTarget {
        result: Result<ShareDelivery, ShareError>,
        seen: RefCell<Vec<SharePayload>>,
    }

    impl ShareTarget for FakeTarget {
        fn share(&self, payload: &SharePayload) -> Result<ShareDelivery, ShareError> {
            self.seen.borrow_mut().push(payload.clone());
            self.result.clone()
        }
    }

    fn target(result: Result<ShareDelivery, ShareError>) -> FakeTarget {
        FakeTarget {
            result,
            seen: RefCell::new(Vec::new()),
        }
    }

    fn payload() -> SharePayload {
        let outcome = GameOutcome {
            game_id: GameId::NumberSequence,
            difficulty: Difficulty::Hard,
            metric: ResultMetric::TimeSeconds(83),
            current_best: None,
            is_best: true,
            details: vec!["Wrong answers: 0".to_string()],
            wrong_count: 0,
            attempts: 10,
            session_id: Uuid::new_v4(),
            finished_at: SystemTime::now(),
        };
        SharePayload::for_outcome(&outcome, "https://example.org/")
    }

    #[test]
    fn test_payload_links_back_to_game_and_tier() {
        let payload = payload();
        assert_eq!(payload.url, "https://example.org/#/play/number-sequence/hard");
        assert!(payload.text.contains("01:23"));
        assert!(payload.text.ends_with("Wrong answers: 0"));
    }

    #[test]
    fn test_notices_per_delivery() {
        let payload = payload();
        assert_eq!(share_result(&target(Ok(ShareDelivery::Shared)), &payload), None);
        assert!(matches!(
            share_result(&target(Ok(ShareDelivery::CopiedLink)), &payload),
            Some(Notice::Info(_))
        ));
        match share_result(&target(Ok(ShareDelivery::Printed)), &payload) {
            Some(Notice::Info(message)) => assert!(!message.contains("copied")),
            other => panic!("unexpected notice {other:?}"),
        }
        assert_eq!(share_result(&target(Err(ShareError::Aborted)), &payload), None);
        assert!(matches!(
            share_result(&target(Err(ShareError::Failed("denied".into()))), &payload),
            Some(Notice::Error(_))
        ));
    }

    #[test]
    fn test_target_receives_payload() {
        let payload = payload();
        let fake = target(Ok(ShareDelivery::Shared));
        share_result(&fake, &payload);
        assert_eq!(*fake.seen.borrow(), vec![payload]);
    }
}
