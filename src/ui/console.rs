use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::result_summary::ResultSummary;
use super::share::{ShareDelivery, SharePayload, ShareTarget};
use super::ResultPresenter;
use crate::error::ShareError;
use crate::model::{GameOutcome, ResultCard};

/// Prints result screens to a terminal and holds the card until the player picks an action.
pub struct ConsolePresenter {
    out: RefCell<Box<dyn Write>>,
    rng: RefCell<StdRng>,
    pending: Rc<RefCell<Option<ResultCard>>>,
}

impl ConsolePresenter {
    pub fn new(seed: u64) -> Self {
        Self::with_writer(Box::new(io::stdout()), seed)
    }

    pub fn with_writer(out: Box<dyn Write>, seed: u64) -> Self {
        Self {
            out: RefCell::new(out),
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn take_card(&self) -> Option<ResultCard> {
        self.pending.borrow_mut().take()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.pending.borrow().as_ref().map(|card| card.outcome.clone())
    }

    pub fn has_card(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn clear(&self) {
        self.pending.borrow_mut().take();
    }

    fn print(&self, summary: &ResultSummary) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out)?;
        writeln!(out, "=== {} ===", summary.title)?;
        writeln!(out, "{}", summary.message())?;
        writeln!(out, "[r] play again   [x] other games   [s] share")?;
        out.flush()
    }
}

impl ResultPresenter for ConsolePresenter {
    fn present(&self, card: ResultCard) {
        let summary = ResultSummary::from_outcome(&card.outcome, &mut *self.rng.borrow_mut());
        if let Err(err) = self.print(&summary) {
            warn!(target: "ui", "Could not print result: {err}");
        }
        *self.pending.borrow_mut() = Some(card);
    }
}

/// A terminal has no share sheet; the link is printed for the player to copy.
pub struct PrintLinkShareTarget;

impl ShareTarget for PrintLinkShareTarget {
    fn share(&self, payload: &SharePayload) -> Result<ShareDelivery, ShareError> {
        let mut out = io::stdout();
        writeln!(out, "{}\n{}", payload.text, payload.url)
            .and_then(|_| out.flush())
            .map_err(|err| ShareError::Failed(err.to_string()))?;
        Ok(ShareDelivery::Printed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use uuid::Uuid;

    use crate::model::{Difficulty, GameId, ResultActions, ResultMetric};

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_present_prints_summary_and_keeps_card() {
        let buffer = SharedBuffer::default();
        let presenter = ConsolePresenter::with_writer(Box::new(buffer.clone()), 1);
        let outcome = GameOutcome {
            game_id: GameId::MathChallenge,
            difficulty: Difficulty::Easy,
            metric: ResultMetric::Score(100),
            current_best: None,
            is_best: true,
            details: vec!["Solved first try: 5/5".to_string()],
            wrong_count: 0,
            attempts: 5,
            session_id: Uuid::new_v4(),
            finished_at: SystemTime::now(),
        };
        presenter.present(ResultCard::new(outcome, ResultActions::default()));

        let printed = String::from_utf8(buffer.0.borrow().clone()).unwrap();
        assert!(printed.contains("=== 100 points ==="));
        assert!(printed.contains("New record!"));
        assert!(presenter.has_card());
        assert_eq!(presenter.outcome().unwrap().metric, ResultMetric::Score(100));
        assert!(presenter.take_card().is_some());
        assert!(!presenter.has_card());
    }

    #[test]
    fn test_print_link_target_reports_printed() {
        let payload = SharePayload {
            url: "https://example.org/#/play/word-chain/easy".to_string(),
            text: "Word Chain (Easy): 100 points".to_string(),
        };
        assert_eq!(PrintLinkShareTarget.share(&payload), Ok(ShareDelivery::Printed));
    }
}
