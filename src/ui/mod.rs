pub mod console;
pub mod result_summary;
pub mod screens;
pub mod share;

pub use console::ConsolePresenter;
pub use result_summary::{EncouragementTier, ResultSummary};
pub use screens::{game_select_screen, home_screen, not_found_screen};
pub use share::{share_result, Notice, ShareDelivery, SharePayload, ShareTarget};

use crate::model::ResultCard;

/// Receives the result of every finished session. Implementations must not call the card's
/// actions synchronously from `present`; the session that finished is still borrowed.
pub trait ResultPresenter {
    fn present(&self, card: ResultCard);
}

#[cfg(test)]
pub use recording::RecordingPresenter;
