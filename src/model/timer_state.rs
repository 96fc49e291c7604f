use std::time::Duration;

/// Wall-clock part plus accumulated wrong-answer penalty of a session clock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimerState {
    pub started_at: Option<Duration>,
    pub stopped_at: Option<Duration>,
    pub penalty_seconds: u32,
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    /// Whole seconds since start (frozen once stopped) plus the penalty.
    pub fn elapsed_seconds(&self, now: Duration) -> u32 {
        let wall_clock = match self.started_at {
            Some(started_at) => {
                let until = self.stopped_at.unwrap_or(now);
                until.saturating_sub(started_at).as_secs() as u32
            }
            None => 0,
        };
        wall_clock.saturating_add(self.penalty_seconds)
    }

    pub fn started(&self, now: Duration) -> TimerState {
        TimerState {
            started_at: Some(now),
            stopped_at: None,
            penalty_seconds: self.penalty_seconds,
        }
    }

    pub fn stopped(&self, now: Duration) -> TimerState {
        let mut new_state = self.clone();
        if new_state.is_running() {
            new_state.stopped_at = Some(now);
        }
        new_state
    }

    pub fn with_penalty(&self, seconds: u32) -> TimerState {
        let mut new_state = self.clone();
        new_state.penalty_seconds = new_state.penalty_seconds.saturating_add(seconds);
        new_state
    }
}
