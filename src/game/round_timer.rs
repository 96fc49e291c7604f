use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::trace;

use super::scheduler::{Scheduler, TaskHandle};
use crate::model::TimerState;

pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

pub type DisplayCallback = Rc<dyn Fn(u32)>;

/// Session clock: wall-clock seconds plus penalties, sampled for display while running.
pub struct RoundTimer {
    state: Rc<RefCell<TimerState>>,
    scheduler: Scheduler,
    sampling: Option<TaskHandle>,
    display: Option<DisplayCallback>,
}

impl RoundTimer {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            state: Rc::new(RefCell::new(TimerState::default())),
            scheduler,
            sampling: None,
            display: None,
        }
    }

    pub fn with_display(scheduler: Scheduler, display: DisplayCallback) -> Self {
        let mut timer = Self::new(scheduler);
        timer.display = Some(display);
        timer
    }

    pub fn start(&mut self) {
        self.cancel_sampling();
        let now = self.scheduler.now();
        let started = self.state.borrow().started(now);
        *self.state.borrow_mut() = started;

        if let Some(display) = self.display.clone() {
            display(self.elapsed_seconds());
            let state = Rc::clone(&self.state);
            let clock = self.scheduler.clock();
            self.sampling = Some(self.scheduler.schedule_repeating(SAMPLE_INTERVAL, move || {
                display(state.borrow().elapsed_seconds(clock.now()));
            }));
        }
        trace!(target: "game_state", "Timer started at {:?}", now);
    }

    pub fn stop(&mut self) {
        self.cancel_sampling();
        let stopped = self.state.borrow().stopped(self.scheduler.now());
        *self.state.borrow_mut() = stopped;
    }

    pub fn add_penalty(&mut self, seconds: u32) {
        let penalized = self.state.borrow().with_penalty(seconds);
        *self.state.borrow_mut() = penalized;
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.state.borrow().elapsed_seconds(self.scheduler.now())
    }

    pub fn penalty_seconds(&self) -> u32 {
        self.state.borrow().penalty_seconds
    }

    pub fn state(&self) -> TimerState {
        self.state.borrow().clone()
    }

    pub fn is_sampling(&self) -> bool {
        self.sampling.as_ref().is_some_and(TaskHandle::is_pending)
    }

    fn cancel_sampling(&mut self) {
        if let Some(handle) = self.sampling.take() {
            handle.cancel();
        }
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.cancel_sampling();
    }
}
