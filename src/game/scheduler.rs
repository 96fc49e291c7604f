use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use log::trace;

pub type TaskId = u64;

pub trait Clock {
    fn now(&self) -> Duration;
    /// Blocks (or jumps) until `deadline`; returns immediately if it already passed.
    fn wait_until(&self, deadline: Duration);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wait_until(&self, deadline: Duration) {
        self.set(deadline);
    }
}

enum TaskCallback {
    Once(Box<dyn FnOnce()>),
    Repeating(Box<dyn FnMut()>),
}

struct Task {
    deadline: Duration,
    interval: Option<Duration>,
    callback: TaskCallback,
}

#[derive(Default)]
struct SchedulerInner {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
    running: Option<TaskId>,
    running_cancelled: bool,
}

impl SchedulerInner {
    fn next_due(&self, now: Duration) -> Option<TaskId> {
        self.tasks
            .iter()
            .filter(|(_, task)| task.deadline <= now)
            .min_by_key(|(id, task)| (task.deadline, **id))
            .map(|(id, _)| *id)
    }

    fn earliest_deadline(&self) -> Option<Duration> {
        self.tasks.values().map(|task| task.deadline).min()
    }

    fn cancel(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(&id).is_some() {
            return true;
        }
        if self.running == Some(id) && !self.running_cancelled {
            self.running_cancelled = true;
            return true;
        }
        false
    }
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
    clock: Rc<dyn Clock>,
}

/// Refers to one scheduled task. Dropping the handle does not cancel the task.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    inner: Weak<RefCell<SchedulerInner>>,
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TaskHandle({})", self.id)
    }
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns whether the task was still pending (or running) and is now cancelled.
    pub fn cancel(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.borrow_mut().cancel(self.id),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                let inner = inner.borrow();
                inner.tasks.contains_key(&self.id)
                    || (inner.running == Some(self.id) && !inner.running_cancelled)
            }
            None => false,
        }
    }
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner::default())),
            clock,
        }
    }

    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock::new()))
    }

    pub fn manual() -> (Self, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        (Self::new(clock.clone()), clock)
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// For callbacks that need the time; capturing the scheduler itself would keep its queue alive.
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    pub fn schedule_once<F>(&self, delay: Duration, callback: F) -> TaskHandle
    where
        F: FnOnce() + 'static,
    {
        self.insert(delay, None, TaskCallback::Once(Box::new(callback)))
    }

    /// First run after one `interval`, then every `interval` until cancelled.
    pub fn schedule_repeating<F>(&self, interval: Duration, callback: F) -> TaskHandle
    where
        F: FnMut() + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        self.insert(
            interval,
            Some(interval),
            TaskCallback::Repeating(Box::new(callback)),
        )
    }

    fn insert(&self, delay: Duration, interval: Option<Duration>, callback: TaskCallback) -> TaskHandle {
        let deadline = self.now() + delay;
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tasks.insert(
            id,
            Task {
                deadline,
                interval,
                callback,
            },
        );
        trace!(target: "scheduler", "Scheduled task {} at {:?}", id, deadline);
        TaskHandle {
            id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner.borrow_mut().cancel(id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.borrow().earliest_deadline()
    }

    /// Runs one task that is due at `now`. The queue is not borrowed while the callback runs.
    fn fire_next_due(&self, now: Duration) -> bool {
        let (id, task) = {
            let mut inner = self.inner.borrow_mut();
            let Some(id) = inner.next_due(now) else {
                return false;
            };
            let Some(task) = inner.tasks.remove(&id) else {
                return false;
            };
            inner.running = Some(id);
            inner.running_cancelled = false;
            (id, task)
        };
        trace!(target: "scheduler", "Running task {} due at {:?}", id, task.deadline);

        let Task {
            deadline,
            interval,
            callback,
        } = task;
        let requeue = match callback {
            TaskCallback::Once(callback) => {
                callback();
                None
            }
            TaskCallback::Repeating(mut callback) => {
                callback();
                Some(callback)
            }
        };

        let mut inner = self.inner.borrow_mut();
        let cancelled = inner.running_cancelled;
        inner.running = None;
        inner.running_cancelled = false;
        if let (Some(callback), Some(interval), false) = (requeue, interval, cancelled) {
            let mut next = deadline + interval;
            while next <= now {
                next += interval;
            }
            inner.tasks.insert(
                id,
                Task {
                    deadline: next,
                    interval: Some(interval),
                    callback: TaskCallback::Repeating(callback),
                },
            );
        }
        true
    }

    pub fn run_due(&self) -> usize {
        let now = self.now();
        let mut ran = 0;
        while self.fire_next_due(now) {
            ran += 1;
        }
        ran
    }

    /// Runs callbacks in deadline order up to `deadline`, moving the clock along with them.
    pub fn run_until(&self, deadline: Duration) -> usize {
        let mut ran = 0;
        loop {
            ran += self.run_due();
            match self.next_deadline() {
                Some(next) if next <= deadline => self.clock.wait_until(next),
                _ => break,
            }
        }
        self.clock.wait_until(deadline);
        ran + self.run_due()
    }

    pub fn advance(&self, by: Duration) -> usize {
        self.run_until(self.now() + by)
    }

    /// Keeps running callbacks while `condition` holds and something is scheduled.
    pub fn run_while<P>(&self, mut condition: P) -> usize
    where
        P: FnMut() -> bool,
    {
        let mut ran = self.run_due();
        while condition() {
            let Some(next) = self.next_deadline() else {
                break;
            };
            self.clock.wait_until(next);
            ran += self.run_due();
        }
        ran
    }
}

/// Cancels whatever it scheduled on `cancel_all` or drop.
pub struct TaskScope {
    scheduler: Scheduler,
    handles: RefCell<Vec<TaskHandle>>,
}

impl TaskScope {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            handles: RefCell::new(Vec::new()),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn track(&self, handle: TaskHandle) -> TaskHandle {
        let mut handles = self.handles.borrow_mut();
        handles.retain(TaskHandle::is_pending);
        handles.push(handle.clone());
        handle
    }

    pub fn schedule_once<F>(&self, delay: Duration, callback: F) -> TaskHandle
    where
        F: FnOnce() + 'static,
    {
        self.track(self.scheduler.schedule_once(delay, callback))
    }

    pub fn schedule_repeating<F>(&self, interval: Duration, callback: F) -> TaskHandle
    where
        F: FnMut() + 'static,
    {
        self.track(self.scheduler.schedule_repeating(interval, callback))
    }

    pub fn pending_count(&self) -> usize {
        self.handles
            .borrow()
            .iter()
            .filter(|handle| handle.is_pending())
            .count()
    }

    pub fn cancel_all(&self) -> usize {
        let handles: Vec<TaskHandle> = self.handles.borrow_mut().drain(..).collect();
        let cancelled = handles.iter().filter(|handle| handle.cancel()).count();
        if cancelled > 0 {
            trace!(target: "scheduler", "Cancelled {} pending tasks", cancelled);
        }
        cancelled
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |label: &'static str| -> Box<dyn FnOnce()> {
            let log = log_clone.clone();
            Box::new(move || log.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_once_tasks_run_in_deadline_then_schedule_order() {
        let (scheduler, clock) = Scheduler::manual();
        let (log, make) = recorder();

        scheduler.schedule_once(Duration::from_millis(800), make("late"));
        scheduler.schedule_once(Duration::from_millis(300), make("early-a"));
        scheduler.schedule_once(Duration::from_millis(300), make("early-b"));

        assert_eq!(scheduler.advance(Duration::from_millis(299)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 2);
        assert_eq!(*log.borrow(), vec!["early-a", "early-b"]);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(*log.borrow(), vec!["early-a", "early-b", "late"]);
        assert_eq!(clock.now(), Duration::from_millis(1_300));
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let (scheduler, _) = Scheduler::manual();
        let (log, make) = recorder();

        let handle = scheduler.schedule_once(Duration::from_millis(500), make("cancelled"));
        assert!(handle.is_pending());
        assert!(handle.cancel());
        assert!(!handle.cancel());
        scheduler.advance(Duration::from_secs(1));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_repeating_task_runs_every_interval_until_cancelled() {
        let (scheduler, _) = Scheduler::manual();
        let ticks = Rc::new(Cell::new(0));
        let ticks_clone = ticks.clone();
        let handle = scheduler.schedule_repeating(Duration::from_millis(250), move || {
            ticks_clone.set(ticks_clone.get() + 1)
        });

        scheduler.advance(Duration::from_millis(1_000));
        assert_eq!(ticks.get(), 4);
        handle.cancel();
        scheduler.advance(Duration::from_millis(1_000));
        assert_eq!(ticks.get(), 4);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_repeating_task_can_cancel_itself() {
        let (scheduler, _) = Scheduler::manual();
        let ticks = Rc::new(Cell::new(0));
        let own_handle: Rc<RefCell<Option<TaskHandle>>> = Rc::new(RefCell::new(None));

        let ticks_clone = ticks.clone();
        let own_handle_clone = own_handle.clone();
        let handle = scheduler.schedule_repeating(Duration::from_millis(100), move || {
            ticks_clone.set(ticks_clone.get() + 1);
            if ticks_clone.get() == 2 {
                if let Some(handle) = own_handle_clone.borrow().as_ref() {
                    handle.cancel();
                }
            }
        });
        *own_handle.borrow_mut() = Some(handle);

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(ticks.get(), 2);
    }

    #[test]
    fn test_callbacks_may_schedule_more_work() {
        let (scheduler, _) = Scheduler::manual();
        let (log, make) = recorder();
        let inner_scheduler = scheduler.clone();
        let follow_up = RefCell::new(Some(make("follow-up")));
        scheduler.schedule_once(Duration::from_millis(100), move || {
            if let Some(callback) = follow_up.borrow_mut().take() {
                inner_scheduler.schedule_once(Duration::from_millis(100), callback);
            }
        });

        scheduler.advance(Duration::from_millis(150));
        assert!(log.borrow().is_empty());
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*log.borrow(), vec!["follow-up"]);
    }

    #[test]
    fn test_run_while_stops_when_condition_clears() {
        let (scheduler, clock) = Scheduler::manual();
        let done = Rc::new(Cell::new(false));
        let done_clone = done.clone();
        scheduler.schedule_once(Duration::from_millis(600), move || done_clone.set(true));
        scheduler.schedule_repeating(Duration::from_millis(250), || ());

        scheduler.run_while(|| !done.get());
        assert!(done.get());
        assert_eq!(clock.now(), Duration::from_millis(600));
    }

    #[test]
    fn test_scope_cancels_everything_on_drop() {
        let (scheduler, _) = Scheduler::manual();
        let (log, make) = recorder();
        {
            let scope = TaskScope::new(scheduler.clone());
            scope.schedule_once(Duration::from_millis(100), make("a"));
            scope.schedule_repeating(Duration::from_millis(100), || ());
            assert_eq!(scope.pending_count(), 2);
        }
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(Duration::from_secs(1));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_scope_cancel_all_reports_only_pending() {
        let (scheduler, _) = Scheduler::manual();
        let scope = TaskScope::new(scheduler.clone());
        scope.schedule_once(Duration::from_millis(100), || ());
        scope.schedule_once(Duration::from_millis(900), || ());
        scheduler.advance(Duration::from_millis(500));
        assert_eq!(scope.cancel_all(), 1);
        assert_eq!(scope.cancel_all(), 0);
    }
}
