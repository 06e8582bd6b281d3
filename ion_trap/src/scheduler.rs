//! Frame-driven timers with cancellable handles
//!
//! Time only moves when [`Scheduler::advance`] is called from the render tick,
//! so everything stays on the UI thread and tests can step time exactly.

/// Handle returned by [`Scheduler::schedule`], used to cancel a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Timer<E> {
    handle: TimerHandle,
    deadline: f64,
    event: E,
}

/// One-shot delayed events
#[derive(Debug)]
pub struct Scheduler<E> {
    now: f64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            timers: Vec::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `event` once `delay` seconds have elapsed
    pub fn schedule(&mut self, delay: f32, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            deadline: self.now + delay.max(0.0) as f64,
            event,
        });
        handle
    }

    /// Drop a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Advance the clock and collect every event that came due, earliest first
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        self.now += dt.max(0.0) as f64;

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.deadline <= now);
        self.timers = pending;

        // Stable sort keeps scheduling order for equal deadlines
        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));
        due.into_iter().map(|t| t.event).collect()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Seconds elapsed since creation
    pub fn now(&self) -> f64 {
        self.now
    }
}
