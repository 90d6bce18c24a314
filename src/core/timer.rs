//! Timer queue driven by the UI frame loop
//!
//! Timers never run code themselves. The frame loop asks for the events that
//! are due and handles them on the UI thread, so there is one writer.

use std::time::{Duration, Instant};

/// Handle returned when a timer is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Whether a repeating timer should keep firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Continue,
    #[allow(dead_code)]
    Stop,
}

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    deadline: Instant,
    /// `None` for one-shot timers
    interval: Option<Duration>,
    event: T,
}

/// Pending timers carrying events of type `T`
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: Vec<Timer<T>>,
    next_id: u64,
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 0,
        }
    }

    /// Fire `event` once, `delay` after `now`
    pub fn once(&mut self, now: Instant, delay: Duration, event: T) -> TimerId {
        self.insert(now + delay, None, event)
    }

    /// Fire `event` every `interval`, starting one interval after `now`
    pub fn repeating(&mut self, now: Instant, interval: Duration, event: T) -> TimerId {
        self.insert(now + interval, Some(interval), event)
    }

    fn insert(&mut self, deadline: Instant, interval: Option<Duration>, event: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline,
            interval,
            event,
        });
        id
    }

    /// Remove a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    #[allow(dead_code)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest deadline among pending timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Take every event due at `now`, in deadline order.
    ///
    /// One-shot timers are removed. Repeating timers fire once per call
    /// even if several intervals elapsed, and are rescheduled from `now`.
    pub fn due(&mut self, now: Instant) -> Vec<(TimerId, T)> {
        let mut fired: Vec<(Instant, TimerId, T)> = Vec::new();

        self.timers.retain_mut(|timer| {
            if timer.deadline > now {
                return true;
            }
            fired.push((timer.deadline, timer.id, timer.event.clone()));
            match timer.interval {
                Some(interval) => {
                    timer.deadline = now + interval;
                    true
                }
                None => false,
            }
        });

        fired.sort_by_key(|(deadline, _, _)| *deadline);
        fired.into_iter().map(|(_, id, event)| (id, event)).collect()
    }
}
