//! Fixed-period scheduling for the game loop.
//!
//! The host polls a [`Ticker`] with the current time and forwards every returned
//! [`TickId`] to the engine. Each call to [`Ticker::schedule`] starts a new generation,
//! so ids handed out before a cancel or restart can be recognised as stale.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickId {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
    generation: u64,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker {
            period,
            next_due: None,
            generation: 0,
        }
    }

    /// Starts ticking every period from `now`, replacing any previous schedule
    pub fn schedule(&mut self, now: Instant) -> TickId {
        self.cancel();
        self.generation += 1;
        self.next_due = Some(now + self.period);
        TickId {
            generation: self.generation,
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// True if `id` belongs to the schedule that is currently active
    pub fn is_current(&self, id: TickId) -> bool {
        self.is_active() && id.generation == self.generation
    }

    /// Returns a tick if one is due. At most one tick is produced per call.
    pub fn poll(&mut self, now: Instant) -> Option<TickId> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        let mut next = due + self.period;
        if next <= now {
            // fell behind by more than a period, don't burst
            next = now + self.period;
        }
        self.next_due = Some(next);
        Some(TickId {
            generation: self.generation,
        })
    }

    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
