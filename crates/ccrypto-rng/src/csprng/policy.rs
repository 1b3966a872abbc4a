//! Reseed policies consulted by [`Csprng`](super::Csprng) before each step
//! of a generate call.
//!
//! Policies run with the generator's lock held and must not call back into
//! the same generator.

use std::time::{Duration, Instant};

/// Decides when the generator pulls fresh entropy.
pub trait ReseedPolicy: Send {
    /// Asked before every generate step; `true` forces a reseed from the
    /// entropy source.
    fn need_reseed(&mut self) -> bool;

    /// Told after every successful reseed, implicit or explicit.
    fn reseed_complete(&mut self) {}
}

/// Rely on the DRBG's own reseed interval only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverReseed;

impl ReseedPolicy for NeverReseed {
    fn need_reseed(&mut self) -> bool {
        false
    }
}

/// Reseed after a fixed number of generate steps.
#[derive(Debug, Clone)]
pub struct CounterPolicy {
    every: u64,
    steps: u64,
}

impl CounterPolicy {
    /// `every` of zero behaves like one: reseed before every step.
    pub fn new(every: u64) -> Self {
        CounterPolicy {
            every: every.max(1),
            steps: 0,
        }
    }
}

impl ReseedPolicy for CounterPolicy {
    fn need_reseed(&mut self) -> bool {
        if self.steps >= self.every {
            return true;
        }
        self.steps += 1;
        false
    }

    fn reseed_complete(&mut self) {
        self.steps = 0;
    }
}

/// Reseed once a wall-clock interval has elapsed since the last reseed.
#[derive(Debug, Clone)]
pub struct TimerPolicy {
    interval: Duration,
    last: Instant,
}

impl TimerPolicy {
    pub fn new(interval: Duration) -> Self {
        TimerPolicy {
            interval,
            last: Instant::now(),
        }
    }
}

impl ReseedPolicy for TimerPolicy {
    fn need_reseed(&mut self) -> bool {
        self.last.elapsed() >= self.interval
    }

    fn reseed_complete(&mut self) {
        self.last = Instant::now();
    }
}

/// Policy built from a predicate and a completion callback.
pub struct FnPolicy<N, C> {
    need: N,
    complete: C,
}

impl<N, C> FnPolicy<N, C>
where
    N: FnMut() -> bool + Send,
    C: FnMut() + Send,
{
    pub fn new(need: N, complete: C) -> Self {
        FnPolicy { need, complete }
    }
}

impl<N, C> ReseedPolicy for FnPolicy<N, C>
where
    N: FnMut() -> bool + Send,
    C: FnMut() + Send,
{
    fn need_reseed(&mut self) -> bool {
        (self.need)()
    }

    fn reseed_complete(&mut self) {
        (self.complete)()
    }
}
