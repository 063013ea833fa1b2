// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tick source abstraction and bounded polling.
//!
//! The driver never sleeps: every wait is a busy loop bounded either by a
//! tick deadline or by a fixed iteration count.

/// Monotonic tick counter supplied by the board's timer driver.
pub trait TickSource {
    /// Ticks elapsed since the source's reference point.
    fn ticks(&mut self) -> u64;

    /// Tick rate in ticks per second.
    fn tick_hz(&self) -> u64;
}

impl<T: TickSource + ?Sized> TickSource for &mut T {
    fn ticks(&mut self) -> u64 {
        (**self).ticks()
    }

    fn tick_hz(&self) -> u64 {
        (**self).tick_hz()
    }
}

/// Convert milliseconds into ticks at `hz`.
pub const fn ms_to_ticks(ms: u64, hz: u64) -> u64 {
    ms * hz / 1000
}

/// Result of a bounded poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    Completed,
    TimedOut,
}

/// Absolute tick deadline.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: u64,
}

impl Deadline {
    pub fn after_ms<T: TickSource + ?Sized>(ticks: &mut T, ms: u64) -> Self {
        let timeout = ms_to_ticks(ms, ticks.tick_hz());
        Self {
            at: ticks.ticks().saturating_add(timeout),
        }
    }

    pub fn expired<T: TickSource + ?Sized>(&self, ticks: &mut T) -> bool {
        ticks.ticks() >= self.at
    }
}

/// Spin on `done` until it returns true or `ms` milliseconds have elapsed.
pub fn poll_until<T, F>(ticks: &mut T, ms: u64, mut done: F) -> PollOutcome
where
    T: TickSource + ?Sized,
    F: FnMut() -> bool,
{
    let deadline = Deadline::after_ms(ticks, ms);
    while !deadline.expired(ticks) {
        if done() {
            return PollOutcome::Completed;
        }
    }
    PollOutcome::TimedOut
}

/// Spin on `done` at most `max_polls` times.
pub fn poll_iterations<F>(max_polls: u32, mut done: F) -> PollOutcome
where
    F: FnMut() -> bool,
{
    for _ in 0..max_polls {
        if done() {
            return PollOutcome::Completed;
        }
    }
    PollOutcome::TimedOut
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        now: u64,
        hz: u64,
    }

    impl TickSource for Counter {
        fn ticks(&mut self) -> u64 {
            self.now += 1;
            self.now
        }

        fn tick_hz(&self) -> u64 {
            self.hz
        }
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(20, 1000), 20);
        assert_eq!(ms_to_ticks(20, 1_000_000), 20_000);
        assert_eq!(ms_to_ticks(20, 100), 2);
    }

    #[test]
    fn test_poll_until_completes() {
        let mut ticks = Counter { now: 0, hz: 1000 };
        let mut polls = 0;
        let outcome = poll_until(&mut ticks, 20, || {
            polls += 1;
            polls == 3
        });
        assert_eq!(outcome, PollOutcome::Completed);
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_poll_until_times_out() {
        let mut ticks = Counter { now: 0, hz: 1000 };
        let mut polls = 0u32;
        let outcome = poll_until(&mut ticks, 20, || {
            polls += 1;
            false
        });
        assert_eq!(outcome, PollOutcome::TimedOut);
        // Deadline is taken at tick 1; one tick is consumed per check.
        assert!(polls >= 18 && polls <= 20);
    }

    #[test]
    fn test_poll_iterations_bound() {
        let mut polls = 0u32;
        let outcome = poll_iterations(0x10, || {
            polls += 1;
            false
        });
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(polls, 0x10);
    }
}
