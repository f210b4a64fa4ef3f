use std::collections::VecDeque;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Time source seam
// ---------------------------------------------------------------------------

/// Supplies the loop's per-cycle timestamps, in seconds since an arbitrary
/// fixed origin. Abstracted so dt handling, stalls and regressions
/// included, is testable without real time.
pub trait Clock {
    fn now(&mut self) -> f64;
}

/// Production clock backed by a monotonic [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests, demos and replays. Pops an explicit stamp
/// sequence first, then keeps stepping uniformly past the end of it.
#[derive(Debug)]
pub struct ManualClock {
    stamps: VecDeque<f64>,
    last: f64,
    step: f64,
}

impl ManualClock {
    /// Uniform cadence: `start`, `start + step`, `start + 2*step`, ...
    pub fn with_step(start: f64, step: f64) -> Self {
        Self {
            stamps: VecDeque::new(),
            last: start - step,
            step,
        }
    }

    /// Replay an explicit stamp sequence (which may stall or run
    /// backwards), then continue from its final value in `step` increments.
    pub fn from_stamps(stamps: Vec<f64>, step: f64) -> Self {
        let last = stamps.last().copied().unwrap_or(0.0);
        Self {
            stamps: stamps.into(),
            last,
            step,
        }
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> f64 {
        if let Some(t) = self.stamps.pop_front() {
            self.last = t;
            t
        } else {
            self.last += self.step;
            self.last
        }
    }
}
