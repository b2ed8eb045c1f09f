//! The "listening now" figure in the header: a slow random walk that never
//! drops below one.

use rand::Rng;
use std::time::{Duration, Instant};

const MIN_STEP_MS: u64 = 3000;
const STEP_JITTER_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Listeners {
    count: u32,
    next_step: Instant,
}

impl Listeners {
    pub fn new<R: Rng + ?Sized>(now: Instant, rng: &mut R) -> Self {
        Self {
            count: rng.gen_range(1..=10),
            next_step: now + step_delay(rng),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Moves the count by one once its step is due. Returns whether it moved.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        if now < self.next_step {
            return false;
        }
        self.count = if rng.gen_bool(0.5) {
            self.count + 1
        } else {
            self.count.saturating_sub(1).max(1)
        };
        self.next_step = now + step_delay(rng);
        true
    }
}

fn step_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_millis(MIN_STEP_MS + rng.gen_range(0..STEP_JITTER_MS))
}
