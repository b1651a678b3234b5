use rand::Rng;
use std::cmp;
use tokio::time::Duration;

/// Capped exponential backoff with full jitter. Competing proposers for the same seq pick
/// independent random delays, so they stop preempting each other after a round or two.
pub(crate) struct Backoff {
    min: Duration,
    max: Duration,
    ceiling: Duration,
}

impl Backoff {
    pub(crate) fn new(min: Duration, max: Duration) -> Self {
        Backoff { min, max, ceiling: min }
    }

    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = rand::thread_rng().gen_range(self.min..=self.ceiling);
        self.ceiling = cmp::min(self.ceiling * 2, self.max);
        delay
    }
}
