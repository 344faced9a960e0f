use rand::Rng;
use std::time::Duration;

/// Exponential reconnect backoff with jitter (spec.md §7: base 1s, cap 60s,
/// jitter ±20%).
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    cap: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap, current: base }
    }

    /// Standard configuration used by a live session (spec.md §7).
    pub fn standard() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }

    /// Clears the running delay back to `base`, e.g. once a session reaches
    /// `LoggedOn`.
    pub fn reset(&mut self) {
        self.current = self.base;
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    fn double_current(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.cap);
    }

    /// The next delay to sleep before retrying, jittered by ±20%, then
    /// doubles (capped) for the following call.
    pub fn next_delay(&mut self, rng: &mut impl Rng) -> Duration {
        let jitter_fraction: f64 = rng.random_range(-0.2..=0.2);
        let delay = self.current.mul_f64((1.0 + jitter_fraction).max(0.0));
        self.double_current();
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn delay_grows_monotonically_until_the_cap() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(60));
        let mut rng = StdRng::seed_from_u64(7);

        let mut previous_unjittered = backoff.current();
        for _ in 0..8 {
            let unjittered_before = backoff.current();
            let delay = backoff.next_delay(&mut rng);
            assert!(delay.as_secs_f64() >= unjittered_before.as_secs_f64() * 0.8 - 1e-9);
            assert!(delay.as_secs_f64() <= unjittered_before.as_secs_f64() * 1.2 + 1e-9);
            assert!(unjittered_before >= previous_unjittered || previous_unjittered == backoff.cap);
            previous_unjittered = unjittered_before;
        }
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(60));
        let mut rng = StdRng::seed_from_u64(1);
        backoff.next_delay(&mut rng);
        backoff.next_delay(&mut rng);
        assert!(backoff.current() > Duration::from_secs(1));
        backoff.reset();
        assert_eq!(backoff.current(), Duration::from_secs(1));
    }

    #[test]
    fn never_exceeds_cap_even_after_many_attempts() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(60));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let delay = backoff.next_delay(&mut rng);
            assert!(delay.as_secs_f64() <= 60.0 * 1.2 + 1e-9);
        }
    }
}
