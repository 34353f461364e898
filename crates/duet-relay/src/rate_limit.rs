//! Per-connection token bucket for relayed frames (chat and signals).
//!
//! One bucket lives inside each connection task, so no locking is needed.

use std::time::Instant;

#[derive(Debug)]
pub struct RelayBudget {
    tokens: f64,
    burst: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl RelayBudget {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self::starting_at(rate_per_sec, burst, Instant::now())
    }

    fn starting_at(rate_per_sec: u32, burst: u32, now: Instant) -> Self {
        Self {
            tokens: f64::from(burst),
            burst: f64::from(burst),
            refill_per_sec: f64::from(rate_per_sec),
            last_refill: now,
        }
    }

    /// Spend one token. Returns false when the bucket is empty.
    pub fn try_take(&mut self) -> bool {
        self.try_take_at(Instant::now())
    }

    fn try_take_at(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.burst);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn burst_then_refuse() {
        let start = Instant::now();
        let mut budget = RelayBudget::starting_at(1, 3, start);

        assert!(budget.try_take_at(start));
        assert!(budget.try_take_at(start));
        assert!(budget.try_take_at(start));
        assert!(!budget.try_take_at(start));
    }

    #[test]
    fn refills_at_the_sustained_rate() {
        let start = Instant::now();
        let mut budget = RelayBudget::starting_at(10, 1, start);

        assert!(budget.try_take_at(start));
        assert!(!budget.try_take_at(start + Duration::from_millis(50)));
        assert!(budget.try_take_at(start + Duration::from_millis(150)));
    }

    #[test]
    fn idle_time_never_exceeds_burst() {
        let start = Instant::now();
        let mut budget = RelayBudget::starting_at(100, 2, start);
        let later = start + Duration::from_secs(60);

        assert!(budget.try_take_at(later));
        assert!(budget.try_take_at(later));
        assert!(!budget.try_take_at(later));
    }
}
