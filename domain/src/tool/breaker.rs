//! Circuit breaker state for one external dependency.
//!
//! ```text
//! Closed ──(threshold consecutive failures)──▶ Open
//!   ▲                                            │ cooldown elapsed
//!   │ probe succeeds                             ▼
//!   └──────────────────────────────────────── HalfOpen ──probe fails──▶ Open
//! ```
//!
//! Time is passed in by the caller, so the state machine stays pure.

use std::time::{Duration, Instant};

/// Breaker tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakerPolicy {
    /// Consecutive failures that open the breaker
    pub failure_threshold: u32,
    /// How long the breaker stays open before allowing a probe
    pub cooldown: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open { until: Instant },
    /// Cooldown elapsed and one probe is in flight
    HalfOpen,
}

/// Decision for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Fail fast; no I/O must happen
    Rejected,
}

/// Consecutive-failure breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    policy: BreakerPolicy,
    state: BreakerState,
    consecutive_failures: u32,
}

impl CircuitBreaker {
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            policy,
            state: BreakerState::Closed,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_open(&self, now: Instant) -> bool {
        matches!(self.state, BreakerState::Open { until } if now < until)
    }

    /// Ask whether an attempt may proceed at `now`.
    pub fn try_acquire(&mut self, now: Instant) -> Admission {
        match self.state {
            BreakerState::Closed => Admission::Allowed,
            BreakerState::Open { until } if now < until => Admission::Rejected,
            BreakerState::Open { .. } => {
                self.state = BreakerState::HalfOpen;
                Admission::Allowed
            }
            BreakerState::HalfOpen => Admission::Rejected,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.state = BreakerState::Closed;
    }

    /// Record a failure. Returns true if this failure opened the breaker.
    pub fn record_failure(&mut self, now: Instant) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let should_open = match self.state {
            BreakerState::HalfOpen => true,
            BreakerState::Closed => self.consecutive_failures >= self.policy.failure_threshold,
            BreakerState::Open { .. } => false,
        };
        if should_open {
            self.state = BreakerState::Open {
                until: now + self.policy.cooldown,
            };
        }
        should_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new(BreakerPolicy {
            failure_threshold: threshold,
            cooldown: Duration::from_millis(cooldown_ms),
        })
    }

    #[test]
    fn test_opens_after_threshold() {
        let now = Instant::now();
        let mut b = breaker(3, 1000);

        assert!(!b.record_failure(now));
        assert!(!b.record_failure(now));
        assert_eq!(b.try_acquire(now), Admission::Allowed);
        assert!(b.record_failure(now));

        assert!(b.is_open(now));
        assert_eq!(b.try_acquire(now), Admission::Rejected);
    }

    #[test]
    fn test_success_resets_count() {
        let now = Instant::now();
        let mut b = breaker(2, 1000);
        b.record_failure(now);
        b.record_success();
        assert!(!b.record_failure(now));
        assert_eq!(b.state(), BreakerState::Closed);
    }

    #[test]
    fn test_half_open_single_probe() {
        let start = Instant::now();
        let mut b = breaker(1, 100);
        b.record_failure(start);

        let later = start + Duration::from_millis(150);
        assert_eq!(b.try_acquire(later), Admission::Allowed);
        assert_eq!(b.state(), BreakerState::HalfOpen);
        // second concurrent caller while probing
        assert_eq!(b.try_acquire(later), Admission::Rejected);

        b.record_success();
        assert_eq!(b.state(), BreakerState::Closed);
        assert_eq!(b.try_acquire(later), Admission::Allowed);
    }

    #[test]
    fn test_failed_probe_reopens() {
        let start = Instant::now();
        let mut b = breaker(3, 100);
        for _ in 0..3 {
            b.record_failure(start);
        }
        let later = start + Duration::from_millis(150);
        assert_eq!(b.try_acquire(later), Admission::Allowed);
        assert!(b.record_failure(later));
        assert!(b.is_open(later));
        assert_eq!(b.try_acquire(later + Duration::from_millis(50)), Admission::Rejected);
    }
}
