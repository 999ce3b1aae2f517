//! Circuit breakers shared across sessions.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use steward_domain::tool::{Admission, BreakerPolicy, BreakerState, CircuitBreaker};

/// One breaker per dependency (tool class), created on first use.
///
/// Guarded by a plain mutex: every operation is a short, non-async state
/// transition, so the lock is never held across an await.
pub struct CircuitBreakers {
    policy: BreakerPolicy,
    breakers: Mutex<HashMap<String, CircuitBreaker>>,
}

impl CircuitBreakers {
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            policy,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    fn with_breaker<R>(&self, dependency: &str, f: impl FnOnce(&mut CircuitBreaker) -> R) -> R {
        let mut breakers = self.breakers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let breaker = breakers
            .entry(dependency.to_string())
            .or_insert_with(|| CircuitBreaker::new(self.policy));
        f(breaker)
    }

    pub fn try_acquire(&self, dependency: &str, now: Instant) -> Admission {
        self.with_breaker(dependency, |b| b.try_acquire(now))
    }

    pub fn record_success(&self, dependency: &str) {
        self.with_breaker(dependency, |b| b.record_success());
    }

    /// Returns true if this failure opened the breaker.
    pub fn record_failure(&self, dependency: &str, now: Instant) -> bool {
        self.with_breaker(dependency, |b| b.record_failure(now))
    }

    pub fn state(&self, dependency: &str) -> BreakerState {
        self.with_breaker(dependency, |b| b.state())
    }
}

impl Default for CircuitBreakers {
    fn default() -> Self {
        Self::new(BreakerPolicy::default())
    }
}
