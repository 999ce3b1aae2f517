//! Engine parameters — per-stage timeouts, retry policy and thresholds.
//!
//! [`EngineParams`] is the application-side view of configuration. The
//! infrastructure layer builds it from the file config; tests build it
//! directly with the builder methods.

use std::collections::HashMap;
use std::time::Duration;
use steward_domain::confirmation::ConfirmationPolicy;
use steward_domain::quality::QualityThresholds;
use steward_domain::session::SummaryBudget;
use steward_domain::tool::BreakerPolicy;

/// Intent router call parameters.
#[derive(Debug, Clone)]
pub struct RouterParams {
    pub timeout: Duration,
    pub max_tokens: u32,
    /// Ask the fast backend to re-emit JSON when deterministic repair fails
    pub llm_repair: bool,
}

impl Default for RouterParams {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            max_tokens: 384,
            llm_repair: true,
        }
    }
}

/// Reply generation parameters.
#[derive(Debug, Clone)]
pub struct FinalizeParams {
    pub fast_timeout: Duration,
    pub quality_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for FinalizeParams {
    fn default() -> Self {
        Self {
            fast_timeout: Duration::from_secs(10),
            quality_timeout: Duration::from_secs(30),
            max_tokens: 512,
            temperature: 0.3,
        }
    }
}

/// Tool execution parameters.
///
/// | Attempt | Backoff before it |
/// |---------|-------------------|
/// | 1 | none |
/// | 2 | `base_backoff` |
/// | n | `base_backoff · 2^(n-2)`, capped at `max_backoff` |
#[derive(Debug, Clone)]
pub struct ToolParams {
    pub default_timeout: Duration,
    /// Per tool class (`fs`, `terminal`, ...)
    pub class_timeouts: HashMap<String, Duration>,
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ToolParams {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            class_timeouts: HashMap::new(),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl ToolParams {
    pub fn timeout_for(&self, class: &str) -> Duration {
        self.class_timeouts
            .get(class)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    /// Delay before attempt number `attempt` (1-based).
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 2);
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// All engine parameters.
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub router: RouterParams,
    pub finalize: FinalizeParams,
    pub tools: ToolParams,
    pub breaker: BreakerPolicy,
    pub confirmation: ConfirmationPolicy,
    /// Router confidence below which alternatives become a menu
    pub clarify_below: f64,
    pub quality: QualityThresholds,
    pub summary: SummaryBudget,
    /// Sessions untouched for this long are dropped
    pub session_idle: Duration,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            router: RouterParams::default(),
            finalize: FinalizeParams::default(),
            tools: ToolParams::default(),
            breaker: BreakerPolicy::default(),
            confirmation: ConfirmationPolicy::default(),
            clarify_below: 0.5,
            quality: QualityThresholds::default(),
            summary: SummaryBudget::default(),
            session_idle: Duration::from_secs(3600),
        }
    }
}

impl EngineParams {
    // ==================== Builder Methods ====================

    pub fn with_router(mut self, router: RouterParams) -> Self {
        self.router = router;
        self
    }

    pub fn with_finalize(mut self, finalize: FinalizeParams) -> Self {
        self.finalize = finalize;
        self
    }

    pub fn with_tools(mut self, tools: ToolParams) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_breaker(mut self, breaker: BreakerPolicy) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationPolicy) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_clarify_below(mut self, clarify_below: f64) -> Self {
        self.clarify_below = clarify_below;
        self
    }

    pub fn with_quality(mut self, quality: QualityThresholds) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_summary(mut self, summary: SummaryBudget) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_session_idle(mut self, session_idle: Duration) -> Self {
        self.session_idle = session_idle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = EngineParams::default();
        assert_eq!(params.tools.max_attempts, 3);
        assert_eq!(params.tools.default_timeout, Duration::from_secs(30));
        assert_eq!(params.breaker.failure_threshold, 3);
        assert_eq!(params.quality, QualityThresholds::default());
        assert_eq!(params.session_idle, Duration::from_secs(3600));
    }

    #[test]
    fn test_class_timeout_override() {
        let mut tools = ToolParams::default();
        tools.class_timeouts.insert("terminal".into(), Duration::from_secs(60));

        assert_eq!(tools.timeout_for("terminal"), Duration::from_secs(60));
        assert_eq!(tools.timeout_for("fs"), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let tools = ToolParams {
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            ..Default::default()
        };
        assert_eq!(tools.backoff_before(1), Duration::ZERO);
        assert_eq!(tools.backoff_before(2), Duration::from_millis(100));
        assert_eq!(tools.backoff_before(3), Duration::from_millis(200));
        assert_eq!(tools.backoff_before(4), Duration::from_millis(350));
        assert_eq!(tools.backoff_before(40), Duration::from_millis(350));
    }
}
