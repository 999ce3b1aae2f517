//! Quality gate: weighted admission score → finalization tier.
//!
//! ```text
//! score = 0.35 * complexity + 0.45 * writing_need + 0.20 * residual_risk
//!
//! score >= thresholds.quality  → Tier::Quality  (remote backend)
//! score >= thresholds.fast     → Tier::Fast     (local backend)
//! otherwise                    → Tier::Draft    (template, no generation)
//! ```
//!
//! All three sub-scores are in `[0, 1]` and derived only from the plan and
//! the turn's tool calls, so the same turn always lands in the same tier.

use crate::core::error::DomainError;
use crate::plan::Plan;
use crate::tool::{CallStatus, RiskLevel, ToolCall};
use serde::{Deserialize, Serialize};

pub const COMPLEXITY_WEIGHT: f64 = 0.35;
pub const WRITING_WEIGHT: f64 = 0.45;
pub const RISK_WEIGHT: f64 = 0.20;

/// Tool output larger than this (in chars) raises writing need a little.
const MEDIUM_OUTPUT_CHARS: usize = 200;
/// Tool output larger than this needs real summarizing.
const LARGE_OUTPUT_CHARS: usize = 800;

/// Finalization tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Quality,
    Fast,
    Draft,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Quality => "quality",
            Tier::Fast => "fast",
            Tier::Draft => "draft",
        }
    }

    /// Next tier down, if any.
    pub fn fallback(&self) -> Option<Tier> {
        match self {
            Tier::Quality => Some(Tier::Fast),
            Tier::Fast => Some(Tier::Draft),
            Tier::Draft => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tier boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub quality: f64,
    pub fast: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            quality: 0.45,
            fast: 0.20,
        }
    }
}

impl QualityThresholds {
    pub fn new(quality: f64, fast: f64) -> Result<Self, DomainError> {
        let thresholds = Self { quality, fast };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.quality) || !in_range(self.fast) {
            return Err(DomainError::InvalidThresholds(format!(
                "thresholds must be within [0, 1] (quality={}, fast={})",
                self.quality, self.fast
            )));
        }
        if self.fast > self.quality {
            return Err(DomainError::InvalidThresholds(format!(
                "fast threshold {} exceeds quality threshold {}",
                self.fast, self.quality
            )));
        }
        Ok(())
    }

    pub fn tier_for(&self, score: f64) -> Tier {
        if score >= self.quality {
            Tier::Quality
        } else if score >= self.fast {
            Tier::Fast
        } else {
            Tier::Draft
        }
    }
}

/// Sub-scores and the combined score for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    pub complexity: f64,
    pub writing: f64,
    pub risk: f64,
    pub score: f64,
}

impl QualityScore {
    pub fn new(complexity: f64, writing: f64, risk: f64) -> Self {
        let complexity = complexity.clamp(0.0, 1.0);
        let writing = writing.clamp(0.0, 1.0);
        let risk = risk.clamp(0.0, 1.0);
        Self {
            complexity,
            writing,
            risk,
            score: COMPLEXITY_WEIGHT * complexity + WRITING_WEIGHT * writing + RISK_WEIGHT * risk,
        }
    }
}

/// Result of assessing a turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub score: QualityScore,
    pub tier: Tier,
}

/// Pure tier selector.
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    thresholds: QualityThresholds,
}

impl QualityGate {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> QualityThresholds {
        self.thresholds
    }

    pub fn assess(&self, plan: &Plan, calls: &[ToolCall]) -> Assessment {
        let score = QualityScore::new(complexity(plan, calls), writing_need(plan, calls), residual_risk(calls));
        Assessment {
            score,
            tier: self.thresholds.tier_for(score.score),
        }
    }
}

/// Slot count, plan length, ambiguity and failures.
pub fn complexity(plan: &Plan, calls: &[ToolCall]) -> f64 {
    let slots = plan.slots.len().min(5) as f64 / 5.0;
    let tools = plan.tool_plan.len().min(4) as f64 / 4.0;
    let ambiguity = 1.0 - plan.confidence.clamp(0.0, 1.0);
    let failure: f64 = if calls.iter().any(|c| c.status == CallStatus::Error) {
        0.1
    } else {
        0.0
    };
    (0.3 * slots + 0.4 * tools + 0.2 * ambiguity + failure).clamp(0.0, 1.0)
}

/// Prose vs. short fact, plus how much tool output needs summarizing.
pub fn writing_need(plan: &Plan, calls: &[ToolCall]) -> f64 {
    let base: f64 = match plan.intent.as_str() {
        "compose_email" => 1.0,
        "chitchat" => 0.6,
        "search_web" | "read_inbox" => 0.5,
        "read_file" | "help" | "open_page" => 0.4,
        "list_events" | "list_directory" => 0.3,
        "greeting" | "farewell" | "thanks" | "time_query" | "date_query" | "unknown" => 0.1,
        _ => 0.2,
    };
    let output_chars: usize = calls
        .iter()
        .filter_map(|c| c.outcome.as_ref())
        .map(|r| r.output_text().chars().count())
        .sum();
    let volume: f64 = if output_chars > LARGE_OUTPUT_CHARS {
        0.3
    } else if output_chars > MEDIUM_OUTPUT_CHARS {
        0.15
    } else {
        0.0
    };
    (base + volume).clamp(0.0, 1.0)
}

/// Highest risk weight among the turn's calls.
pub fn residual_risk(calls: &[ToolCall]) -> f64 {
    calls
        .iter()
        .map(|c| c.risk)
        .max()
        .map_or(0.0, |risk: RiskLevel| risk.weight())
}
