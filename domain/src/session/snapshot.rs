//! Versioned JSON serialization of [`SessionState`] for external stores.

use super::entities::SessionState;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: SessionState,
}

impl SessionSnapshot {
    pub fn capture(state: &SessionState, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            state: state.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::Snapshot(e.to_string()))
    }

    /// Parse a snapshot, rejecting unknown format versions.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| DomainError::Snapshot(e.to_string()))?;
        let version = value
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| DomainError::Snapshot("missing version".to_string()))?;
        if version != u64::from(SNAPSHOT_VERSION) {
            return Err(DomainError::UnsupportedSnapshotVersion(
                u32::try_from(version).unwrap_or(u32::MAX),
            ));
        }
        serde_json::from_value(value).map_err(|e| DomainError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::SessionId;
    use crate::session::summary::SummaryBudget;

    #[test]
    fn test_snapshot_reloads_verbatim() {
        let mut state = SessionState::new(SessionId::new("s1"));
        state.begin_turn();
        state.summary.push("user: hi | reply: Hello!", &SummaryBudget::default());

        let json = SessionSnapshot::capture(&state, Utc::now()).to_json().unwrap();
        let restored = SessionSnapshot::from_json(&json).unwrap();

        assert_eq!(restored.version, SNAPSHOT_VERSION);
        assert_eq!(restored.state, state);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let state = SessionState::new(SessionId::new("s1"));
        let mut snapshot = SessionSnapshot::capture(&state, Utc::now());
        snapshot.version = 99;
        let json = snapshot.to_json().unwrap();

        assert_eq!(
            SessionSnapshot::from_json(&json).unwrap_err(),
            DomainError::UnsupportedSnapshotVersion(99)
        );
        assert!(matches!(SessionSnapshot::from_json("{"), Err(DomainError::Snapshot(_))));
    }
}
