use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used when the operator leaves the master label blank.
pub const DEFAULT_MASTER_LABEL: &str = "Master";

/// Account name recorded on log entries about the master.
pub const MASTER_ACCOUNT: &str = "master";

/// Account name recorded on log entries not tied to any account.
pub const SYSTEM_ACCOUNT: &str = "system";

/// The one account whose actions are mirrored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterAccount {
    pub label: String,
    pub domain: String,
    /// Opaque session token (GSID cookie).
    pub credential: String,
}

impl Default for MasterAccount {
    fn default() -> Self {
        Self {
            label: DEFAULT_MASTER_LABEL.to_string(),
            domain: String::new(),
            credential: String::new(),
        }
    }
}

/// An account that replays the master's actions when active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerAccount {
    /// Display name. Uniqueness is checked case-insensitively.
    pub name: String,
    pub domain: String,
    pub credential: String,
    /// Scales the mirrored stake. Not clamped: zero and negatives are kept.
    pub risk_multiplier: f64,
    pub active: bool,
}

/// A single entry of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UTC, truncated to whole seconds.
    pub ts: DateTime<Utc>,
    pub account: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Zero for non-trading events.
    pub stake: f64,
    pub status: String,
    pub message: String,
}

/// The most recently published redirect target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveLink {
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl LiveLink {
    /// Whole seconds elapsed since publication, as of `now`.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.published_at).num_seconds()
    }

    pub fn is_stale(&self, now: DateTime<Utc>, stale_after_secs: u64) -> bool {
        self.age_secs(now) > stale_after_secs as i64
    }
}

/// Registry view returned to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrySnapshot {
    pub master: MasterAccount,
    pub followers: Vec<FollowerAccount>,
}

/// Full console state as served by `/api/state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub master: MasterAccount,
    pub followers: Vec<FollowerAccount>,
    pub logs: Vec<LogEntry>,
    pub live_url: Option<String>,
    /// Epoch seconds of the last publish.
    pub live_updated: Option<i64>,
}
