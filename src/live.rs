use chrono::{DateTime, Utc};

use crate::error::{ConsoleError, ConsoleResult};
use crate::types::LiveLink;

/// Age in seconds after which a published link is no longer served.
pub const DEFAULT_STALE_AFTER_SECS: u64 = 1800;

/// Why `fetch` has no link to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    NeverPublished,
    Stale { age_secs: i64 },
}

impl Unavailable {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NeverPublished => "not_published",
            Self::Stale { .. } => "stale",
        }
    }
}

/// Holds the single most recently published live link.
#[derive(Debug, Clone)]
pub struct LiveLinkCache {
    current: Option<LiveLink>,
    stale_after_secs: u64,
}

impl LiveLinkCache {
    pub fn new(stale_after_secs: u64) -> Self {
        Self {
            current: None,
            stale_after_secs,
        }
    }

    /// Replace the stored link with `url`, stamped `now`.
    pub fn publish(&mut self, url: &str, now: DateTime<Utc>) -> ConsoleResult<LiveLink> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConsoleError::validation("Missing url"));
        }
        let link = LiveLink {
            url: url.to_string(),
            published_at: now,
        };
        self.current = Some(link.clone());
        Ok(link)
    }

    /// The stored link if one exists and is not older than the threshold.
    pub fn fetch(&self, now: DateTime<Utc>) -> Result<LiveLink, Unavailable> {
        let link = self.current.as_ref().ok_or(Unavailable::NeverPublished)?;
        if link.is_stale(now, self.stale_after_secs) {
            return Err(Unavailable::Stale {
                age_secs: link.age_secs(now),
            });
        }
        Ok(link.clone())
    }

    /// The stored link regardless of age.
    pub fn current(&self) -> Option<&LiveLink> {
        self.current.as_ref()
    }

    pub fn stale_after_secs(&self) -> u64 {
        self.stale_after_secs
    }
}

impl Default for LiveLinkCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER_SECS)
    }
}
