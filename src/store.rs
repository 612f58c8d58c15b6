use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::ConsoleResult;
use crate::live::{LiveLinkCache, Unavailable};
use crate::logs::LogRing;
use crate::registry::{AccountRegistry, FollowerForm};
use crate::types::{
    FollowerAccount, LiveLink, LogEntry, MASTER_ACCOUNT, MasterAccount, RegistrySnapshot,
    SYSTEM_ACCOUNT, StateSnapshot,
};

/// Event type for account configuration changes.
const EVENT_CONFIG: &str = "config";

/// Event type for live-link changes.
const EVENT_LIVE: &str = "live";

const STATUS_OK: &str = "ok";

/// Everything guarded by the store lock.
#[derive(Debug)]
struct ConsoleState {
    registry: AccountRegistry,
    logs: LogRing,
    live: LiveLinkCache,
}

impl ConsoleState {
    fn log(&mut self, now: DateTime<Utc>, account: &str, event_type: &str, message: String) {
        self.logs.append(LogEntry {
            ts: now,
            account: account.to_string(),
            event_type: event_type.to_string(),
            stake: 0.0,
            status: STATUS_OK.to_string(),
            message,
        });
    }
}

/// The process-wide console state: account registry, activity log and live
/// link behind a single lock.
///
/// Each method takes the lock exactly once, so a mutation and the log entry
/// recording it are applied together, and a find-then-replace cannot
/// interleave with another writer.
pub struct Store {
    state: RwLock<ConsoleState>,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(ConsoleState {
                registry: AccountRegistry::new(),
                logs: LogRing::new(config.log_capacity, config.log_retain),
                live: LiveLinkCache::new(config.live_stale_secs),
            }),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn save_master(
        &self,
        label: &str,
        domain: &str,
        credential: &str,
    ) -> ConsoleResult<MasterAccount> {
        let now = self.now();
        let mut state = self.state.write();
        let master = state.registry.save_master(label, domain, credential)?;
        state.log(
            now,
            MASTER_ACCOUNT,
            EVENT_CONFIG,
            format!("Master saved: {} @ {}", master.label, master.domain),
        );
        info!("Master saved: {} @ {}", master.label, master.domain);
        Ok(master)
    }

    pub fn upsert_follower(&self, form: FollowerForm<'_>) -> ConsoleResult<FollowerAccount> {
        let now = self.now();
        let mut state = self.state.write();
        let follower = state.registry.upsert_follower(form)?;
        state.log(
            now,
            &follower.name,
            EVENT_CONFIG,
            format!(
                "Follower saved: riskx={}, active={}",
                follower.risk_multiplier, follower.active
            ),
        );
        info!(
            "Follower {} saved (riskx={}, active={})",
            follower.name, follower.risk_multiplier, follower.active
        );
        Ok(follower)
    }

    /// Remove a follower. Returns `true` once removed; absence is an error.
    pub fn delete_follower(&self, name: &str) -> ConsoleResult<bool> {
        let now = self.now();
        let mut state = self.state.write();
        let removed = state.registry.delete_follower(name)?;
        state.log(now, &removed.name, EVENT_CONFIG, "Follower deleted".to_string());
        info!("Follower {} deleted", removed.name);
        Ok(true)
    }

    pub fn publish_live(&self, url: &str) -> ConsoleResult<LiveLink> {
        let now = self.now();
        let mut state = self.state.write();
        let link = state.live.publish(url, now)?;
        state.log(now, SYSTEM_ACCOUNT, EVENT_LIVE, "Live link published".to_string());
        info!("Live link published");
        Ok(link)
    }

    pub fn fetch_live(&self) -> Result<LiveLink, Unavailable> {
        let now = self.now();
        let result = self.state.read().live.fetch(now);
        if let Err(reason) = &result {
            debug!("Live link unavailable: {reason:?}");
        }
        result
    }

    pub fn live_stale_after_secs(&self) -> u64 {
        self.state.read().live.stale_after_secs()
    }

    pub fn registry(&self) -> RegistrySnapshot {
        self.state.read().registry.snapshot()
    }

    pub fn follower(&self, name: &str) -> Option<FollowerAccount> {
        self.state.read().registry.follower(name).cloned()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.state.read().logs.snapshot()
    }

    /// Full snapshot taken under one read guard.
    pub fn snapshot(&self) -> StateSnapshot {
        let state = self.state.read();
        let registry = state.registry.snapshot();
        let live = state.live.current();
        StateSnapshot {
            master: registry.master,
            followers: registry.followers,
            logs: state.logs.snapshot(),
            live_url: live.map(|l| l.url.clone()),
            live_updated: live.map(|l| l.published_at.timestamp()),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ConsoleError;

    fn store_at(secs: i64) -> (Store, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(secs));
        let store = Store::with_clock(&StoreConfig::default(), clock.clone());
        (store, clock)
    }

    fn follower<'a>(name: &'a str, domain: &'a str) -> FollowerForm<'a> {
        FollowerForm {
            name,
            domain,
            credential: "tok",
            risk_multiplier: "1.0",
            active: "1",
        }
    }

    // ── logging side effects ───────────────────────────────────────

    #[test]
    fn master_save_logs_entry() {
        let (store, _) = store_at(1_700_000_000);
        store.save_master("", "m.com", "gsid").unwrap();
        let logs = store.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].account, "master");
        assert_eq!(logs[0].event_type, "config");
        assert_eq!(logs[0].status, "ok");
        assert_eq!(logs[0].stake, 0.0);
        assert_eq!(logs[0].message, "Master saved: Master @ m.com");
        assert_eq!(logs[0].ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn failed_mutation_does_not_log() {
        let (store, _) = store_at(0);
        store.save_master("M", "m.com", "gsid").unwrap();
        assert!(store.save_master("M", "", "gsid").is_err());
        assert!(store.delete_follower("ghost").is_err());
        assert!(store.publish_live("").is_err());
        assert_eq!(store.logs().len(), 1);
        assert_eq!(store.registry().master.domain, "m.com");
    }

    #[test]
    fn follower_logs_under_stored_name() {
        let (store, _) = store_at(0);
        store.upsert_follower(follower("Alice", "a.com")).unwrap();
        store.upsert_follower(follower("ALICE", "b.com")).unwrap();
        store.delete_follower("alice").unwrap();
        let logs = store.logs();
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|l| l.account == "Alice"));
        assert_eq!(logs[0].message, "Follower saved: riskx=1, active=true");
        assert_eq!(logs[2].message, "Follower deleted");
    }

    #[test]
    fn delete_returns_true_and_not_found_otherwise() {
        let (store, _) = store_at(0);
        store.upsert_follower(follower("Alice", "a.com")).unwrap();
        store.upsert_follower(follower("Bob", "b.com")).unwrap();
        assert_eq!(store.delete_follower("alice"), Ok(true));
        assert_eq!(
            store.delete_follower("alice"),
            Err(ConsoleError::not_found("Follower not found"))
        );
        assert!(store.follower("bob").is_some());
    }

    // ── live link ──────────────────────────────────────────────────

    #[test]
    fn live_uses_injected_clock() {
        let (store, clock) = store_at(0);
        assert_eq!(store.fetch_live(), Err(Unavailable::NeverPublished));

        store.publish_live("https://x/y?tok=1").unwrap();
        clock.set(1000);
        assert_eq!(store.fetch_live().unwrap().url, "https://x/y?tok=1");
        clock.set(2000);
        assert_eq!(store.fetch_live(), Err(Unavailable::Stale { age_secs: 2000 }));
    }

    #[test]
    fn live_publish_logs_system_entry() {
        let (store, _) = store_at(0);
        store.publish_live("https://x").unwrap();
        let logs = store.logs();
        assert_eq!(logs[0].account, "system");
        assert_eq!(logs[0].event_type, "live");
    }

    #[test]
    fn custom_stale_threshold() {
        let clock = Arc::new(ManualClock::new(0));
        let config = StoreConfig {
            live_stale_secs: 60,
            ..StoreConfig::default()
        };
        let store = Store::with_clock(&config, clock.clone());
        store.publish_live("https://x").unwrap();
        clock.advance(61);
        assert!(store.fetch_live().is_err());
        assert_eq!(store.live_stale_after_secs(), 60);
    }

    // ── snapshot ───────────────────────────────────────────────────

    #[test]
    fn snapshot_reports_stale_link_raw() {
        let (store, clock) = store_at(100);
        store.save_master("M", "m.com", "gsid").unwrap();
        store.upsert_follower(follower("Alice", "a.com")).unwrap();
        store.publish_live("https://x").unwrap();
        clock.advance(10_000);

        let snap = store.snapshot();
        assert_eq!(snap.master.label, "M");
        assert_eq!(snap.followers.len(), 1);
        assert_eq!(snap.logs.len(), 3);
        assert_eq!(snap.live_url.as_deref(), Some("https://x"));
        assert_eq!(snap.live_updated, Some(100));
    }

    #[test]
    fn snapshot_json_shape() {
        let (store, _) = store_at(0);
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["master"]["label"], "Master");
        assert!(json["followers"].as_array().unwrap().is_empty());
        assert!(json["logs"].as_array().unwrap().is_empty());
        assert!(json["live_url"].is_null());
        assert!(json["live_updated"].is_null());
    }

    #[test]
    fn log_ring_bounded_through_store() {
        let clock = Arc::new(ManualClock::new(0));
        let config = StoreConfig {
            log_capacity: 10,
            log_retain: 5,
            ..StoreConfig::default()
        };
        let store = Store::with_clock(&config, clock);
        for n in 0..25 {
            store.publish_live(&format!("https://x/{n}")).unwrap();
            assert!(store.logs().len() <= 10);
        }
    }

    // ── concurrency ────────────────────────────────────────────────

    #[test]
    fn concurrent_upserts_of_same_name_keep_one_record() {
        let store = Arc::new(Store::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        let name = if n % 2 == 0 { "Shared" } else { "shared" };
                        let domain = format!("t{t}-{n}.com");
                        store.upsert_follower(follower(name, &domain)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.registry().followers.len(), 1);
        assert_eq!(store.logs().len(), 400);
    }
}
