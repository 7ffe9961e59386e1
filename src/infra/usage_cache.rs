use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use crate::domain::{SessionSource, UsageSummary};

pub const USAGE_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

struct CacheEntry {
    summary: UsageSummary,
    fetched_at: SystemTime,
}

/// Usage summaries cached per source tag for the lifetime of the process.
///
/// Entries expire after a fixed TTL; an expired or missing entry means the
/// consumer fetches from the store. The current time is passed in by the
/// caller, so expiry is testable without sleeping. Purely an optimization —
/// never a correctness dependency.
pub struct UsageCache {
    ttl: Duration,
    entries: BTreeMap<SessionSource, CacheEntry>,
}

impl UsageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, source: SessionSource, now: SystemTime) -> Option<UsageSummary> {
        let entry = self.entries.get(&source)?;
        let age = now.duration_since(entry.fetched_at).ok()?;
        if age >= self.ttl {
            return None;
        }
        Some(entry.summary)
    }

    /// Last write wins per source key.
    pub fn insert(&mut self, source: SessionSource, summary: UsageSummary, now: SystemTime) {
        self.entries.insert(
            source,
            CacheEntry {
                summary,
                fetched_at: now,
            },
        );
    }

    /// Explicit refresh: forget the entry so the next lookup misses.
    pub fn invalidate(&mut self, source: SessionSource) {
        self.entries.remove(&source);
    }
}

impl Default for UsageCache {
    fn default() -> Self {
        Self::new(USAGE_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TokenUsage;

    fn summary(total: u64) -> UsageSummary {
        UsageSummary {
            today: TokenUsage::default(),
            this_month: TokenUsage::default(),
            total: TokenUsage {
                total_tokens: total,
                ..TokenUsage::default()
            },
        }
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let mut cache = UsageCache::new(Duration::from_secs(600));
        let start = SystemTime::UNIX_EPOCH;
        cache.insert(SessionSource::Claude, summary(100), start);

        let within = start + Duration::from_secs(599);
        assert!(cache.get(SessionSource::Claude, within).is_some());

        let after = start + Duration::from_secs(600);
        assert!(cache.get(SessionSource::Claude, after).is_none());
    }

    #[test]
    fn entries_are_keyed_by_source() {
        let mut cache = UsageCache::new(Duration::from_secs(600));
        let now = SystemTime::UNIX_EPOCH;
        cache.insert(SessionSource::Claude, summary(1), now);
        assert!(cache.get(SessionSource::Codex, now).is_none());

        cache.insert(SessionSource::Claude, summary(2), now);
        let cached = cache.get(SessionSource::Claude, now);
        assert_eq!(cached.map(|usage| usage.total.total_tokens), Some(2));
    }

    #[test]
    fn invalidate_forces_a_miss() {
        let mut cache = UsageCache::new(Duration::from_secs(600));
        let now = SystemTime::UNIX_EPOCH;
        cache.insert(SessionSource::Gemini, summary(1), now);
        cache.invalidate(SessionSource::Gemini);
        assert!(cache.get(SessionSource::Gemini, now).is_none());
    }
}
