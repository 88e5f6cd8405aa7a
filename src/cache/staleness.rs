//! Staleness decision for cached counts.
//!
//! Content refreshes on a decay curve: freshly published content refreshes
//! aggressively, aging content progressively less often, asymptoting to a
//! floor set by the catch-all tier. This bounds API call volume while
//! keeping new content accurate.

use chrono::{DateTime, Duration, Utc};

/// One row of the refresh tier table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTier {
    /// The tier applies to content published after `now - newer_than`.
    /// `None` marks the catch-all tier, which matches everything.
    pub newer_than: Option<Duration>,
    /// How long a cached entry stays fresh within this tier.
    pub interval: Duration,
}

impl RefreshTier {
    /// Tier for content newer than the given age.
    pub fn newer_than(age: Duration, interval: Duration) -> Self {
        Self {
            newer_than: Some(age),
            interval,
        }
    }

    /// Catch-all tier matching content of any age.
    pub fn catch_all(interval: Duration) -> Self {
        Self {
            newer_than: None,
            interval,
        }
    }
}

/// Decides whether cached counts are due for a refresh.
///
/// The tier table is evaluated top to bottom and the first matching tier
/// wins, so tables should be ordered from newest content to oldest.
#[derive(Debug, Clone)]
pub struct StalenessPolicy {
    tiers: Vec<RefreshTier>,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(vec![
            RefreshTier::newer_than(Duration::days(1), Duration::minutes(30)),
            RefreshTier::newer_than(Duration::days(5), Duration::hours(6)),
            RefreshTier::catch_all(Duration::days(2)),
        ])
    }
}

impl StalenessPolicy {
    /// Create a policy with a custom tier table.
    pub fn new(tiers: Vec<RefreshTier>) -> Self {
        Self { tiers }
    }

    /// The tier table, in evaluation order.
    pub fn tiers(&self) -> &[RefreshTier] {
        &self.tiers
    }

    /// Check whether an entry needs refreshing.
    ///
    /// `last_fetched` absent always refreshes. `published_at` absent (the
    /// site, external URLs) only ever matches the catch-all tier. When a
    /// custom table has no matching tier the entry is considered fresh.
    pub fn needs_refresh(
        &self,
        last_fetched: Option<DateTime<Utc>>,
        published_at: Option<DateTime<Utc>>,
    ) -> bool {
        let Some(last_fetched) = last_fetched else {
            return true;
        };

        let now = Utc::now();
        let Some(interval) = self.interval_for(published_at, now) else {
            return false;
        };

        last_fetched < now - interval
    }

    /// Select the refresh interval for content of the given age.
    fn interval_for(
        &self,
        published_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        self.tiers
            .iter()
            .find(|tier| match tier.newer_than {
                Some(age) => published_at.is_some_and(|published| published > now - age),
                None => true,
            })
            .map(|tier| tier.interval)
    }
}
