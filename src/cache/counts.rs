//! Share count cache orchestration.
//!
//! [`ShareCountCache`] ties the collaborators together: it resolves an
//! identity to a storage key and target URL, consults the staleness policy,
//! refreshes from the counting service when due, aggregates, persists, and
//! returns counts. Failures never escape this boundary; they degrade to the
//! previous payload or to empty counts so callers always have something to
//! render.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::ShareConfig;
use crate::count::{round_count, total_count, Service, SharePayload};
use crate::error::{Result, ShareCountError};
use crate::identity::{ContentSource, Identity, StaticContent};
use crate::remote::CountFetcher;
use crate::storage::Storage;

use super::entry::CacheEntry;
use super::staleness::StalenessPolicy;

/// Override hook for the aggregated total.
pub type TotalOverride = Box<dyn Fn(i64, &SharePayload) -> i64 + Send + Sync>;

/// Resolver hook for services this crate does not know.
pub type UnknownServiceResolver = Box<dyn Fn(&str, &SharePayload) -> i64 + Send + Sync>;

/// Extension points applied at fixed spots in the count pipeline.
#[derive(Default)]
pub struct ShareHooks {
    total: Option<TotalOverride>,
    unknown_service: Option<UnknownServiceResolver>,
}

impl ShareHooks {
    /// Hooks with default behavior (identity total, unknown services are 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the aggregated total after summation.
    pub fn with_total(
        mut self,
        hook: impl Fn(i64, &SharePayload) -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.total = Some(Box::new(hook));
        self
    }

    /// Resolve counts for unrecognized service names.
    pub fn with_unknown_service(
        mut self,
        hook: impl Fn(&str, &SharePayload) -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.unknown_service = Some(Box::new(hook));
        self
    }

    fn adjusted_total(&self, total: i64, payload: &SharePayload) -> i64 {
        match &self.total {
            Some(hook) => hook(total, payload),
            None => total,
        }
    }

    fn unknown(&self, name: &str, payload: &SharePayload) -> i64 {
        match &self.unknown_service {
            Some(hook) => hook(name, payload),
            None => 0,
        }
    }
}

/// Outcome of a batch priming run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimeSummary {
    /// Entries refreshed from the counting service.
    pub refreshed: usize,
    /// Entries that were still fresh and left alone.
    pub fresh: usize,
    /// Entries whose refresh failed.
    pub failed: usize,
}

/// Cached, staleness-aware access to share counts.
pub struct ShareCountCache {
    config: ShareConfig,
    storage: Box<dyn Storage>,
    fetcher: Box<dyn CountFetcher>,
    content: Box<dyn ContentSource>,
    policy: StalenessPolicy,
    hooks: ShareHooks,
}

impl ShareCountCache {
    /// Create a cache over the given storage and fetcher.
    ///
    /// The staleness policy comes from the config's tier table; content
    /// item resolution defaults to an empty table until
    /// [`with_content`](Self::with_content) supplies one.
    pub fn new(
        config: ShareConfig,
        storage: Box<dyn Storage>,
        fetcher: Box<dyn CountFetcher>,
    ) -> Self {
        let policy = config.policy();
        Self {
            config,
            storage,
            fetcher,
            content: Box::new(StaticContent::new()),
            policy,
            hooks: ShareHooks::new(),
        }
    }

    /// Use a content source for resolving content item identities.
    pub fn with_content(mut self, content: Box<dyn ContentSource>) -> Self {
        self.content = content;
        self
    }

    /// Replace the staleness policy.
    pub fn with_policy(mut self, policy: StalenessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Install extension hooks.
    pub fn with_hooks(mut self, hooks: ShareHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// The resolved configuration this cache runs with.
    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// Counts for an identity, refreshed from the counting service if the
    /// cached entry is missing or stale.
    ///
    /// Never fails: on fetch or storage problems the previous payload is
    /// served (possibly stale), or an empty payload if none exists.
    pub fn counts(&self, identity: &Identity) -> SharePayload {
        let key = identity.storage_key();
        let (url, published_at) = self.resolve(identity);
        let cached = self.load_entry(&key);
        let last_fetched = cached.as_ref().map(|entry| entry.fetched_at);

        if !self.policy.needs_refresh(last_fetched, published_at) {
            return cached.map(|entry| entry.payload).unwrap_or_default();
        }

        match self.refresh(&key, url.as_deref()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Keeping previous counts for {}: {}", key, e);
                cached.map(|entry| entry.payload).unwrap_or_default()
            }
        }
    }

    /// Hook-adjusted total across all services for an identity.
    pub fn total(&self, identity: &Identity) -> i64 {
        let payload = self.counts(identity);
        self.hooks.adjusted_total(total_count(&payload), &payload)
    }

    /// A single service's count for an identity, as a display string.
    ///
    /// Missing services yield `"0"`. With `round_to > 0` the count is
    /// rounded to that many significant digits and abbreviated; with 0 the
    /// raw integer is returned.
    pub fn single_count(&self, identity: &Identity, service: &Service, round_to: u32) -> String {
        let payload = self.counts(identity);

        let count = match service {
            Service::Total => self.hooks.adjusted_total(total_count(&payload), &payload),
            Service::Unknown(name) => self.hooks.unknown(name, &payload),
            known => known.extract(&payload).unwrap_or(0),
        };

        if round_to > 0 {
            round_count(count, round_to)
        } else {
            count.to_string()
        }
    }

    /// Warm the cache for a batch of identities.
    ///
    /// Each identity is refreshed only if its entry is missing or stale;
    /// failures are counted, not propagated.
    pub fn prime<'a, I>(&self, identities: I) -> PrimeSummary
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let mut summary = PrimeSummary::default();

        for identity in identities {
            let key = identity.storage_key();
            let (url, published_at) = self.resolve(identity);
            let last_fetched = self.load_entry(&key).map(|entry| entry.fetched_at);

            if !self.policy.needs_refresh(last_fetched, published_at) {
                summary.fresh += 1;
                continue;
            }

            match self.refresh(&key, url.as_deref()) {
                Ok(_) => summary.refreshed += 1,
                Err(e) => {
                    warn!("Priming {} failed: {}", key, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Peek at the stored entry for an identity without refreshing.
    pub fn cached(&self, identity: &Identity) -> Option<CacheEntry> {
        self.load_entry(&identity.storage_key())
    }

    /// Target URL and publish date for an identity.
    fn resolve(&self, identity: &Identity) -> (Option<String>, Option<DateTime<Utc>>) {
        match identity {
            Identity::Site => (self.config.site_url.clone(), None),
            Identity::ExternalUrl(url) => (Some(url.clone()), None),
            Identity::ContentItem(id) => match self.content.lookup(*id) {
                Some(meta) => (Some(meta.url), Some(meta.published_at)),
                None => (None, None),
            },
        }
    }

    fn load_entry(&self, key: &str) -> Option<CacheEntry> {
        match self.storage.get(key) {
            Ok(Some(bytes)) => match CacheEntry::from_bytes(&bytes) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Discarding unreadable cache entry for {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Storage read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Fetch, aggregate, and persist a fresh entry.
    fn refresh(&self, key: &str, url: Option<&str>) -> Result<SharePayload> {
        let url = url.ok_or_else(|| anyhow!("no target URL for {}", key))?;
        if !self.config.has_api_key() {
            return Err(ShareCountError::MissingApiKey);
        }

        let payload = self.fetcher.fetch(url)?;
        let total = self.hooks.adjusted_total(total_count(&payload), &payload);
        let entry = CacheEntry::new(payload, total);
        self.storage.set(key, &entry.to_bytes()?)?;

        debug!("Refreshed counts for {} (total {})", key, entry.total);
        Ok(entry.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::{Breakdown, ServiceCount};
    use crate::identity::StaticContent;
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fetcher stub returning a fixed payload or failure, counting calls.
    struct StubFetcher {
        payload: Option<SharePayload>,
        calls: Arc<AtomicUsize>,
    }

    impl StubFetcher {
        fn returning(payload: SharePayload) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    payload: Some(payload),
                    calls: calls.clone(),
                },
                calls,
            )
        }

        fn failing() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    payload: None,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl CountFetcher for StubFetcher {
        fn fetch(&self, url: &str) -> Result<SharePayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.payload {
                Some(payload) => Ok(payload.clone()),
                None => Err(ShareCountError::Http {
                    status: 500,
                    url: url.to_string(),
                }),
            }
        }
    }

    fn sample_payload() -> SharePayload {
        let mut payload = SharePayload::new();
        payload.insert("Twitter".into(), ServiceCount::Count(5));
        payload.insert(
            "Facebook".into(),
            ServiceCount::Breakdown(Breakdown::from_total(10)),
        );
        payload
    }

    fn test_config() -> ShareConfig {
        ShareConfig {
            api_key: "test-key".into(),
            site_url: Some("https://example.com".into()),
            ..ShareConfig::default()
        }
    }

    fn cache_with(
        config: ShareConfig,
        fetcher: StubFetcher,
    ) -> ShareCountCache {
        ShareCountCache::new(config, Box::new(MemoryStore::new()), Box::new(fetcher))
    }

    /// Write an entry with a back-dated fetch time straight into storage.
    fn seed_stale_entry(
        storage: &dyn Storage,
        identity: &Identity,
        payload: SharePayload,
        age: Duration,
    ) {
        let entry = CacheEntry {
            total: total_count(&payload),
            payload,
            fetched_at: Utc::now() - age,
        };
        storage
            .set(&identity.storage_key(), &entry.to_bytes().unwrap())
            .unwrap();
    }

    #[test]
    fn first_read_fetches_and_persists() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let payload = cache.counts(&identity);

        assert_eq!(payload, sample_payload());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let entry = cache.cached(&identity).unwrap();
        assert_eq!(entry.total, 15);
    }

    #[test]
    fn fresh_entry_is_served_without_refetching() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        cache.counts(&identity);
        cache.counts(&identity);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_entry_triggers_refetch() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        // Older than the catch-all two-day interval.
        seed_stale_entry(
            cache.storage.as_ref(),
            &identity,
            SharePayload::new(),
            Duration::days(3),
        );

        let payload = cache.counts(&identity);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(payload, sample_payload());
    }

    #[test]
    fn fetch_failure_with_no_history_yields_empty_payload() {
        let (fetcher, calls) = StubFetcher::failing();
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let payload = cache.counts(&identity);

        assert!(payload.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fetch_failure_serves_stale_payload() {
        let (fetcher, _) = StubFetcher::failing();
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let mut old_payload = SharePayload::new();
        old_payload.insert("Twitter".into(), ServiceCount::Count(42));
        seed_stale_entry(
            cache.storage.as_ref(),
            &identity,
            old_payload.clone(),
            Duration::days(3),
        );

        let payload = cache.counts(&identity);

        assert_eq!(payload, old_payload);
    }

    #[test]
    fn failed_refresh_does_not_clobber_stored_entry() {
        let (fetcher, _) = StubFetcher::failing();
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let mut old_payload = SharePayload::new();
        old_payload.insert("Twitter".into(), ServiceCount::Count(42));
        seed_stale_entry(
            cache.storage.as_ref(),
            &identity,
            old_payload,
            Duration::days(3),
        );

        cache.counts(&identity);

        assert_eq!(cache.cached(&identity).unwrap().total, 42);
    }

    #[test]
    fn missing_api_key_skips_fetch_and_serves_cache() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let config = ShareConfig {
            api_key: String::new(),
            ..test_config()
        };
        let cache = cache_with(config, fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let payload = cache.counts(&identity);

        assert!(payload.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn site_without_configured_url_never_fetches() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let config = ShareConfig {
            site_url: None,
            ..test_config()
        };
        let cache = cache_with(config, fetcher);

        let payload = cache.counts(&Identity::Site);

        assert!(payload.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_content_item_never_fetches() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);

        let payload = cache.counts(&Identity::ContentItem(99));

        assert!(payload.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn content_item_resolves_through_content_source() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let mut content = StaticContent::new();
        content.insert(
            7,
            "https://example.com/post-7",
            Utc::now() - Duration::days(2),
        );
        let cache = cache_with(test_config(), fetcher).with_content(Box::new(content));

        let payload = cache.counts(&Identity::ContentItem(7));

        assert_eq!(payload, sample_payload());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn total_hook_overrides_persisted_total() {
        let (fetcher, _) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher)
            .with_hooks(ShareHooks::new().with_total(|total, _| total + 100));
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        assert_eq!(cache.total(&identity), 115);
        assert_eq!(cache.cached(&identity).unwrap().total, 115);
    }

    #[test]
    fn single_count_extracts_and_formats() {
        let (fetcher, _) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        assert_eq!(cache.single_count(&identity, &Service::Twitter, 0), "5");
        assert_eq!(cache.single_count(&identity, &Service::Facebook, 0), "10");
        assert_eq!(cache.single_count(&identity, &Service::Total, 0), "15");
        assert_eq!(cache.single_count(&identity, &Service::Pinterest, 0), "0");
        assert_eq!(cache.single_count(&identity, &Service::Twitter, 2), "5");
    }

    #[test]
    fn single_count_rounds_large_values() {
        let mut payload = SharePayload::new();
        payload.insert("Twitter".into(), ServiceCount::Count(1234));
        let (fetcher, _) = StubFetcher::returning(payload);
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        assert_eq!(cache.single_count(&identity, &Service::Twitter, 2), "1.2k");
        assert_eq!(cache.single_count(&identity, &Service::Twitter, 0), "1234");
    }

    #[test]
    fn unknown_service_defaults_to_zero() {
        let (fetcher, _) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let service = Service::Unknown("myspace".into());
        assert_eq!(cache.single_count(&identity, &service, 2), "0");
    }

    #[test]
    fn unknown_service_hook_is_consulted() {
        let (fetcher, _) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher).with_hooks(
            ShareHooks::new().with_unknown_service(|name, _| if name == "myspace" { 3 } else { 0 }),
        );
        let identity = Identity::ExternalUrl("https://example.com/a".into());

        let service = Service::Unknown("myspace".into());
        assert_eq!(cache.single_count(&identity, &service, 0), "3");
    }

    #[test]
    fn prime_refreshes_only_stale_identities() {
        let (fetcher, calls) = StubFetcher::returning(sample_payload());
        let cache = cache_with(test_config(), fetcher);

        let fresh = Identity::ExternalUrl("https://example.com/fresh".into());
        let stale = Identity::ExternalUrl("https://example.com/stale".into());
        let unresolvable = Identity::ContentItem(99);

        cache.counts(&fresh);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        seed_stale_entry(
            cache.storage.as_ref(),
            &stale,
            SharePayload::new(),
            Duration::days(3),
        );

        let summary = cache.prime([&fresh, &stale, &unresolvable]);

        assert_eq!(
            summary,
            PrimeSummary {
                refreshed: 1,
                fresh: 1,
                failed: 1,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
