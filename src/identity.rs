//! Identities counts are tracked for, and content resolution.
//!
//! An [`Identity`] names the thing being counted: the whole site, an
//! arbitrary external URL, or a content item owned by the host system.
//! Content items resolve to a permalink and publish date through the
//! [`ContentSource`] collaborator; the host implements it against its own
//! content model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Storage key for the whole-site entry.
const SITE_KEY: &str = "share_count:site";

/// Key prefix for external URL entries.
const URL_KEY_PREFIX: &str = "share_count:url:";

/// Key prefix for content item entries.
const ITEM_KEY_PREFIX: &str = "share_count:item:";

/// The subject counts are tracked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// The whole property, counted against the configured site URL.
    Site,
    /// An arbitrary absolute URL not owned by the host system.
    ExternalUrl(String),
    /// A content item, resolved through a [`ContentSource`].
    ContentItem(u64),
}

impl Identity {
    /// Deterministic storage key for this identity.
    ///
    /// External URLs are keyed by a stable hash so arbitrary URLs map to
    /// bounded keys.
    pub fn storage_key(&self) -> String {
        match self {
            Identity::Site => SITE_KEY.to_string(),
            Identity::ExternalUrl(url) => format!("{}{}", URL_KEY_PREFIX, url_hash(url)),
            Identity::ContentItem(id) => format!("{}{}", ITEM_KEY_PREFIX, id),
        }
    }
}

/// Stable 16-character hex digest of a URL.
pub fn url_hash(url: &str) -> String {
    let hash = Sha256::digest(url.as_bytes());
    hex::encode(&hash[..8])
}

/// Resolved metadata for a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMeta {
    /// The item's public permalink.
    pub url: String,
    /// When the item was published.
    pub published_at: DateTime<Utc>,
}

/// Resolves content item ids to their permalink and publish date.
pub trait ContentSource: Send + Sync {
    /// Look up an item, returning `None` for unknown ids.
    fn lookup(&self, id: u64) -> Option<ContentMeta>;
}

/// Fixed in-memory content table.
///
/// Suitable for tests and for embedders whose content set is known up
/// front; real hosts implement [`ContentSource`] against their own store.
#[derive(Debug, Default)]
pub struct StaticContent {
    items: HashMap<u64, ContentMeta>,
}

impl StaticContent {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the table.
    pub fn insert(&mut self, id: u64, url: impl Into<String>, published_at: DateTime<Utc>) {
        self.items.insert(
            id,
            ContentMeta {
                url: url.into(),
                published_at,
            },
        );
    }
}

impl ContentSource for StaticContent {
    fn lookup(&self, id: u64) -> Option<ContentMeta> {
        self.items.get(&id).cloned()
    }
}
