//! Cached count entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::count::SharePayload;
use crate::error::{Result, ShareCountError};

/// A stored snapshot of counts for one identity.
///
/// Entries are written wholesale on every refresh and never partially
/// merged. `total` is the hook-adjusted aggregate of `payload` at write
/// time, stored redundantly for fast reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Per-service counts as last returned by the counting service.
    pub payload: SharePayload,
    /// When the payload was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Aggregated total across services.
    pub total: i64,
}

impl CacheEntry {
    /// Create an entry fetched now.
    pub fn new(payload: SharePayload, total: i64) -> Self {
        Self {
            payload,
            fetched_at: Utc::now(),
            total,
        }
    }

    /// Age of this entry.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ShareCountError::MalformedPayload {
            message: e.to_string(),
        })
    }

    /// Deserialize from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| ShareCountError::MalformedPayload {
            message: e.to_string(),
        })
    }
}
