//! Share count payload types.
//!
//! The SharedCount API returns a JSON object mapping service names to
//! counts. Most services report a plain integer; Facebook reports a nested
//! breakdown. Both shapes are preserved so payloads round-trip losslessly
//! through serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShareCountError};

/// Per-service share counts as returned by the counting service.
///
/// Keys are service names as they appear on the wire ("Facebook",
/// "Twitter", "Pinterest", "LinkedIn", "GooglePlusOne", "StumbleUpon").
pub type SharePayload = BTreeMap<String, ServiceCount>;

/// A single service's count value.
///
/// Variants are tried in order during deserialization; anything that is
/// neither a plain integer nor a Facebook-style breakdown is retained
/// verbatim in [`ServiceCount::Other`] and contributes zero to totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceCount {
    /// Plain integer count (Twitter, Pinterest, ...).
    Count(i64),
    /// Structured count with sub-totals (Facebook).
    Breakdown(Breakdown),
    /// Unrecognized value, kept for lossless round-tripping.
    Other(serde_json::Value),
}

/// Facebook-style count decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub total_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub share_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    /// Fields the service reports that we do not interpret
    /// (e.g. Facebook's `click_count`, `commentsbox_count`).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Breakdown {
    /// A breakdown carrying only a total.
    pub fn from_total(total_count: i64) -> Self {
        Self {
            total_count,
            like_count: 0,
            share_count: 0,
            comment_count: 0,
            extra: BTreeMap::new(),
        }
    }
}

/// Parse a raw response body into a payload.
pub fn parse_payload(body: &str) -> Result<SharePayload> {
    serde_json::from_str(body).map_err(|e| ShareCountError::MalformedPayload {
        message: e.to_string(),
    })
}
