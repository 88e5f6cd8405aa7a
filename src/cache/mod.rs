//! Count caching: entries, staleness decisions, and orchestration.
//!
//! Cached counts are refreshed on a decay curve driven by content age; see
//! [`staleness`] for the tier table and [`counts`] for the read/refresh
//! pipeline.

pub mod counts;
pub mod entry;
pub mod staleness;

pub use counts::{PrimeSummary, ShareCountCache, ShareHooks, TotalOverride, UnknownServiceResolver};
pub use entry::CacheEntry;
pub use staleness::{RefreshTier, StalenessPolicy};
