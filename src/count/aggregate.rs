//! Count aggregation across services.

use super::payload::{ServiceCount, SharePayload};

/// Sum share counts across all services in a payload.
///
/// Plain counts add their value, breakdowns add their `total_count`, and
/// anything else contributes zero. An empty payload sums to zero. The sum
/// is order-independent; native `i64` range is assumed.
pub fn total_count(payload: &SharePayload) -> i64 {
    payload
        .values()
        .map(|count| match count {
            ServiceCount::Count(n) => *n,
            ServiceCount::Breakdown(b) => b.total_count,
            ServiceCount::Other(_) => 0,
        })
        .sum()
}
