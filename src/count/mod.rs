//! Count payloads, aggregation, and display formatting.
//!
//! This module owns the numeric side of the system: the wire payload model
//! ([`payload`]), the service-to-field mapping ([`service`]), total
//! aggregation ([`aggregate`]), and significant-figure abbreviation
//! ([`format`]).

pub mod aggregate;
pub mod format;
pub mod payload;
pub mod service;

pub use aggregate::total_count;
pub use format::round_count;
pub use payload::{parse_payload, Breakdown, ServiceCount, SharePayload};
pub use service::Service;
