//! Sharecount - fetch, cache, and aggregate social share counts.
//!
//! Sharecount retrieves per-service share counts for web pages from the
//! SharedCount API, caches them with an age-aware refresh policy, and
//! exposes them raw or formatted for display.
//!
//! # Modules
//!
//! - [`cache`] - Cache entries, staleness policy, and orchestration
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`count`] - Payload model, aggregation, and display formatting
//! - [`error`] - Error types and result aliases
//! - [`identity`] - Identities counts are tracked for
//! - [`remote`] - SharedCount API client
//! - [`storage`] - Key-value storage collaborators
//!
//! # Example
//!
//! ```
//! use sharecount::count::{round_count, total_count, SharePayload, ServiceCount};
//!
//! let mut payload = SharePayload::new();
//! payload.insert("Twitter".to_string(), ServiceCount::Count(1234));
//!
//! assert_eq!(total_count(&payload), 1234);
//! assert_eq!(round_count(total_count(&payload), 2), "1.2k");
//! ```
//!
//! For the full read-through-cache flow, see the integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod count;
pub mod error;
pub mod identity;
pub mod remote;
pub mod storage;

pub use cache::{ShareCountCache, ShareHooks, StalenessPolicy};
pub use config::ShareConfig;
pub use count::{Service, SharePayload};
pub use error::{Result, ShareCountError};
pub use identity::Identity;
