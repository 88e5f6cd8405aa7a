//! Error types for share count operations.
//!
//! This module defines [`ShareCountError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ShareCountError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `ShareCountError::Other`) for unexpected errors
//! - Errors never cross the [`ShareCountCache`](crate::cache::ShareCountCache)
//!   read boundary: fetch and storage failures are logged and degrade to
//!   stale or empty counts

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for share count operations.
#[derive(Debug, Error)]
pub enum ShareCountError {
    /// No API key configured; remote fetches cannot be performed.
    #[error("No SharedCount API key configured")]
    MissingApiKey,

    /// The counting service answered with a non-success status.
    #[error("HTTP {status} fetching counts for {url}")]
    Http { status: u16, url: String },

    /// Network-level failure talking to the counting service.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The counting service returned a body that is not a valid payload.
    #[error("Malformed count payload: {message}")]
    MalformedPayload { message: String },

    /// The storage collaborator failed to read or write an entry.
    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for share count operations.
pub type Result<T> = std::result::Result<T, ShareCountError>;
