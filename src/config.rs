//! Configuration loading and validation.
//!
//! Configuration comes from a YAML file (`sharecount.yml` by default) plus
//! CLI/env overrides for the API key. All options have defaults; a missing
//! config file simply yields [`ShareConfig::default`].
//!
//! ```yaml
//! api_key: "abc123"
//! api_domain: free
//! significant_digits: 2
//! site_url: https://example.com
//! included_services: [facebook, twitter, pinterest, google]
//! refresh_tiers:
//!   - newer_than: 1d
//!     every: 30m
//!   - newer_than: 5d
//!     every: 6h
//!   - every: 2d
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::cache::{RefreshTier, StalenessPolicy};
use crate::count::Service;
use crate::error::{Result, ShareCountError};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sharecount.yml";

/// SharedCount API endpoint tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiDomain {
    Free,
    Plus,
    Business,
}

impl ApiDomain {
    /// Base URL for this endpoint tier.
    pub fn base_url(&self) -> &'static str {
        match self {
            ApiDomain::Free => "https://free.sharedcount.com",
            ApiDomain::Plus => "https://plus.sharedcount.com",
            ApiDomain::Business => "https://business.sharedcount.com",
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// SharedCount API key; empty means fetches are skipped.
    pub api_key: String,
    /// Which SharedCount endpoint to query.
    pub api_domain: ApiDomain,
    /// Significant digits for formatted counts.
    pub significant_digits: u32,
    /// URL counted for [`Identity::Site`](crate::identity::Identity::Site).
    pub site_url: Option<String>,
    /// Services shown by the CLI fetch command.
    pub included_services: Vec<Service>,
    /// Refresh tier table, newest content first.
    pub tiers: Vec<RefreshTier>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_domain: ApiDomain::Free,
            significant_digits: 2,
            site_url: None,
            included_services: vec![
                Service::Facebook,
                Service::Twitter,
                Service::Pinterest,
                Service::GooglePlusOne,
            ],
            tiers: StalenessPolicy::default().tiers().to_vec(),
        }
    }
}

impl ShareConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ShareCountError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let file: ConfigFile =
            serde_yaml::from_str(&content).map_err(|e| ShareCountError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        file.resolve()
    }

    /// Load from an explicit path, the default file, or fall back to defaults.
    ///
    /// An explicitly named file must exist; the default `sharecount.yml` is
    /// optional.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Build the staleness policy from the configured tier table.
    pub fn policy(&self) -> StalenessPolicy {
        StalenessPolicy::new(self.tiers.clone())
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Raw config file schema; every field optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_key: Option<String>,
    api_domain: Option<ApiDomain>,
    significant_digits: Option<u32>,
    site_url: Option<String>,
    included_services: Option<Vec<Service>>,
    refresh_tiers: Option<Vec<TierSpec>>,
}

/// One refresh tier as written in the config file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TierSpec {
    /// Content age bound, e.g. "1d". Omitted marks the catch-all tier.
    newer_than: Option<String>,
    /// Refresh interval, e.g. "30m".
    every: String,
}

impl ConfigFile {
    fn resolve(self) -> Result<ShareConfig> {
        let defaults = ShareConfig::default();

        let significant_digits = self.significant_digits.unwrap_or(defaults.significant_digits);
        if significant_digits > 15 {
            return Err(ShareCountError::ConfigValidation {
                message: format!("significant_digits {} is out of range (max 15)", significant_digits),
            });
        }

        let tiers = match self.refresh_tiers {
            None => defaults.tiers,
            Some(specs) => {
                if specs.is_empty() {
                    return Err(ShareCountError::ConfigValidation {
                        message: "refresh_tiers must not be empty".to_string(),
                    });
                }
                specs
                    .into_iter()
                    .map(TierSpec::resolve)
                    .collect::<Result<Vec<_>>>()?
            }
        };

        Ok(ShareConfig {
            api_key: self.api_key.unwrap_or_default(),
            api_domain: self.api_domain.unwrap_or(defaults.api_domain),
            significant_digits,
            site_url: self.site_url,
            included_services: self
                .included_services
                .unwrap_or(defaults.included_services),
            tiers,
        })
    }
}

impl TierSpec {
    fn resolve(self) -> Result<RefreshTier> {
        Ok(RefreshTier {
            newer_than: self.newer_than.as_deref().map(parse_interval).transpose()?,
            interval: parse_interval(&self.every)?,
        })
    }
}

/// Parse an interval string like "2d", "6h", "30m", "45s".
///
/// A bare number is taken as seconds.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim().to_lowercase();

    let parse = |digits: &str| -> Result<i64> {
        digits
            .parse()
            .map_err(|_| ShareCountError::ConfigValidation {
                message: format!("invalid interval '{}'", value),
            })
    };

    if let Some(days) = value.strip_suffix('d') {
        Ok(Duration::days(parse(days)?))
    } else if let Some(hours) = value.strip_suffix('h') {
        Ok(Duration::hours(parse(hours)?))
    } else if let Some(mins) = value.strip_suffix('m') {
        Ok(Duration::minutes(parse(mins)?))
    } else if let Some(secs) = value.strip_suffix('s') {
        Ok(Duration::seconds(parse(secs)?))
    } else {
        Ok(Duration::seconds(parse(&value)?))
    }
}

/// Format an interval for display ("2d", "6h", "30m", "45s").
pub fn format_interval(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
