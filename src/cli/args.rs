//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::count::Service;
use crate::error::{Result, ShareCountError};
use crate::identity::Identity;

/// Sharecount - social share count retrieval and caching.
#[derive(Debug, Parser)]
#[command(name = "sharecount")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default sharecount.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the count cache
    #[arg(long, global = true, default_value = ".sharecount")]
    pub cache_dir: PathBuf,

    /// SharedCount API key (overrides the config file)
    #[arg(long, global = true, env = "SHARECOUNT_API_KEY")]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch counts for a page or the whole site
    Fetch(FetchArgs),

    /// Show a single service's count
    Single(SingleArgs),

    /// Warm the cache for a batch of URLs
    Prime(PrimeArgs),

    /// List cached entries
    Status(StatusArgs),

    /// Remove all cached entries
    Clear,
}

/// What to count: one page URL or the whole site.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Page URL to count
    #[arg(long, conflicts_with = "site")]
    pub url: Option<String>,

    /// Count the whole site (uses site_url from config)
    #[arg(long)]
    pub site: bool,
}

impl TargetArgs {
    /// Resolve to an identity; exactly one target must be given.
    pub fn identity(&self) -> Result<Identity> {
        match (&self.url, self.site) {
            (Some(url), false) => Ok(Identity::ExternalUrl(url.clone())),
            (None, true) => Ok(Identity::Site),
            _ => Err(ShareCountError::ConfigValidation {
                message: "specify exactly one of --url or --site".to_string(),
            }),
        }
    }
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output the raw payload as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `single` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SingleArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Service to read (facebook, facebook_likes, twitter, ..., total)
    #[arg(long, default_value = "total")]
    pub service: Service,

    /// Significant digits for rounding; 0 disables rounding
    /// (default: significant_digits from config)
    #[arg(long)]
    pub round: Option<u32>,
}

/// Arguments for the `prime` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PrimeArgs {
    /// URLs to warm the cache for
    pub urls: Vec<String>,

    /// File with one URL per line (blank lines and # comments skipped)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Include the site entry
    #[arg(long)]
    pub site: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
