//! Command implementations.

use std::fs;

use chrono::{DateTime, Utc};
use console::style;
use indicatif::ProgressBar;

use super::args::{Cli, Commands, FetchArgs, PrimeArgs, SingleArgs, StatusArgs};
use crate::cache::{CacheEntry, PrimeSummary, ShareCountCache};
use crate::config::ShareConfig;
use crate::error::Result;
use crate::identity::Identity;
use crate::remote::SharedCountClient;
use crate::storage::{FileStore, Storage};

/// Execute the parsed command line, returning the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    let mut config = ShareConfig::load_or_default(cli.config.as_deref())?;
    if let Some(key) = &cli.api_key {
        config.api_key = key.clone();
    }

    match &cli.command {
        Commands::Fetch(args) => fetch(cli, config, args),
        Commands::Single(args) => single(cli, config, args),
        Commands::Prime(args) => prime(cli, config, args),
        Commands::Status(args) => status(cli, args),
        Commands::Clear => clear(cli),
    }
}

fn build_cache(cli: &Cli, config: ShareConfig) -> ShareCountCache {
    let client =
        SharedCountClient::from_parts(config.api_domain.base_url(), config.api_key.clone());
    ShareCountCache::new(
        config,
        Box::new(FileStore::new(&cli.cache_dir)),
        Box::new(client),
    )
}

fn warn_missing_key(config: &ShareConfig, quiet: bool) {
    if !config.has_api_key() && !quiet {
        eprintln!(
            "{}",
            style("No API key configured; serving cached counts only").yellow()
        );
    }
}

fn fetch(cli: &Cli, config: ShareConfig, args: &FetchArgs) -> Result<i32> {
    let identity = args.target.identity()?;
    warn_missing_key(&config, cli.quiet);

    let services = config.included_services.clone();
    let digits = config.significant_digits;
    let cache = build_cache(cli, config);

    if args.json {
        let payload = cache.counts(&identity);
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(anyhow::Error::from)?
        );
        return Ok(0);
    }

    for service in &services {
        let count = cache.single_count(&identity, service, digits);
        println!("{:<18} {}", service.to_string(), style(count).bold());
    }
    println!(
        "{:<18} {}",
        "total",
        style(cache.total(&identity).to_string()).bold().green()
    );

    Ok(0)
}

fn single(cli: &Cli, config: ShareConfig, args: &SingleArgs) -> Result<i32> {
    let identity = args.target.identity()?;
    warn_missing_key(&config, cli.quiet);

    let round = args.round.unwrap_or(config.significant_digits);
    let cache = build_cache(cli, config);

    println!("{}", cache.single_count(&identity, &args.service, round));
    Ok(0)
}

fn prime(cli: &Cli, config: ShareConfig, args: &PrimeArgs) -> Result<i32> {
    let mut identities = Vec::new();
    if args.site {
        identities.push(Identity::Site);
    }
    for url in &args.urls {
        identities.push(Identity::ExternalUrl(url.clone()));
    }
    if let Some(path) = &args.file {
        for line in fs::read_to_string(path)?.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                identities.push(Identity::ExternalUrl(line.to_string()));
            }
        }
    }

    if identities.is_empty() {
        return Err(crate::error::ShareCountError::ConfigValidation {
            message: "nothing to prime; pass URLs, --file, or --site".to_string(),
        });
    }

    warn_missing_key(&config, cli.quiet);
    let cache = build_cache(cli, config);

    let bar = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(identities.len() as u64)
    };

    let mut summary = PrimeSummary::default();
    for identity in &identities {
        let outcome = cache.prime([identity]);
        summary.refreshed += outcome.refreshed;
        summary.fresh += outcome.fresh;
        summary.failed += outcome.failed;
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "{} refreshed, {} already fresh, {} failed",
        style(summary.refreshed).green(),
        summary.fresh,
        if summary.failed > 0 {
            style(summary.failed).red()
        } else {
            style(summary.failed)
        }
    );

    Ok(if summary.failed > 0 { 1 } else { 0 })
}

fn status(cli: &Cli, args: &StatusArgs) -> Result<i32> {
    let store = FileStore::new(&cli.cache_dir);
    let keys = store.list()?;

    if keys.is_empty() {
        println!("Cache is empty");
        return Ok(0);
    }

    let entries: Vec<_> = keys
        .into_iter()
        .map(|stored| {
            let entry = store
                .get(&stored.key)
                .ok()
                .flatten()
                .and_then(|bytes| CacheEntry::from_bytes(&bytes).ok());
            (stored, entry)
        })
        .collect();

    if args.json {
        let rows: Vec<_> = entries
            .iter()
            .map(|(stored, entry)| {
                serde_json::json!({
                    "key": stored.key,
                    "fetched_at": entry.as_ref().map(|e| e.fetched_at),
                    "total": entry.as_ref().map(|e| e.total),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).map_err(anyhow::Error::from)?
        );
        return Ok(0);
    }

    println!("{} cached entries:\n", entries.len());
    for (stored, entry) in &entries {
        match entry {
            Some(entry) => println!(
                "  {:<40} total {:<8} fetched {}",
                stored.key,
                entry.total,
                relative_age(entry.fetched_at)
            ),
            None => println!("  {:<40} {}", stored.key, style("unreadable").red()),
        }
    }

    Ok(0)
}

fn clear(cli: &Cli) -> Result<i32> {
    let store = FileStore::new(&cli.cache_dir);
    let removed = store.clear()?;
    println!("Cleared {} entries", removed);
    Ok(0)
}

/// Compact relative age for status listings.
fn relative_age(fetched_at: DateTime<Utc>) -> String {
    let minutes = Utc::now().signed_duration_since(fetched_at).num_minutes();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (24 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn relative_age_buckets() {
        let now = Utc::now();
        assert_eq!(relative_age(now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(5)), "5m ago");
        assert_eq!(relative_age(now - Duration::hours(3)), "3h ago");
        assert_eq!(relative_age(now - Duration::days(4)), "4d ago");
    }
}
