//! Service identification and payload field extraction.
//!
//! Replaces string-keyed lookup of count fields with an explicit enum and a
//! fixed mapping onto payload entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::payload::{ServiceCount, SharePayload};

/// A sharing service (or pseudo-service) whose count can be queried.
///
/// `Total` is the hook-adjusted sum across all services; `Unknown` carries
/// any unrecognized name and resolves through the unknown-service hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Service {
    Facebook,
    FacebookLikes,
    FacebookShares,
    FacebookComments,
    Twitter,
    Pinterest,
    LinkedIn,
    GooglePlusOne,
    StumbleUpon,
    Total,
    Unknown(String),
}

impl Service {
    /// The payload key this service reads from, if any.
    ///
    /// The Facebook sub-counts all read the "Facebook" entry; `Total` and
    /// `Unknown` have no single payload field.
    pub fn payload_key(&self) -> Option<&'static str> {
        match self {
            Service::Facebook
            | Service::FacebookLikes
            | Service::FacebookShares
            | Service::FacebookComments => Some("Facebook"),
            Service::Twitter => Some("Twitter"),
            Service::Pinterest => Some("Pinterest"),
            Service::LinkedIn => Some("LinkedIn"),
            Service::GooglePlusOne => Some("GooglePlusOne"),
            Service::StumbleUpon => Some("StumbleUpon"),
            Service::Total | Service::Unknown(_) => None,
        }
    }

    /// Extract this service's count from a payload.
    ///
    /// Returns `None` for missing entries, for `Total`/`Unknown` (which are
    /// resolved by the cache, not by field lookup), and for sub-counts
    /// requested from a service that only reported a plain integer.
    pub fn extract(&self, payload: &SharePayload) -> Option<i64> {
        let value = payload.get(self.payload_key()?)?;

        match (self, value) {
            (Service::FacebookLikes, ServiceCount::Breakdown(b)) => Some(b.like_count),
            (Service::FacebookShares, ServiceCount::Breakdown(b)) => Some(b.share_count),
            (Service::FacebookComments, ServiceCount::Breakdown(b)) => Some(b.comment_count),
            (Service::FacebookLikes, _)
            | (Service::FacebookShares, _)
            | (Service::FacebookComments, _) => None,
            (_, ServiceCount::Count(n)) => Some(*n),
            (_, ServiceCount::Breakdown(b)) => Some(b.total_count),
            (_, ServiceCount::Other(_)) => None,
        }
    }
}

impl FromStr for Service {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Service::Facebook,
            "facebook_likes" => Service::FacebookLikes,
            "facebook_shares" => Service::FacebookShares,
            "facebook_comments" => Service::FacebookComments,
            "twitter" => Service::Twitter,
            "pinterest" => Service::Pinterest,
            "linkedin" => Service::LinkedIn,
            "google" => Service::GooglePlusOne,
            "stumbleupon" => Service::StumbleUpon,
            "total" => Service::Total,
            other => Service::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Facebook => "facebook",
            Service::FacebookLikes => "facebook_likes",
            Service::FacebookShares => "facebook_shares",
            Service::FacebookComments => "facebook_comments",
            Service::Twitter => "twitter",
            Service::Pinterest => "pinterest",
            Service::LinkedIn => "linkedin",
            Service::GooglePlusOne => "google",
            Service::StumbleUpon => "stumbleupon",
            Service::Total => "total",
            Service::Unknown(name) => name,
        };
        f.write_str(name)
    }
}

impl TryFrom<String> for Service {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Service> for String {
    fn from(service: Service) -> Self {
        service.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::payload::Breakdown;

    fn sample_payload() -> SharePayload {
        let mut payload = SharePayload::new();
        payload.insert("Twitter".into(), ServiceCount::Count(250));
        payload.insert(
            "Facebook".into(),
            ServiceCount::Breakdown(Breakdown {
                total_count: 649,
                like_count: 279,
                share_count: 332,
                comment_count: 38,
                extra: Default::default(),
            }),
        );
        payload
    }

    #[test]
    fn parses_reference_names() {
        assert_eq!("facebook".parse::<Service>().unwrap(), Service::Facebook);
        assert_eq!(
            "facebook_likes".parse::<Service>().unwrap(),
            Service::FacebookLikes
        );
        assert_eq!("google".parse::<Service>().unwrap(), Service::GooglePlusOne);
        assert_eq!("total".parse::<Service>().unwrap(), Service::Total);
    }

    #[test]
    fn unrecognized_name_becomes_unknown() {
        assert_eq!(
            "myspace".parse::<Service>().unwrap(),
            Service::Unknown("myspace".into())
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for service in [
            Service::Facebook,
            Service::FacebookComments,
            Service::GooglePlusOne,
            Service::StumbleUpon,
            Service::Total,
        ] {
            let name = service.to_string();
            assert_eq!(name.parse::<Service>().unwrap(), service);
        }
    }

    #[test]
    fn extracts_plain_count() {
        let payload = sample_payload();
        assert_eq!(Service::Twitter.extract(&payload), Some(250));
    }

    #[test]
    fn extracts_breakdown_fields() {
        let payload = sample_payload();
        assert_eq!(Service::Facebook.extract(&payload), Some(649));
        assert_eq!(Service::FacebookLikes.extract(&payload), Some(279));
        assert_eq!(Service::FacebookShares.extract(&payload), Some(332));
        assert_eq!(Service::FacebookComments.extract(&payload), Some(38));
    }

    #[test]
    fn missing_service_extracts_none() {
        let payload = sample_payload();
        assert_eq!(Service::Pinterest.extract(&payload), None);
    }

    #[test]
    fn subcount_of_plain_entry_extracts_none() {
        let mut payload = SharePayload::new();
        payload.insert("Facebook".into(), ServiceCount::Count(10));

        assert_eq!(Service::Facebook.extract(&payload), Some(10));
        assert_eq!(Service::FacebookLikes.extract(&payload), None);
    }

    #[test]
    fn total_and_unknown_have_no_payload_key() {
        let payload = sample_payload();
        assert_eq!(Service::Total.extract(&payload), None);
        assert_eq!(Service::Unknown("x".into()).extract(&payload), None);
    }
}
