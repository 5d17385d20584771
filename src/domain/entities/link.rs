//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL with its visit counters.
///
/// The record is also the value stored in the cache under `link:{code}`,
/// hence the camelCase serde representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub short_code: String,
    pub long_url: String,
    pub total_clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        short_code: String,
        long_url: String,
        total_clicks: i64,
        last_clicked_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            short_code,
            long_url,
            total_clicks,
            last_clicked_at,
            created_at,
        }
    }

    /// Returns true once the link has been visited at least once.
    pub fn has_clicks(&self) -> bool {
        self.total_clicks > 0
    }

    /// Builds the public short URL for this link under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.short_code)
    }
}

/// Input data for creating a new link.
///
/// Counters are not part of the input: a new link always starts with
/// zero clicks and no last-click timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub short_code: String,
    pub long_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total_clicks: i64) -> Link {
        Link::new(
            "abc123".to_string(),
            "https://example.com".to_string(),
            total_clicks,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_link_creation() {
        let link = sample(0);

        assert_eq!(link.short_code, "abc123");
        assert_eq!(link.long_url, "https://example.com");
        assert_eq!(link.total_clicks, 0);
        assert!(link.last_clicked_at.is_none());
        assert!(!link.has_clicks());
    }

    #[test]
    fn test_has_clicks() {
        assert!(sample(3).has_clicks());
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let link = sample(0);
        assert_eq!(link.short_url("https://s.test/"), "https://s.test/abc123");
        assert_eq!(link.short_url("http://localhost:3000"), "http://localhost:3000/abc123");
    }

    #[test]
    fn test_serializes_as_camel_case() {
        let link = sample(2);
        let value = serde_json::to_value(&link).unwrap();

        assert_eq!(value["shortCode"], "abc123");
        assert_eq!(value["longUrl"], "https://example.com");
        assert_eq!(value["totalClicks"], 2);
        assert!(value["lastClickedAt"].is_null());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_cached_json_parses_back() {
        let link = sample(5);
        let json = serde_json::to_string(&link).unwrap();
        let parsed: Link = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, link);
    }
}
