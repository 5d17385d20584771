//! DTOs for the link registry endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use validator::Validate;

use crate::domain::entities::{Link, LinkPage};
use crate::utils::code_generator::SHORT_CODE_REGEX;

/// Request to register a short code.
///
/// An empty `shortCode` is treated as absent, so a form that always sends
/// the field still gets a generated code.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[serde(rename = "longUrl")]
    #[validate(url(message = "Invalid URL format"))]
    pub long_url: String,

    #[serde(rename = "shortCode", default)]
    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(regex(
        path = *SHORT_CODE_REGEX,
        message = "Shortcode must be 6-8 alphanumeric characters"
    ))]
    pub short_code: Option<String>,
}

/// JSON representation of a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub short_code: String,
    pub long_url: String,
    pub short_url: String,
    pub total_clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        let short_url = link.short_url(base_url);
        Self {
            short_code: link.short_code,
            long_url: link.long_url,
            short_url,
            total_clicks: link.total_clicks,
            last_clicked_at: link.last_clicked_at,
            created_at: link.created_at,
        }
    }
}

/// One page of links.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListResponse {
    pub links: Vec<LinkResponse>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl LinkListResponse {
    pub fn from_page(page: LinkPage, base_url: &str) -> Self {
        Self {
            links: page
                .links
                .into_iter()
                .map(|link| LinkResponse::from_link(link, base_url))
                .collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }
    }
}

/// Acknowledgement for a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn deleted() -> Self {
        Self {
            message: "Link deleted successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_empty_short_code_is_absent() {
        let req: CreateLinkRequest =
            serde_json::from_str(r#"{"longUrl": "https://example.com", "shortCode": ""}"#).unwrap();
        assert!(req.short_code.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_missing_short_code() {
        let req: CreateLinkRequest =
            serde_json::from_str(r#"{"longUrl": "https://example.com"}"#).unwrap();
        assert!(req.short_code.is_none());
    }

    #[test]
    fn test_create_request_validation_reports_fields() {
        let req: CreateLinkRequest =
            serde_json::from_str(r#"{"longUrl": "nope", "shortCode": "a-b"}"#).unwrap();
        let err = crate::error::AppError::from(req.validate().unwrap_err());
        let crate::error::AppError::Validation { details, .. } = err else {
            panic!("expected validation error");
        };
        let fields = details["fields"].as_object().unwrap();

        assert!(fields.contains_key("longUrl"));
        assert!(fields.contains_key("shortCode"));
        assert!(!fields.contains_key("long_url"));
    }

    #[test]
    fn test_link_response_derives_short_url() {
        let link = Link::new(
            "abc123".to_string(),
            "https://example.com".to_string(),
            0,
            None,
            Utc::now(),
        );
        let response = LinkResponse::from_link(link, "https://s.test/");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["shortUrl"], "https://s.test/abc123");
        assert_eq!(value["totalClicks"], 0);
        assert!(value["lastClickedAt"].is_null());
    }
}
