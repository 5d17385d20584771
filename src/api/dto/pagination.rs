//! Query parameters for the link listing endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use serde_with::{NoneAsEmptyString, serde_as};
use validator::Validate;

use crate::domain::entities::{LinkFilter, LinkQuery, SortField, SortOrder};
use crate::error::AppError;

/// Raw listing parameters from the query string.
///
/// Every parameter is optional and an empty value counts as absent. Values
/// are parsed with their `FromStr` implementations, so an unknown sort field
/// or a malformed number or RFC 3339 timestamp rejects the whole request.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ListLinksParams {
    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(length(max = 200, message = "Search term is too long"))]
    pub search: Option<String>,

    #[serde(rename = "sortBy")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub sort_by: Option<SortField>,

    #[serde(rename = "sortOrder")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub sort_order: Option<SortOrder>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(range(min = 1, message = "Page must be greater than 0"))]
    pub page: Option<u32>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(range(min = 1, max = 1000, message = "Limit must be between 1 and 1000"))]
    pub limit: Option<u32>,

    #[serde(rename = "minClicks")]
    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(range(min = 0, message = "Must not be negative"))]
    pub min_clicks: Option<i64>,

    #[serde(rename = "maxClicks")]
    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(range(min = 0, message = "Must not be negative"))]
    pub max_clicks: Option<i64>,

    #[serde(rename = "hasClicks")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub has_clicks: Option<bool>,

    #[serde(rename = "createdAfter")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub created_after: Option<DateTime<Utc>>,

    #[serde(rename = "createdBefore")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub created_before: Option<DateTime<Utc>>,

    #[serde(rename = "lastClickedAfter")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub last_clicked_after: Option<DateTime<Utc>>,

    #[serde(rename = "lastClickedBefore")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub last_clicked_before: Option<DateTime<Utc>>,
}

impl ListLinksParams {
    /// Validates the parameters and applies defaults.
    ///
    /// # Defaults
    ///
    /// - `sortBy`: `createdAt`, `sortOrder`: `desc`
    /// - `page`: 1, `limit`: 100
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for out-of-range values, or when
    /// `minClicks` exceeds `maxClicks` while `hasClicks` is absent.
    pub fn into_query(self) -> Result<LinkQuery, AppError> {
        self.validate()?;

        if self.has_clicks.is_none()
            && let (Some(min), Some(max)) = (self.min_clicks, self.max_clicks)
            && min > max
        {
            return Err(AppError::bad_request(
                "Validation error",
                json!({ "fields": { "minClicks": ["minClicks must not exceed maxClicks"] } }),
            ));
        }

        let filter = LinkFilter {
            search: self.search,
            min_clicks: self.min_clicks,
            max_clicks: self.max_clicks,
            has_clicks: self.has_clicks,
            created_after: self.created_after,
            created_before: self.created_before,
            last_clicked_after: self.last_clicked_after,
            last_clicked_before: self.last_clicked_before,
        };

        Ok(LinkQuery::new(filter)
            .with_sort(
                self.sort_by.unwrap_or_default(),
                self.sort_order.unwrap_or_default(),
            )
            .with_page(
                self.page.unwrap_or(LinkQuery::DEFAULT_PAGE),
                self.limit.unwrap_or(LinkQuery::DEFAULT_LIMIT),
            ))
    }
}
