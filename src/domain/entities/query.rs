//! Filter, sort and pagination model for link listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Link;

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    ShortCode,
    LongUrl,
    TotalClicks,
    LastClickedAt,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Column name in the `links` table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::ShortCode => "short_code",
            SortField::LongUrl => "long_url",
            SortField::TotalClicks => "total_clicks",
            SortField::LastClickedAt => "last_clicked_at",
            SortField::CreatedAt => "created_at",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortField::ShortCode => "shortCode",
            SortField::LongUrl => "longUrl",
            SortField::TotalClicks => "totalClicks",
            SortField::LastClickedAt => "lastClickedAt",
            SortField::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortCode" => Ok(SortField::ShortCode),
            "longUrl" => Ok(SortField::LongUrl),
            "totalClicks" => Ok(SortField::TotalClicks),
            "lastClickedAt" => Ok(SortField::LastClickedAt),
            "createdAt" => Ok(SortField::CreatedAt),
            other => Err(format!(
                "unknown sort field '{other}', expected one of: shortCode, longUrl, totalClicks, lastClickedAt, createdAt"
            )),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction.
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}', expected asc or desc")),
        }
    }
}

/// Predicates applied to a listing. All present predicates are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFilter {
    /// Case-insensitive substring of either the short code or the long URL.
    pub search: Option<String>,
    pub min_clicks: Option<i64>,
    pub max_clicks: Option<i64>,
    /// When present, replaces `min_clicks`/`max_clicks` entirely.
    pub has_clicks: Option<bool>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub last_clicked_after: Option<DateTime<Utc>>,
    pub last_clicked_before: Option<DateTime<Utc>>,
}

/// Effective constraint on `total_clicks` after applying `has_clicks` precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClicksBound {
    Any,
    /// `total_clicks > 0`
    Some,
    /// `total_clicks = 0`
    None,
    Range { min: Option<i64>, max: Option<i64> },
}

impl LinkFilter {
    /// Resolves the clicks predicate. `has_clicks` wins over the numeric bounds.
    pub fn clicks_bound(&self) -> ClicksBound {
        match self.has_clicks {
            Some(true) => ClicksBound::Some,
            Some(false) => ClicksBound::None,
            None if self.min_clicks.is_none() && self.max_clicks.is_none() => ClicksBound::Any,
            None => ClicksBound::Range {
                min: self.min_clicks,
                max: self.max_clicks,
            },
        }
    }

    /// Non-empty, trimmed search term.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns true if `link` satisfies every predicate of this filter.
    ///
    /// Evaluates the same predicates as the SQL `WHERE` clause built by
    /// [`crate::infrastructure::persistence::PgLinkRepository`].
    pub fn matches(&self, link: &Link) -> bool {
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            if !link.short_code.to_lowercase().contains(&term)
                && !link.long_url.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        let clicks_ok = match self.clicks_bound() {
            ClicksBound::Any => true,
            ClicksBound::Some => link.total_clicks > 0,
            ClicksBound::None => link.total_clicks == 0,
            ClicksBound::Range { min, max } => {
                min.is_none_or(|m| link.total_clicks >= m)
                    && max.is_none_or(|m| link.total_clicks <= m)
            }
        };
        if !clicks_ok {
            return false;
        }

        if self.created_after.is_some_and(|t| link.created_at < t)
            || self.created_before.is_some_and(|t| link.created_at > t)
        {
            return false;
        }

        if let Some(after) = self.last_clicked_after
            && link.last_clicked_at.is_none_or(|t| t < after)
        {
            return false;
        }
        if let Some(before) = self.last_clicked_before
            && link.last_clicked_at.is_none_or(|t| t > before)
        {
            return false;
        }

        true
    }
}

/// A fully validated listing request.
///
/// Its JSON form is part of the list-cache key, so every parameter that
/// influences the result must live here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkQuery {
    pub filter: LinkFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 1-indexed page number.
    pub page: u32,
    pub limit: u32,
}

impl LinkQuery {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 1000;

    /// Creates a query with default sort (`createdAt` descending) and pagination.
    pub fn new(filter: LinkFilter) -> Self {
        Self {
            filter,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Sets the sort column and direction.
    pub fn with_sort(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Sets the page and page size.
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

impl Default for LinkQuery {
    fn default() -> Self {
        Self::new(LinkFilter::default())
    }
}

/// One page of a listing plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl LinkPage {
    /// Assembles a page, computing `total_pages = ceil(total / limit)`.
    pub fn new(links: Vec<Link>, total: i64, query: &LinkQuery) -> Self {
        let limit = i64::from(query.limit.max(1));
        let total_pages = (total + limit - 1) / limit;

        Self {
            links,
            total,
            page: query.page,
            limit: query.limit,
            total_pages,
        }
    }
}
