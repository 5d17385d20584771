//! Link registry service: create, fetch, list and delete.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::link_cache::LinkCache;
use crate::domain::entities::{Link, LinkFilter, LinkPage, LinkQuery, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::timeout::with_timeout;
use crate::utils::url_validator::validate_long_url;

/// Attempts at finding a free generated code before giving up.
const MAX_GENERATE_ATTEMPTS: usize = 10;

/// Totals across the whole registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub total_links: i64,
    pub total_clicks: i64,
}

/// Service for managing link records.
///
/// Every write keeps the cache coherent with the store: creates prime the
/// record entry, deletes evict it, and both advance the listing namespace.
pub struct LinkService<L: LinkRepository> {
    repository: Arc<L>,
    cache: Arc<LinkCache>,
    store_timeout: Duration,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    pub fn new(repository: Arc<L>, cache: Arc<LinkCache>, store_timeout: Duration) -> Self {
        Self {
            repository,
            cache,
            store_timeout,
        }
    }

    /// Registers a short code for `long_url`.
    ///
    /// # Code Generation
    ///
    /// - If `custom_code` is provided, validates and uses it. An existing code
    ///   is reported as a conflict, never overwritten.
    /// - Otherwise, generates a random 6-character code and retries up to 10
    ///   times on collision.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL or custom code.
    /// Returns [`AppError::Conflict`] if the custom code is taken.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached in time.
    pub async fn create_link(
        &self,
        long_url: &str,
        custom_code: Option<String>,
    ) -> Result<Link, AppError> {
        let long_url = validate_long_url(long_url).map_err(|e| {
            AppError::bad_request(
                "Invalid URL format",
                json!({ "fields": { "longUrl": [e.to_string()] } }),
            )
        })?;

        let link = match custom_code {
            Some(code) => {
                validate_custom_code(&code)?;
                self.insert(NewLink {
                    short_code: code,
                    long_url,
                })
                .await?
            }
            None => self.insert_generated(long_url).await?,
        };

        self.cache.put_link(&link).await;
        self.cache.invalidate_lists().await;

        metrics::counter!("links_created_total").increment(1);
        info!(code = %link.short_code, "Link created");

        Ok(link)
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        with_timeout(
            self.store_timeout,
            "create",
            self.repository.create(new_link),
        )
        .await
    }

    async fn insert_generated(&self, long_url: String) -> Result<Link, AppError> {
        for attempt in 1..=MAX_GENERATE_ATTEMPTS {
            let new_link = NewLink {
                short_code: generate_code(),
                long_url: long_url.clone(),
            };

            match self.insert(new_link).await {
                Err(AppError::Conflict { details, .. }) => {
                    debug!(attempt, %details, "Generated code collided, retrying");
                }
                other => return other,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": MAX_GENERATE_ATTEMPTS }),
        ))
    }

    /// Retrieves a link by its short code without counting a visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        if let Some(link) = self.cache.get_link(code).await {
            return Ok(link);
        }

        let link = with_timeout(
            self.store_timeout,
            "find_by_code",
            self.repository.find_by_code(code),
        )
        .await?
        .ok_or_else(|| not_found(code))?;

        self.cache.put_link(&link).await;
        Ok(link)
    }

    /// Returns one page of links matching `query`, together with the total
    /// number of matches.
    ///
    /// Pages are cached per query for the listing TTL.
    pub async fn list_links(&self, query: &LinkQuery) -> Result<LinkPage, AppError> {
        let slot = self.cache.list_slot(query).await;
        if let Some(slot) = &slot
            && let Some(page) = self.cache.get_list(slot).await
        {
            return Ok(page);
        }

        let (links, total) = tokio::try_join!(
            with_timeout(self.store_timeout, "list", self.repository.list(query)),
            with_timeout(
                self.store_timeout,
                "count",
                self.repository.count(&query.filter)
            ),
        )?;

        let page = LinkPage::new(links, total, query);

        if let Some(slot) = &slot {
            self.cache.put_list(slot, &page).await;
        }

        Ok(page)
    }

    /// Deletes a link and purges every cache entry that may reference it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        let deleted = with_timeout(self.store_timeout, "delete", self.repository.delete(code)).await?;

        // Evict even on a miss: the entry may outlive a delete made elsewhere.
        self.cache.evict_link(code).await;

        if !deleted {
            return Err(not_found(code));
        }

        self.cache.invalidate_lists().await;

        metrics::counter!("links_deleted_total").increment(1);
        info!(code, "Link deleted");

        Ok(())
    }

    /// Counts links and clicks across the registry. Always read from the store.
    pub async fn summary(&self) -> Result<LinkSummary, AppError> {
        let everything = LinkFilter::default();
        let (total_links, total_clicks) = tokio::try_join!(
            with_timeout(
                self.store_timeout,
                "count",
                self.repository.count(&everything)
            ),
            with_timeout(
                self.store_timeout,
                "total_clicks",
                self.repository.total_clicks()
            ),
        )?;

        Ok(LinkSummary {
            total_links,
            total_clicks,
        })
    }

    /// Makes every cached listing unreachable.
    pub async fn flush_list_cache(&self) {
        warn!("Flushing listing cache");
        self.cache.invalidate_lists().await;
    }

    /// Round-trips to the store.
    pub async fn check_store(&self) -> Result<(), AppError> {
        with_timeout(self.store_timeout, "ping", self.repository.ping()).await
    }

    /// Reports whether the cache backend answers.
    pub async fn check_cache(&self) -> bool {
        self.cache.is_healthy().await
    }
}

pub(crate) fn not_found(code: &str) -> AppError {
    AppError::not_found("Link not found", json!({ "shortCode": code }))
}
