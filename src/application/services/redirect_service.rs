//! Short code resolution with visit counting.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument};

use crate::application::link_cache::LinkCache;
use crate::application::services::link_service::not_found;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::timeout::with_timeout;

/// Resolves short codes to their targets and records each visit.
///
/// # Flow
///
/// 1. Look up `link:{code}` in the cache; on a miss read the store and prime
///    the cache.
/// 2. Atomically add one click in the store. This is the authoritative
///    existence check: a cached record whose row has since been deleted is
///    evicted and the visit fails with [`AppError::NotFound`].
/// 3. Refresh the cached record with the post-increment row and advance the
///    listing namespace, since listed totals are now stale.
///
/// Cache work is best-effort; only store failures fail the visit.
///
/// The refresh in step 3 is not atomic with the click. A delete that evicts
/// `link:{code}` between the two can be overwritten by the refresh, leaving
/// a record for a deleted row in the cache until its TTL runs out or the next
/// visit to the code evicts it. Redirects are unaffected, since step 2 is
/// the existence check; only cache-first reads of the record may see it.
pub struct RedirectService<L: LinkRepository> {
    repository: Arc<L>,
    cache: Arc<LinkCache>,
    store_timeout: Duration,
}

impl<L: LinkRepository> RedirectService<L> {
    pub fn new(repository: Arc<L>, cache: Arc<LinkCache>, store_timeout: Duration) -> Self {
        Self {
            repository,
            cache,
            store_timeout,
        }
    }

    /// Returns the target URL for `code` after counting the visit exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached in time.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let cached = self.cache.get_link(code).await;

        if cached.is_none() {
            let link = with_timeout(
                self.store_timeout,
                "find_by_code",
                self.repository.find_by_code(code),
            )
            .await
            .inspect_err(|e| log_store_failure("find_by_code", code, e))?
            .ok_or_else(|| not_found(code))?;

            self.cache.put_link(&link).await;
        }

        let updated = with_timeout(
            self.store_timeout,
            "record_click",
            self.repository.record_click(code),
        )
        .await
        .inspect_err(|e| log_store_failure("record_click", code, e))?;

        let Some(link) = updated else {
            debug!("Cached link no longer in store, evicting");
            self.cache.evict_link(code).await;
            return Err(not_found(code));
        };

        self.cache.put_link(&link).await;
        self.cache.invalidate_lists().await;

        metrics::counter!("redirects_total").increment(1);
        debug!(total_clicks = link.total_clicks, "Redirect recorded");

        Ok(link.long_url)
    }
}

fn log_store_failure(operation: &'static str, code: &str, e: &AppError) {
    if matches!(e, AppError::Unavailable { .. } | AppError::Internal { .. }) {
        error!(operation, code, error = %e, "Store call failed during redirect");
    }
}
