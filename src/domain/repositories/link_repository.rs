//! Repository trait for the authoritative link store.

use crate::domain::entities::{Link, LinkFilter, LinkQuery, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Store of link records keyed by their unique short code.
///
/// The store is the single source of truth. Implementations must make
/// [`create`](Self::create) and [`record_click`](Self::record_click) atomic
/// at the storage level.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with zero clicks, or reports that the code is taken.
    ///
    /// Insert and conflict detection happen in one statement, so two
    /// concurrent creates of the same code cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists; the
    /// existing record is left untouched.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically adds one click and sets `last_clicked_at` to the store's
    /// current time.
    ///
    /// Returns the post-increment record, or `None` if no link has this code.
    async fn record_click(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Returns one page of links matching `query`.
    async fn list(&self, query: &LinkQuery) -> Result<Vec<Link>, AppError>;

    /// Counts links matching `filter`, ignoring pagination.
    async fn count(&self, filter: &LinkFilter) -> Result<i64, AppError>;

    /// Deletes a link. Returns `Ok(false)` if the code does not exist.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Sum of `total_clicks` across all links.
    async fn total_clicks(&self) -> Result<i64, AppError>;

    /// Round-trips to the store; used by health checks.
    async fn ping(&self) -> Result<(), AppError>;
}
