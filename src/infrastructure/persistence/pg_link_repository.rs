//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{ClicksBound, Link, LinkFilter, LinkQuery, NewLink, SortField};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use serde_json::json;

const LINK_COLUMNS: &str = "short_code, long_url, total_clicks, last_clicked_at, created_at";

/// PostgreSQL repository for link storage and retrieval.
///
/// All values are bound as parameters; the only interpolated SQL fragments
/// are column names and sort keywords taken from closed enums.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Escapes `LIKE` metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Appends the `WHERE` clause for `filter` to `qb`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LinkFilter) {
    qb.push(" WHERE TRUE");

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        qb.push(" AND (short_code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR long_url ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    match filter.clicks_bound() {
        ClicksBound::Any => {}
        ClicksBound::Some => {
            qb.push(" AND total_clicks > 0");
        }
        ClicksBound::None => {
            qb.push(" AND total_clicks = 0");
        }
        ClicksBound::Range { min, max } => {
            if let Some(min) = min {
                qb.push(" AND total_clicks >= ").push_bind(min);
            }
            if let Some(max) = max {
                qb.push(" AND total_clicks <= ").push_bind(max);
            }
        }
    }

    if let Some(after) = filter.created_after {
        qb.push(" AND created_at >= ").push_bind(after);
    }
    if let Some(before) = filter.created_before {
        qb.push(" AND created_at <= ").push_bind(before);
    }
    if let Some(after) = filter.last_clicked_after {
        qb.push(" AND last_clicked_at >= ").push_bind(after);
    }
    if let Some(before) = filter.last_clicked_before {
        qb.push(" AND last_clicked_at <= ").push_bind(before);
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let inserted = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (short_code, long_url)
            VALUES ($1, $2)
            ON CONFLICT (short_code) DO NOTHING
            RETURNING short_code, long_url, total_clicks, last_clicked_at, created_at
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        inserted.ok_or_else(|| {
            AppError::conflict(
                "Shortcode already exists",
                json!({ "shortCode": new_link.short_code }),
            )
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn record_click(&self, code: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET total_clicks = total_clicks + 1,
                last_clicked_at = NOW()
            WHERE short_code = $1
            RETURNING short_code, long_url, total_clicks, last_clicked_at, created_at
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list(&self, query: &LinkQuery) -> Result<Vec<Link>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {LINK_COLUMNS} FROM links"));
        push_filter(&mut qb, &query.filter);

        qb.push(" ORDER BY ")
            .push(query.sort_by.column())
            .push(" ")
            .push(query.sort_order.keyword());
        if query.sort_by == SortField::LastClickedAt {
            qb.push(" NULLS LAST");
        }
        // Stable ordering across pages when the sort column has ties.
        qb.push(", short_code ASC");

        qb.push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset());

        let links = qb
            .build_query_as::<Link>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(links)
    }

    async fn count(&self, filter: &LinkFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM links");
        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE short_code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_clicks), 0)::BIGINT FROM links")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(total)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
