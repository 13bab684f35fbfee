//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPage};
use crate::domain::repositories::{InsertOutcome, LinkStore};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, code, target, access_count, created_at, updated_at";

/// PostgreSQL store for links.
///
/// Uniqueness of `code` is enforced by the `links_code_key` constraint. Inserts
/// use `ON CONFLICT (code) DO NOTHING`, so a losing concurrent insert returns
/// no row and surfaces as [`InsertOutcome::CodeTaken`]. Access
/// counts are incremented in place with a single `UPDATE`.
pub struct PgLinkStore {
    pool: Arc<PgPool>,
}

impl PgLinkStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn try_insert(&self, code: &str, target: &str) -> Result<InsertOutcome, AppError> {
        let query = format!(
            "INSERT INTO links (code, target) VALUES ($1, $2) \
             ON CONFLICT (code) DO NOTHING \
             RETURNING {LINK_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Link>(&query)
            .bind(code)
            .bind(target)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(match inserted {
            Some(link) => InsertOutcome::Inserted(link),
            None => InsertOutcome::CodeTaken,
        })
    }

    async fn get(&self, code: &str) -> Result<Option<Link>, AppError> {
        let query = format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1");

        let link = sqlx::query_as::<_, Link>(&query)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(link)
    }

    async fn increment_access(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET access_count = access_count + 1,
                updated_at = GREATEST(updated_at, NOW())
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(&self, offset: u64, count: u32) -> Result<LinkPage, AppError> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        );
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let links = sqlx::query_as::<_, Link>(&query)
            .bind(i64::from(count))
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(LinkPage {
            links,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
