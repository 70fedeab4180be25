//! Offline queue operations: enqueue, list, remove.

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::{unix_timestamp, OfflineDb};
use super::types::{PendingId, PendingRequest};
use crate::request::RequestConfig;

impl OfflineDb {
    /// Persist a request for later replay.
    pub async fn enqueue(&self, config: &RequestConfig, context: Option<&str>) -> Result<PendingId> {
        let config_json = serde_json::to_string(config)?;
        let id = sqlx::query(
            r#"
            INSERT INTO pending_requests (config_json, context, attempts, created_at)
            VALUES (?1, ?2, 0, ?3)
            "#,
        )
        .bind(config_json)
        .bind(context)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        tracing::debug!(id, url = %config.url, "queued request for replay");
        Ok(id)
    }

    /// All queued requests, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<PendingRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, config_json, context, attempts, created_at
            FROM pending_requests
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let config_json: String = row.get("config_json");
            let config: RequestConfig = serde_json::from_str(&config_json)
                .with_context(|| format!("decode queued request {}", id))?;
            out.push(PendingRequest {
                id,
                config,
                context: row.get("context"),
                attempts: row.get("attempts"),
                created_at: row.get("created_at"),
            });
        }
        Ok(out)
    }

    pub async fn pending_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM pending_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Returns false if no row had this id.
    pub async fn remove_pending(&self, id: PendingId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM pending_requests WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Count one more failed replay for `id`.
    pub async fn mark_attempt(&self, id: PendingId) -> Result<()> {
        sqlx::query("UPDATE pending_requests SET attempts = attempts + 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
