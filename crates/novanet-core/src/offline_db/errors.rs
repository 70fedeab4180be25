//! Error log operations: record, list recent, prune, clear.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::db::OfflineDb;
use super::types::ErrorRecord;
use crate::classify::{ClassifiedError, ErrorKind, Severity};

impl OfflineDb {
    /// Append a classified error. Re-logging the same error id is a no-op.
    pub async fn log_error(&self, error: &ClassifiedError) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO error_log (
                id, kind, severity, message, user_message,
                retryable, context, status, timestamp
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(error.id.to_string())
        .bind(error.kind.as_str())
        .bind(error.severity.as_str())
        .bind(&error.message)
        .bind(&error.user_message)
        .bind(error.retryable)
        .bind(error.context.as_deref())
        .bind(error.status().map(i64::from))
        .bind(error.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent errors first, at most `limit`.
    pub async fn recent_errors(&self, limit: u32) -> Result<Vec<ErrorRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, severity, message, user_message, retryable, context, status, timestamp
            FROM error_log
            ORDER BY seq DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.get("kind");
            let severity: String = row.get("severity");
            let status: Option<i64> = row.get("status");
            let timestamp: String = row.get("timestamp");
            out.push(ErrorRecord {
                id: row.get("id"),
                kind: ErrorKind::from_str(&kind),
                severity: Severity::from_str(&severity),
                message: row.get("message"),
                user_message: row.get("user_message"),
                retryable: row.get("retryable"),
                context: row.get("context"),
                status: status.and_then(|s| u16::try_from(s).ok()),
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_default(),
            });
        }
        Ok(out)
    }

    /// Keep only the newest `keep` entries. Returns how many were deleted.
    pub async fn prune_errors(&self, keep: u32) -> Result<u64> {
        let done = sqlx::query(
            r#"
            DELETE FROM error_log
            WHERE seq NOT IN (
                SELECT seq FROM error_log ORDER BY seq DESC LIMIT ?1
            )
            "#,
        )
        .bind(i64::from(keep))
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected())
    }

    pub async fn clear_errors(&self) -> Result<u64> {
        let done = sqlx::query("DELETE FROM error_log")
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
