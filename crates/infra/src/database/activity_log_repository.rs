//! SQLite-backed source of pending activity logs.
//!
//! Loads every `activity_log` row together with its recipient and the
//! recipient's invitation in one `LEFT JOIN` query, so a dangling reference
//! surfaces as an absent relationship instead of a dropped row.

use std::sync::Arc;

use activity_export_core::ActivityLogSource;
use activity_export_domain::{
    ActionKind, ActivityLog, ExportError, Invitation, Recipient, Result as DomainResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, Row};
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};
use crate::errors::InfraError;

const PENDING_ACTIVITY_LOGS_QUERY: &str = "
    SELECT
        a.id,
        a.action,
        a.sender_id,
        a.activity_time,
        r.id,
        COALESCE(r.customer_number, ''),
        COALESCE(r.sender_customer_number, ''),
        COALESCE(r.nickname, ''),
        COALESCE(r.sender_name, ''),
        COALESCE(r.sender_country_code, ''),
        COALESCE(r.sender_group_member, ''),
        COALESCE(r.recipient_country_code, ''),
        COALESCE(r.recipient_group_member, ''),
        i.expiry_date
    FROM activity_log a
    LEFT JOIN recipient r ON r.id = a.recipient_id
    LEFT JOIN recipient_invitation i ON i.id = r.invitation_id
    WHERE a.activity_time >= ?1
    ORDER BY a.activity_time ASC, a.id ASC";

/// Activity log source reading from the shared SQLite pool.
pub struct SqliteActivityLogRepository {
    db: Arc<DbManager>,
    lookback: Option<Duration>,
}

impl SqliteActivityLogRepository {
    /// Construct a repository that exports every stored activity log.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db, lookback: None }
    }

    /// Only return activity newer than `lookback` relative to the fetch time.
    #[must_use]
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = Some(lookback);
        self
    }

    /// Lower bound (unix seconds) applied to `activity_time` for a fetch at `now`.
    fn since(&self, now: DateTime<Utc>) -> i64 {
        self.lookback
            .and_then(|window| now.checked_sub_signed(window))
            .map_or(i64::MIN, |since| since.timestamp())
    }
}

#[async_trait]
impl ActivityLogSource for SqliteActivityLogRepository {
    async fn fetch_pending_activity_logs(&self) -> DomainResult<Vec<ActivityLog>> {
        let db = Arc::clone(&self.db);
        let since = self.since(Utc::now());

        let logs = task::spawn_blocking(move || -> DomainResult<Vec<ActivityLog>> {
            let conn = db.get_connection()?;
            query_pending(&conn, since)
        })
        .await
        .map_err(|err| ExportError::from(InfraError::from(err)))??;

        debug!(count = logs.len(), since, "Fetched pending activity logs");
        Ok(logs)
    }
}

fn query_pending(conn: &Connection, since: i64) -> DomainResult<Vec<ActivityLog>> {
    let mut stmt = conn.prepare(PENDING_ACTIVITY_LOGS_QUERY).map_err(map_sql_error)?;
    let rows = stmt.query_map([since], map_activity_row).map_err(map_sql_error)?;

    rows.map(|row| row.map_err(map_sql_error).and_then(|raw| raw.into_activity_log()))
        .collect()
}

/// Row image before timestamps are validated.
struct ActivityRow {
    id: i64,
    action: String,
    sender_id: String,
    activity_time: i64,
    recipient: Option<Recipient>,
    expiry_date: Option<i64>,
}

impl ActivityRow {
    fn into_activity_log(self) -> DomainResult<ActivityLog> {
        let activity_time = timestamp_from_secs(self.activity_time, "activity_time", self.id)?;

        let recipient = match self.recipient {
            Some(mut recipient) => {
                recipient.invitation = self
                    .expiry_date
                    .map(|secs| timestamp_from_secs(secs, "expiry_date", self.id))
                    .transpose()?
                    .map(|expiry_date| Invitation { expiry_date });
                Some(recipient)
            }
            None => None,
        };

        Ok(ActivityLog {
            id: self.id,
            action: ActionKind::parse(&self.action),
            sender_id: self.sender_id,
            activity_time,
            recipient,
        })
    }
}

fn map_activity_row(row: &Row<'_>) -> rusqlite::Result<ActivityRow> {
    let recipient_id: Option<String> = row.get(4)?;
    let recipient = match recipient_id {
        Some(id) => Some(Recipient {
            id,
            customer_number: row.get(5)?,
            sender_customer_number: row.get(6)?,
            nickname: row.get(7)?,
            sender_name: row.get(8)?,
            sender_country_code: row.get(9)?,
            sender_group_member: row.get(10)?,
            recipient_country_code: row.get(11)?,
            recipient_group_member: row.get(12)?,
            invitation: None,
        }),
        None => None,
    };

    Ok(ActivityRow {
        id: row.get(0)?,
        action: row.get(1)?,
        sender_id: row.get(2)?,
        activity_time: row.get(3)?,
        recipient,
        expiry_date: row.get(13)?,
    })
}

fn timestamp_from_secs(secs: i64, column: &str, log_id: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        ExportError::DataAccess(format!(
            "activity log {log_id} has out-of-range {column} timestamp {secs}"
        ))
    })
}
