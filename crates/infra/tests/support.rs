#![allow(dead_code)]

use std::sync::Arc;

use activity_export_infra::database::DbManager;
use rusqlite::params;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("activity.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), temp_dir }
    }

    /// Scratch directory next to the database, for export output.
    pub fn dir(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn insert_invitation(&self, id: i64, expiry_date: i64) {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO recipient_invitation (id, expiry_date) VALUES (?1, ?2)",
            params![id, expiry_date],
        )
        .expect("invitation inserted");
    }

    /// Insert a recipient with sender `GB`/`01`, recipient `FR`/`03`.
    pub fn insert_recipient(&self, id: &str, invitation_id: Option<i64>) {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO recipient (
                id, customer_number, sender_customer_number, nickname, sender_name,
                sender_country_code, sender_group_member, recipient_country_code,
                recipient_group_member, invitation_id
            ) VALUES (?1, 'C200', 'C100', 'Bob', 'Alice', 'GB', '01', 'FR', '03', ?2)",
            params![id, invitation_id],
        )
        .expect("recipient inserted");
    }

    pub fn insert_activity(
        &self,
        action: &str,
        sender_id: &str,
        activity_time: i64,
        recipient_id: Option<&str>,
    ) -> i64 {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO activity_log (action, sender_id, activity_time, recipient_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![action, sender_id, activity_time, recipient_id],
        )
        .expect("activity inserted");
        conn.last_insert_rowid()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// 2024-03-01T09:30:00Z
pub const MARCH_1_0930: i64 = 1_709_285_400;
/// 2024-03-13T00:00:00Z
pub const MARCH_13: i64 = 1_710_288_000;
