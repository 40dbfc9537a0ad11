//! Store trait and the SQLite implementation.

use crate::error::{StoreError, StoreResult};
use crate::repos::{ApiKeyRepo, FormRepo, SubmissionRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined store trait. Handlers depend on this trait object only.
#[async_trait]
pub trait FormStore: FormRepo + SubmissionRepo + ApiKeyRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> StoreResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> StoreResult<()>;
}

/// SQLite-based store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store, creating the database file if missing.
    pub async fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under test/axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl FormStore for SqliteStore {
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::{ApiKeyRow, FormRow, SubmissionRow};
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[async_trait]
    impl FormRepo for SqliteStore {
        async fn create_form(&self, form: &FormRow) -> StoreResult<()> {
            match sqlx::query(
                r#"
                INSERT INTO forms (form_id, owner_key_id, name, schema_json, version, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(form.form_id)
            .bind(form.owner_key_id)
            .bind(&form.name)
            .bind(&form.schema_json)
            .bind(form.version)
            .bind(form.created_at)
            .bind(form.updated_at)
            .execute(&self.pool)
            .await
            {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db_err))
                    if db_err.message().contains("UNIQUE constraint") =>
                {
                    Err(StoreError::AlreadyExists(format!(
                        "form {} already exists",
                        form.form_id
                    )))
                }
                Err(e) => Err(e.into()),
            }
        }

        async fn get_form(&self, form_id: Uuid) -> StoreResult<Option<FormRow>> {
            let row = sqlx::query_as::<_, FormRow>("SELECT * FROM forms WHERE form_id = ?")
                .bind(form_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_forms(
            &self,
            owner_key_id: Uuid,
            limit: u32,
            before: Option<OffsetDateTime>,
        ) -> StoreResult<Vec<FormRow>> {
            let rows = match before {
                Some(cursor) => {
                    sqlx::query_as::<_, FormRow>(
                        "SELECT * FROM forms WHERE owner_key_id = ? AND created_at < ? \
                         ORDER BY created_at DESC LIMIT ?",
                    )
                    .bind(owner_key_id)
                    .bind(cursor)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as::<_, FormRow>(
                        "SELECT * FROM forms WHERE owner_key_id = ? \
                         ORDER BY created_at DESC LIMIT ?",
                    )
                    .bind(owner_key_id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
                }
            };
            Ok(rows)
        }

        async fn update_form(&self, form: &FormRow, expected_version: i64) -> StoreResult<()> {
            // Conditional write: the version predicate serializes concurrent
            // updates to the same form and prevents lost updates.
            let result = sqlx::query(
                "UPDATE forms SET name = ?, schema_json = ?, version = ?, updated_at = ? \
                 WHERE form_id = ? AND version = ?",
            )
            .bind(&form.name)
            .bind(&form.schema_json)
            .bind(form.version)
            .bind(form.updated_at)
            .bind(form.form_id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                if self.get_form(form.form_id).await?.is_none() {
                    return Err(StoreError::NotFound(format!(
                        "form {} not found",
                        form.form_id
                    )));
                }
                return Err(StoreError::Conflict(format!(
                    "form {} was modified concurrently",
                    form.form_id
                )));
            }
            Ok(())
        }

        async fn delete_form(&self, form_id: Uuid) -> StoreResult<bool> {
            // Submissions go with the form via ON DELETE CASCADE.
            let result = sqlx::query("DELETE FROM forms WHERE form_id = ?")
                .bind(form_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }

    #[async_trait]
    impl SubmissionRepo for SqliteStore {
        async fn create_submission(&self, submission: &SubmissionRow) -> StoreResult<()> {
            match sqlx::query(
                r#"
                INSERT INTO submissions (submission_id, form_id, values_json, submitted_at, client_ip)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(submission.submission_id)
            .bind(submission.form_id)
            .bind(&submission.values_json)
            .bind(submission.submitted_at)
            .bind(&submission.client_ip)
            .execute(&self.pool)
            .await
            {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db_err))
                    if db_err.message().contains("FOREIGN KEY constraint") =>
                {
                    Err(StoreError::NotFound(format!(
                        "form {} not found",
                        submission.form_id
                    )))
                }
                Err(e) => Err(e.into()),
            }
        }

        async fn get_submission(
            &self,
            submission_id: Uuid,
        ) -> StoreResult<Option<SubmissionRow>> {
            let row = sqlx::query_as::<_, SubmissionRow>(
                "SELECT * FROM submissions WHERE submission_id = ?",
            )
            .bind(submission_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_submissions(
            &self,
            form_id: Uuid,
            limit: u32,
            before: Option<OffsetDateTime>,
        ) -> StoreResult<Vec<SubmissionRow>> {
            let rows = match before {
                Some(cursor) => {
                    sqlx::query_as::<_, SubmissionRow>(
                        "SELECT * FROM submissions WHERE form_id = ? AND submitted_at < ? \
                         ORDER BY submitted_at DESC LIMIT ?",
                    )
                    .bind(form_id)
                    .bind(cursor)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as::<_, SubmissionRow>(
                        "SELECT * FROM submissions WHERE form_id = ? \
                         ORDER BY submitted_at DESC LIMIT ?",
                    )
                    .bind(form_id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
                }
            };
            Ok(rows)
        }

        async fn count_submissions(&self, form_id: Uuid) -> StoreResult<u64> {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE form_id = ?")
                    .bind(form_id)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl ApiKeyRepo for SqliteStore {
        async fn create_api_key(&self, key: &ApiKeyRow) -> StoreResult<()> {
            match sqlx::query(
                r#"
                INSERT INTO api_keys (key_id, key_hash, label, created_at, revoked_at, last_used_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(key.key_id)
            .bind(&key.key_hash)
            .bind(&key.label)
            .bind(key.created_at)
            .bind(key.revoked_at)
            .bind(key.last_used_at)
            .execute(&self.pool)
            .await
            {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db_err))
                    if db_err.message().contains("UNIQUE constraint") =>
                {
                    Err(StoreError::AlreadyExists(
                        "api key hash already exists".to_string(),
                    ))
                }
                Err(e) => Err(e.into()),
            }
        }

        async fn get_api_key(&self, key_id: Uuid) -> StoreResult<Option<ApiKeyRow>> {
            let row = sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys WHERE key_id = ?")
                .bind(key_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_api_key_by_hash(&self, key_hash: &str) -> StoreResult<Option<ApiKeyRow>> {
            let row = sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys WHERE key_hash = ?")
                .bind(key_hash)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn revoke_api_key(
            &self,
            key_id: Uuid,
            revoked_at: OffsetDateTime,
        ) -> StoreResult<()> {
            let result = sqlx::query("UPDATE api_keys SET revoked_at = ? WHERE key_id = ?")
                .bind(revoked_at)
                .bind(key_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(format!("api key {} not found", key_id)));
            }
            Ok(())
        }

        async fn touch_api_key(&self, key_id: Uuid, used_at: OffsetDateTime) -> StoreResult<()> {
            sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE key_id = ?")
                .bind(used_at)
                .bind(key_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        }

        async fn get_bootstrap_key_id(&self) -> StoreResult<Option<Uuid>> {
            let id: Option<Uuid> =
                sqlx::query_scalar("SELECT key_id FROM bootstrap WHERE name = 'admin_key'")
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(id)
        }

        async fn set_bootstrap_key_id(&self, key_id: Uuid) -> StoreResult<()> {
            sqlx::query(
                "INSERT INTO bootstrap (name, key_id) VALUES ('admin_key', ?) \
                 ON CONFLICT(name) DO UPDATE SET key_id = excluded.key_id",
            )
            .bind(key_id)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
    }
}

const SCHEMA_SQL: &str = r#"
-- Form definitions
CREATE TABLE IF NOT EXISTS forms (
    form_id BLOB PRIMARY KEY,
    owner_key_id BLOB NOT NULL,
    name TEXT NOT NULL,
    schema_json TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_forms_owner ON forms(owner_key_id, created_at);

-- Submissions. Deleting the parent form removes its submissions.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id BLOB PRIMARY KEY,
    form_id BLOB NOT NULL,
    values_json TEXT NOT NULL,
    submitted_at TEXT NOT NULL,
    client_ip TEXT,
    FOREIGN KEY (form_id) REFERENCES forms(form_id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_submissions_form ON submissions(form_id, submitted_at);

-- API keys
CREATE TABLE IF NOT EXISTS api_keys (
    key_id BLOB PRIMARY KEY,
    key_hash TEXT NOT NULL UNIQUE,
    label TEXT,
    created_at TEXT NOT NULL,
    revoked_at TEXT,
    last_used_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_api_keys_hash ON api_keys(key_hash);

-- Bootstrap bookkeeping (single-row registry of the admin key)
CREATE TABLE IF NOT EXISTS bootstrap (
    name TEXT PRIMARY KEY,
    key_id BLOB NOT NULL
);
"#;
