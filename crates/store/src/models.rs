//! Database models mapping to the store schema.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Form definition record.
///
/// `schema_json` holds the ordered field descriptor array as JSON; order is
/// preserved exactly as submitted. `version` is the optimistic-concurrency
/// counter checked by conditional updates.
#[derive(Debug, Clone, FromRow)]
pub struct FormRow {
    pub form_id: Uuid,
    pub owner_key_id: Uuid,
    pub name: String,
    pub schema_json: String,
    pub version: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Submission record. Read-only after creation; removed only by the
/// cascade when the parent form is deleted.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub submission_id: Uuid,
    pub form_id: Uuid,
    pub values_json: String,
    pub submitted_at: OffsetDateTime,
    pub client_ip: Option<String>,
}

/// API key record. The raw key is never stored, only its SHA-256 hash.
#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyRow {
    pub key_id: Uuid,
    pub key_hash: String,
    pub label: Option<String>,
    pub created_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
    pub last_used_at: Option<OffsetDateTime>,
}
