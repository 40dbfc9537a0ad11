//! Submission repository.

use crate::error::StoreResult;
use crate::models::SubmissionRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for submission operations. Submissions are append-only.
#[async_trait]
pub trait SubmissionRepo: Send + Sync {
    /// Persist a new submission. The referenced form must exist; the
    /// foreign key rejects orphans.
    async fn create_submission(&self, submission: &SubmissionRow) -> StoreResult<()>;

    /// Get a submission by ID.
    async fn get_submission(&self, submission_id: Uuid) -> StoreResult<Option<SubmissionRow>>;

    /// List submissions for a form, most recent first.
    async fn list_submissions(
        &self,
        form_id: Uuid,
        limit: u32,
        before: Option<OffsetDateTime>,
    ) -> StoreResult<Vec<SubmissionRow>>;

    /// Count submissions for a form.
    async fn count_submissions(&self, form_id: Uuid) -> StoreResult<u64>;
}
