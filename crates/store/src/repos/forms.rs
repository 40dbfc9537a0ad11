//! Form definition repository.

use crate::error::StoreResult;
use crate::models::FormRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for form definition operations.
#[async_trait]
pub trait FormRepo: Send + Sync {
    /// Create a new form definition.
    async fn create_form(&self, form: &FormRow) -> StoreResult<()>;

    /// Get a form by ID.
    async fn get_form(&self, form_id: Uuid) -> StoreResult<Option<FormRow>>;

    /// List forms owned by an API key, most recent first.
    ///
    /// `before` is an exclusive `created_at` cursor for pagination.
    async fn list_forms(
        &self,
        owner_key_id: Uuid,
        limit: u32,
        before: Option<OffsetDateTime>,
    ) -> StoreResult<Vec<FormRow>>;

    /// Conditionally update a form.
    ///
    /// The write only applies when the stored version equals
    /// `expected_version`; a concurrent writer surfaces as
    /// [`StoreError::Conflict`](crate::StoreError::Conflict).
    async fn update_form(&self, form: &FormRow, expected_version: i64) -> StoreResult<()>;

    /// Delete a form and, via cascade, its submissions.
    ///
    /// Returns whether a row was actually removed. Deleting an unknown ID
    /// is not an error; the caller decides the response contract.
    async fn delete_form(&self, form_id: Uuid) -> StoreResult<bool>;
}
