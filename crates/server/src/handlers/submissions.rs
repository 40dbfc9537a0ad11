//! Submission intake and retrieval endpoints.
//!
//! Intake is public: anyone who knows a form's ID may submit to it.
//! Reading submissions back requires the API key that owns the form.

use crate::auth::require_key;
use crate::error::{ApiError, ApiResult};
use crate::handlers::forms::{format_timestamp, parse_form_id};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use formbox_core::schema::{FieldDescriptor, validate_values};
use formbox_store::models::{FormRow, SubmissionRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Response from a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitFormResponse {
    pub message: String,
    pub submission_id: String,
}

/// One stored submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub submission_id: String,
    pub form_id: String,
    pub values: serde_json::Map<String, Value>,
    pub submitted_at: String,
}

/// Response for submission details.
#[derive(Debug, Serialize)]
pub struct GetSubmissionResponse {
    pub submission: SubmissionResponse,
}

/// Response for listing a form's submissions.
#[derive(Debug, Serialize)]
pub struct ListSubmissionsResponse {
    pub submissions: Vec<SubmissionResponse>,
}

/// Query parameters for listing submissions.
#[derive(Debug, Deserialize)]
pub struct ListSubmissionsParams {
    pub limit: Option<u32>,
    /// Exclusive RFC 3339 `submitted_at` cursor for pagination.
    pub before: Option<String>,
}

fn submission_row_to_response(row: SubmissionRow) -> ApiResult<SubmissionResponse> {
    let values: serde_json::Map<String, Value> = serde_json::from_str(&row.values_json)
        .map_err(|e| ApiError::Internal(format!("invalid stored submission values: {e}")))?;
    let submitted_at = format_timestamp(row.submitted_at, "submitted_at")?;

    Ok(SubmissionResponse {
        submission_id: row.submission_id.to_string(),
        form_id: row.form_id.to_string(),
        values,
        submitted_at,
    })
}

fn parse_schema(form: &FormRow) -> ApiResult<Vec<FieldDescriptor>> {
    serde_json::from_str(&form.schema_json)
        .map_err(|e| ApiError::Internal(format!("invalid stored schema: {e}")))
}

async fn load_owned_form(state: &AppState, form_id: Uuid, key_id: Uuid) -> ApiResult<FormRow> {
    let form = state
        .store
        .get_form(form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("form not found".to_string()))?;

    if form.owner_key_id != key_id {
        return Err(ApiError::Forbidden(
            "form belongs to another api key".to_string(),
        ));
    }

    Ok(form)
}

/// POST /v1/forms/{form_id}/submissions - Accept a submission for a form.
///
/// No authentication: this is the endpoint embedded forms post to. The
/// submitted values are validated against the form's schema before any
/// write happens.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    req: Request,
) -> ApiResult<Json<SubmitFormResponse>> {
    let form_id = parse_form_id(&form_id)?;

    // Best-effort origin attribution; the service runs behind a proxy.
    let client_ip = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let bytes = axum::body::to_bytes(req.into_body(), state.config.server.max_body_size)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let values: serde_json::Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?;

    let form = state
        .store
        .get_form(form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("form not found".to_string()))?;

    let schema = parse_schema(&form)?;
    validate_values(&schema, &values)?;

    let values_json = serde_json::to_string(&values)
        .map_err(|e| ApiError::Internal(format!("failed to serialize values: {e}")))?;

    // submitted_at is assigned server-side; clients cannot backdate entries.
    let submission = SubmissionRow {
        submission_id: Uuid::new_v4(),
        form_id,
        values_json,
        submitted_at: OffsetDateTime::now_utc(),
        client_ip,
    };

    state.store.create_submission(&submission).await?;

    tracing::info!(
        form_id = %form_id,
        submission_id = %submission.submission_id,
        "Submission accepted"
    );

    Ok(Json(SubmitFormResponse {
        message: "Submission accepted".to_string(),
        submission_id: submission.submission_id.to_string(),
    }))
}

/// GET /v1/forms/{form_id}/submissions - List a form's submissions,
/// most recent first. Owner only.
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Query(params): Query<ListSubmissionsParams>,
    req: Request,
) -> ApiResult<Json<ListSubmissionsResponse>> {
    let auth = require_key(&req)?;
    let form_id = parse_form_id(&form_id)?;

    load_owned_form(&state, form_id, auth.key.key_id).await?;

    let limit = state.page_size(params.limit);
    let before = params
        .before
        .as_deref()
        .map(|raw| {
            OffsetDateTime::parse(raw, &Rfc3339)
                .map_err(|e| ApiError::BadRequest(format!("invalid before cursor: {e}")))
        })
        .transpose()?;

    let submissions = state
        .store
        .list_submissions(form_id, limit, before)
        .await?
        .into_iter()
        .map(submission_row_to_response)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(ListSubmissionsResponse { submissions }))
}

/// GET /v1/forms/{form_id}/submissions/{submission_id} - Get one
/// submission. Owner only.
pub async fn get_submission(
    State(state): State<AppState>,
    Path((form_id, submission_id)): Path<(String, String)>,
    req: Request,
) -> ApiResult<Json<GetSubmissionResponse>> {
    let auth = require_key(&req)?;
    let form_id = parse_form_id(&form_id)?;
    let submission_id = Uuid::parse_str(&submission_id)
        .map_err(|_| ApiError::NotFound("submission not found".to_string()))?;

    load_owned_form(&state, form_id, auth.key.key_id).await?;

    let submission = state
        .store
        .get_submission(submission_id)
        .await?
        // A submission ID from a different form must not leak through the
        // parent form's URL.
        .filter(|s| s.form_id == form_id)
        .ok_or_else(|| ApiError::NotFound("submission not found".to_string()))?;

    Ok(Json(GetSubmissionResponse {
        submission: submission_row_to_response(submission)?,
    }))
}
