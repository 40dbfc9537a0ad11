//! Form definition CRUD endpoints.

use crate::auth::require_key;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use formbox_core::schema::{FieldDescriptor, validate_schema};
use formbox_store::models::FormRow;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Name recorded when a client creates a form without one.
const DEFAULT_FORM_NAME: &str = "Untitled form";

/// Request to create a new form.
#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub schema: Vec<FieldDescriptor>,
}

/// Request to update an existing form. The schema is replaced whole.
#[derive(Debug, Deserialize)]
pub struct UpdateFormRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub schema: Vec<FieldDescriptor>,
}

/// Form details (used by every response that embeds a form).
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form_id: String,
    pub name: String,
    pub schema: Vec<FieldDescriptor>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Response from creating a form.
#[derive(Debug, Serialize)]
pub struct CreateFormResponse {
    pub message: String,
    pub form: FormResponse,
}

/// Response for form details.
#[derive(Debug, Serialize)]
pub struct GetFormResponse {
    pub form: FormResponse,
}

/// Response for listing forms.
#[derive(Debug, Serialize)]
pub struct ListFormsResponse {
    pub forms: Vec<FormResponse>,
}

/// Response from updating a form.
#[derive(Debug, Serialize)]
pub struct UpdateFormResponse {
    pub message: String,
    pub form: FormResponse,
}

/// Response from deleting a form.
#[derive(Debug, Serialize)]
pub struct DeleteFormResponse {
    pub message: String,
}

/// Query parameters for listing forms.
#[derive(Debug, Deserialize)]
pub struct ListFormsParams {
    /// Maximum number of forms to return.
    pub limit: Option<u32>,
    /// Exclusive RFC 3339 `created_at` cursor for pagination.
    pub before: Option<String>,
}

pub(crate) fn format_timestamp(t: OffsetDateTime, field: &str) -> ApiResult<String> {
    t.format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("failed to format {field}: {e}")))
}

/// Parse a form ID from the request path.
///
/// An ID that cannot be a UUID cannot name an existing form, so parse
/// failures report "not found" rather than "bad request"; clients probing
/// arbitrary IDs see the same 404 either way.
pub(crate) fn parse_form_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("form not found".to_string()))
}

pub(crate) fn form_row_to_response(form: FormRow) -> ApiResult<FormResponse> {
    let schema: Vec<FieldDescriptor> = serde_json::from_str(&form.schema_json)
        .map_err(|e| ApiError::Internal(format!("invalid stored schema: {e}")))?;
    let created_at = format_timestamp(form.created_at, "created_at")?;
    let updated_at = format_timestamp(form.updated_at, "updated_at")?;

    Ok(FormResponse {
        form_id: form.form_id.to_string(),
        name: form.name,
        schema,
        version: form.version,
        created_at,
        updated_at,
    })
}

async fn read_json_body<T: serde::de::DeserializeOwned>(
    req: Request,
    max_body_size: usize,
) -> ApiResult<T> {
    let bytes = axum::body::to_bytes(req.into_body(), max_body_size)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}

/// POST /v1/forms - Create a new form.
///
/// Returns 200 rather than 201 for compatibility with existing clients.
pub async fn create_form(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<CreateFormResponse>> {
    let auth = require_key(&req)?.clone();

    let body: CreateFormRequest = read_json_body(req, state.config.server.max_body_size).await?;

    // Validation strictly precedes the persistence write (fail fast).
    validate_schema(&body.schema)?;

    let schema_json = serde_json::to_string(&body.schema)
        .map_err(|e| ApiError::Internal(format!("failed to serialize schema: {e}")))?;

    let now = OffsetDateTime::now_utc();
    let form = FormRow {
        form_id: Uuid::new_v4(),
        owner_key_id: auth.key.key_id,
        name: body
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FORM_NAME.to_string()),
        schema_json,
        version: 1,
        created_at: now,
        updated_at: now,
    };

    state.store.create_form(&form).await?;

    tracing::info!(form_id = %form.form_id, owner = %auth.key.key_id, "Form created");

    Ok(Json(CreateFormResponse {
        message: "Form created successfully".to_string(),
        form: form_row_to_response(form)?,
    }))
}

/// GET /v1/forms/{form_id} - Get a form by ID.
pub async fn get_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    req: Request,
) -> ApiResult<Json<GetFormResponse>> {
    let auth = require_key(&req)?;
    let form_id = parse_form_id(&form_id)?;

    let form = state
        .store
        .get_form(form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("form not found".to_string()))?;

    if form.owner_key_id != auth.key.key_id {
        return Err(ApiError::Forbidden(
            "form belongs to another api key".to_string(),
        ));
    }

    Ok(Json(GetFormResponse {
        form: form_row_to_response(form)?,
    }))
}

/// GET /v1/forms - List forms owned by the caller, most recent first.
pub async fn list_forms(
    State(state): State<AppState>,
    Query(params): Query<ListFormsParams>,
    req: Request,
) -> ApiResult<Json<ListFormsResponse>> {
    let auth = require_key(&req)?;

    let limit = state.page_size(params.limit);
    let before = params
        .before
        .as_deref()
        .map(|raw| {
            OffsetDateTime::parse(raw, &Rfc3339)
                .map_err(|e| ApiError::BadRequest(format!("invalid before cursor: {e}")))
        })
        .transpose()?;

    let forms = state
        .store
        .list_forms(auth.key.key_id, limit, before)
        .await?
        .into_iter()
        .map(form_row_to_response)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(ListFormsResponse { forms }))
}

/// PUT /v1/forms/{form_id} - Replace a form's schema (and optionally name).
pub async fn update_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    req: Request,
) -> ApiResult<Json<UpdateFormResponse>> {
    let auth = require_key(&req)?.clone();
    let form_id = parse_form_id(&form_id)?;

    let body: UpdateFormRequest = read_json_body(req, state.config.server.max_body_size).await?;

    validate_schema(&body.schema)?;

    let mut form = state
        .store
        .get_form(form_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("form not found".to_string()))?;

    if form.owner_key_id != auth.key.key_id {
        return Err(ApiError::Forbidden(
            "form belongs to another api key".to_string(),
        ));
    }

    let expected_version = form.version;
    if let Some(name) = body.name.filter(|n| !n.trim().is_empty()) {
        form.name = name;
    }
    form.schema_json = serde_json::to_string(&body.schema)
        .map_err(|e| ApiError::Internal(format!("failed to serialize schema: {e}")))?;
    form.version = expected_version + 1;
    form.updated_at = OffsetDateTime::now_utc();

    // Conditional write: a concurrent writer surfaces as 409 rather than a
    // silent lost update.
    state.store.update_form(&form, expected_version).await?;

    tracing::info!(form_id = %form.form_id, version = form.version, "Form updated");

    Ok(Json(UpdateFormResponse {
        message: "Form updated successfully".to_string(),
        form: form_row_to_response(form)?,
    }))
}

/// DELETE /v1/forms/{form_id} - Delete a form and its submissions.
///
/// Idempotent: deleting an unknown or already-deleted form also returns
/// success. Clients retrying a delete after a timeout see the same outcome.
pub async fn delete_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    req: Request,
) -> ApiResult<Json<DeleteFormResponse>> {
    let auth = require_key(&req)?;

    let response = Json(DeleteFormResponse {
        message: "Form deleted successfully".to_string(),
    });

    // An unparseable ID cannot name a live form; report idempotent success.
    let Ok(form_id) = Uuid::parse_str(&form_id) else {
        return Ok(response);
    };

    // Ownership still applies: another key's form must not be deletable.
    match state.store.get_form(form_id).await? {
        Some(form) if form.owner_key_id != auth.key.key_id => {
            return Err(ApiError::Forbidden(
                "form belongs to another api key".to_string(),
            ));
        }
        Some(_) => {
            let removed = state.store.delete_form(form_id).await?;
            if removed {
                tracing::info!(form_id = %form_id, "Form deleted");
            }
        }
        None => {}
    }

    Ok(response)
}
