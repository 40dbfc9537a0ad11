//! API key authentication middleware.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use formbox_store::models::ApiKeyRow;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Authenticated request extension.
///
/// Present on a request only when a valid, unrevoked API key was supplied.
/// Public endpoints (submission intake, health) never look for it.
#[derive(Clone, Debug)]
pub struct AuthenticatedKey {
    /// The validated API key record.
    pub key: ApiKeyRow,
}

/// Extract the raw API key from the request headers.
///
/// Accepted carriers, in precedence order: `X-Api-Key`, `X-Access-Key`,
/// `Authorization: Bearer <key>` (scheme case-insensitive per RFC 6750).
fn extract_api_key(req: &Request) -> Option<&str> {
    for header in ["x-api-key", "x-access-key"] {
        if let Some(value) = req.headers().get(header).and_then(|v| v.to_str().ok())
            && !value.is_empty()
        {
            return Some(value);
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}

/// Hash an API key for storage lookup.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Authentication middleware.
///
/// Validates a supplied API key and attaches [`AuthenticatedKey`] to the
/// request. Requests without any key pass through unauthenticated; the
/// per-handler `require_key` check decides whether that is acceptable.
/// A key that is present but unknown or revoked is rejected here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(raw_key) = extract_api_key(&req) {
        let key_hash = hash_api_key(raw_key);

        let key_row = state
            .store
            .get_api_key_by_hash(&key_hash)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("unknown api key".to_string()))?;

        if key_row.revoked_at.is_some() {
            return Err(ApiError::Unauthorized("api key revoked".to_string()));
        }

        // Update last used time (fire and forget)
        let store = state.store.clone();
        let key_id = key_row.key_id;
        tokio::spawn(async move {
            let _ = store.touch_api_key(key_id, OffsetDateTime::now_utc()).await;
        });

        req.extensions_mut().insert(AuthenticatedKey { key: key_row });
    }

    Ok(next.run(req).await)
}

/// Require an authenticated API key on the request.
pub fn require_key(req: &Request) -> ApiResult<&AuthenticatedKey> {
    req.extensions()
        .get::<AuthenticatedKey>()
        .ok_or_else(|| ApiError::Unauthorized("missing api key".to_string()))
}
