//! Integration tests for form CRUD operations.

mod common;

use axum::http::StatusCode;
use common::TestServer;
use common::fixtures::{contact_schema, create_test_key, email_schema};
use serde_json::json;

// Helper to make JSON requests (duplicated for test isolation)
async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    api_key: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, body_json)
}

async fn create_form(server: &TestServer, key: &str, body: serde_json::Value) -> String {
    let (status, response) =
        json_request(&server.router, "POST", "/v1/forms", Some(body), Some(key)).await;
    assert_eq!(status, StatusCode::OK);
    response["form"]["form_id"]
        .as_str()
        .expect("form_id missing")
        .to_string()
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_form_with_schema_only() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    let body = json!({"schema": [{"name": "email", "required": true}]});
    let (status, response) =
        json_request(&server.router, "POST", "/v1/forms", Some(body), Some(&key)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["message"].as_str(),
        Some("Form created successfully")
    );
    assert!(response["form"]["form_id"].as_str().is_some());
    assert_eq!(response["form"]["version"].as_i64(), Some(1));
    // Unspecified field type defaults to text
    assert_eq!(response["form"]["schema"][0]["type"].as_str(), Some("text"));
}

#[tokio::test]
async fn test_create_form_with_name() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    let body = json!({"name": "Contact us", "schema": contact_schema()});
    let (status, response) =
        json_request(&server.router, "POST", "/v1/forms", Some(body), Some(&key)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["form"]["name"].as_str(), Some("Contact us"));
}

#[tokio::test]
async fn test_create_form_requires_auth() {
    let server = TestServer::new().await;

    let body = json!({"schema": email_schema()});
    let (status, response) =
        json_request(&server.router, "POST", "/v1/forms", Some(body), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(response["error"].as_str().is_some());
}

#[tokio::test]
async fn test_create_form_rejects_unknown_key() {
    let server = TestServer::new().await;

    let body = json!({"schema": email_schema()});
    let (status, _) = json_request(
        &server.router,
        "POST",
        "/v1/forms",
        Some(body),
        Some("not-a-real-key"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_form_invalid_schema_writes_nothing() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    // Empty schema is invalid
    let (status, response) = json_request(
        &server.router,
        "POST",
        "/v1/forms",
        Some(json!({"schema": []})),
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().is_some());

    // Duplicate field names are invalid
    let (status, _) = json_request(
        &server.router,
        "POST",
        "/v1/forms",
        Some(json!({"schema": [{"name": "a"}, {"name": "a"}]})),
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Neither attempt left a row behind
    let (status, response) =
        json_request(&server.router, "GET", "/v1/forms", None, Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["forms"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_create_form_rejects_malformed_json() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/forms")
        .header("X-Api-Key", &key)
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Get
// =============================================================================

#[tokio::test]
async fn test_get_form_roundtrip() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;
    let form_id = create_form(&server, &key, json!({"schema": contact_schema()})).await;

    let (status, response) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&key),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["form"]["form_id"].as_str(), Some(form_id.as_str()));
    assert_eq!(response["form"]["schema"].as_array().map(Vec::len), Some(5));
    assert!(response["form"]["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_get_unknown_form_returns_404() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    // Non-UUID identifiers are indistinguishable from unknown forms
    let (status, response) = json_request(
        &server.router,
        "GET",
        "/v1/forms/does-not-exist",
        None,
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(response["error"].as_str().is_some());

    // Well-formed but unknown UUID
    let (status, _) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{}", uuid::Uuid::new_v4()),
        None,
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_form_owned_by_other_key_is_forbidden() {
    let server = TestServer::new().await;
    let owner = create_test_key(&server, "owner").await;
    let intruder = create_test_key(&server, "intruder").await;
    let form_id = create_form(&server, &owner, json!({"schema": email_schema()})).await;

    let (status, response) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&intruder),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(response["error"].as_str().is_some());
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_forms_scoped_to_owner() {
    let server = TestServer::new().await;
    let alice = create_test_key(&server, "alice").await;
    let bob = create_test_key(&server, "bob").await;

    create_form(&server, &alice, json!({"name": "a1", "schema": email_schema()})).await;
    create_form(&server, &alice, json!({"name": "a2", "schema": email_schema()})).await;
    create_form(&server, &bob, json!({"name": "b1", "schema": email_schema()})).await;

    let (status, response) =
        json_request(&server.router, "GET", "/v1/forms", None, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    let forms = response["forms"].as_array().unwrap();
    assert_eq!(forms.len(), 2);
    // Most recent first
    assert_eq!(forms[0]["name"].as_str(), Some("a2"));
    assert_eq!(forms[1]["name"].as_str(), Some("a1"));

    let (_, response) = json_request(&server.router, "GET", "/v1/forms", None, Some(&bob)).await;
    assert_eq!(response["forms"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_list_forms_respects_limit() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    for i in 0..3 {
        create_form(
            &server,
            &key,
            json!({"name": format!("form-{i}"), "schema": email_schema()}),
        )
        .await;
    }

    let (status, response) =
        json_request(&server.router, "GET", "/v1/forms?limit=2", None, Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["forms"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_list_forms_stable_under_repeated_reads() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    for i in 0..4 {
        create_form(
            &server,
            &key,
            json!({"name": format!("form-{i}"), "schema": email_schema()}),
        )
        .await;
    }

    let (status, first) = json_request(&server.router, "GET", "/v1/forms", None, Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["forms"].as_array().map(Vec::len), Some(4));

    // No writes in between: a second read returns the identical body
    let (status, second) = json_request(&server.router, "GET", "/v1/forms", None, Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_list_forms_rejects_bad_cursor() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    let (status, _) = json_request(
        &server.router,
        "GET",
        "/v1/forms?before=yesterday",
        None,
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_form_replaces_schema() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;
    let form_id = create_form(&server, &key, json!({"schema": email_schema()})).await;

    let body = json!({"name": "Renamed", "schema": contact_schema()});
    let (status, response) = json_request(
        &server.router,
        "PUT",
        &format!("/v1/forms/{form_id}"),
        Some(body),
        Some(&key),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["message"].as_str(),
        Some("Form updated successfully")
    );
    assert_eq!(response["form"]["name"].as_str(), Some("Renamed"));
    assert_eq!(response["form"]["version"].as_i64(), Some(2));
    assert_eq!(response["form"]["schema"].as_array().map(Vec::len), Some(5));

    // The replacement is whole: the old single-field schema is gone
    let (_, response) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&key),
    )
    .await;
    assert_eq!(response["form"]["schema"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn test_update_unknown_form_returns_404() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;

    let (status, _) = json_request(
        &server.router,
        "PUT",
        &format!("/v1/forms/{}", uuid::Uuid::new_v4()),
        Some(json!({"schema": email_schema()})),
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_form_owned_by_other_key_is_forbidden() {
    let server = TestServer::new().await;
    let owner = create_test_key(&server, "owner").await;
    let intruder = create_test_key(&server, "intruder").await;
    let form_id = create_form(&server, &owner, json!({"schema": email_schema()})).await;

    let (status, _) = json_request(
        &server.router,
        "PUT",
        &format!("/v1/forms/{form_id}"),
        Some(json!({"schema": contact_schema()})),
        Some(&intruder),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_invalid_schema_leaves_form_unchanged() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;
    let form_id = create_form(&server, &key, json!({"schema": email_schema()})).await;

    let (status, _) = json_request(
        &server.router,
        "PUT",
        &format!("/v1/forms/{form_id}"),
        Some(json!({"schema": []})),
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Two fields with the same name
    let (status, _) = json_request(
        &server.router,
        "PUT",
        &format!("/v1/forms/{form_id}"),
        Some(json!({"schema": [{"name": "email"}, {"name": "email"}]})),
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, response) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&key),
    )
    .await;
    assert_eq!(response["form"]["version"].as_i64(), Some(1));
    assert_eq!(response["form"]["schema"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_stale_version_update_conflicts() {
    use formbox_store::error::StoreError;

    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;
    let form_id = create_form(&server, &key, json!({"schema": email_schema()})).await;

    // Simulate a concurrent writer by bumping the version under the handler
    let store = server.store();
    let mut row = store
        .get_form(form_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    let expected = row.version;
    row.version += 1;
    store.update_form(&row, expected).await.unwrap();

    // A store-level retry with the stale version surfaces the conflict
    let stale = store.update_form(&row, expected).await;
    assert!(matches!(stale, Err(StoreError::Conflict(_))));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_form_then_get_returns_404() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;
    let form_id = create_form(&server, &key, json!({"schema": email_schema()})).await;

    let (status, response) = json_request(
        &server.router,
        "DELETE",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["message"].as_str(),
        Some("Form deleted successfully")
    );

    let (status, _) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&key),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_form_is_idempotent() {
    let server = TestServer::new().await;
    let key = create_test_key(&server, "owner").await;
    let form_id = create_form(&server, &key, json!({"schema": email_schema()})).await;

    for _ in 0..2 {
        let (status, response) = json_request(
            &server.router,
            "DELETE",
            &format!("/v1/forms/{form_id}"),
            None,
            Some(&key),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response["message"].as_str(),
            Some("Form deleted successfully")
        );
    }
}

#[tokio::test]
async fn test_delete_form_owned_by_other_key_is_forbidden() {
    let server = TestServer::new().await;
    let owner = create_test_key(&server, "owner").await;
    let intruder = create_test_key(&server, "intruder").await;
    let form_id = create_form(&server, &owner, json!({"schema": email_schema()})).await;

    let (status, _) = json_request(
        &server.router,
        "DELETE",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&intruder),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Still there for the owner
    let (status, _) = json_request(
        &server.router,
        "GET",
        &format!("/v1/forms/{form_id}"),
        None,
        Some(&owner),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let (status, response) = json_request(&server.router, "GET", "/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"].as_str(), Some("ok"));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let server = TestServer::new().await;

    let (status, response) = json_request(&server.router, "GET", "/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(response["error"].as_str().is_some());
}
