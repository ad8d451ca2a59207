use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Create a client on `app` and return its id.
async fn create(app: &Router, body: &str) -> String {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/v2/clients", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let client: Value = body_json(resp).await;
    client["client_id"].as_str().unwrap().to_string()
}

// --- list ---

#[tokio::test]
async fn list_clients_empty_bare_array() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v2/clients"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let clients: Vec<Value> = body_json(resp).await;
    assert!(clients.is_empty());
}

#[tokio::test]
async fn list_clients_with_totals_paginates() {
    let app = app();
    for name in ["a", "b", "c"] {
        create(&app, &format!(r#"{{"name":"{name}"}}"#)).await;
    }

    let resp = app
        .oneshot(empty_request(
            "GET",
            "/api/v2/clients?per_page=2&page=1&include_totals=true",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["start"], 2);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["length"], 1);
    assert_eq!(page["total"], 3);
    assert_eq!(page["clients"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_clients_huge_page_is_empty() {
    let app = app();
    create(&app, r#"{"name":"a"}"#).await;

    let resp = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/v2/clients?per_page=50&page={}", usize::MAX),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let clients: Vec<Value> = body_json(resp).await;
    assert!(clients.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_client_assigns_id_and_secret() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v2/clients",
            r#"{"name":"My App","app_type":"spa"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let client: Value = body_json(resp).await;
    assert_eq!(client["name"], "My App");
    assert_eq!(client["app_type"], "spa");
    assert!(client["client_id"].is_string());
    assert!(client["client_secret"].is_string());
}

#[tokio::test]
async fn create_client_requires_name() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v2/clients", r#"{"app_type":"spa"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "Missing required property: name");
}

#[tokio::test]
async fn create_client_rejects_string_lifetime() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v2/clients",
            r#"{"name":"x","jwt_configuration":{"lifetime_in_seconds":"3600"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get ---

#[tokio::test]
async fn get_client_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v2/clients/missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn legacy_tenant_returns_string_lifetime() {
    let app = app_with(Config {
        legacy_lifetime_strings: true,
    });
    let id = create(
        &app,
        r#"{"name":"legacy","jwt_configuration":{"lifetime_in_seconds":36000,"alg":"RS256"}}"#,
    )
    .await;

    let resp = app
        .oneshot(empty_request("GET", &format!("/api/v2/clients/{id}")))
        .await
        .unwrap();

    let client: Value = body_json(resp).await;
    assert_eq!(client["jwt_configuration"]["lifetime_in_seconds"], "36000");
    assert_eq!(client["jwt_configuration"]["alg"], "RS256");
}

// --- update ---

#[tokio::test]
async fn update_client_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/api/v2/clients/missing", r#"{"name":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_client_merges_fields_and_metadata() {
    let app = app();
    let id = create(
        &app,
        r#"{"name":"before","sso":true,"client_metadata":{"team":"a","tier":"gold"}}"#,
    )
    .await;

    let resp = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v2/clients/{id}"),
            r#"{"name":"after","client_metadata":{"tier":null,"region":"eu"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let client: Value = body_json(resp).await;
    assert_eq!(client["name"], "after");
    assert_eq!(client["sso"], true);
    assert_eq!(client["client_metadata"], json!({"team": "a", "region": "eu"}));
}

#[tokio::test]
async fn update_client_rejects_client_id() {
    let app = app();
    let id = create(&app, r#"{"name":"x"}"#).await;

    let resp = app
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v2/clients/{id}"),
            r#"{"client_id":"other"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- rotate secret ---

#[tokio::test]
async fn rotate_secret_changes_secret() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/v2/clients", r#"{"name":"x"}"#))
        .await
        .unwrap();
    let created: Value = body_json(resp).await;
    let id = created["client_id"].as_str().unwrap();

    let resp = app
        .oneshot(empty_request("POST", &format!("/api/v2/clients/{id}/rotate-secret")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let rotated: Value = body_json(resp).await;
    assert_ne!(rotated["client_secret"], created["client_secret"]);
}

// --- delete ---

#[tokio::test]
async fn delete_client_returns_204_with_empty_body() {
    let app = app();
    let id = create(&app, r#"{"name":"x"}"#).await;

    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/v2/clients/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app
        .oneshot(empty_request("DELETE", &format!("/api/v2/clients/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- credentials ---

#[tokio::test]
async fn credential_lifecycle() {
    let app = app();
    let id = create(&app, r#"{"name":"x"}"#).await;
    let base = format!("/api/v2/clients/{id}/credentials");

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &base,
            r#"{"name":"key","credential_type":"public_key","pem":"PEM","alg":"RS256"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    assert!(created.get("pem").is_none());
    let credential_id = created["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("{base}/{credential_id}"),
            r#"{"expires_at":"2030-01-01T00:00:00Z"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["expires_at"], "2030-01-01T00:00:00Z");
    assert_eq!(updated["kid"], created["kid"]);

    let resp = app
        .clone()
        .oneshot(empty_request("GET", &base))
        .await
        .unwrap();
    let listed: Vec<Value> = body_json(resp).await;
    assert_eq!(listed.len(), 1);

    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("{base}/{credential_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(empty_request("GET", &format!("{base}/{credential_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn credential_update_rejects_other_fields() {
    let app = app();
    let id = create(&app, r#"{"name":"x"}"#).await;
    let base = format!("/api/v2/clients/{id}/credentials");
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &base,
            r#"{"credential_type":"public_key","pem":"PEM"}"#,
        ))
        .await
        .unwrap();
    let created: Value = body_json(resp).await;
    let credential_id = created["id"].as_str().unwrap();

    let resp = app
        .oneshot(json_request(
            "PATCH",
            &format!("{base}/{credential_id}"),
            r#"{"name":"renamed","expires_at":"2030-01-01T00:00:00Z"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_credential_missing_pem_returns_422() {
    let app = app();
    let id = create(&app, r#"{"name":"x"}"#).await;

    let resp = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v2/clients/{id}/credentials"),
            r#"{"credential_type":"public_key"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
