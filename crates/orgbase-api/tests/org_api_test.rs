//! End-to-end tests for the organization API over the in-memory store

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use orgbase_api::{ApiServer, ApiServerConfig};
use orgbase_auth::TokenService;
use orgbase_control::LifecycleManager;
use orgbase_store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()

async fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let manager = Arc::new(LifecycleManager::new(store));
    manager.bootstrap().await.expect("bootstrap");

    let tokens = Arc::new(TokenService::new(
        b"api-test-secret",
        Duration::minutes(30),
    ));

    ApiServer::new(ApiServerConfig::default(), manager, tokens).build_router()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_org(app: &Router, name: &str, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orgs",
            json!({
                "organization_name": name,
                "email": email,
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

async fn login(app: &Router, email: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_get_organization() {
    let app = test_app().await;

    let created = create_org(&app, "TechCorp", "admin@techcorp.com").await;
    assert_eq!(created["organization_name"], "TechCorp");
    assert_eq!(created["storage_unit_id"], "org_techcorp");
    assert_eq!(created["admin_email"], "admin@techcorp.com");
    assert!(created["organization_id"].as_str().is_some());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orgs/TechCorp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["organization_name"], "TechCorp");
    assert_eq!(body["status"], "active");
    assert_eq!(body["organization_id"], created["organization_id"]);
}

#[tokio::test]
async fn test_get_unknown_organization_returns_404() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orgs/Nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["code"], "ORG_NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_name_returns_400() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/orgs",
            json!({
                "organization_name": "TechCorp",
                "email": "other@techcorp.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["code"], "NAME_EXISTS");
}

#[tokio::test]
async fn test_duplicate_email_returns_400() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/orgs",
            json!({
                "organization_name": "Globex",
                "email": "a@techcorp.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["code"], "EMAIL_EXISTS");
}

#[tokio::test]
async fn test_create_input_validation() {
    let app = test_app().await;

    // Name too short
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orgs",
            json!({
                "organization_name": "ab",
                "email": "a@techcorp.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["code"], "INVALID_NAME");

    // Password too short
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orgs",
            json!({
                "organization_name": "TechCorp",
                "email": "a@techcorp.com",
                "password": "short",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["code"], "WEAK_PASSWORD");

    // Malformed email
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/orgs",
            json!({
                "organization_name": "TechCorp",
                "email": "not-an-email",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["code"], "INVALID_EMAIL");
}

#[tokio::test]
async fn test_login_issues_scoped_token() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let response = login(&app, "a@techcorp.com", "SecurePass123").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().unwrap().contains('.'));
    assert!(body["expires_at"].as_i64().unwrap() > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn test_login_with_bad_credentials_returns_401() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let response = login(&app, "a@techcorp.com", "WrongPass123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_json(response).await["code"], "INVALID_CREDENTIALS");

    let response = login(&app, "ghost@nowhere.com", "SecurePass123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rename_with_valid_credentials() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/orgs/TechCorp",
            json!({
                "new_organization_name": "TechCorpGlobal",
                "email": "a@techcorp.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["organization_name"], "TechCorpGlobal");
    assert_eq!(body["storage_unit_id"], "org_techcorpglobal");

    // Old name is gone, new name resolves
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/orgs/TechCorp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orgs/TechCorpGlobal")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rename_with_wrong_credentials_returns_403() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;
    create_org(&app, "Globex", "b@globex.com").await;

    // Wrong password
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/orgs/TechCorp",
            json!({
                "new_organization_name": "NewName",
                "email": "a@techcorp.com",
                "password": "WrongPass123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response_json(response).await["code"], "FORBIDDEN");

    // Admin of another organization
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/orgs/TechCorp",
            json!({
                "new_organization_name": "NewName",
                "email": "b@globex.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rename_onto_taken_name_returns_400() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;
    create_org(&app, "Globex", "b@globex.com").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/orgs/TechCorp",
            json!({
                "new_organization_name": "Globex",
                "email": "a@techcorp.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["code"], "NAME_EXISTS");
}

#[tokio::test]
async fn test_delete_requires_bearer_token() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/orgs/TechCorp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_json(response).await["code"], "MISSING_AUTH");
}

#[tokio::test]
async fn test_delete_with_own_token_succeeds() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let login_body = response_json(login(&app, "a@techcorp.com", "SecurePass123").await).await;
    let token = login_body["access_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/orgs/TechCorp")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Organization is gone
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orgs/TechCorp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_with_foreign_token_returns_403() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;
    create_org(&app, "Globex", "b@globex.com").await;

    let login_body = response_json(login(&app, "b@globex.com", "SecurePass123").await).await;
    let token = login_body["access_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/orgs/TechCorp")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Target untouched
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orgs/TechCorp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_token_outlives_rename_of_its_organization() {
    let app = test_app().await;
    create_org(&app, "TechCorp", "a@techcorp.com").await;

    let login_body = response_json(login(&app, "a@techcorp.com", "SecurePass123").await).await;
    let token = login_body["access_token"].as_str().unwrap().to_string();

    // Rename after the token was issued
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/orgs/TechCorp",
            json!({
                "new_organization_name": "TechCorpGlobal",
                "email": "a@techcorp.com",
                "password": "SecurePass123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The token is still scoped to the old name, so it no longer authorizes
    // actions on the renamed organization.
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/orgs/TechCorpGlobal")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
