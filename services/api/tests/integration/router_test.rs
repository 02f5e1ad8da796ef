//! Router-level tests for paths that answer before reaching the store.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower::ServiceExt;

use foodgram_api::router::build_router;
use foodgram_api::state::AppState;
use foodgram_testing::auth::MockAuth;
use foodgram_testing::request::{build, json_body};

fn app() -> Router {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
    };
    build_router(state, 1024 * 1024)
}

#[tokio::test]
async fn healthz_returns_200_with_request_id() {
    let response = app()
        .oneshot(build(Method::GET, "/healthz", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_propagate_client_request_id() {
    let request = Request::builder()
        .uri("/healthz")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn readyz_returns_503_when_store_is_down() {
    let response = app()
        .oneshot(build(Method::GET, "/readyz", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_require_identity_for_writes() {
    for (method, uri) in [
        (Method::POST, "/recipes"),
        (Method::PATCH, "/recipes/1"),
        (Method::DELETE, "/recipes/1"),
        (Method::POST, "/recipes/1/favorite"),
        (Method::DELETE, "/recipes/1/shopping_cart"),
        (Method::GET, "/recipes/download_shopping_cart"),
        (Method::GET, "/users/me"),
        (Method::GET, "/users/subscriptions"),
    ] {
        let response = app()
            .oneshot(build(method.clone(), uri, None, Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        let body = json_body(response).await;
        assert_eq!(body["kind"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn should_forbid_catalog_writes_for_regular_user() {
    let auth = MockAuth::user();
    for uri in ["/tags", "/ingredients"] {
        let response = app()
            .oneshot(build(
                Method::POST,
                uri,
                Some(&auth),
                Some(json!({"name": "Salt", "measurement_unit": "g", "slug": "salt"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["kind"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn should_answer_malformed_body_with_missing_data() {
    let auth = MockAuth::user();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/recipes")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-foodgram-user-id", auth.user_id.to_string())
        .header("x-foodgram-user-role", "0")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "MISSING_DATA");
    assert_eq!(body["message"], "missing data");
}

#[tokio::test]
async fn should_reject_recipe_without_ingredients() {
    let auth = MockAuth::user();
    let response = app()
        .oneshot(build(
            Method::POST,
            "/recipes",
            Some(&auth),
            Some(json!({
                "ingredients": [],
                "tags": [1],
                "image": "data:image/png;base64,iVBORw0KGgo=",
                "name": "Soup",
                "text": "Boil.",
                "cooking_time": 5
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "NO_INGREDIENTS");
    assert_eq!(body["message"], "at least one ingredient required");
}

#[tokio::test]
async fn should_reject_unknown_boolean_flag() {
    let response = app()
        .oneshot(build(
            Method::GET,
            "/recipes?is_favorited=maybe",
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "INVALID_QUERY");
}

#[tokio::test]
async fn should_treat_non_numeric_recipe_id_as_not_found() {
    let response = app()
        .oneshot(build(Method::GET, "/recipes/abc", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "RECIPE_NOT_FOUND");
}
