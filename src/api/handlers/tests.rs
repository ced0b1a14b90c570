//! Router tests driven through `tower::ServiceExt::oneshot`.

use crate::api::router;
use crate::auth::{password::CredentialHasher, AuthConfig, AuthService, FixedClock};
use crate::store::{memory::MemoryStore, Store};
use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use session_token::HmacKey;
use std::sync::Arc;
use tower::ServiceExt;

const NOW: i64 = 1_700_000_000;

struct TestApp {
    store: Arc<MemoryStore>,
    app: Router,
}

fn test_app() -> Result<TestApp> {
    let store = Arc::new(MemoryStore::new());
    let config = AuthConfig::new(HmacKey::new(b"router-tests-key".to_vec())?)
        .with_hasher(CredentialHasher::with_cost(1024, 1, 1)?);
    let auth = Arc::new(AuthService::new(
        store.clone(),
        &config,
        Arc::new(FixedClock::new(NOW)),
    )?);
    let app = router(auth, store.clone() as Arc<dyn Store>);
    Ok(TestApp { store, app })
}

async fn send(app: &Router, request: Request<Body>) -> Result<Response> {
    Ok(app.clone().oneshot(request).await?)
}

fn post_json(uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn get(uri: &str) -> Result<Request<Body>> {
    Ok(Request::builder().uri(uri).body(Body::empty())?)
}

async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

async fn body_json(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn signup(app: &Router, name: &str, email: &str, password: &str) -> Result<Response> {
    send(
        app,
        post_json(
            "/signup",
            &json!({"name": name, "email": email, "password": password}),
        )?,
    )
    .await
}

async fn login_token(app: &Router, email: &str, password: &str) -> Result<String> {
    let response = send(
        app,
        post_json("/login", &json!({"email": email, "password": password}))?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response should carry a token")
}

#[tokio::test]
async fn root_greets() -> Result<()> {
    let test = test_app()?;
    let response = send(&test.app, get("/")?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.starts_with("bouquet"));
    Ok(())
}

#[tokio::test]
async fn signup_login_and_me() -> Result<()> {
    let test = test_app()?;

    let response = signup(&test.app, "Ann", "ann@x.com", "pw123").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        json!({"message": "User created successfully"})
    );

    let token = login_token(&test.app, "ann@x.com", "pw123").await?;

    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let response = send(&test.app, request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        json!({"id": 1, "email": "ann@x.com"})
    );
    Ok(())
}

#[tokio::test]
async fn signup_duplicate_email_is_conflict() -> Result<()> {
    let test = test_app()?;
    signup(&test.app, "Ann", "ann@x.com", "pw123").await?;

    let response = signup(&test.app, "Ann", "ann@x.com", "other").await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(response).await?, "Email already in use");
    assert_eq!(test.store.writes(), 1);
    Ok(())
}

#[tokio::test]
async fn signup_rejects_bad_input() -> Result<()> {
    let test = test_app()?;

    let missing_body = Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .body(Body::empty())?;
    let response = send(&test.app, missing_body).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let not_json = Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = send(&test.app, not_json).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for (name, email, password) in [
        ("", "ann@x.com", "pw123"),
        ("Ann", "not-an-email", "pw123"),
        ("Ann", "ann@x.com", ""),
    ] {
        let response = signup(&test.app, name, email, password).await?;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{name:?} {email:?}"
        );
    }

    assert_eq!(test.store.writes(), 0);
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_input() -> Result<()> {
    let test = test_app()?;
    signup(&test.app, "Ann", "ann@x.com", "pw123").await?;

    let missing_body = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .body(Body::empty())?;
    let response = send(&test.app, missing_body).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let not_json = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = send(&test.app, not_json).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &test.app,
        post_json("/login", &json!({"email": "ann@x.com"}))?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &test.app,
        post_json("/login", &json!({"email": "not-an-email", "password": "pw123"}))?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Invalid email");

    let response = send(
        &test.app,
        post_json("/login", &json!({"email": "ann@x.com", "password": ""}))?,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Invalid password");
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let test = test_app()?;
    signup(&test.app, "Ann", "ann@x.com", "pw123").await?;

    let wrong_password = send(
        &test.app,
        post_json("/login", &json!({"email": "ann@x.com", "password": "nope"}))?,
    )
    .await?;
    let unknown_email = send(
        &test.app,
        post_json("/login", &json!({"email": "bob@x.com", "password": "pw123"}))?,
    )
    .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(wrong_password).await?, "Invalid credentials");
    assert_eq!(body_text(unknown_email).await?, "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn store_outage_is_server_error() -> Result<()> {
    let test = test_app()?;
    test.store.set_unavailable(true);

    let response = signup(&test.app, "Ann", "ann@x.com", "pw123").await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await?, "Internal server error");

    let response = send(&test.app, get("/users")?).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn me_rejects_missing_and_bad_tokens() -> Result<()> {
    let test = test_app()?;
    signup(&test.app, "Ann", "ann@x.com", "pw123").await?;
    let token = login_token(&test.app, "ann@x.com", "pw123").await?;
    let mut tampered = token.clone();
    tampered.push('x');

    let response = send(&test.app, get("/me")?).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for value in [
        "Bearer garbage".to_string(),
        format!("Bearer {tampered}"),
        format!("Basic {token}"),
        "Bearer ".to_string(),
    ] {
        let request = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, value.as_str())
            .body(Body::empty())?;
        let response = send(&test.app, request).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(body_text(response).await?, "Unauthorized");
    }
    Ok(())
}

#[tokio::test]
async fn users_listing_hides_credentials() -> Result<()> {
    let test = test_app()?;

    let response = send(&test.app, get("/users")?).await?;
    assert_eq!(body_json(response).await?, json!([]));

    signup(&test.app, "Ann", "ann@x.com", "pw123").await?;
    signup(&test.app, "Bob", "bob@x.com", "hunter2").await?;

    let response = send(&test.app, get("/users")?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await?,
        json!([
            {"id": 1, "name": "Ann", "email": "ann@x.com"},
            {"id": 2, "name": "Bob", "email": "bob@x.com"},
        ])
    );
    Ok(())
}

#[tokio::test]
async fn products_create_and_list() -> Result<()> {
    let test = test_app()?;

    let response = send(&test.app, get("/get-products")?).await?;
    assert_eq!(body_json(response).await?, json!([]));

    let rose = json!({
        "id": "rose-1",
        "name": "Red Rose",
        "description": "A dozen red roses",
        "image": "/img/rose.png",
        "price": 30.0,
        "discountedPrice": 25.5,
        "rating": 4.5,
        "tags": ["roses", "red", "roses"],
        "isNew": true,
        "isBestseller": false
    });
    let response = send(&test.app, post_json("/products", &rose)?).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await?,
        json!({"message": "Product created successfully"})
    );

    let response = send(&test.app, post_json("/products", &rose)?).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&test.app, get("/get-products")?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?, json!([rose]));
    Ok(())
}

#[tokio::test]
async fn products_require_id_and_name() -> Result<()> {
    let test = test_app()?;

    for body in [
        json!({"name": "No id"}),
        json!({"id": "p1"}),
        json!({"id": "  ", "name": "Blank id"}),
    ] {
        let response = send(&test.app, post_json("/products", &body)?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(test.store.writes(), 0);
    Ok(())
}

#[tokio::test]
async fn health_reports_store_state() -> Result<()> {
    let test = test_app()?;

    let response = send(&test.app, get("/health")?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let x_app = response
        .headers()
        .get("X-App")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .context("X-App header")?;
    assert!(x_app.starts_with(concat!("bouquet:", env!("CARGO_PKG_VERSION"), ":")));
    let body = body_json(response).await?;
    assert_eq!(body["database"], "ok");
    assert_eq!(body["name"], "bouquet");

    let options = Request::builder()
        .method(Method::OPTIONS)
        .uri("/health")
        .body(Body::empty())?;
    let response = send(&test.app, options).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.is_empty());

    test.store.set_unavailable(true);
    let response = send(&test.app, get("/health")?).await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await?["database"], "error");
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_or_propagated() -> Result<()> {
    let test = test_app()?;

    let response = send(&test.app, get("/")?).await?;
    let generated = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .context("generated request id")?;
    assert_eq!(generated.len(), 26);

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "client-supplied")
        .body(Body::empty())?;
    let response = send(&test.app, request).await?;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("client-supplied")
    );
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() -> Result<()> {
    let test = test_app()?;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/signup")
        .header(header::ORIGIN, "https://shop.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())?;
    let response = send(&test.app, request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    Ok(())
}
