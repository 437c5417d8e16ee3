//! Wizard router tests
//!
//! Requests go through `tower::ServiceExt::oneshot`; the platform is an
//! in-process axum stub on an ephemeral port.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use karma_sdk::Config;
use karma_web::{router, AppState, SESSION_COOKIE};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn spawn_stub(platform: Router) -> Config {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, platform).await.unwrap();
    });
    Config::with_base_url(format!("http://{addr}"))
}

fn platform(kyc_status: &'static str, terms_accepted: bool) -> Router {
    Router::new()
        .route(
            "/api/register",
            post(|| async { Json(json!({"account_id": "acc_1", "secret_key": "sk_live_new"})) }),
        )
        .route(
            "/api/kyc/status",
            get(move || async move { Json(json!({"status": kyc_status})) }),
        )
        .route(
            "/api/terms/status",
            get(move || async move { Json(json!({"accepted": terms_accepted})) }),
        )
        .route(
            "/api/cards",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "card_id": "card_1",
                    "agent_api_key": "sk_agent_abc",
                    "deposit_address": "Gx...1337",
                    "last4": "4821",
                    "name": body["name"],
                }))
            }),
        )
        .route(
            "/api/spend/balance",
            get(|| async {
                Json(json!({
                    "available": 0.0,
                    "balance": 0.0,
                    "pending_holds": 0.0,
                    "daily_remaining": 500.0,
                    "monthly_remaining": 2000.0,
                }))
            }),
        )
}

/// Minimal browser: carries the session cookie between requests
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    async fn new(platform: Router) -> Self {
        let config = spawn_stub(platform).await;
        Self {
            app: router(Arc::new(AppState::new(config))),
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn with_cookie(&self, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, String) {
        let request = self
            .with_cookie(Request::builder().uri(uri))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post(&mut self, uri: &str, form: &str) -> (StatusCode, String) {
        let request = self
            .with_cookie(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            )
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }
}

#[tokio::test]
async fn test_health_check() {
    let mut browser = Browser::new(Router::new()).await;
    let (status, body) = browser.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_first_visit_sets_session_cookie() {
    let mut browser = Browser::new(Router::new()).await;
    let (status, body) = browser.get("/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/dashboard/register""#));
    assert!(browser
        .cookie
        .as_deref()
        .unwrap()
        .starts_with(&format!("{SESSION_COOKIE}=")));
}

#[tokio::test]
async fn test_register_then_verification_form() {
    let mut browser = Browser::new(platform("not_started", false)).await;
    browser.get("/dashboard").await;

    let (status, _) = browser.post("/dashboard/register", "email=ann%40example.com").await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains("sk_live_new"));
    assert!(body.contains(r#"action="/dashboard/kyc""#));

    // The owner key notice is shown once
    let (_, body) = browser.get("/dashboard").await;
    assert!(!body.contains("sk_live_new"));
}

#[tokio::test]
async fn test_incomplete_identity_form_keeps_step() {
    let mut browser = Browser::new(platform("not_started", false)).await;
    browser.get("/dashboard").await;
    browser.post("/dashboard/register", "email=ann%40example.com").await;

    browser
        .post("/dashboard/kyc", "first_name=Ann&last_name=Lee&country=GB")
        .await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains("Date of birth is required."));
    assert!(body.contains(r#"action="/dashboard/kyc""#));
}

#[tokio::test]
async fn test_resume_lands_on_agreements() {
    let mut browser = Browser::new(platform("approved", false)).await;
    browser.get("/dashboard").await;

    browser.post("/dashboard/resume", "owner_key=sk_live_abc").await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains(r#"action="/dashboard/terms""#));
}

#[tokio::test]
async fn test_resume_with_terms_done_lands_on_card_form() {
    let mut browser = Browser::new(platform("approved", true)).await;
    browser.get("/dashboard").await;

    browser.post("/dashboard/resume", "owner_key=sk_live_abc").await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains(r#"action="/dashboard/cards""#));

    browser
        .post("/dashboard/cards", "name=Travel&per_txn=&daily=500&monthly=2000")
        .await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains("**** **** **** 4821"));
    assert!(body.contains("sk_agent_abc"));
    assert!(body.contains(r#"content="10""#));
}

#[tokio::test]
async fn test_resume_rejects_agent_key() {
    let mut browser = Browser::new(platform("approved", true)).await;
    browser.get("/dashboard").await;

    browser.post("/dashboard/resume", "owner_key=sk_agent_abc").await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains("Owner keys start with sk_live_."));
    assert!(body.contains(r#"action="/dashboard/register""#));
}

#[tokio::test]
async fn test_resume_with_failed_lookup_lands_on_kyc() {
    let mut browser = Browser::new(Router::new()).await;
    browser.get("/dashboard").await;

    browser.post("/dashboard/resume", "owner_key=sk_live_abc").await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains(r#"action="/dashboard/kyc""#));
}

#[tokio::test]
async fn test_agreements_require_every_box() {
    let mut browser = Browser::new(platform("approved", false)).await;
    browser.get("/dashboard").await;
    browser.post("/dashboard/resume", "owner_key=sk_live_abc").await;

    browser.post("/dashboard/terms", "esign=on&card_terms=on").await;
    let (_, body) = browser.get("/dashboard").await;
    assert!(body.contains("Please accept all agreements."));
    assert!(body.contains(r#"action="/dashboard/terms""#));
}
