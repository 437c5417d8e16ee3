//! Wizard routes
//!
//! Every form posts to `/dashboard/...`, updates the browser's session and
//! redirects back to `GET /dashboard`, which renders whatever step the
//! session is on. Platform failures become an inline message and the
//! session keeps its step.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use karma_sdk::{Config, CredentialScope, KarmaAgent, KarmaOwner, Registration};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::pages;
use crate::wizard::{
    landing_step, AgreementsForm, CardForm, KycForm, RegisterForm, ResumeForm, Session,
    VerifyForm, WizardStep,
};

pub const SESSION_COOKIE: &str = "karma_session";

/// One browser's session. Requests on the same cookie take turns.
type SharedSession = Arc<Mutex<Session>>;

/// Application state
pub struct AppState {
    config: Config,
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of browsers with wizard progress
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// The session for `id`, if a form has ever been posted with it
    async fn existing(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// The session for `id`, created on first use
    async fn session(&self, id: Uuid) -> SharedSession {
        self.sessions.write().await.entry(id).or_default().clone()
    }

    fn owner(&self, session: &Session) -> Option<KarmaOwner> {
        let key = session.owner_key.as_deref()?;
        KarmaOwner::with_config(key, &self.config).ok()
    }
}

/// Wizard and health routes. Static pages are mounted by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    let wizard = Router::new()
        .route("/register", post(register))
        .route("/register/verify", post(verify_registration))
        .route("/resume", post(resume))
        .route("/kyc", post(submit_kyc))
        .route("/terms", post(accept_terms))
        .route("/cards", post(create_card))
        .route("/reset", post(reset));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/dashboard", get(show))
        .nest("/dashboard", wizard)
        .with_state(state)
}

/// Session id from the cookie, or a fresh one set on the jar
fn session_id(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), id)
}

fn back_to_wizard(jar: CookieJar) -> Response {
    (jar, Redirect::to("/dashboard")).into_response()
}

/// GET /api/health - Health check endpoint
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        r#"{"status":"healthy","service":"karma-web"}"#,
    )
}

/// GET /dashboard - render the current step, refreshing remote status first.
///
/// A browser that has never posted a form sees the first step and leaves
/// nothing behind.
async fn show(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, id) = session_id(jar);
    let Some(shared) = state.existing(id).await else {
        let html = pages::render(&Session::default(), None, None);
        return (jar, Html(html)).into_response();
    };
    let mut session = shared.lock().await;

    let step = session.step;
    match step {
        WizardStep::Kyc if session.kyc_url.is_some() => refresh_kyc(&state, &mut session).await,
        WizardStep::Dashboard => refresh_balance(&state, &mut session).await,
        _ => {}
    }

    let (notice, error) = session.take_messages();
    let html = pages::render(&session, notice.as_deref(), error.as_deref());
    (jar, Html(html)).into_response()
}

async fn refresh_kyc(state: &AppState, session: &mut Session) {
    let Some(owner) = state.owner(session) else {
        return;
    };
    match owner.kyc_status().await {
        Ok(reply) if reply.status.is_approved() => {
            info!("verification approved");
            session.kyc_url = None;
            session.advance(WizardStep::Agreements);
        }
        Ok(reply) if reply.status.is_terminal() => {
            session.kyc_url = None;
            session.fail(format!(
                "Verification {}: {}",
                reply.status,
                reply.reason.as_deref().unwrap_or("unknown")
            ));
        }
        Ok(reply) => debug!(status = %reply.status, "verification still pending"),
        Err(err) => debug!(error = %err, "verification status check failed"),
    }
}

async fn refresh_balance(state: &AppState, session: &mut Session) {
    let Some(key) = session.card.as_ref().map(|c| c.agent_api_key.clone()) else {
        return;
    };
    let balance = match KarmaAgent::with_config(key, &state.config) {
        Ok(agent) => agent.balance().await,
        Err(err) => Err(err),
    };
    match balance {
        Ok(balance) => session.balance = Some(balance),
        Err(err) => debug!(error = %err, "balance refresh failed"),
    }
}

/// POST /dashboard/register
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let (jar, id) = session_id(jar);
    let shared = state.session(id).await;
    let mut session = shared.lock().await;
    let email = form.email.trim().to_string();

    if email.is_empty() {
        session.fail("Email is required.");
    } else {
        match KarmaOwner::register(&state.config, &email).await {
            Ok(Registration::Registered(credentials)) => {
                info!(account_id = %credentials.account_id, "registered");
                session.notice = Some(owner_key_notice(&credentials.secret_key));
                session.email = Some(email);
                session.signed_in(credentials.secret_key, WizardStep::Kyc);
            }
            Ok(Registration::OtpRequired { email: sent_to }) => {
                session.email = Some(email);
                session.otp_sent_to = Some(sent_to);
                session.error = None;
            }
            Err(err) => session.fail(err.to_string()),
        }
    }

    back_to_wizard(jar)
}

/// POST /dashboard/register/verify
async fn verify_registration(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<VerifyForm>,
) -> Response {
    let (jar, id) = session_id(jar);
    let shared = state.session(id).await;
    let mut session = shared.lock().await;

    match session.email.clone() {
        None => session.fail("Start with your email address."),
        Some(email) => {
            match KarmaOwner::verify_registration(&state.config, &email, form.code.trim()).await {
                Ok(credentials) => {
                    info!(account_id = %credentials.account_id, "registered");
                    session.notice = Some(owner_key_notice(&credentials.secret_key));
                    session.signed_in(credentials.secret_key, WizardStep::Kyc);
                }
                Err(err) => session.fail(err.to_string()),
            }
        }
    }

    back_to_wizard(jar)
}

fn owner_key_notice(key: &str) -> String {
    format!("Your owner key: {key}. Save it now; it is shown only once.")
}

/// POST /dashboard/resume - continue with an existing owner key
async fn resume(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ResumeForm>,
) -> Response {
    let (jar, id) = session_id(jar);
    let shared = state.session(id).await;
    let mut session = shared.lock().await;
    let key = form.owner_key.trim().to_string();

    if !CredentialScope::Owner.admits(&key) {
        session.fail(format!(
            "Owner keys start with {}.",
            CredentialScope::Owner.prefix()
        ));
    } else {
        let step = match KarmaOwner::with_config(key.as_str(), &state.config) {
            Ok(owner) => {
                let kyc = owner.kyc_status().await.ok().map(|r| r.status);
                let terms = match kyc {
                    Some(status) if status.is_approved() => {
                        owner.terms_status().await.ok().map(|t| t.accepted)
                    }
                    _ => None,
                };
                landing_step(kyc, terms)
            }
            Err(err) => {
                warn!(error = %err, "could not build owner client");
                WizardStep::Kyc
            }
        };
        session.signed_in(key, step);
    }

    back_to_wizard(jar)
}

/// POST /dashboard/kyc
async fn submit_kyc(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<KycForm>,
) -> Response {
    let (jar, id) = session_id(jar);
    let shared = state.session(id).await;
    let mut session = shared.lock().await;

    match (state.owner(&session), form.validate(session.email.clone())) {
        (None, _) => session.fail("Register or enter your owner key first."),
        (_, Err(message)) => session.fail(message),
        (Some(owner), Ok(request)) => match owner.submit_kyc(&request).await {
            Ok(reply) if reply.status.is_approved() => session.advance(WizardStep::Agreements),
            Ok(reply) => match reply.kyc_url {
                Some(url) => {
                    session.kyc_url = Some(url);
                    session.error = None;
                }
                None if reply.status.is_terminal() => session.fail(format!(
                    "Verification {}: {}",
                    reply.status,
                    reply.reason.as_deref().unwrap_or("unknown")
                )),
                None => session.fail("Verification is in progress. Try again shortly."),
            },
            Err(err) => session.fail(err.to_string()),
        },
    }

    back_to_wizard(jar)
}

/// POST /dashboard/terms
async fn accept_terms(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<AgreementsForm>,
) -> Response {
    let (jar, id) = session_id(jar);
    let shared = state.session(id).await;
    let mut session = shared.lock().await;

    match state.owner(&session) {
        None => session.fail("Register or enter your owner key first."),
        Some(_) if !form.all_accepted() => session.fail("Please accept all agreements."),
        Some(owner) => match owner.accept_terms().await {
            Ok(reply) if reply.accepted => session.advance(WizardStep::CreateCard),
            Ok(_) => session.fail("Terms acceptance was not recorded."),
            Err(err) => session.fail(err.to_string()),
        },
    }

    back_to_wizard(jar)
}

/// POST /dashboard/cards
async fn create_card(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CardForm>,
) -> Response {
    let (jar, id) = session_id(jar);
    let shared = state.session(id).await;
    let mut session = shared.lock().await;

    match state.owner(&session) {
        None => session.fail("Register or enter your owner key first."),
        Some(owner) => match owner.create_card(&form.to_request()).await {
            Ok(card) => {
                info!(card_id = %card.card_id, "card created");
                session.card = Some(card);
                session.advance(WizardStep::Dashboard);
            }
            Err(err) => session.fail(err.to_string()),
        },
    }

    back_to_wizard(jar)
}

/// POST /dashboard/reset - forget this browser's wizard progress
async fn reset(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, id) = session_id(jar);
    state.sessions.write().await.remove(&id);
    back_to_wizard(jar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    fn app() -> (Arc<AppState>, Router) {
        // Nothing in these tests reaches the platform
        let state = Arc::new(AppState::new(Config::with_base_url("http://127.0.0.1:1")));
        (state.clone(), router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (Option<String>, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (cookie, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_dashboard(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/dashboard");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(form.to_string())).unwrap()
    }

    fn cookie_id(cookie: &str) -> Uuid {
        let value = cookie.trim_start_matches(SESSION_COOKIE).trim_start_matches('=');
        Uuid::parse_str(value).unwrap()
    }

    #[tokio::test]
    async fn test_cookieless_visits_leave_no_sessions() {
        let (state, app) = app();

        for _ in 0..200 {
            let (cookie, body) = send(&app, get_dashboard(None)).await;
            assert!(cookie.is_some());
            assert!(body.contains(r#"action="/dashboard/register""#));
        }
        assert_eq!(state.session_count().await, 0);

        // A posted form is what creates one
        let (cookie, _) = send(&app, post_form("/dashboard/register", None, "email=")).await;
        assert_eq!(state.session_count().await, 1);

        let (_, body) = send(&app, get_dashboard(cookie.as_deref())).await;
        assert!(body.contains("Email is required."));
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_reset_wins_over_request_in_flight() {
        let (state, app) = app();
        let (cookie, _) = send(&app, post_form("/dashboard/register", None, "email=")).await;
        let cookie = cookie.unwrap();
        let id = cookie_id(&cookie);

        // A slow request holds the session while the browser resets
        let in_flight = state.existing(id).await.unwrap();
        let mut held = in_flight.lock().await;

        send(&app, post_form("/dashboard/reset", Some(&cookie), "")).await;

        held.owner_key = Some("sk_live_stale".into());
        held.step = WizardStep::Dashboard;
        drop(held);

        assert_eq!(state.session_count().await, 0);
        let (_, body) = send(&app, get_dashboard(Some(&cookie))).await;
        assert!(body.contains(r#"action="/dashboard/register""#));
    }

    #[tokio::test]
    async fn test_requests_on_one_cookie_take_turns() {
        let (state, app) = app();
        let (cookie, _) = send(&app, post_form("/dashboard/register", None, "email=")).await;
        let cookie = cookie.unwrap();
        let id = cookie_id(&cookie);

        let in_flight = state.existing(id).await.unwrap();
        let mut held = in_flight.lock().await;

        let waiting = tokio::spawn({
            let app = app.clone();
            let cookie = cookie.clone();
            async move { send(&app, get_dashboard(Some(&cookie))).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!waiting.is_finished());

        held.fail("written by the earlier request");
        drop(held);

        let (_, body) = waiting.await.unwrap();
        assert!(body.contains("written by the earlier request"));
    }
}
