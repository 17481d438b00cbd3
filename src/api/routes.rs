//! REST endpoints for the front-end and the report trigger.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::chat::{ChatProxy, ChatRequest};
use crate::diet::{DietPlanRequest, select_plan};
use crate::error::{RegistrationError, ReportError};
use crate::leads::{RegistrationOutcome, RegistrationPipeline, RegistrationRequest};
use crate::locale::Language;
use crate::report::DailyReporter;

/// Header carrying the shared secret for the report trigger.
pub const REPORT_TOKEN_HEADER: &str = "x-report-token";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RegistrationPipeline>,
    pub chat: Arc<ChatProxy>,
    pub reporter: Arc<DailyReporter>,
    /// Empty disables `POST /api/reports/daily`.
    pub report_token: SecretString,
}

/// Build the Axum router with all API routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/registrations", post(register))
        .route("/api/chat", post(chat))
        .route("/api/diet-plan", post(diet_plan))
        .route("/api/reports/daily", post(daily_report))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Error body: `{"success": false, "error": ...}`.
fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "code": code,
            "error": message.into(),
        })),
    )
        .into_response()
}

fn bad_json(rejection: JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, "invalid_payload", rejection.body_text())
}

fn registration_error(err: RegistrationError, language: Language) -> Response {
    match err {
        RegistrationError::Validation(msg) => {
            error_response(StatusCode::BAD_REQUEST, "validation", msg)
        }
        RegistrationError::Storage(e) => {
            warn!(error = %e, "Registration storage failure");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "storage_unavailable",
                language.registration_unavailable(),
            )
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Daily report failed");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            self.code(),
            "The daily report could not be completed.",
        )
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "care-leads"
    }))
}

// ── Registration ────────────────────────────────────────────────────────

/// POST /api/registrations
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_json(rejection),
    };
    let language = request.language;

    match state.pipeline.register(request).await {
        Ok(RegistrationOutcome::Created(reg)) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "id": reg.id,
                "status": reg.status,
            })),
        )
            .into_response(),
        Ok(RegistrationOutcome::Duplicate) => error_response(
            StatusCode::CONFLICT,
            "duplicate",
            language.duplicate_registration(),
        ),
        Err(e) => registration_error(e, language),
    }
}

// ── Chat ────────────────────────────────────────────────────────────────

/// POST /api/chat
///
/// Always 200 for a well-formed request; upstream failures come back as
/// `success: false` with a fallback message.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => Json(state.chat.respond(request).await).into_response(),
        Err(rejection) => bad_json(rejection),
    }
}

// ── Diet plan ───────────────────────────────────────────────────────────

/// POST /api/diet-plan
async fn diet_plan(payload: Result<Json<DietPlanRequest>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(req)) => {
            let plan = select_plan(req.age, req.gender, req.frailty);
            Json(json!({ "success": true, "plan": plan })).into_response()
        }
        Err(rejection) => bad_json(rejection),
    }
}

// ── Reports ─────────────────────────────────────────────────────────────

/// POST /api/reports/daily
///
/// Requires the configured shared secret in `x-report-token`.
async fn daily_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let expected = state.report_token.expose_secret();
    if expected.is_empty() {
        return error_response(
            StatusCode::FORBIDDEN,
            "report_trigger_disabled",
            "The report trigger is not enabled.",
        );
    }
    let provided = headers
        .get(REPORT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if provided != expected {
        warn!("Report trigger rejected: bad or missing token");
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid report token.");
    }

    match state.reporter.run().await {
        Ok(summary) => {
            info!(record_count = summary.record_count, "Daily report triggered via API");
            Json(summary).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ChatConfig;
    use crate::email::EmailDispatcher;
    use crate::email::dispatcher::testing::{RecordingMailer, recipients};
    use crate::store::{LibSqlBackend, RegistrationStore};

    const TOKEN: &str = "report-secret";

    async fn app() -> Router {
        app_with(RecordingMailer::default(), TOKEN).await
    }

    async fn app_with(mailer: RecordingMailer, report_token: &str) -> Router {
        let store: Arc<dyn RegistrationStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let dispatcher = Arc::new(EmailDispatcher::new(Arc::new(mailer), recipients()));
        let timeout = Duration::from_secs(5);
        let chat_config = ChatConfig {
            api_url: "http://127.0.0.1:9".into(),
            api_key: SecretString::from(String::new()),
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 100,
        };
        api_routes(AppState {
            pipeline: Arc::new(RegistrationPipeline::new(
                store.clone(),
                dispatcher.clone(),
                timeout,
            )),
            chat: Arc::new(ChatProxy::new(&chat_config, timeout).unwrap()),
            reporter: Arc::new(DailyReporter::new(store, dispatcher, timeout)),
            report_token: SecretString::from(report_token.to_string()),
        })
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        send(
            app,
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn trigger_report(app: Router, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut req = Request::post("/api/reports/daily");
        if let Some(token) = token {
            req = req.header(REPORT_TOKEN_HEADER, token);
        }
        send(app, req.body(Body::empty()).unwrap()).await
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let resp = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_name_is_bad_request() {
        let (status, body) = post_json(
            app().await,
            "/api/registrations",
            json!({"name": "", "email": "a@example.com", "relation": "self"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
    }

    #[tokio::test]
    async fn malformed_payload_is_bad_request() {
        let (status, body) = post_json(
            app().await,
            "/api/registrations",
            json!({"name": "Chan", "relation": "cousin-in-law"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn diet_plan_endpoint_returns_bundle() {
        let (status, body) = post_json(
            app().await,
            "/api/diet-plan",
            json!({"age": "75_84", "gender": "male", "frailty": "frail"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"]["key"], "frail");
    }

    #[tokio::test]
    async fn chat_without_key_returns_fallback_with_ok_status() {
        let (status, body) = post_json(
            app().await,
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "hello"}], "language": "en"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"]["role"], "assistant");
        assert!(!body["message"]["content"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_message_follows_request_language() {
        let app = app().await;
        let chan = json!({"name": "Chan", "email": "chan@example.com", "relation": "self"});
        let (status, _) = post_json(app.clone(), "/api/registrations", chan.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(app.clone(), "/api/registrations", chan.clone()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], Language::Zh.duplicate_registration());

        let mut english = chan;
        english["language"] = json!("en");
        let (_, body) = post_json(app, "/api/registrations", english).await;
        assert_eq!(body["error"], Language::En.duplicate_registration());
    }

    #[tokio::test]
    async fn report_trigger_requires_token() {
        let (status, body) = trigger_report(app().await, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        let (status, _) = trigger_report(app().await, Some("guess")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = trigger_report(app().await, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn report_trigger_disabled_without_configured_token() {
        let app = app_with(RecordingMailer::default(), "").await;
        let (status, body) = trigger_report(app, Some("")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "report_trigger_disabled");
    }

    #[tokio::test]
    async fn report_failure_hides_transport_detail() {
        let app = app_with(RecordingMailer::failing(), TOKEN).await;
        let (status, body) = trigger_report(app, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "report_send_failed");
        assert!(!body.to_string().contains("connection refused"));
    }
}
