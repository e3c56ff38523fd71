use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::assistant::{
    build_prompt, resolve_tone, Action, CompletionClient, CompletionConfig, CompletionProvider,
};
use crate::config::constants::{HISTORY_PAGE_SIZE, MAX_TEXT_LENGTH, WEB_CHECK_HEADROOM};
use crate::config::AppConfig;
use crate::error::{Result, WordcraftError};
use crate::history::{HistoryStore, NewHistoryEntry, SqliteHistoryStore};
use crate::logging::{access_log_middleware, request_id_middleware, SlowRequestThreshold};
use crate::models::{
    AssistRequest, AssistResponse, HealthResponse, HistoryResponse, PlagiarismCheckRequest,
};
use crate::plagiarism::{run_check, CheckMode, DuckDuckGoSearch, PlagiarismReport, WebChecker};
use crate::rate_limit::{rate_limit_middleware, PerIpRateLimiter};
use crate::text_processing::trim_space;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionProvider>,
    pub web_checker: Arc<WebChecker>,
    pub history: Arc<dyn HistoryStore>,
    pub rate_limiter: Option<PerIpRateLimiter>,
    pub request_timeout: Duration,
    pub slow_request_threshold: Duration,
}

impl AppState {
    /// Wire the production collaborators described by `config`
    pub async fn from_config(
        config: &AppConfig,
        slow_request_threshold: Duration,
    ) -> Result<Self> {
        let completion = CompletionClient::new(CompletionConfig::from(config))?;
        let search = DuckDuckGoSearch::new(config.search_url.clone())
            .map_err(|e| WordcraftError::Unknown(e.to_string()))?;
        let history = SqliteHistoryStore::connect(&config.db_path).await?;

        Ok(Self {
            completion: Arc::new(completion),
            web_checker: Arc::new(
                WebChecker::new(Arc::new(search))
                    .with_deadline(web_check_deadline(config.request_timeout)),
            ),
            history: Arc::new(history),
            rate_limiter: config.rate_limit.clone().map(PerIpRateLimiter::new),
            request_timeout: config.request_timeout,
            slow_request_threshold,
        })
    }
}

/// Budget for a whole web check so it finishes before the router's timeout
pub fn web_check_deadline(request_timeout: Duration) -> Duration {
    request_timeout - WEB_CHECK_HEADROOM.min(request_timeout / 2)
}

fn validate_length(text: &str) -> Result<()> {
    let len = text.chars().count();
    if len > MAX_TEXT_LENGTH {
        return Err(WordcraftError::TextTooLong(len));
    }
    Ok(())
}

// HTTP Handlers

/// Run a writing action through the completion provider
async fn assist(
    State(state): State<AppState>,
    Form(req): Form<AssistRequest>,
) -> Result<Json<AssistResponse>> {
    let text = trim_space(&req.text);
    if text.is_empty() {
        return Err(WordcraftError::EmptyText);
    }
    validate_length(text)?;

    let action = Action::parse(req.action.as_deref());
    let tone = resolve_tone(req.tone.as_deref());

    tracing::debug!(
        action = action.as_str(),
        tone = tone,
        text_len = text.len(),
        "Assist request"
    );

    let prompt = build_prompt(action, text, tone);
    let result = state.completion.complete(&prompt).await?;

    let entry = NewHistoryEntry {
        action: action.as_str().to_string(),
        original_text: text.to_string(),
        result_text: result.clone(),
    };
    if let Err(e) = state.history.append(entry).await {
        tracing::error!(error = %e, "Failed to save history entry");
    }

    Ok(Json(AssistResponse {
        status: "success".to_string(),
        action: action.as_str().to_string(),
        original_text: text.to_string(),
        result,
    }))
}

/// Local or web duplication check
async fn plagiarism_check(
    State(state): State<AppState>,
    Form(req): Form<PlagiarismCheckRequest>,
) -> Result<Json<PlagiarismReport>> {
    validate_length(&req.text)?;

    let mode = CheckMode::parse(Some(&req.mode));
    tracing::debug!(mode = ?mode, text_len = req.text.len(), "Plagiarism check request");

    Ok(Json(run_check(&req.text, mode, &state.web_checker).await))
}

async fn history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let records = state.history.list_recent(HISTORY_PAGE_SIZE).await?;
    Ok(Json(HistoryResponse { records }))
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP server router
pub fn create_router(state: AppState) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_timeout = state.request_timeout;
    let slow_threshold = SlowRequestThreshold(state.slow_request_threshold);
    let rate_limiter = state.rate_limiter.clone();

    let mut router = Router::new()
        .route("/", post(assist))
        .route("/plagiarism_check", post(plagiarism_check))
        .route("/history", get(history))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout));

    if let Some(limiter) = rate_limiter {
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    router
        .layer(middleware::from_fn_with_state(
            slow_threshold,
            access_log_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}
