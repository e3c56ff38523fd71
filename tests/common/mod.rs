#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wordcraft::assistant::{CompletionError, CompletionProvider};
use wordcraft::error::{Result, WordcraftError};
use wordcraft::history::{HistoryRecord, HistoryStore, NewHistoryEntry, SqliteHistoryStore};
use wordcraft::plagiarism::{SearchError, SearchHit, SearchProvider, WebChecker};
use wordcraft::rate_limit::{PerIpRateLimiter, RateLimitConfig};
use wordcraft::server::{create_router, web_check_deadline, AppState};

/// Completion provider that echoes a canned answer or a canned failure
pub struct FakeCompletion {
    pub reply: std::result::Result<String, u16>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(CompletionError::Api {
                status: *status,
                message: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// Search provider that reports a hit for every query
pub struct AlwaysFound;

#[async_trait]
impl SearchProvider for AlwaysFound {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        Ok(vec![SearchHit {
            url: "https://example.com/original".to_string(),
            title: "Original article".to_string(),
        }])
    }
}

/// Search provider that answers with no hits after a fixed latency
pub struct SlowSearch(pub Duration);

#[async_trait]
impl SearchProvider for SlowSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

/// Search provider that always fails
pub struct BrokenSearch;

#[async_trait]
impl SearchProvider for BrokenSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        Err(SearchError::Status(500))
    }
}

/// History store whose every operation fails
pub struct BrokenHistory;

#[async_trait]
impl HistoryStore for BrokenHistory {
    async fn append(&self, _entry: NewHistoryEntry) -> Result<i64> {
        Err(WordcraftError::Database("disk I/O error".to_string()))
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<HistoryRecord>> {
        Err(WordcraftError::Database("disk I/O error".to_string()))
    }
}

pub struct TestApp {
    pub completion: Arc<dyn CompletionProvider>,
    pub search: Arc<dyn SearchProvider>,
    pub history: Arc<dyn HistoryStore>,
    pub rate_limit: Option<RateLimitConfig>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self {
            completion: FakeCompletion::replying("Fixed text."),
            search: Arc::new(AlwaysFound),
            history: Arc::new(SqliteHistoryStore::in_memory().await.unwrap()),
            rate_limit: None,
        }
    }

    pub fn router(&self) -> Router {
        let request_timeout = Duration::from_secs(60);
        let web_checker = WebChecker::new(self.search.clone())
            .with_delay(Duration::ZERO)
            .with_deadline(web_check_deadline(request_timeout));

        let state = AppState {
            completion: self.completion.clone(),
            web_checker: Arc::new(web_checker),
            history: self.history.clone(),
            rate_limiter: self.rate_limit.clone().map(PerIpRateLimiter::new),
            request_timeout,
            slow_request_threshold: Duration::from_secs(5),
        };
        create_router(state)
    }
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
