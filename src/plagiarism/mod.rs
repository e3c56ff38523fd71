pub mod local;
pub mod search;
pub mod web;

use serde::Serialize;

pub use local::{check_local_repetition, LocalReport, SimilarityMatch};
pub use search::{DuckDuckGoSearch, SearchError, SearchHit, SearchProvider};
pub use web::{WebCheckError, WebChecker, WebMatch, WebReport};

/// Which duplication check to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Local,
    Web,
}

impl CheckMode {
    /// Anything other than `web` runs the local check
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("web") => CheckMode::Web,
            _ => CheckMode::Local,
        }
    }
}

/// Body returned by the duplication check in every outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlagiarismReport {
    Local(LocalReport),
    Web(WebReport),
    Error { error: String },
}

impl From<Result<WebReport, WebCheckError>> for PlagiarismReport {
    fn from(result: Result<WebReport, WebCheckError>) -> Self {
        match result {
            Ok(report) => PlagiarismReport::Web(report),
            Err(e) => PlagiarismReport::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Run the requested check
pub async fn run_check(text: &str, mode: CheckMode, web: &WebChecker) -> PlagiarismReport {
    match mode {
        CheckMode::Local => PlagiarismReport::Local(check_local_repetition(text)),
        CheckMode::Web => web.check(text).await.into(),
    }
}
