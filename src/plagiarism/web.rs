//! Duplication checking against live web search results
//!
//! Long sentences are sampled, searched as exact phrases one at a time with a
//! fixed pause between lookups, and every lookup that returns a hit counts as
//! a match. The first provider failure aborts the whole batch.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::search::{SearchError, SearchProvider};
use crate::config::constants::{MIN_WEB_CANDIDATE_TOKENS, SEARCH_DELAY, WEB_CHECK_LIMIT};
use crate::text_processing::{split_sentences, token_count};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebMatch {
    pub sentence: String,
    pub found_at: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebReport {
    pub web_score: u32,
    pub matches: Vec<WebMatch>,
    pub checked_count: usize,
}

#[derive(Debug)]
pub enum WebCheckError {
    /// No sentence was long enough to be worth searching for
    TooShort,
    /// The search provider failed; earlier matches are discarded
    External(String),
}

impl fmt::Display for WebCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebCheckError::TooShort => write!(f, "Text is too short or generic to check."),
            WebCheckError::External(details) => write!(f, "External API Error: {}", details),
        }
    }
}

impl std::error::Error for WebCheckError {}

impl From<SearchError> for WebCheckError {
    fn from(err: SearchError) -> Self {
        WebCheckError::External(err.to_string())
    }
}

/// Sentences distinctive enough to search for
pub fn web_candidates(sentences: &[String]) -> Vec<&str> {
    sentences
        .iter()
        .filter(|s| token_count(s) > MIN_WEB_CANDIDATE_TOKENS)
        .map(String::as_str)
        .collect()
}

/// Spread the lookups across the whole text
///
/// Takes every `n / limit`-th candidate from the start and keeps the first
/// `limit` of them.
pub fn sample_candidates<'a>(candidates: &[&'a str], limit: usize) -> Vec<&'a str> {
    if limit == 0 || candidates.len() <= limit {
        return candidates.to_vec();
    }

    let stride = candidates.len() / limit;
    candidates
        .iter()
        .step_by(stride)
        .take(limit)
        .copied()
        .collect()
}

pub struct WebChecker {
    provider: Arc<dyn SearchProvider>,
    limit: usize,
    delay: Duration,
    deadline: Option<Duration>,
}

impl WebChecker {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            limit: WEB_CHECK_LIMIT,
            delay: SEARCH_DELAY,
            deadline: None,
        }
    }

    /// Override the pause between lookups
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Bound the whole batch of lookups; running out of time aborts the check
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn check(&self, text: &str) -> Result<WebReport, WebCheckError> {
        let sentences = split_sentences(text);
        let candidates = web_candidates(&sentences);
        if candidates.is_empty() {
            return Err(WebCheckError::TooShort);
        }

        let sampled = sample_candidates(&candidates, self.limit);

        let lookups = self.lookup_all(&sampled);
        let matches = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, lookups).await.map_err(|_| {
                tracing::warn!(?deadline, "web check ran out of time, aborting");
                WebCheckError::External(format!(
                    "web check timed out after {}s",
                    deadline.as_secs()
                ))
            })??,
            None => lookups.await?,
        };

        let checked_count = sampled.len();
        let web_score = (matches.len() * 100 / checked_count) as u32;

        tracing::info!(
            candidates = candidates.len(),
            checked = checked_count,
            matched = matches.len(),
            web_score,
            "web check finished"
        );

        Ok(WebReport {
            web_score,
            matches,
            checked_count,
        })
    }

    async fn lookup_all(&self, sampled: &[&str]) -> Result<Vec<WebMatch>, WebCheckError> {
        let mut matches = Vec::new();

        for (i, sentence) in sampled.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let query = format!("\"{}\"", sentence);
            let hits = self.provider.search(&query, 1).await.map_err(|e| {
                tracing::warn!(error = %e, checked = i, "web lookup failed, aborting check");
                WebCheckError::from(e)
            })?;

            if let Some(hit) = hits.into_iter().next() {
                matches.push(WebMatch {
                    sentence: sentence.to_string(),
                    found_at: hit.url,
                    title: hit.title,
                });
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plagiarism::search::SearchHit;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const LONG_A: &str = "The committee approved the annual budget after a long debate.";
    const LONG_B: &str = "Researchers found that the river had changed course twice.";
    const LONG_C: &str = "Our team shipped the new release on a rainy Friday afternoon.";

    /// Fake provider that answers from a script and records each query
    struct ScriptedSearch {
        queries: Mutex<Vec<(String, Instant)>>,
        hit_when_contains: Option<&'static str>,
        fail_on_call: Option<usize>,
        latency: Duration,
    }

    impl ScriptedSearch {
        fn new() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                hit_when_contains: None,
                fail_on_call: None,
                latency: Duration::ZERO,
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries
                .lock()
                .unwrap()
                .iter()
                .map(|(q, _)| q.clone())
                .collect()
        }

        fn times(&self) -> Vec<Instant> {
            self.queries.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    #[async_trait]
    impl SearchProvider for ScriptedSearch {
        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchHit>, SearchError> {
            assert_eq!(max_results, 1);
            let call = {
                let mut queries = self.queries.lock().unwrap();
                queries.push((query.to_string(), Instant::now()));
                queries.len()
            };

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            if self.fail_on_call == Some(call) {
                return Err(SearchError::Status(503));
            }

            match self.hit_when_contains {
                Some(needle) if query.contains(needle) => Ok(vec![SearchHit {
                    url: "https://example.com/source".to_string(),
                    title: "Source page".to_string(),
                }]),
                _ => Ok(Vec::new()),
            }
        }
    }

    fn numbered(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("Sentence number {} has plenty of words.", i))
            .collect()
    }

    #[test]
    fn test_candidates_need_more_than_five_tokens() {
        let sentences = vec![
            "One two three four five.".to_string(),
            "One two three four five six.".to_string(),
        ];
        assert_eq!(web_candidates(&sentences), vec!["One two three four five six."]);
    }

    #[test]
    fn test_sample_all_when_under_limit() {
        let sentences = numbered(5);
        let candidates = web_candidates(&sentences);
        assert_eq!(sample_candidates(&candidates, 8), candidates);
    }

    #[test]
    fn test_sample_stride() {
        let sentences = numbered(20);
        let candidates = web_candidates(&sentences);
        let sampled = sample_candidates(&candidates, 8);

        // stride 2: indices 0, 2, ..., 14
        assert_eq!(sampled.len(), 8);
        assert_eq!(sampled[0], candidates[0]);
        assert_eq!(sampled[7], candidates[14]);
    }

    #[test]
    fn test_sample_truncates_after_stride() {
        // 9 candidates: stride 1, first 8 kept, last one never checked
        let sentences = numbered(9);
        let candidates = web_candidates(&sentences);
        let sampled = sample_candidates(&candidates, 8);
        assert_eq!(sampled, candidates[..8].to_vec());

        // 17 candidates: stride 2 selects 9, truncated to 8
        let sentences = numbered(17);
        let candidates = web_candidates(&sentences);
        let sampled = sample_candidates(&candidates, 8);
        assert_eq!(sampled.len(), 8);
        assert_eq!(sampled[7], candidates[14]);
    }

    #[tokio::test]
    async fn test_too_short_makes_no_lookup() {
        let provider = Arc::new(ScriptedSearch::new());
        let checker = WebChecker::new(provider.clone()).with_delay(Duration::ZERO);

        let err = checker.check("Hi there. Thanks a lot!").await.unwrap_err();

        assert!(matches!(err, WebCheckError::TooShort));
        assert_eq!(err.to_string(), "Text is too short or generic to check.");
        assert!(provider.queries().is_empty());
    }

    #[tokio::test]
    async fn test_queries_are_exact_phrases() {
        let provider = Arc::new(ScriptedSearch::new());
        let checker = WebChecker::new(provider.clone()).with_delay(Duration::ZERO);

        let text = format!("{} Short one. {}", LONG_A, LONG_B);
        let report = checker.check(&text).await.unwrap();

        assert_eq!(
            provider.queries(),
            vec![format!("\"{}\"", LONG_A), format!("\"{}\"", LONG_B)]
        );
        assert_eq!(report.checked_count, 2);
        assert_eq!(report.web_score, 0);
        assert!(report.matches.is_empty());
    }

    #[tokio::test]
    async fn test_score_truncates() {
        let provider = Arc::new(ScriptedSearch {
            hit_when_contains: Some("river"),
            ..ScriptedSearch::new()
        });
        let checker = WebChecker::new(provider.clone()).with_delay(Duration::ZERO);

        let text = format!("{} {} {}", LONG_A, LONG_B, LONG_C);
        let report = checker.check(&text).await.unwrap();

        assert_eq!(report.checked_count, 3);
        assert_eq!(report.web_score, 33);
        assert_eq!(
            report.matches,
            vec![WebMatch {
                sentence: LONG_B.to_string(),
                found_at: "https://example.com/source".to_string(),
                title: "Source page".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_batch() {
        let provider = Arc::new(ScriptedSearch {
            hit_when_contains: Some("committee"),
            fail_on_call: Some(3),
            ..ScriptedSearch::new()
        });
        let checker = WebChecker::new(provider.clone()).with_delay(Duration::ZERO);

        let text = numbered(4).join(" ") + " " + LONG_A;
        let err = checker.check(&text).await.unwrap_err();

        assert_eq!(provider.queries().len(), 3);
        assert_eq!(
            err.to_string(),
            "External API Error: search provider returned HTTP 503"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_lookups_only() {
        let provider = Arc::new(ScriptedSearch::new());
        let checker = WebChecker::new(provider.clone());

        let start = Instant::now();
        let text = format!("{} {} {}", LONG_A, LONG_B, LONG_C);
        checker.check(&text).await.unwrap();

        let times = provider.times();
        assert_eq!(times.len(), 3);
        assert!(times[0] - start < SEARCH_DELAY);
        assert!(times[1] - times[0] >= SEARCH_DELAY);
        assert!(times[2] - times[1] >= SEARCH_DELAY);
        // no trailing pause after the final lookup
        let elapsed = start.elapsed();
        assert!(elapsed >= 2 * SEARCH_DELAY);
        assert!(elapsed < 3 * SEARCH_DELAY, "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_slow_batch() {
        let provider = Arc::new(ScriptedSearch {
            latency: Duration::from_secs(9),
            ..ScriptedSearch::new()
        });
        let checker = WebChecker::new(provider.clone()).with_deadline(Duration::from_secs(30));

        let start = Instant::now();
        let err = checker.check(&numbered(8).join(" ")).await.unwrap_err();

        assert_eq!(err.to_string(), "External API Error: web check timed out after 30s");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31), "elapsed {:?}", elapsed);
        assert!(provider.queries().len() < 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_leaves_fast_batch_alone() {
        let provider = Arc::new(ScriptedSearch {
            latency: Duration::from_secs(1),
            ..ScriptedSearch::new()
        });
        let checker = WebChecker::new(provider.clone()).with_deadline(Duration::from_secs(30));

        let report = checker.check(&numbered(8).join(" ")).await.unwrap();

        assert_eq!(report.checked_count, 8);
        assert_eq!(provider.queries().len(), 8);
    }

    #[tokio::test]
    async fn test_rate_limited_provider_aborts_check() {
        use crate::plagiarism::search::DuckDuckGoSearch;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_string(r#"<form id="challenge-form" action="/anomaly"></form>"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = DuckDuckGoSearch::new(server.uri()).unwrap();
        let checker = WebChecker::new(Arc::new(provider)).with_delay(Duration::ZERO);

        let text = format!("{} {}", LONG_A, LONG_B);
        let err = checker.check(&text).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "External API Error: search provider is rate limiting requests"
        );
    }

    #[test]
    fn test_report_wire_keys() {
        let report = WebReport {
            web_score: 50,
            matches: vec![WebMatch {
                sentence: "s".to_string(),
                found_at: "https://example.com".to_string(),
                title: "t".to_string(),
            }],
            checked_count: 2,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["web_score"], 50);
        assert_eq!(json["checked_count"], 2);
        assert_eq!(json["matches"][0]["found_at"], "https://example.com");
    }
}
