//! Web search provider
//!
//! Exact-phrase lookups against the DuckDuckGo HTML endpoint

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::config::constants::SEARCH_TIMEOUT;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

lazy_static! {
    static ref RESULT_ANCHOR: Regex =
        Regex::new(r#"(?s)<a\s([^>]*class="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#).unwrap();
    static ref HREF_ATTR: Regex = Regex::new(r#"href="([^"]*)""#).unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Top-level search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
}

#[derive(Debug)]
pub enum SearchError {
    Http(reqwest::Error),
    /// 202 with a challenge page instead of results
    RateLimited,
    Status(u16),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Http(e) => write!(f, "search request failed: {}", e),
            SearchError::RateLimited => write!(f, "search provider is rate limiting requests"),
            SearchError::Status(code) => write!(f, "search provider returned HTTP {}", code),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Http(err)
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return at most `max_results` hits, best first
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, SearchError>;
}

/// Search provider backed by html.duckduckgo.com
pub struct DuckDuckGoSearch {
    client: Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_timeout(base_url, SEARCH_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(&self.base_url)
            .form(&[("q", query)])
            .send()
            .await?;

        // Anything but a plain 200 means the page holds no results
        match response.status() {
            StatusCode::OK => {}
            StatusCode::ACCEPTED => return Err(SearchError::RateLimited),
            status => return Err(SearchError::Status(status.as_u16())),
        }

        let body = response.text().await?;
        let hits = parse_results(&body, max_results);

        tracing::debug!(query_len = query.len(), hits = hits.len(), "search completed");

        Ok(hits)
    }
}

/// Extract organic results from a DuckDuckGo HTML results page
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    RESULT_ANCHOR
        .captures_iter(html)
        .filter_map(|caps| {
            let href = HREF_ATTR.captures(&caps[1])?.get(1)?.as_str();
            let url = resolve_link(&decode_entities(href))?;
            let title = clean_title(&caps[2]);
            Some(SearchHit { url, title })
        })
        .take(max_results)
        .collect()
}

/// Turn a result link into the target URL
///
/// Redirect links carry the target in the `uddg` query parameter. Ad links
/// (`/y.js`) yield `None`.
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    let on_ddg = url
        .host_str()
        .map(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        .unwrap_or(false);

    if on_ddg {
        if url.path() == "/y.js" {
            return None;
        }
        if url.path().starts_with("/l/") {
            return url
                .query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned());
        }
    }

    Some(url.to_string())
}

fn clean_title(raw: &str) -> String {
    let text = TAG.replace_all(raw, "");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        // last, so "&amp;lt;" stays "&lt;"
        .replace("&amp;", "&")
}
