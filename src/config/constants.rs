use std::time::Duration;

/// Maximum allowed text length for assist and check requests (in characters)
///
/// The local checker compares every sentence pair, so very long inputs are
/// rejected up front.
pub const MAX_TEXT_LENGTH: usize = 20_000;

/// Similarity ratio a sentence pair must exceed to be reported as repeated
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Sentences with this many tokens or fewer are too generic for a web lookup
pub const MIN_WEB_CANDIDATE_TOKENS: usize = 5;

/// Maximum number of sentences sent to the search provider per check
pub const WEB_CHECK_LIMIT: usize = 8;

/// Pause between consecutive search lookups
pub const SEARCH_DELAY: Duration = Duration::from_millis(500);

/// Timeout for a single search lookup
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Time a web check leaves unused under the request timeout so it can
/// still answer with a structured error
pub const WEB_CHECK_HEADROOM: Duration = Duration::from_secs(5);

/// Sampling temperature sent with every completion request
pub const COMPLETION_TEMPERATURE: f64 = 0.7;

/// Output-length cap sent with every completion request
pub const COMPLETION_MAX_TOKENS: u32 = 1500;

/// Timeout for a single completion request
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(40);

/// Number of history records returned by the history endpoint
pub const HISTORY_PAGE_SIZE: i64 = 20;

pub const DEFAULT_MODEL: &str = "mistralai/mistral-nemo:free";
pub const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_DB_PATH: &str = "wordcraft.db";
pub const DEFAULT_TONE: &str = "Professional";
pub const DEFAULT_PORT: u16 = 5000;

/// Key=value file loaded into the environment before startup
pub const CONFIG_FILE: &str = "config.txt";

/// Loaded after `CONFIG_FILE`; neither overrides variables already set
pub const DOTENV_FILE: &str = ".env";
