/// CLI argument parsing and help text
use crate::config::constants::DEFAULT_PORT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    /// Run the HTTP service
    Server { port: u16 },
    /// One-shot duplication check printed as JSON
    Check { text: String, web: bool },
}

/// Parse process arguments (without the program name)
///
/// An unparsable `--port` value falls back to the default port. With no
/// arguments at all, help is shown.
pub fn parse_args(args: &[String]) -> Command {
    let has = |flag: &str| args.iter().any(|a| a == flag);

    if has("--help") || has("-h") {
        return Command::Help;
    }
    if has("--version") || has("-v") {
        return Command::Version;
    }

    if has("--server") {
        let port = args
            .iter()
            .position(|arg| arg == "--port")
            .and_then(|pos| args.get(pos + 1))
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        return Command::Server { port };
    }

    let web = has("--web");
    let text = args
        .iter()
        .filter(|a| a.as_str() != "--web")
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    if text.trim().is_empty() {
        return Command::Help;
    }

    Command::Check { text, web }
}

pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!("Wordcraft v{}", version);
    println!("AI writing assistant with local and web duplication checks");
    println!();
    println!("USAGE:");
    println!("    wordcraft [OPTIONS] [TEXT]");
    println!();
    println!("OPTIONS:");
    println!("    --server              Start HTTP server mode");
    println!("    --port <PORT>         Server port (default: {})", DEFAULT_PORT);
    println!("    --web                 Check TEXT against web search results");
    println!("    -h, --help            Print this help message");
    println!("    -v, --version         Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Start HTTP server on default port {}", DEFAULT_PORT);
    println!("    wordcraft --server");
    println!();
    println!("    # Check a text for repeated sentences");
    println!("    wordcraft \"The cat sat. The cat sat.\"");
    println!();
    println!("    # Look up long sentences on the web");
    println!("    wordcraft --web \"$(cat essay.txt)\"");
    println!();
    println!("SERVER ENDPOINTS:");
    println!("    POST   /                  - Proofread, rewrite or SEO (form: action, text, tone)");
    println!("    POST   /plagiarism_check  - Duplication check (form: text, mode=local|web)");
    println!("    GET    /history           - 20 most recent assist results");
    println!("    GET    /health            - Health check");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    OPENROUTER_API_KEY               - Completion API key (required for assist)");
    println!("    OPENROUTER_MODEL                 - Model id (default: mistralai/mistral-nemo:free)");
    println!("    OPENROUTER_API_URL               - Completion endpoint");
    println!("    SEARCH_API_URL                   - Search endpoint");
    println!("    WORDCRAFT_DB_PATH                - History database (default: wordcraft.db)");
    println!("    RATE_LIMIT_MODE                  - Rate limit mode (per-ip/disabled)");
    println!("    REQUEST_TIMEOUT_SECONDS          - Request timeout in seconds (default: 60)");
    println!("    WORDCRAFT_LOG_DIR                - Log directory");
    println!("    RUST_LOG                         - Log level (error/warn/info/debug/trace)");
    println!();
    println!("CONFIGURATION:");
    println!("    KEY=VALUE pairs are read from config.txt, then .env, in the");
    println!("    current working directory. Real environment variables win.");
}

pub fn print_version() {
    println!("Wordcraft v{}", env!("CARGO_PKG_VERSION"));
}
