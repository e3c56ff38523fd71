use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use wordcraft::cli::{self, Command};
use wordcraft::config::{self, AppConfig};
use wordcraft::error::{self, WordcraftError};
use wordcraft::logging::{self, LogConfig};
use wordcraft::plagiarism::{run_check, CheckMode, DuckDuckGoSearch, WebChecker};
use wordcraft::server::{create_router, AppState};

#[tokio::main]
async fn main() -> error::Result<()> {
    // config.txt and .env are optional; real environment variables win
    config::load_env_files();

    let args: Vec<String> = env::args().skip(1).collect();

    match cli::parse_args(&args) {
        Command::Help => cli::print_help(),
        Command::Version => cli::print_version(),
        Command::Server { port } => run_server(port).await?,
        Command::Check { text, web } => run_cli_check(&text, web).await?,
    }

    Ok(())
}

async fn run_server(port: u16) -> error::Result<()> {
    let log_config = LogConfig::from_env();

    // Keep the guard alive for the whole process so file logs are flushed
    let _log_guard = match logging::init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging(&log_config);
            tracing::warn!(error = %e, "File logging unavailable, using console only");
            None
        }
    };
    logging::log_platform_info();

    let config = AppConfig::from_env();

    println!("Wordcraft v{}", env!("CARGO_PKG_VERSION"));
    println!("Starting HTTP server on port {}...", port);

    let state = AppState::from_config(&config, log_config.slow_request_threshold).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("\nServer listening on http://{}", addr);
    println!("\nAvailable endpoints:");
    println!("  POST   /                  - Proofread, rewrite or SEO");
    println!("  POST   /plagiarism_check  - Local or web duplication check");
    println!("  GET    /history           - Recent assist results");
    println!("  GET    /health            - Health check");
    println!("\nCompletion:");
    println!("  Model: {}", config.model);
    if config.api_key.is_some() {
        println!("  API key: configured");
    } else {
        println!("  API key: MISSING (assist requests will fail)");
        println!("  Set OPENROUTER_API_KEY in config.txt or the environment");
        tracing::warn!("OPENROUTER_API_KEY is not set");
    }
    println!("\nHistory database: {}", config.db_path.display());
    println!("\nRate Limiting:");
    match &config.rate_limit {
        Some(limit) => {
            println!("  Status: ENABLED (per client IP)");
            println!("  Rate: {} requests/second", limit.per_second);
            println!("  Burst size: {} requests", limit.burst_size);
        }
        None => {
            println!("  Status: DISABLED");
            println!("  Set RATE_LIMIT_MODE=per-ip to enable protection");
        }
    }
    println!("\nRequest Timeout:");
    println!("  Timeout: {} seconds", config.request_timeout.as_secs());

    tracing::info!(%addr, "Server listening");

    let app = create_router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// One-shot check from the command line; prints the JSON report to stdout
async fn run_cli_check(text: &str, web: bool) -> error::Result<()> {
    logging::init_console_logging(&LogConfig::from_env());

    let config = AppConfig::from_env();
    let search = DuckDuckGoSearch::new(config.search_url.clone())
        .map_err(|e| WordcraftError::Unknown(e.to_string()))?;
    let checker = WebChecker::new(Arc::new(search));

    let mode = if web { CheckMode::Web } else { CheckMode::Local };
    let report = run_check(text, mode, &checker).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
