// Library modules for integration tests
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod plagiarism;
pub mod rate_limit;
pub mod server;
pub mod text_processing;
pub mod utils;
