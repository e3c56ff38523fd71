pub mod completion;
pub mod prompt;

pub use completion::{CompletionClient, CompletionConfig, CompletionError, CompletionProvider};
pub use prompt::{build_prompt, resolve_tone, Action};
