pub mod client;
pub mod suggester;

pub use client::{ModelConfig, OpenRouterClient, DEFAULT_MODEL};
pub use suggester::{parse_suggestions, suggest_questions, SuggestionSource};
