pub mod ai;
pub mod ai_worker;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod file_io;
pub mod logger;
pub mod models;
pub mod report;
pub mod results;
pub mod session;
pub mod ui;
pub mod utils;


// Re-exports for convenience
pub use ai::{ModelConfig, OpenRouterClient, SuggestionSource, DEFAULT_MODEL};
pub use app::App;
pub use catalog::Catalog;
pub use config::AppConfig;
pub use error::{QuizError, Result};
pub use models::{AppState, Module, Question};
pub use results::QuizResult;
pub use session::{handle_quiz_input, QuizSession};
pub use ui::{draw, draw_menu, draw_quit_confirmation, draw_quiz, draw_results};
pub use utils::calculate_wrapped_cursor_position;
