pub mod layout;
mod editor;
mod menu;
mod popups;
mod quiz;
mod summary;

use crate::app::App;
use crate::models::AppState;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

pub use layout::{calculate_dashboard_chunks, calculate_quiz_chunks, calculate_results_chunks, centered_rect};
pub use menu::{draw_menu, module_color};
pub use quiz::{draw_quit_confirmation, draw_quiz};
pub use summary::{draw_results, draw_results_document, results_text};

/// Draw the current view, then any overlay on top.
pub fn draw(f: &mut Frame, app: &App) {
    match app.state {
        AppState::Dashboard => draw_menu(f, app),
        AppState::Quiz => {
            if let Some(session) = &app.session {
                draw_quiz(f, session);
            }
        }
        AppState::QuizQuitConfirm => draw_quit_confirmation(f),
        AppState::Results => {
            if let Some((title, result)) = &app.result {
                draw_results(f, result, title, app.results_scroll);
            }
        }
        AppState::Editor => {
            if let Some(editor) = &app.editor {
                editor::draw_editor(f, editor, app.ai_enabled());
            }
        }
    }

    if let Some(overlay) = &app.overlay {
        popups::draw_overlay(f, overlay);
    }
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// `key` highlighted, followed by its label.
fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [Span::styled(key, key_style()), Span::from(label)]
}
