use super::key_hint;
use super::layout::centered_rect;
use crate::app::{CountPrompt, LoginForm, Overlay, PathPrompt};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn popup_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan))
}

fn error_line(error: &Option<String>) -> Line<'static> {
    match error {
        Some(e) => Line::from(Span::styled(e.clone(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    }
}

pub fn draw_overlay(f: &mut Frame, overlay: &Overlay) {
    match overlay {
        Overlay::Login(form) => draw_login(f, form),
        Overlay::PathPrompt(prompt) => draw_path_prompt(f, prompt),
        Overlay::QuestionCount(prompt) => draw_count_prompt(f, prompt),
        Overlay::ResetConfirm => draw_reset_confirmation(f),
    }
}

fn draw_login(f: &mut Frame, form: &LoginForm) {
    let area = centered_rect(50, 9, f.area());
    f.render_widget(Clear, area);

    let field_style = |focused: bool| {
        if focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let masked = "*".repeat(form.password.value.chars().count());

    let mut help = Vec::new();
    help.extend(key_hint("Tab", " Switch  "));
    help.extend(key_hint("Enter", " Login  "));
    help.extend(key_hint("Esc", " Cancel"));

    let lines = vec![
        Line::from(vec![
            Span::styled("Username: ", field_style(!form.on_password)),
            Span::from(form.username.value.clone()),
        ]),
        Line::from(vec![
            Span::styled("Password: ", field_style(form.on_password)),
            Span::from(masked),
        ]),
        Line::from(""),
        error_line(&form.error),
        Line::from(""),
        Line::from(help),
    ];
    let widget = Paragraph::new(lines).block(popup_block("Admin Login".to_string()));
    f.render_widget(widget, area);

    // cursor sits after the focused field's text
    let (row, column) = if form.on_password {
        (1, form.password.cursor())
    } else {
        (0, form.username.cursor())
    };
    f.set_cursor_position((area.x + 1 + 10 + column as u16, area.y + 1 + row));
}

fn draw_path_prompt(f: &mut Frame, prompt: &PathPrompt) {
    let area = centered_rect(70, 10, f.area());
    f.render_widget(Clear, area);
    let block = popup_block(prompt.action.prompt_title());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let hint = if prompt.action.is_import() {
        "Path to a JSON file"
    } else {
        "Leave blank to use the default file name in the export directory"
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        rows[0],
    );

    // long paths wrap; the cursor follows the wrapped position
    let width = rows[1].width as usize;
    let (line, column) = prompt.input.wrapped_cursor(width);
    let scroll = line.saturating_sub(rows[1].height.saturating_sub(1) as usize) as u16;
    let input = Paragraph::new(wrap_hard(&prompt.input.value, width))
        .style(Style::default().fg(Color::White))
        .scroll((scroll, 0));
    f.render_widget(input, rows[1]);
    f.set_cursor_position((rows[1].x + column as u16, rows[1].y + line as u16 - scroll));

    f.render_widget(Paragraph::new(error_line(&prompt.error)), rows[2]);

    let mut help = Vec::new();
    help.extend(key_hint("Enter", " Confirm  "));
    help.extend(key_hint("Esc", " Cancel"));
    f.render_widget(Paragraph::new(Line::from(help)), rows[4]);
}

/// Break `text` every `width` chars, matching the cursor math.
fn wrap_hard(text: &str, width: usize) -> Vec<Line<'static>> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || width == 0 {
        return vec![Line::from(text.to_string())];
    }
    chars
        .chunks(width)
        .map(|chunk| Line::from(chunk.iter().collect::<String>()))
        .collect()
}

fn draw_count_prompt(f: &mut Frame, prompt: &CountPrompt) {
    let area = centered_rect(60, 9, f.area());
    f.render_widget(Clear, area);

    let mut help = Vec::new();
    help.extend(key_hint("Enter", " Start  "));
    help.extend(key_hint("Esc", " Cancel"));

    let lines = vec![
        Line::from(Span::styled(
            prompt.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} questions available.", prompt.max)),
        Line::from(""),
        Line::from(format!("Number of questions: {}", prompt.input.value)),
        error_line(&prompt.error),
        Line::from(""),
        Line::from(help),
    ];
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(popup_block("Customize Quiz".to_string()));
    f.render_widget(widget, area);
    f.set_cursor_position((
        area.x + 1 + "Number of questions: ".len() as u16 + prompt.input.cursor() as u16,
        area.y + 4,
    ));
}

fn draw_reset_confirmation(f: &mut Frame) {
    let area = centered_rect(50, 6, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from("Reset all module progress?"),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "y",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::from(" Yes  "),
            Span::styled(
                "n",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::from(" No"),
        ]),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block("Reset Progress".to_string()).border_style(Style::default().fg(Color::Yellow)));
    f.render_widget(widget, area);
}
