use super::key_hint;
use super::layout::centered_rect;
use crate::editor::{EditorMode, EditorPane, FormField, QuestionEditor, QuestionForm};
use crate::models::Question;
use crate::utils::truncate_string;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

fn pane_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
}

fn question_items(questions: &[Question], width: usize) -> Vec<ListItem<'static>> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            ListItem::new(vec![
                Line::from(format!("{}. {}", i + 1, truncate_string(&q.question, width))),
                Line::from(Span::styled(
                    format!("   ✓ {}", truncate_string(&q.correct_answer, width.saturating_sub(3))),
                    Style::default().fg(Color::Green),
                )),
            ])
        })
        .collect()
}

fn draw_list(f: &mut Frame, area: Rect, items: Vec<ListItem<'static>>, block: Block<'static>, selected: usize) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

pub fn draw_editor(f: &mut Frame, editor: &QuestionEditor, ai_enabled: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new(vec![Line::from(Span::styled(
        format!("Edit Questions - {} / {}", editor.module_title, editor.heading()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let show_suggestions = editor.suggestions_pending || !editor.suggestions.is_empty();
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if show_suggestions {
            [Constraint::Percentage(55), Constraint::Percentage(45)]
        } else {
            [Constraint::Percentage(100), Constraint::Percentage(0)]
        })
        .split(chunks[1]);

    let width = panes[0].width.saturating_sub(8) as usize;
    let draft_items = if editor.draft.is_empty() {
        vec![ListItem::new("No questions yet. Press a to add one.").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        question_items(&editor.draft, width)
    };
    draw_list(
        f,
        panes[0],
        draft_items,
        pane_block(format!("Draft ({})", editor.draft.len()), editor.pane == EditorPane::Draft),
        editor.cursor,
    );

    if show_suggestions {
        let width = panes[1].width.saturating_sub(8) as usize;
        let items = if editor.suggestions.is_empty() {
            vec![ListItem::new("Waiting for suggestions...").style(Style::default().fg(Color::Yellow))]
        } else {
            question_items(&editor.suggestions, width)
        };
        draw_list(
            f,
            panes[1],
            items,
            pane_block(
                format!("AI Suggestions ({})", editor.suggestions.len()),
                editor.pane == EditorPane::Suggestions,
            ),
            editor.suggestion_cursor,
        );
    }

    let message = Paragraph::new(editor.message.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(message, chunks[2]);

    let mut spans = Vec::new();
    match editor.pane {
        EditorPane::Draft => {
            spans.extend(key_hint("a", " Add  "));
            spans.extend(key_hint("e/Enter", " Edit  "));
            spans.extend(key_hint("d", " Delete  "));
            if ai_enabled {
                spans.extend(key_hint("g", " Suggest  "));
            }
            if !editor.suggestions.is_empty() {
                spans.extend(key_hint("Tab", " Suggestions  "));
            }
            spans.extend(key_hint("s", " Save  "));
            spans.extend(key_hint("Esc", " Cancel"));
        }
        EditorPane::Suggestions => {
            spans.extend(key_hint("a/Enter", " Accept  "));
            spans.extend(key_hint("x", " Dismiss  "));
            spans.extend(key_hint("Tab/Esc", " Draft"));
        }
    }
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);

    match &editor.mode {
        EditorMode::List => {}
        EditorMode::Form(form) => draw_form(f, form),
        EditorMode::ConfirmDelete(id) => {
            let question = editor
                .draft
                .iter()
                .find(|q| &q.id == id)
                .map(|q| q.question.clone())
                .unwrap_or_default();
            draw_delete_confirmation(f, &question);
        }
    }
}

fn field_line(label: &str, value: &str, focused: bool, marker: Option<Span<'static>>) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![Span::styled(format!("{:<13}", label), label_style)];
    spans.push(Span::from(value.to_string()));
    if let Some(marker) = marker {
        spans.push(marker);
    }
    Line::from(spans)
}

fn draw_form(f: &mut Frame, form: &QuestionForm) {
    let height = form.options.len() as u16 + 10;
    let area = centered_rect(80, height, f.area());
    f.render_widget(Clear, area);

    let title = if form.id.is_some() {
        "Edit Question"
    } else {
        "Add Question"
    };

    let mut lines = vec![field_line(
        "Question:",
        &form.question.value,
        form.focus == FormField::Question,
        None,
    )];
    lines.push(Line::from(""));
    for (i, option) in form.options.iter().enumerate() {
        let marker = (form.correct == Some(i)).then(|| {
            Span::styled(
                "  (correct)",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        });
        lines.push(field_line(
            &format!("Option {}:", i + 1),
            &option.value,
            form.focus == FormField::Option(i),
            marker,
        ));
    }
    lines.push(Line::from(""));
    lines.push(field_line(
        "Explanation:",
        &form.explanation.value,
        form.focus == FormField::Explanation,
        None,
    ));
    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    } else {
        let mut spans = Vec::new();
        spans.extend(key_hint("Tab", " Next field  "));
        spans.extend(key_hint("Enter", " Mark option correct  "));
        spans.extend(key_hint("Ctrl+S", " Apply  "));
        spans.extend(key_hint("Esc", " Cancel"));
        lines.push(Line::from(spans));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(widget, area);
}

fn draw_delete_confirmation(f: &mut Frame, question: &str) {
    let area = centered_rect(60, 7, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from("Delete this question?"),
        Line::from(Span::styled(
            truncate_string(question, area.width.saturating_sub(4) as usize),
            Style::default().add_modifier(Modifier::BOLD),
        )),
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
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Confirm Delete")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(widget, area);
}
