use super::key_hint;
use crate::session::{QuizPhase, QuizSession};
use crate::ui::layout::calculate_quiz_chunks;
use crate::utils::markdown::render_markdown;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

fn draw_empty(f: &mut Frame, session: &QuizSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(session.title.clone())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("No questions available for this topic yet.")
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help = Paragraph::new(Line::from(key_hint("Enter/Esc", " Return to Dashboard").to_vec()))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn option_line(session: &QuizSession, index: usize, option: &str) -> Line<'static> {
    let selected = session.selected_index == Some(index);
    let label = format!("{} {}. {}", if selected { ">" } else { " " }, index + 1, option);

    if session.phase != QuizPhase::Checked {
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        return Line::from(Span::styled(label, style));
    }

    let correct = session
        .current_question()
        .is_some_and(|q| q.is_correct(option));
    if correct {
        Line::from(Span::styled(
            format!("{}  ✓", label),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
    } else if selected {
        Line::from(Span::styled(
            format!("{}  ✗", label),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(label, Style::default().fg(Color::DarkGray)))
    }
}

pub fn draw_quiz(f: &mut Frame, session: &QuizSession) {
    let Some(question) = session.current_question() else {
        draw_empty(f, session);
        return;
    };
    let layout = calculate_quiz_chunks(f.area());

    let header = Paragraph::new(format!(
        "Question {} / {} - {}",
        session.current_index + 1,
        session.questions.len(),
        session.title
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(session.progress_percentage().min(100));
    f.render_widget(gauge, layout.progress_area);

    let question_widget = Paragraph::new(question.question.clone())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(question_widget, layout.question_area);

    let options: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| option_line(session, i, option))
        .collect();
    let options_widget = Paragraph::new(options)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Options"));
    f.render_widget(options_widget, layout.options_area);

    let mut feedback = Text::default();
    if session.phase == QuizPhase::Checked {
        match session.records.last() {
            Some(record) if record.is_correct => feedback.push_line(Line::from(Span::styled(
                "Correct!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))),
            Some(record) => feedback.push_line(Line::from(vec![
                Span::styled(
                    "Incorrect. ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::from(format!("The correct answer is: {}", record.correct_answer)),
            ])),
            None => {}
        }
        if let Some(explanation) = &session.explanation {
            feedback.push_line(Line::from(""));
            feedback.extend(render_markdown(explanation));
        }
    }
    let feedback_widget = Paragraph::new(feedback)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Explanation"));
    f.render_widget(feedback_widget, layout.feedback_area);

    let mut spans = Vec::new();
    if session.phase == QuizPhase::Checked {
        let label = if session.is_last_question() {
            " Finish  "
        } else {
            " Next  "
        };
        spans.extend(key_hint("Enter", label));
    } else {
        spans.extend(key_hint("↑/↓/1-9", " Select  "));
        spans.extend(key_hint("Enter", " Check  "));
    }
    spans.extend(key_hint("Esc", " Quit to Dashboard  "));
    spans.extend(key_hint("Ctrl+C", " Exit App"));
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Quit Quiz")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("Return to the dashboard? Your answers so far will be discarded.")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Yes (Return to Dashboard)  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" No (Continue Quiz)  "),
        Span::styled(
            "Ctrl+C",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Exit App"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
