use super::key_hint;
use crate::results::{format_time, QuizResult, ScoreBand};
use crate::ui::layout::calculate_results_chunks;
use crate::utils::markdown::render_markdown;
use crate::utils::truncate_string;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::High => Color::Green,
        ScoreBand::Mid => Color::Yellow,
        ScoreBand::Low => Color::Red,
    }
}

/// Body of the results view; also the content of the PDF export.
pub fn results_text(result: &QuizResult) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut text = Text::default();

    text.push_line(Line::from(Span::styled(
        format!("Score: {}%", result.score),
        bold.fg(band_color(result.band())),
    )));
    text.push_line(Line::from(Span::styled(result.headline(), bold)));
    text.push_line(Line::from(format!(
        "{} out of {} correct",
        result.correct_count, result.total_questions
    )));
    text.push_line(Line::from(""));
    text.push_line(Line::from(format!(
        "Average time per question: {:.1}s ({})",
        result.average_seconds,
        result.speed_label()
    )));
    text.push_line(Line::from(format!("Total time: {}", format_time(result.total_seconds))));
    text.push_line(Line::from(""));

    text.push_line(Line::from(Span::styled("Question Breakdown", bold)));
    for (i, record) in result.records.iter().enumerate() {
        let (mark, color) = if record.is_correct {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };
        text.push_line(Line::from(vec![
            Span::styled(format!("{} ", mark), Style::default().fg(color)),
            Span::from(format!("{}. {}", i + 1, truncate_string(&record.question_text, 64))),
        ]));
    }
    text.push_line(Line::from(""));

    text.push_line(Line::from(Span::styled("Review Incorrect Answers", bold)));
    let mut any_incorrect = false;
    for record in result.incorrect() {
        any_incorrect = true;
        text.push_line(Line::from(""));
        text.push_line(Line::from(Span::styled(record.question_text.clone(), bold)));
        text.push_line(Line::from(vec![
            Span::styled("Your answer: ", Style::default().fg(Color::Red)),
            Span::from(record.selected_answer.clone()),
        ]));
        text.push_line(Line::from(vec![
            Span::styled("Correct answer: ", Style::default().fg(Color::Green)),
            Span::from(record.correct_answer.clone()),
        ]));
        if let Some(explanation) = &record.explanation {
            text.extend(render_markdown(explanation));
        }
    }
    if !any_incorrect {
        text.push_line(Line::from("No incorrect answers. Well done!"));
    }
    text
}

pub fn draw_results(f: &mut Frame, result: &QuizResult, title: &str, scroll: u16) {
    let layout = calculate_results_chunks(f.area());

    let header = Paragraph::new(format!("Quiz Results - {}", title))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let body = Paragraph::new(results_text(result))
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, layout.content_area);

    let mut spans = Vec::new();
    spans.extend(key_hint("↑/↓", " Scroll  "));
    spans.extend(key_hint("p", " Save PDF  "));
    spans.extend(key_hint("m/Enter", " Dashboard  "));
    spans.extend(key_hint("Ctrl+C", " Exit App"));
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.footer_area);
}

/// The printable document: heading plus the full results text, no chrome.
pub fn draw_results_document(f: &mut Frame, result: &QuizResult, title: &str) {
    let mut text = Text::default();
    text.push_line(Line::from(Span::styled(
        "Quiz Results",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    text.push_line(Line::from(title.to_string()));
    text.push_line(Line::from(""));
    text.extend(results_text(result));

    // unbordered so trailing blank rows can be trimmed off
    let document = Paragraph::new(text).wrap(Wrap { trim: true });
    f.render_widget(document, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerRecord;
    use std::time::Duration;

    fn record(correct: bool, explanation: Option<&str>) -> AnswerRecord {
        AnswerRecord {
            question_text: "Which flag makes nmap run a SYN scan?".to_string(),
            selected_answer: if correct { "-sS" } else { "-sT" }.to_string(),
            correct_answer: "-sS".to_string(),
            is_correct: correct,
            explanation: explanation.map(str::to_string),
        }
    }

    fn plain(text: &Text) -> Vec<String> {
        text.lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_results_text_summary_lines() {
        let result = QuizResult::from_records(
            &[record(true, None), record(false, Some("**Half-open** scan."))],
            Duration::from_secs(75),
        );
        let lines = plain(&results_text(&result));
        assert_eq!(lines[0], "Score: 50%");
        assert_eq!(lines[1], "Good Job!");
        assert_eq!(lines[2], "1 out of 2 correct");
        assert!(lines.contains(&"Average time per question: 37.5s (Slow)".to_string()));
        assert!(lines.contains(&"Total time: 1m 15s".to_string()));
        assert!(lines.contains(&"Your answer: -sT".to_string()));
        assert!(lines.contains(&"Half-open scan.".to_string()));
    }

    #[test]
    fn test_results_text_without_mistakes() {
        let result = QuizResult::from_records(&[record(true, None)], Duration::from_secs(5));
        let lines = plain(&results_text(&result));
        assert!(lines.contains(&"No incorrect answers. Well done!".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Your answer")));
    }
}
