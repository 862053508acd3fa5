use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::layout::calculate_dashboard_chunks;
use super::key_hint;
use crate::app::{App, DashboardRow};
use crate::models::Module;

/// Terminal color for a catalog color name.
pub fn module_color(name: &str) -> Color {
    match name {
        "red" | "rose" => Color::Red,
        "orange" | "amber" | "yellow" => Color::Yellow,
        "green" | "emerald" | "lime" | "teal" => Color::Green,
        "blue" | "sky" | "indigo" => Color::Blue,
        "cyan" => Color::Cyan,
        "purple" | "violet" | "fuchsia" | "pink" => Color::Magenta,
        "slate" | "stone" | "zinc" | "neutral" => Color::DarkGray,
        _ => Color::Gray,
    }
}

fn module_item<'a>(app: &App, module: &Module, selected: bool) -> ListItem<'a> {
    let expanded = app.dashboard.expanded_modules.contains(&module.id);
    let marker = if expanded { "▾" } else { "▸" };
    let count = app.bank.question_count(module.id, None);

    let mut spans = vec![
        Span::from(format!("{} ", marker)),
        Span::styled(
            format!("{:>2}. {}", module.id, module.title),
            Style::default()
                .fg(module_color(&module.color))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({} questions)", count),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.completed.contains(&module.id) {
        spans.push(Span::styled(
            "  ✓ Completed",
            Style::default().fg(Color::Green),
        ));
    }
    if app.is_admin && !app.visibility.get(module.id) {
        spans.push(Span::styled(
            "  [hidden]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ));
    }
    let item = ListItem::new(Line::from(spans));
    if selected {
        item.style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        item
    }
}

fn row_item<'a>(app: &App, row: DashboardRow, selected: bool) -> Option<ListItem<'a>> {
    let module = app.catalog.module(row.module_id())?;
    let item = match row {
        DashboardRow::Module(_) => return Some(module_item(app, module, selected)),
        DashboardRow::SubTopic(_, s) => {
            let sub = module.sub_topics.get(s)?;
            let marker = if sub.content_points().is_empty() {
                " "
            } else if app.dashboard.expanded_sub_topics.contains(&(module.id, s)) {
                "▾"
            } else {
                "▸"
            };
            let count = app.bank.question_count(module.id, Some(sub.title()));
            ListItem::new(Line::from(vec![
                Span::from(format!("    {} {}", marker, sub.title())),
                Span::styled(format!("  ({})", count), Style::default().fg(Color::DarkGray)),
            ]))
        }
        DashboardRow::ContentPoint(_, s, p) => {
            let point = module.sub_topics.get(s)?.content_points().get(p)?;
            ListItem::new(format!("        • {}", point))
        }
    };
    Some(if selected {
        item.style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        item
    })
}

pub fn draw_menu(f: &mut Frame, app: &App) {
    let layout = calculate_dashboard_chunks(f.area());

    let title = Paragraph::new("Exam Prep")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    let mut tabs = Vec::new();
    for (i, exam) in app.catalog.exams.iter().enumerate() {
        let style = if i == app.dashboard.exam_index {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tabs.push(Span::styled(format!(" [{}] {} ", i + 1, exam.title), style));
    }
    f.render_widget(Paragraph::new(Line::from(tabs)), layout.tabs_area);

    let progress = app.progress_percentage();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(progress.min(100) as u16)
        .label(format!("Progress: {}%", progress));
    f.render_widget(gauge, layout.progress_area);

    let rows = app.dashboard_rows();
    let selected = app.dashboard.cursor.min(rows.len().saturating_sub(1));
    let items: Vec<ListItem> = if rows.is_empty() {
        vec![ListItem::new("No modules available").style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]
    } else {
        rows.iter()
            .enumerate()
            .filter_map(|(i, row)| row_item(app, *row, i == selected))
            .collect()
    };
    let description = app
        .catalog
        .exams
        .get(app.dashboard.exam_index)
        .map(|e| e.description.clone())
        .unwrap_or_default();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(description),
    );
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, layout.list_area, &mut state);

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(layout.status_area);

    let status = match &app.status {
        Some(message) => Paragraph::new(message.text.clone()).style(Style::default().fg(if message.is_error {
            Color::Red
        } else {
            Color::Green
        })),
        None => Paragraph::new(""),
    };
    f.render_widget(status.block(Block::default().borders(Borders::ALL).title("Status")), footer[0]);

    let mode_content = vec![
        Line::from(if app.is_admin { "Mode: Admin" } else { "Mode: User" }),
        Line::from(if app.ai_enabled() {
            "AI: Enabled"
        } else {
            "AI: Disabled"
        }),
    ];
    let mode = Paragraph::new(mode_content)
        .style(
            Style::default()
                .fg(if app.is_admin { Color::Yellow } else { Color::Green })
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(mode, footer[1]);

    let mut spans = Vec::new();
    spans.extend(key_hint("Tab/1-9", " Exam  "));
    spans.extend(key_hint("↑/↓", " Navigate  "));
    spans.extend(key_hint("→/←", " Expand  "));
    spans.extend(key_hint("Enter", " Quiz  "));
    spans.extend(key_hint("r", " Reset  "));
    if app.is_admin {
        spans.extend(key_hint("v", " Visibility  "));
        spans.extend(key_hint("e", " Edit  "));
        spans.extend(key_hint("i/x", " Topic In/Out  "));
        spans.extend(key_hint("I/X", " Bank In/Out  "));
        spans.extend(key_hint("a", " Logout  "));
    } else {
        spans.extend(key_hint("a", " Admin  "));
    }
    spans.extend(key_hint("q", " Quit"));
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_color_fallback() {
        assert_eq!(module_color("red"), Color::Red);
        assert_eq!(module_color("stone"), Color::DarkGray);
        assert_eq!(module_color("unknown"), Color::Gray);
    }
}
