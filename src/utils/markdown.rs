use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

lazy_static::lazy_static! {
    static ref BOLD_RE: Regex = Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern compiles");
    static ref CALLOUT_RE: Regex = Regex::new(r"^(🔐|💡|✅|❌)\s").expect("callout pattern compiles");
}

/// Render explanation text for ratatui.
///
/// Supports `- ` / `* ` bullet items, `**bold**` runs, and callout lines
/// opening with one of 🔐 💡 ✅ ❌ which are shown bold. Blank lines are dropped.
pub fn render_markdown(content: &str) -> Vec<Line<'static>> {
    let mut result = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            let mut spans = vec![Span::from("  • ")];
            spans.extend(parse_inline(item));
            result.push(Line::from(spans));
            continue;
        }

        if CALLOUT_RE.is_match(line) {
            result.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            continue;
        }

        result.push(Line::from(parse_inline(line)));
    }

    result
}

/// Split `**bold**` runs out of plain text.
fn parse_inline(text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::from(text[last..whole.start()].to_string()));
        }
        spans.push(Span::styled(
            inner.as_str().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        last = whole.end();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::from(text[last..].to_string()));
    }

    spans
}

/// Plain-text rendering for documents without styling.
pub fn strip_markdown(content: &str) -> Vec<String> {
    render_markdown(content)
        .iter()
        .map(|line| line.to_string())
        .collect()
}
