//! Single-page PDF export of a quiz result.
//!
//! The results document is drawn into an off-screen terminal buffer, which is
//! then placed on one portrait A4 page at full page width as monospaced text.
//! A document taller than the page is squeezed vertically to fit.

use crate::error::Result;
use crate::file_io::write_export;
use crate::results::QuizResult;
use crate::ui::draw_results_document;
use chrono::NaiveDate;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::fmt::Write as _;
use std::path::Path;

pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;
pub const DOCUMENT_COLUMNS: u16 = 80;

/// Courier advance width as a fraction of the font size.
const COURIER_ADVANCE: f32 = 0.6;
/// A terminal cell is about twice as tall as it is wide.
const CELL_ASPECT: f32 = 2.0;
const MAX_DOCUMENT_ROWS: u16 = 2000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFit {
    pub width: f32,
    pub height: f32,
}

impl PageFit {
    pub fn is_compressed(&self, image_width: f32, image_height: f32) -> bool {
        self.height < image_height * self.width / image_width
    }
}

/// Full page width; natural height at that width, capped at the page height.
pub fn fit_to_page(image_width: f32, image_height: f32, page_width: f32, page_height: f32) -> PageFit {
    let natural_height = image_height * page_width / image_width;
    PageFit {
        width: page_width,
        height: natural_height.min(page_height),
    }
}

pub fn default_file_name(date: NaiveDate) -> String {
    format!("quiz-results-{}.pdf", date.format("%Y-%m-%d"))
}

pub fn today_file_name() -> String {
    default_file_name(chrono::Utc::now().date_naive())
}

/// Draw the results document off-screen and trim trailing blank rows.
pub fn render_document(result: &QuizResult, title: &str) -> std::io::Result<Buffer> {
    let rows = estimated_rows(result);
    let mut terminal = Terminal::new(TestBackend::new(DOCUMENT_COLUMNS, rows))?;
    terminal.draw(|f| draw_results_document(f, result, title))?;
    let buffer = terminal.backend().buffer().clone();

    let lines = buffer_lines(&buffer);
    let used = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(1, |i| i + 1);
    let mut trimmed = Buffer::empty(ratatui::layout::Rect::new(0, 0, DOCUMENT_COLUMNS, used as u16));
    let width = DOCUMENT_COLUMNS as usize;
    for (i, cell) in buffer.content().iter().take(width * used).enumerate() {
        trimmed.content[i] = cell.clone();
    }
    Ok(trimmed)
}

/// Generous upper bound; wrapping only ever adds rows.
fn estimated_rows(result: &QuizResult) -> u16 {
    let text_len: usize = result
        .incorrect()
        .map(|r| {
            r.question_text.len()
                + r.selected_answer.len()
                + r.correct_answer.len()
                + r.explanation.as_deref().map_or(0, str::len)
        })
        .sum();
    let per_record = result.incorrect().count() * 8;
    let rows = 30 + per_record + 2 * text_len / (DOCUMENT_COLUMNS as usize - 4);
    rows.min(MAX_DOCUMENT_ROWS as usize) as u16
}

/// Rows of the buffer as text, trailing spaces removed.
pub fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let width = buffer.area.width.max(1) as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| {
            let mut line = String::new();
            for cell in row {
                line.push_str(cell.symbol());
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Characters outside printable ASCII are mapped to close stand-ins.
fn pdf_char(ch: char) -> char {
    match ch {
        ' '..='~' => ch,
        '•' | '·' => '*',
        '✓' | '✔' | '✅' => '+',
        '✗' | '✘' | '❌' => 'x',
        '█' | '▓' | '▒' => '#',
        '░' => '.',
        '─' | '━' | '—' | '–' => '-',
        '│' | '┃' => '|',
        '┌' | '┐' | '└' | '┘' | '├' | '┤' | '┬' | '┴' | '┼' | '╭' | '╮' | '╯' | '╰' => '+',
        _ => '?',
    }
}

fn pdf_escape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars().map(pdf_char) {
        if matches!(ch, '\\' | '(' | ')') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Minimal PDF 1.4: one page, one content stream, built-in Courier.
pub fn build_pdf(lines: &[String], columns: u16) -> Vec<u8> {
    let columns = columns.max(1) as f32;
    let rows = lines.len().max(1) as f32;
    let cell_width = A4_WIDTH_PT / columns;
    let font_size = cell_width / COURIER_ADVANCE;

    let fit = fit_to_page(columns, rows * CELL_ASPECT, A4_WIDTH_PT, A4_HEIGHT_PT);
    let row_height = fit.height / rows;
    let vertical_scale = row_height / (cell_width * CELL_ASPECT);

    let mut content = String::new();
    content.push_str("BT\n");
    let _ = writeln!(content, "/F1 {:.3} Tf", font_size);
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        // baseline sits a little above the bottom of the row
        let y = A4_HEIGHT_PT - (i as f32 + 1.0) * row_height + row_height * 0.25;
        let _ = writeln!(
            content,
            "1 0 0 {:.4} 0 {:.3} Tm ({}) Tj",
            vertical_scale.min(1.0),
            y,
            pdf_escape(line)
        );
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>",
            A4_WIDTH_PT, A4_HEIGHT_PT
        ),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }
    let xref_start = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    );
    pdf.into_bytes()
}

pub fn export_pdf(result: &QuizResult, title: &str, path: &Path) -> Result<()> {
    let buffer = render_document(result, title)?;
    let lines = buffer_lines(&buffer);
    tracing::debug!("Results document is {} rows", lines.len());
    write_export(path, &build_pdf(&lines, buffer.area.width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerRecord;
    use std::time::Duration;

    fn result(wrong: usize) -> QuizResult {
        let mut records = vec![AnswerRecord {
            question_text: "Which port does SSH use?".to_string(),
            selected_answer: "22".to_string(),
            correct_answer: "22".to_string(),
            is_correct: true,
            explanation: None,
        }];
        for i in 0..wrong {
            records.push(AnswerRecord {
                question_text: format!("Wrong question number {}?", i),
                selected_answer: "y".to_string(),
                correct_answer: "x".to_string(),
                is_correct: false,
                explanation: Some("Because (x) is right \\ always.".to_string()),
            });
        }
        QuizResult::from_records(&records, Duration::from_secs(42))
    }

    #[test]
    fn test_short_document_keeps_natural_height() {
        let fit = fit_to_page(800.0, 400.0, A4_WIDTH_PT, A4_HEIGHT_PT);
        assert_eq!(fit.width, A4_WIDTH_PT);
        assert!((fit.height - 297.64).abs() < 0.01);
        assert!(!fit.is_compressed(800.0, 400.0));
    }

    #[test]
    fn test_tall_document_is_squeezed_to_page() {
        let fit = fit_to_page(800.0, 4000.0, A4_WIDTH_PT, A4_HEIGHT_PT);
        assert_eq!(fit.width, A4_WIDTH_PT);
        assert_eq!(fit.height, A4_HEIGHT_PT);
        assert!(fit.is_compressed(800.0, 4000.0));
    }

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(default_file_name(date), "quiz-results-2024-03-07.pdf");
    }

    #[test]
    fn test_today_file_name_uses_utc_date() {
        let before = chrono::Utc::now().date_naive();
        let name = today_file_name();
        let after = chrono::Utc::now().date_naive();
        assert!(name == default_file_name(before) || name == default_file_name(after));
    }

    #[test]
    fn test_escape_and_ascii_mapping() {
        assert_eq!(pdf_escape(r"a (b) \c"), r"a \(b\) \\c");
        assert_eq!(pdf_escape("• ✓ é"), "* + ?");
    }

    #[test]
    fn test_render_document_contains_summary() {
        let buffer = render_document(&result(1), "Scanning Networks").unwrap();
        assert_eq!(buffer.area.width, DOCUMENT_COLUMNS);
        let text = buffer_lines(&buffer).join("\n");
        assert!(text.contains("Quiz Results"));
        assert!(text.contains("Scanning Networks"));
        assert!(text.contains("50%"));
        assert!(text.contains("Wrong question number 0?"));
        assert!(!buffer_lines(&buffer).last().unwrap().is_empty());
    }

    #[test]
    fn test_pdf_structure() {
        let lines = vec!["Quiz Results".to_string(), String::new(), "Score: 50%".to_string()];
        let pdf = String::from_utf8(build_pdf(&lines, DOCUMENT_COLUMNS)).unwrap();
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
        assert!(pdf.contains("/BaseFont /Courier"));
        assert!(pdf.contains("(Quiz Results) Tj"));
        assert_eq!(pdf.matches(" Tj").count(), 2);
        let xref_at = pdf.find("xref\n").unwrap();
        assert!(pdf.contains(&format!("startxref\n{}\n", xref_at)));
    }

    #[test]
    fn test_export_pdf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_file_name(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        export_pdf(&result(40), "Long quiz", &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
