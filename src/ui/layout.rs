use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct DashboardLayout {
    pub header_area: Rect,
    pub tabs_area: Rect,
    pub progress_area: Rect,
    pub list_area: Rect,
    pub status_area: Rect,
    pub help_area: Rect,
}

pub struct QuizLayout {
    pub header_area: Rect,
    pub progress_area: Rect,
    pub question_area: Rect,
    pub options_area: Rect,
    pub feedback_area: Rect,
    pub help_area: Rect,
}

pub struct ResultsLayout {
    pub header_area: Rect,
    pub content_area: Rect,
    pub footer_area: Rect,
}

pub fn calculate_dashboard_chunks(area: Rect) -> DashboardLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    DashboardLayout {
        header_area: chunks[0],
        tabs_area: chunks[1],
        progress_area: chunks[2],
        list_area: chunks[3],
        status_area: chunks[4],
        help_area: chunks[5],
    }
}

pub fn calculate_quiz_chunks(area: Rect) -> QuizLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Length(3),
        ])
        .split(area);

    QuizLayout {
        header_area: chunks[0],
        progress_area: chunks[1],
        question_area: chunks[2],
        options_area: chunks[3],
        feedback_area: chunks[4],
        help_area: chunks[5],
    }
}

pub fn calculate_results_chunks(area: Rect) -> ResultsLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area);

    ResultsLayout {
        header_area: chunks[0],
        content_area: chunks[1],
        footer_area: chunks[2],
    }
}

/// A box `percent_x` wide and `height` rows tall, centered in `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_layout() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = calculate_dashboard_chunks(area);

        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.progress_area.height, 1);
        assert_eq!(layout.status_area.height, 3);
        assert_eq!(layout.help_area.height, 3);
        // margin 1 leaves 38 rows, 11 of them fixed
        assert_eq!(layout.list_area.height, 27);
    }

    #[test]
    fn test_quiz_layout() {
        let area = Rect::new(0, 0, 100, 100);
        let layout = calculate_quiz_chunks(area);

        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.help_area.height, 3);
        assert!(layout.question_area.height >= 4);
        assert!(layout.options_area.height > 0);
        assert!(layout.feedback_area.height > 0);
    }

    #[test]
    fn test_results_layout() {
        let area = Rect::new(0, 0, 100, 100);
        let layout = calculate_results_chunks(area);

        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.footer_area.height, 3);
        assert_eq!(layout.content_area.height, 92);
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 30);
        let rect = centered_rect(60, 10, area);
        assert_eq!(rect.height, 10);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.x, 20);
        assert_eq!(rect.y, 10);

        let clipped = centered_rect(50, 50, Rect::new(0, 0, 40, 8));
        assert_eq!(clipped.height, 8);
    }
}
