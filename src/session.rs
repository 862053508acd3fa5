use crate::models::{AnswerRecord, AppState, ModuleId, Question};
use crate::results::QuizResult;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// No questions; only returning to the dashboard is possible.
    Empty,
    Answering,
    Checked,
    Completed,
}

#[derive(Debug)]
pub struct QuizSession {
    pub module_id: ModuleId,
    pub sub_topic: Option<String>,
    pub title: String,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub selected_index: Option<usize>,
    pub phase: QuizPhase,
    pub explanation: Option<String>,
    pub records: Vec<AnswerRecord>,
    pub started_at: Instant,
    pub finished_at: Option<Instant>,
}

pub fn quiz_title(module_title: &str, sub_topic: Option<&str>, content_point: Option<&str>) -> String {
    match (sub_topic, content_point) {
        (Some(sub), Some(point)) => format!("{}: {}", sub, point),
        (Some(sub), None) => format!("{}: {}", module_title, sub),
        _ => module_title.to_string(),
    }
}

/// Parse the requested number of questions, accepted in `1..=max`.
pub fn validate_question_count(input: &str, max: usize) -> Result<usize, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Please enter a number.".to_string());
    }
    match input.parse::<usize>() {
        Ok(count) if (1..=max).contains(&count) => Ok(count),
        _ => Err(format!("Please enter a number between 1 and {}.", max)),
    }
}

impl QuizSession {
    pub fn new(module_id: ModuleId, sub_topic: Option<String>, title: String, questions: Vec<Question>) -> Self {
        let phase = if questions.is_empty() {
            QuizPhase::Empty
        } else {
            QuizPhase::Answering
        };
        Self {
            module_id,
            sub_topic,
            title,
            questions,
            current_index: 0,
            selected_index: None,
            phase,
            explanation: None,
            records: Vec::new(),
            started_at: Instant::now(),
            finished_at: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn selected_answer(&self) -> Option<&str> {
        let question = self.current_question()?;
        self.selected_index
            .and_then(|i| question.options.get(i))
            .map(String::as_str)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// Whole-module quizzes count towards module completion.
    pub fn is_module_quiz(&self) -> bool {
        self.sub_topic.is_none()
    }

    pub fn select_answer(&mut self, option_index: usize) -> bool {
        if self.phase != QuizPhase::Answering {
            return false;
        }
        let in_range = self
            .current_question()
            .is_some_and(|q| option_index < q.options.len());
        if in_range {
            self.selected_index = Some(option_index);
        }
        in_range
    }

    /// Returns whether the selected answer was correct, or `None` when
    /// nothing could be checked.
    pub fn check_answer(&mut self) -> Option<bool> {
        if self.phase != QuizPhase::Answering {
            return None;
        }
        let selected = self.selected_answer()?.to_string();
        let question = self.current_question()?;
        let is_correct = question.is_correct(&selected);
        let explanation = question.explanation_text().map(str::to_string);

        self.records.push(AnswerRecord {
            question_text: question.question.clone(),
            selected_answer: selected,
            correct_answer: question.correct_answer.clone(),
            is_correct,
            explanation: explanation.clone(),
        });
        self.explanation = explanation;
        self.phase = QuizPhase::Checked;
        Some(is_correct)
    }

    /// Advance past a checked question. Returns the module id when this
    /// call completed the quiz.
    pub fn next_question(&mut self) -> Option<ModuleId> {
        if self.phase != QuizPhase::Checked {
            return None;
        }
        if self.is_last_question() {
            self.phase = QuizPhase::Completed;
            self.finished_at = Some(Instant::now());
            tracing::info!("Quiz '{}' completed", self.title);
            return Some(self.module_id);
        }
        self.current_index += 1;
        self.selected_index = None;
        self.explanation = None;
        self.phase = QuizPhase::Answering;
        None
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }

    pub fn result(&self) -> QuizResult {
        QuizResult::from_records(&self.records, self.elapsed())
    }

    pub fn progress_percentage(&self) -> u16 {
        if self.questions.is_empty() {
            return 0;
        }
        (((self.current_index + 1) * 100) / self.questions.len()) as u16
    }
}

/// Key handling while a quiz is on screen. Returns the module id when the
/// quiz has just completed.
pub fn handle_quiz_input(session: &mut QuizSession, key: KeyEvent, app_state: &mut AppState) -> Option<ModuleId> {
    match session.phase {
        // leaving an empty quiz counts as finishing it
        QuizPhase::Empty => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('m')) {
                return Some(session.module_id);
            }
            None
        }
        QuizPhase::Answering => {
            let option_count = session.current_question().map_or(0, |q| q.options.len());
            match key.code {
                KeyCode::Esc => *app_state = AppState::QuizQuitConfirm,
                KeyCode::Down | KeyCode::Char('j') => {
                    let next = session
                        .selected_index
                        .map_or(0, |i| (i + 1).min(option_count.saturating_sub(1)));
                    session.select_answer(next);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    let prev = session.selected_index.map_or(0, |i| i.saturating_sub(1));
                    session.select_answer(prev);
                }
                KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                    let index = c as usize - '1' as usize;
                    session.select_answer(index);
                }
                KeyCode::Enter => {
                    session.check_answer();
                }
                _ => {}
            }
            None
        }
        QuizPhase::Checked => match key.code {
            KeyCode::Esc => {
                *app_state = AppState::QuizQuitConfirm;
                None
            }
            KeyCode::Enter | KeyCode::Char('n') => {
                let completed = session.next_question();
                if completed.is_some() {
                    *app_state = AppState::Results;
                }
                completed
            }
            _ => None,
        },
        QuizPhase::Completed => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn question(id: &str, options: &[&str], correct: &str, explanation: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            question: format!("Question {}?", id),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct.to_string(),
            explanation: explanation.map(str::to_string),
        }
    }

    fn session(questions: Vec<Question>, sub_topic: Option<&str>) -> QuizSession {
        QuizSession::new(3, sub_topic.map(str::to_string), "Test".to_string(), questions)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_empty_list_never_answers() {
        let mut s = session(vec![], Some("A"));
        assert_eq!(s.phase, QuizPhase::Empty);
        assert!(!s.select_answer(0));
        assert_eq!(s.check_answer(), None);
        assert_eq!(s.next_question(), None);

        let mut state = AppState::Quiz;
        assert_eq!(handle_quiz_input(&mut s, key(KeyCode::Char('x')), &mut state), None);
        assert_eq!(handle_quiz_input(&mut s, key(KeyCode::Enter), &mut state), Some(3));
        assert_eq!(state, AppState::Quiz);
    }

    #[test]
    fn test_check_requires_selection() {
        let mut s = session(vec![question("q1", &["x", "y"], "x", None)], None);
        assert_eq!(s.check_answer(), None);
        assert_eq!(s.phase, QuizPhase::Answering);
    }

    #[test]
    fn test_select_is_noop_once_checked() {
        let mut s = session(vec![question("q1", &["x", "y"], "x", None)], None);
        s.select_answer(1);
        assert_eq!(s.check_answer(), Some(false));
        assert!(!s.select_answer(0));
        assert_eq!(s.selected_answer(), Some("y"));
    }

    #[test]
    fn test_explanation_surfaces_only_when_present() {
        let mut s = session(
            vec![
                question("q1", &["x", "y"], "x", Some("Because **x**.")),
                question("q2", &["x", "y"], "y", Some("  ")),
            ],
            None,
        );
        s.select_answer(0);
        assert_eq!(s.check_answer(), Some(true));
        assert_eq!(s.explanation.as_deref(), Some("Because **x**."));

        assert_eq!(s.next_question(), None);
        assert!(s.explanation.is_none());
        assert!(s.selected_index.is_none());
        assert_eq!(s.phase, QuizPhase::Answering);

        s.select_answer(1);
        s.check_answer();
        assert!(s.explanation.is_none());
    }

    #[test]
    fn test_completion_happens_exactly_once() {
        let mut s = session(
            vec![
                question("q1", &["a", "b"], "a", None),
                question("q2", &["a", "b"], "b", None),
            ],
            None,
        );
        for (i, pick) in [0, 0].iter().enumerate() {
            s.select_answer(*pick);
            s.check_answer();
            let outcome = s.next_question();
            if i == 1 {
                assert_eq!(outcome, Some(3));
            } else {
                assert_eq!(outcome, None);
            }
        }
        assert_eq!(s.phase, QuizPhase::Completed);
        assert_eq!(s.next_question(), None);
        assert!(!s.select_answer(0));
        assert_eq!(s.check_answer(), None);
        assert_eq!(s.phase, QuizPhase::Completed);

        let result = s.result();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.score, 50);
    }

    #[test]
    fn test_duplicate_option_text_compares_by_value() {
        let mut s = session(vec![question("q1", &["same", "same"], "same", None)], None);
        s.select_answer(1);
        assert_eq!(s.check_answer(), Some(true));
    }

    #[test]
    fn test_keyboard_flow_to_results() {
        let mut s = session(vec![question("q1", &["x", "y"], "x", None)], Some("A"));
        let mut state = AppState::Quiz;

        handle_quiz_input(&mut s, key(KeyCode::Char('2')), &mut state);
        assert_eq!(s.selected_answer(), Some("y"));
        handle_quiz_input(&mut s, key(KeyCode::Up), &mut state);
        assert_eq!(s.selected_answer(), Some("x"));
        handle_quiz_input(&mut s, key(KeyCode::Down), &mut state);
        assert_eq!(s.selected_answer(), Some("y"));
        handle_quiz_input(&mut s, key(KeyCode::Down), &mut state);
        assert_eq!(s.selected_answer(), Some("y"));

        handle_quiz_input(&mut s, key(KeyCode::Enter), &mut state);
        assert_eq!(s.phase, QuizPhase::Checked);
        assert!(!s.records[0].is_correct);

        let done = handle_quiz_input(&mut s, key(KeyCode::Enter), &mut state);
        assert_eq!(done, Some(3));
        assert_eq!(state, AppState::Results);
    }

    #[test]
    fn test_escape_asks_for_confirmation() {
        let mut s = session(vec![question("q1", &["x"], "x", None)], None);
        let mut state = AppState::Quiz;
        handle_quiz_input(&mut s, key(KeyCode::Esc), &mut state);
        assert_eq!(state, AppState::QuizQuitConfirm);
    }

    #[test]
    fn test_out_of_range_digit_is_ignored() {
        let mut s = session(vec![question("q1", &["x", "y"], "x", None)], None);
        let mut state = AppState::Quiz;
        handle_quiz_input(&mut s, key(KeyCode::Char('9')), &mut state);
        assert!(s.selected_index.is_none());
    }

    #[test]
    fn test_quiz_title_variants() {
        assert_eq!(quiz_title("Sniffing", None, None), "Sniffing");
        assert_eq!(quiz_title("Sniffing", Some("ARP poisoning"), None), "Sniffing: ARP poisoning");
        assert_eq!(
            quiz_title("DOMAIN 1", Some("1.4 Risk Management"), Some("Risk registers")),
            "1.4 Risk Management: Risk registers"
        );
    }

    #[test]
    fn test_validate_question_count() {
        assert_eq!(validate_question_count("3", 5), Ok(3));
        assert_eq!(validate_question_count(" 5 ", 5), Ok(5));
        assert_eq!(validate_question_count("", 5), Err("Please enter a number.".to_string()));
        let range = Err("Please enter a number between 1 and 5.".to_string());
        assert_eq!(validate_question_count("0", 5), range);
        assert_eq!(validate_question_count("6", 5), range);
        assert_eq!(validate_question_count("abc", 5), range);
        assert_eq!(validate_question_count("-1", 5), range);
    }

    #[test]
    fn test_progress_percentage() {
        let s = session(
            vec![
                question("1", &["x"], "x", None),
                question("2", &["x"], "x", None),
                question("3", &["x"], "x", None),
                question("4", &["x"], "x", None),
            ],
            None,
        );
        assert_eq!(s.progress_percentage(), 25);
    }
}
