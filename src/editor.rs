//! Draft-based editing of one (module, sub-topic) question list.
//!
//! Nothing reaches the bank until the draft is saved; closing discards it.

use crate::models::{ModuleId, Question};
use crate::utils::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

pub const FORM_OPTION_COUNT: usize = 4;

/// Fresh question id, unique among `existing`.
pub fn new_question_id(existing: &[Question]) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut rng = rand::thread_rng();
    loop {
        let id = format!("q_{}_{:06x}", millis, rng.gen_range(0..0x100_0000u32));
        if !existing.iter().any(|q| q.id == id) {
            return id;
        }
    }
}

pub fn validate_question(question: &Question) -> Result<(), String> {
    if question.id.trim().is_empty() {
        return Err("Question id is missing.".to_string());
    }
    if question.question.trim().is_empty() {
        return Err("Question text is required.".to_string());
    }
    if question.options.len() < 2 {
        return Err("Provide at least two options.".to_string());
    }
    if !question.options.contains(&question.correct_answer) {
        return Err("The correct answer must match one of the options.".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Question,
    Option(usize),
    Explanation,
}

impl FormField {
    fn next(self, option_count: usize) -> Self {
        match self {
            FormField::Question => FormField::Option(0),
            FormField::Option(i) if i + 1 < option_count => FormField::Option(i + 1),
            FormField::Option(_) => FormField::Explanation,
            FormField::Explanation => FormField::Question,
        }
    }

    fn prev(self, option_count: usize) -> Self {
        match self {
            FormField::Question => FormField::Explanation,
            FormField::Option(0) => FormField::Question,
            FormField::Option(i) => FormField::Option(i - 1),
            FormField::Explanation => FormField::Option(option_count.saturating_sub(1)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuestionForm {
    /// Id of the question being edited; a new one is generated on submit when `None`.
    pub id: Option<String>,
    pub question: TextInput,
    pub options: Vec<TextInput>,
    pub correct: Option<usize>,
    pub explanation: TextInput,
    pub focus: FormField,
    pub error: Option<String>,
}

impl QuestionForm {
    pub fn blank() -> Self {
        Self {
            id: None,
            question: TextInput::default(),
            options: vec![TextInput::default(); FORM_OPTION_COUNT],
            correct: None,
            explanation: TextInput::default(),
            focus: FormField::Question,
            error: None,
        }
    }

    pub fn from_question(question: &Question) -> Self {
        let mut options: Vec<TextInput> = question.options.iter().map(|o| TextInput::new(o)).collect();
        while options.len() < FORM_OPTION_COUNT {
            options.push(TextInput::default());
        }
        Self {
            id: Some(question.id.clone()),
            question: TextInput::new(&question.question),
            correct: question.options.iter().position(|o| *o == question.correct_answer),
            options,
            explanation: TextInput::new(question.explanation.as_deref().unwrap_or_default()),
            focus: FormField::Question,
            error: None,
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            FormField::Question => &mut self.question,
            FormField::Option(i) => &mut self.options[i],
            FormField::Explanation => &mut self.explanation,
        }
    }

    /// Build the question. Blank options are dropped; the correct option
    /// keeps pointing at the same text.
    pub fn to_question(&self, existing: &[Question]) -> Result<Question, String> {
        let correct_answer = self
            .correct
            .and_then(|i| self.options.get(i))
            .map(|o| o.value.trim().to_string())
            .unwrap_or_default();
        let options: Vec<String> = self
            .options
            .iter()
            .map(|o| o.value.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        let explanation = self.explanation.value.trim();

        let question = Question {
            id: self
                .id
                .clone()
                .unwrap_or_else(|| new_question_id(existing)),
            question: self.question.value.trim().to_string(),
            options,
            correct_answer,
            explanation: (!explanation.is_empty()).then(|| explanation.to_string()),
        };
        validate_question(&question)?;
        Ok(question)
    }
}

#[derive(Debug, Clone)]
pub enum EditorMode {
    List,
    Form(QuestionForm),
    ConfirmDelete(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPane {
    Draft,
    Suggestions,
}

/// What the editor asks its owner to do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    None,
    Save,
    Close,
    RequestSuggestions,
}

#[derive(Debug, Clone)]
pub struct QuestionEditor {
    pub module_id: ModuleId,
    pub module_title: String,
    pub sub_topic: String,
    pub content_point: Option<String>,
    pub draft: Vec<Question>,
    pub cursor: usize,
    pub mode: EditorMode,
    pub pane: EditorPane,
    pub suggestions: Vec<Question>,
    pub suggestion_cursor: usize,
    pub suggestions_pending: bool,
    pub message: Option<String>,
}

impl QuestionEditor {
    pub fn new(
        module_id: ModuleId,
        module_title: &str,
        sub_topic: &str,
        content_point: Option<&str>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            module_id,
            module_title: module_title.to_string(),
            sub_topic: sub_topic.to_string(),
            content_point: content_point.map(str::to_string),
            draft: questions,
            cursor: 0,
            mode: EditorMode::List,
            pane: EditorPane::Draft,
            suggestions: Vec::new(),
            suggestion_cursor: 0,
            suggestions_pending: false,
            message: None,
        }
    }

    /// Heading shown above the list: `sub-topic` or `sub-topic > content point`.
    pub fn heading(&self) -> String {
        match &self.content_point {
            Some(point) => format!("{} > {}", self.sub_topic, point),
            None => self.sub_topic.clone(),
        }
    }

    /// Replace in place when the id exists, append otherwise.
    pub fn upsert(&mut self, question: Question) {
        match self.draft.iter().position(|q| q.id == question.id) {
            Some(index) => self.draft[index] = question,
            None => self.draft.push(question),
        }
    }

    pub fn request_delete(&mut self, id: &str) {
        if self.draft.iter().any(|q| q.id == id) {
            self.mode = EditorMode::ConfirmDelete(id.to_string());
        }
    }

    pub fn confirm_delete(&mut self) {
        if let EditorMode::ConfirmDelete(id) = &self.mode {
            let id = id.clone();
            self.draft.retain(|q| q.id != id);
            self.cursor = self.cursor.min(self.draft.len().saturating_sub(1));
        }
        self.mode = EditorMode::List;
    }

    pub fn cancel_delete(&mut self) {
        self.mode = EditorMode::List;
    }

    pub fn begin_add(&mut self) {
        self.mode = EditorMode::Form(QuestionForm::blank());
    }

    pub fn begin_edit(&mut self, index: usize) {
        if let Some(question) = self.draft.get(index) {
            self.mode = EditorMode::Form(QuestionForm::from_question(question));
        }
    }

    /// Validate and apply the open form. On failure the form stays open
    /// with the error attached.
    pub fn submit_form(&mut self) -> bool {
        let EditorMode::Form(form) = &mut self.mode else {
            return false;
        };
        match form.to_question(&self.draft) {
            Ok(question) => {
                self.mode = EditorMode::List;
                self.upsert(question);
                true
            }
            Err(e) => {
                form.error = Some(e);
                false
            }
        }
    }

    pub fn begin_suggestions(&mut self) {
        self.suggestions_pending = true;
        self.message = Some("Requesting suggestions...".to_string());
    }

    pub fn apply_suggestions(&mut self, outcome: Result<Vec<Question>, String>) {
        self.suggestions_pending = false;
        match outcome {
            Ok(questions) => {
                self.message = Some(format!("{} suggestions received.", questions.len()));
                self.suggestions = questions;
                self.suggestion_cursor = 0;
                if !self.suggestions.is_empty() {
                    self.pane = EditorPane::Suggestions;
                }
            }
            Err(e) => {
                tracing::warn!("Suggestion request failed: {}", e);
                self.message = Some(e);
            }
        }
    }

    /// Move a suggestion into the draft. The id is refreshed if it collides.
    pub fn accept_suggestion(&mut self, index: usize) -> bool {
        if index >= self.suggestions.len() {
            return false;
        }
        let mut question = self.suggestions.remove(index);
        if self.draft.iter().any(|q| q.id == question.id) {
            question.id = new_question_id(&self.draft);
        }
        self.draft.push(question);
        self.suggestion_cursor = self
            .suggestion_cursor
            .min(self.suggestions.len().saturating_sub(1));
        if self.suggestions.is_empty() {
            self.pane = EditorPane::Draft;
        }
        true
    }

    pub fn dismiss_suggestion(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.suggestions.remove(index);
            self.suggestion_cursor = self
                .suggestion_cursor
                .min(self.suggestions.len().saturating_sub(1));
        }
        if self.suggestions.is_empty() {
            self.pane = EditorPane::Draft;
        }
    }

    /// Final contents for the bank.
    pub fn into_saved(self) -> (ModuleId, String, Vec<Question>) {
        (self.module_id, self.sub_topic, self.draft)
    }
}

pub fn handle_editor_input(editor: &mut QuestionEditor, key: KeyEvent) -> EditorAction {
    match &mut editor.mode {
        EditorMode::ConfirmDelete(_) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => editor.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => editor.cancel_delete(),
                _ => {}
            }
            EditorAction::None
        }
        EditorMode::Form(form) => {
            let option_count = form.options.len();
            match key.code {
                KeyCode::Esc => editor.mode = EditorMode::List,
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    editor.submit_form();
                }
                KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(option_count),
                KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(option_count),
                KeyCode::Enter => {
                    if let FormField::Option(i) = form.focus {
                        form.correct = Some(i);
                    } else {
                        form.focus = form.focus.next(option_count);
                    }
                }
                KeyCode::Left => form.focused_input().move_left(),
                KeyCode::Right => form.focused_input().move_right(),
                KeyCode::Home => form.focused_input().move_home(),
                KeyCode::End => form.focused_input().move_end(),
                KeyCode::Backspace => form.focused_input().backspace(),
                KeyCode::Delete => form.focused_input().delete(),
                KeyCode::Char(c) => {
                    form.focused_input().insert(c);
                    form.error = None;
                }
                _ => {}
            }
            EditorAction::None
        }
        EditorMode::List => match editor.pane {
            EditorPane::Draft => handle_draft_keys(editor, key),
            EditorPane::Suggestions => handle_suggestion_keys(editor, key),
        },
    }
}

fn handle_draft_keys(editor: &mut QuestionEditor, key: KeyEvent) -> EditorAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return EditorAction::Close,
        KeyCode::Char('s') => return EditorAction::Save,
        KeyCode::Char('g') if !editor.suggestions_pending => {
            editor.begin_suggestions();
            return EditorAction::RequestSuggestions;
        }
        KeyCode::Tab if !editor.suggestions.is_empty() => editor.pane = EditorPane::Suggestions,
        KeyCode::Up | KeyCode::Char('k') => editor.cursor = editor.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if editor.cursor + 1 < editor.draft.len() {
                editor.cursor += 1;
            }
        }
        KeyCode::Char('a') => editor.begin_add(),
        KeyCode::Enter | KeyCode::Char('e') => editor.begin_edit(editor.cursor),
        KeyCode::Char('d') => {
            if let Some(id) = editor.draft.get(editor.cursor).map(|q| q.id.clone()) {
                editor.request_delete(&id);
            }
        }
        _ => {}
    }
    EditorAction::None
}

fn handle_suggestion_keys(editor: &mut QuestionEditor, key: KeyEvent) -> EditorAction {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => editor.pane = EditorPane::Draft,
        KeyCode::Up | KeyCode::Char('k') => {
            editor.suggestion_cursor = editor.suggestion_cursor.saturating_sub(1)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if editor.suggestion_cursor + 1 < editor.suggestions.len() {
                editor.suggestion_cursor += 1;
            }
        }
        KeyCode::Enter | KeyCode::Char('a') => {
            editor.accept_suggestion(editor.suggestion_cursor);
        }
        KeyCode::Char('x') => editor.dismiss_suggestion(editor.suggestion_cursor),
        _ => {}
    }
    EditorAction::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            question: text.to_string(),
            options: vec!["x".to_string(), "y".to_string()],
            correct_answer: "x".to_string(),
            explanation: None,
        }
    }

    fn editor(questions: Vec<Question>) -> QuestionEditor {
        QuestionEditor::new(3, "Scanning Networks", "A", None, questions)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn type_text(editor: &mut QuestionEditor, text: &str) {
        for c in text.chars() {
            handle_editor_input(editor, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut e = editor(vec![question("a", "One"), question("b", "Two")]);
        e.upsert(question("b", "Two, revised"));
        assert_eq!(e.draft.len(), 2);
        assert_eq!(e.draft[1].question, "Two, revised");

        e.upsert(question("c", "Three"));
        assert_eq!(e.draft.len(), 3);
        assert_eq!(e.draft[2].id, "c");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut e = editor(vec![question("a", "One"), question("b", "Two")]);
        e.request_delete("a");
        assert_eq!(e.draft.len(), 2);
        e.cancel_delete();
        assert_eq!(e.draft.len(), 2);

        e.request_delete("a");
        e.confirm_delete();
        assert_eq!(e.draft.len(), 1);
        assert_eq!(e.draft[0].id, "b");
        assert!(matches!(e.mode, EditorMode::List));
    }

    #[test]
    fn test_request_delete_unknown_id_is_ignored() {
        let mut e = editor(vec![question("a", "One")]);
        e.request_delete("zzz");
        assert!(matches!(e.mode, EditorMode::List));
    }

    #[test]
    fn test_validation_messages() {
        let mut q = question("a", "  ");
        assert_eq!(validate_question(&q), Err("Question text is required.".to_string()));
        q.question = "Real".to_string();
        q.options = vec!["x".to_string()];
        assert_eq!(validate_question(&q), Err("Provide at least two options.".to_string()));
        q.options = vec!["y".to_string(), "z".to_string()];
        assert!(validate_question(&q).is_err());
        q.correct_answer = "z".to_string();
        assert!(validate_question(&q).is_ok());
        q.id = String::new();
        assert_eq!(validate_question(&q), Err("Question id is missing.".to_string()));
    }

    #[test]
    fn test_new_ids_are_unique() {
        let mut existing = Vec::new();
        for _ in 0..50 {
            let id = new_question_id(&existing);
            assert!(!existing.iter().any(|q: &Question| q.id == id));
            existing.push(question(&id, "Q"));
        }
    }

    #[test]
    fn test_form_drops_blank_options() {
        let mut form = QuestionForm::blank();
        form.question = TextInput::new("Which scan is stealthiest?");
        form.options[0] = TextInput::new("SYN");
        form.options[2] = TextInput::new("Connect");
        form.correct = Some(2);

        let q = form.to_question(&[]).unwrap();
        assert_eq!(q.options, vec!["SYN".to_string(), "Connect".to_string()]);
        assert_eq!(q.correct_answer, "Connect");
        assert!(!q.id.is_empty());
        assert!(q.explanation.is_none());
    }

    #[test]
    fn test_form_round_trips_existing_question() {
        let mut original = question("a", "One");
        original.explanation = Some("Because.".to_string());
        let form = QuestionForm::from_question(&original);
        assert_eq!(form.options.len(), FORM_OPTION_COUNT);
        assert_eq!(form.correct, Some(0));
        assert_eq!(form.to_question(&[]).unwrap(), original);
    }

    #[test]
    fn test_add_question_through_keyboard() {
        let mut e = editor(vec![]);
        handle_editor_input(&mut e, key(KeyCode::Char('a')));
        type_text(&mut e, "Default SSH port?");
        handle_editor_input(&mut e, key(KeyCode::Tab));
        type_text(&mut e, "21");
        handle_editor_input(&mut e, key(KeyCode::Tab));
        type_text(&mut e, "22");
        handle_editor_input(&mut e, key(KeyCode::Enter));

        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        handle_editor_input(&mut e, save);

        assert!(matches!(e.mode, EditorMode::List));
        assert_eq!(e.draft.len(), 1);
        assert_eq!(e.draft[0].correct_answer, "22");
        assert_eq!(e.draft[0].options, vec!["21".to_string(), "22".to_string()]);
    }

    #[test]
    fn test_invalid_form_stays_open() {
        let mut e = editor(vec![]);
        e.begin_add();
        assert!(!e.submit_form());
        match &e.mode {
            EditorMode::Form(form) => assert_eq!(form.error.as_deref(), Some("Question text is required.")),
            other => panic!("unexpected mode {:?}", other),
        }
        assert!(e.draft.is_empty());
    }

    #[test]
    fn test_suggestions_accept_and_fail() {
        let mut e = editor(vec![question("a", "One")]);
        e.begin_suggestions();
        assert!(e.suggestions_pending);

        e.apply_suggestions(Ok(vec![question("a", "Colliding id"), question("s2", "Two")]));
        assert!(!e.suggestions_pending);
        assert_eq!(e.pane, EditorPane::Suggestions);

        assert!(e.accept_suggestion(0));
        assert_eq!(e.draft.len(), 2);
        assert_ne!(e.draft[1].id, "a");
        assert_eq!(e.suggestions.len(), 1);

        let before = e.draft.clone();
        e.apply_suggestions(Err("Question suggestion failed: offline".to_string()));
        assert_eq!(e.draft, before);
        assert_eq!(e.message.as_deref(), Some("Question suggestion failed: offline"));
    }

    #[test]
    fn test_list_keys_map_to_actions() {
        let mut e = editor(vec![question("a", "One")]);
        assert_eq!(handle_editor_input(&mut e, key(KeyCode::Char('s'))), EditorAction::Save);
        assert_eq!(
            handle_editor_input(&mut e, key(KeyCode::Char('g'))),
            EditorAction::RequestSuggestions
        );
        // no second request while one is in flight
        assert_eq!(handle_editor_input(&mut e, key(KeyCode::Char('g'))), EditorAction::None);
        assert_eq!(handle_editor_input(&mut e, key(KeyCode::Esc)), EditorAction::Close);
    }

    #[test]
    fn test_save_returns_draft() {
        let mut e = editor(vec![]);
        e.upsert(question("n", "New"));
        let (module, sub, questions) = e.into_saved();
        assert_eq!(module, 3);
        assert_eq!(sub, "A");
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_heading_with_content_point() {
        let e = QuestionEditor::new(21, "DOMAIN 1", "1.1 Security Fundamentals", Some("CIA Triad"), vec![]);
        assert_eq!(e.heading(), "1.1 Security Fundamentals > CIA Triad");
    }
}
