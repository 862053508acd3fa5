//! Top-level application state and key dispatch.

use crate::ai_worker::{SuggestionRequest, SuggestionResponse};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::db::question_bank::{sub_topic_export_file_name, BANK_EXPORT_FILE_NAME};
use crate::db::{ModuleVisibilityStore, QuestionBankStore, SharedStorage};
use crate::editor::{handle_editor_input, EditorAction, QuestionEditor};
use crate::error::QuizError;
use crate::file_io::{read_import_file, resolve_export_path};
use crate::models::{AppState, Module, ModuleId, Question};
use crate::report;
use crate::results::QuizResult;
use crate::session::{handle_quiz_input, quiz_title, validate_question_count, QuizSession};
use crate::utils::TextInput;
use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRow {
    Module(ModuleId),
    SubTopic(ModuleId, usize),
    ContentPoint(ModuleId, usize, usize),
}

impl DashboardRow {
    pub fn module_id(&self) -> ModuleId {
        match *self {
            DashboardRow::Module(id) | DashboardRow::SubTopic(id, _) | DashboardRow::ContentPoint(id, _, _) => id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub exam_index: usize,
    pub cursor: usize,
    pub expanded_modules: BTreeSet<ModuleId>,
    pub expanded_sub_topics: BTreeSet<(ModuleId, usize)>,
}

/// What a quiz is about to run over.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizTarget {
    pub module_id: ModuleId,
    pub sub_topic: Option<String>,
    pub content_point: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileAction {
    ImportBank,
    ExportBank,
    ImportTopic { module_id: ModuleId, sub_topic: String },
    ExportTopic { module_id: ModuleId, sub_topic: String },
    ExportResults,
}

impl FileAction {
    pub fn prompt_title(&self) -> String {
        match self {
            FileAction::ImportBank => "Import question bank from".to_string(),
            FileAction::ExportBank => "Export question bank to".to_string(),
            FileAction::ImportTopic { sub_topic, .. } => format!("Import questions for {} from", sub_topic),
            FileAction::ExportTopic { sub_topic, .. } => format!("Export questions for {} to", sub_topic),
            FileAction::ExportResults => "Save results PDF to".to_string(),
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, FileAction::ImportBank | FileAction::ImportTopic { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: TextInput,
    pub password: TextInput,
    pub on_password: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PathPrompt {
    pub action: FileAction,
    pub input: TextInput,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CountPrompt {
    pub target: QuizTarget,
    pub title: String,
    pub max: usize,
    pub input: TextInput,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Overlay {
    Login(LoginForm),
    PathPrompt(PathPrompt),
    QuestionCount(CountPrompt),
    ResetConfirm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub catalog: Catalog,
    pub config: AppConfig,
    pub state: AppState,
    pub overlay: Option<Overlay>,
    pub dashboard: DashboardState,
    pub bank: QuestionBankStore,
    pub visibility: ModuleVisibilityStore,
    pub completed: BTreeSet<ModuleId>,
    pub is_admin: bool,
    pub session: Option<QuizSession>,
    pub result: Option<(String, QuizResult)>,
    pub results_scroll: u16,
    pub editor: Option<QuestionEditor>,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    suggestion_tx: Option<Sender<SuggestionRequest>>,
}

impl App {
    pub fn new(catalog: Catalog, storage: SharedStorage, config: AppConfig) -> Self {
        let bank = QuestionBankStore::load(storage.clone());
        let visibility = ModuleVisibilityStore::load(storage, &catalog.module_ids());
        Self {
            catalog,
            config,
            state: AppState::Dashboard,
            overlay: None,
            dashboard: DashboardState::default(),
            bank,
            visibility,
            completed: BTreeSet::new(),
            is_admin: false,
            session: None,
            result: None,
            results_scroll: 0,
            editor: None,
            status: None,
            should_quit: false,
            suggestion_tx: None,
        }
    }

    pub fn with_suggestions(mut self, tx: Sender<SuggestionRequest>) -> Self {
        self.suggestion_tx = Some(tx);
        self
    }

    pub fn ai_enabled(&self) -> bool {
        self.suggestion_tx.is_some()
    }

    fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!("{}", text);
        self.status = Some(StatusMessage { text, is_error: false });
    }

    fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!("{}", text);
        self.status = Some(StatusMessage { text, is_error: true });
    }

    // ---- dashboard model ----

    pub fn current_exam_modules(&self) -> Vec<&Module> {
        self.catalog
            .exams
            .get(self.dashboard.exam_index)
            .map(|exam| exam.modules.iter().collect())
            .unwrap_or_default()
    }

    /// Modules the current user may see on the current exam tab.
    pub fn listed_modules(&self) -> Vec<&Module> {
        self.current_exam_modules()
            .into_iter()
            .filter(|m| self.is_admin || self.visibility.get(m.id))
            .collect()
    }

    pub fn dashboard_rows(&self) -> Vec<DashboardRow> {
        let mut rows = Vec::new();
        for module in self.listed_modules() {
            rows.push(DashboardRow::Module(module.id));
            if !self.dashboard.expanded_modules.contains(&module.id) {
                continue;
            }
            for (sub_index, sub) in module.sub_topics.iter().enumerate() {
                rows.push(DashboardRow::SubTopic(module.id, sub_index));
                if self.dashboard.expanded_sub_topics.contains(&(module.id, sub_index)) {
                    for point_index in 0..sub.content_points().len() {
                        rows.push(DashboardRow::ContentPoint(module.id, sub_index, point_index));
                    }
                }
            }
        }
        rows
    }

    pub fn selected_row(&self) -> Option<DashboardRow> {
        let rows = self.dashboard_rows();
        rows.get(self.dashboard.cursor.min(rows.len().saturating_sub(1)))
            .copied()
    }

    /// Completed visible modules over visible modules on the current tab, in percent.
    pub fn progress_percentage(&self) -> u32 {
        let visible: Vec<ModuleId> = self
            .current_exam_modules()
            .iter()
            .filter(|m| self.visibility.get(m.id))
            .map(|m| m.id)
            .collect();
        if visible.is_empty() {
            return 0;
        }
        let done = visible.iter().filter(|id| self.completed.contains(id)).count();
        (100.0 * done as f64 / visible.len() as f64).round() as u32
    }

    fn target_for(&self, row: DashboardRow) -> Option<QuizTarget> {
        let module = self.catalog.module(row.module_id())?;
        let (sub_topic, content_point) = match row {
            DashboardRow::Module(_) => (None, None),
            DashboardRow::SubTopic(_, s) => (Some(module.sub_topics.get(s)?.title().to_string()), None),
            DashboardRow::ContentPoint(_, s, p) => {
                let sub = module.sub_topics.get(s)?;
                (
                    Some(sub.title().to_string()),
                    Some(sub.content_points().get(p)?.clone()),
                )
            }
        };
        Some(QuizTarget {
            module_id: module.id,
            sub_topic,
            content_point,
        })
    }

    /// Questions a target runs over; a whole module concatenates its
    /// sub-topic lists in catalog order.
    pub fn questions_for(&self, target: &QuizTarget) -> Vec<Question> {
        match &target.sub_topic {
            Some(sub) => self.bank.get(target.module_id, sub),
            None => self
                .catalog
                .module(target.module_id)
                .map(|module| {
                    module
                        .sub_topics
                        .iter()
                        .flat_map(|sub| self.bank.get(module.id, sub.title()))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn title_for(&self, target: &QuizTarget) -> String {
        let module_title = self
            .catalog
            .module(target.module_id)
            .map(|m| m.title.as_str())
            .unwrap_or_default();
        quiz_title(
            module_title,
            target.sub_topic.as_deref(),
            target.content_point.as_deref(),
        )
    }

    // ---- quiz flow ----

    /// Ask for the question count, or go straight to the empty-quiz screen.
    pub fn request_quiz(&mut self, target: QuizTarget) {
        let available = self.questions_for(&target).len();
        let title = self.title_for(&target);
        if available == 0 {
            self.session = Some(QuizSession::new(target.module_id, target.sub_topic, title, Vec::new()));
            self.state = AppState::Quiz;
            return;
        }
        self.overlay = Some(Overlay::QuestionCount(CountPrompt {
            target,
            title,
            max: available,
            input: TextInput::new(&available.to_string()),
            error: None,
        }));
    }

    pub fn start_quiz(&mut self, target: QuizTarget, count: usize) {
        let mut questions = self.questions_for(&target);
        questions.truncate(count);
        let title = self.title_for(&target);
        tracing::info!("Starting quiz '{}' with {} questions", title, questions.len());
        self.session = Some(QuizSession::new(target.module_id, target.sub_topic, title, questions));
        self.state = AppState::Quiz;
    }

    fn finish_quiz(&mut self, module_id: ModuleId) {
        let Some(session) = &self.session else {
            return;
        };
        if session.is_module_quiz() {
            self.completed.insert(module_id);
        }
        self.result = Some((session.title.clone(), session.result()));
        self.results_scroll = 0;
        self.state = AppState::Results;
    }

    pub fn return_to_dashboard(&mut self) {
        self.session = None;
        self.editor = None;
        self.state = AppState::Dashboard;
    }

    // ---- admin ----

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        if self.config.admin.verify(username, password) {
            self.is_admin = true;
            self.info("Logged in as admin.");
            true
        } else {
            tracing::warn!("Rejected admin login for '{}'", username);
            false
        }
    }

    pub fn logout(&mut self) {
        self.is_admin = false;
        self.dashboard.cursor = 0;
        self.info("Logged out.");
    }

    pub fn toggle_visibility(&mut self, module_id: ModuleId) {
        match self.visibility.toggle(module_id) {
            Ok(visible) => self.info(format!(
                "Module {} is now {}.",
                module_id,
                if visible { "visible" } else { "hidden" }
            )),
            Err(e) => self.error(format!("Failed to save module visibility: {}", e)),
        }
    }

    pub fn reset_progress(&mut self) {
        self.completed.clear();
        self.info("Progress reset.");
    }

    pub fn open_editor(&mut self, target: &QuizTarget) {
        let (Some(module), Some(sub_topic)) = (self.catalog.module(target.module_id), &target.sub_topic) else {
            return;
        };
        let questions = self.bank.get(module.id, sub_topic);
        self.editor = Some(QuestionEditor::new(
            module.id,
            &module.title,
            sub_topic,
            target.content_point.as_deref(),
            questions,
        ));
        self.state = AppState::Editor;
    }

    pub fn save_editor(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let (module_id, sub_topic, questions) = editor.into_saved();
        let count = questions.len();
        match self.bank.save(module_id, &sub_topic, questions) {
            Ok(()) => self.info(format!("Saved {} questions for {}.", count, sub_topic)),
            Err(e) => self.error(format!("Failed to save questions: {}", e)),
        }
        self.state = AppState::Dashboard;
    }

    fn request_suggestions(&mut self) {
        let Some(editor) = &mut self.editor else {
            return;
        };
        let request = SuggestionRequest {
            module_id: editor.module_id,
            module_title: editor.module_title.clone(),
            sub_topic: editor.sub_topic.clone(),
        };
        let sent = self
            .suggestion_tx
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            editor.apply_suggestions(Err(
                "AI suggestions are disabled. Set OPENROUTER_API_KEY to enable them.".to_string(),
            ));
        }
    }

    /// Apply a worker response to whatever editor is open.
    pub fn apply_suggestion_response(&mut self, response: SuggestionResponse) {
        match &mut self.editor {
            Some(editor) => editor.apply_suggestions(response.outcome),
            None => tracing::debug!(
                "Dropping suggestions for {} / {}: editor closed",
                response.module_id,
                response.sub_topic
            ),
        }
    }

    // ---- files ----

    pub fn run_file_action(&mut self, action: &FileAction, input: &str) {
        let export_dir = self.config.storage.export_dir.clone();
        match action {
            FileAction::ImportBank => self.import_bank(Path::new(input.trim())),
            FileAction::ExportBank => {
                let path = resolve_export_path(input, &export_dir, BANK_EXPORT_FILE_NAME);
                match self.bank.export_whole() {
                    Ok(json) => self.write_file(&path, json.as_bytes(), "question bank"),
                    Err(e) => self.error(e.to_string()),
                }
            }
            FileAction::ImportTopic { module_id, sub_topic } => {
                self.import_topic(*module_id, sub_topic, Path::new(input.trim()))
            }
            FileAction::ExportTopic { module_id, sub_topic } => {
                let path = resolve_export_path(input, &export_dir, &sub_topic_export_file_name(sub_topic));
                match self.bank.export_sub_topic(*module_id, sub_topic) {
                    Ok(json) => self.write_file(&path, json.as_bytes(), sub_topic),
                    Err(e) => self.error(e.to_string()),
                }
            }
            FileAction::ExportResults => {
                let Some((title, result)) = &self.result else {
                    return;
                };
                let path = resolve_export_path(input, &export_dir, &report::today_file_name());
                match report::export_pdf(result, title, &path) {
                    Ok(()) => self.info(format!("Saved results to {}.", path.display())),
                    Err(e) => self.error(format!("Failed to generate PDF. Please try again. ({})", e)),
                }
            }
        }
    }

    fn write_file(&mut self, path: &Path, contents: &[u8], what: &str) {
        match crate::file_io::write_export(path, contents) {
            Ok(()) => self.info(format!("Exported {} to {}.", what, path.display())),
            Err(e) => self.error(e.to_string()),
        }
    }

    pub fn import_bank(&mut self, path: &Path) {
        let outcome = read_import_file(path).and_then(|json| self.bank.import_whole(&json).map(|_| ()));
        match outcome {
            Ok(()) => self.info("Question bank imported successfully!"),
            Err(e @ QuizError::FileRead { .. }) => self.error(e.to_string()),
            Err(e) => self.error(format!(
                "Failed to import question bank. Please ensure the file is valid JSON. Error: {}",
                e
            )),
        }
    }

    pub fn import_topic(&mut self, module_id: ModuleId, sub_topic: &str, path: &Path) {
        let outcome =
            read_import_file(path).and_then(|json| self.bank.import_sub_topic(module_id, sub_topic, &json));
        match outcome {
            Ok(questions) => self.info(format!(
                "Successfully imported {} questions for {}.",
                questions.len(),
                sub_topic
            )),
            Err(e @ QuizError::FileRead { .. }) => self.error(e.to_string()),
            Err(e) => self.error(format!(
                "Failed to import questions. Please ensure the file is a valid JSON array of questions. Error: {}",
                e
            )),
        }
    }

    // ---- key handling ----

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if let Some(overlay) = self.overlay.take() {
            self.overlay = self.handle_overlay_key(overlay, key);
            return;
        }
        match self.state {
            AppState::Dashboard => self.handle_dashboard_key(key),
            AppState::Quiz => {
                let Some(session) = &mut self.session else {
                    self.state = AppState::Dashboard;
                    return;
                };
                let completed = handle_quiz_input(session, key, &mut self.state);
                if let Some(module_id) = completed {
                    self.finish_quiz(module_id);
                } else if self.state == AppState::Dashboard {
                    self.session = None;
                }
            }
            AppState::QuizQuitConfirm => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.return_to_dashboard(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.state = AppState::Quiz,
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.results_scroll = self.results_scroll.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => self.results_scroll = self.results_scroll.saturating_add(1),
                KeyCode::Char('p') => {
                    self.overlay = Some(Overlay::PathPrompt(PathPrompt {
                        action: FileAction::ExportResults,
                        input: TextInput::default(),
                        error: None,
                    }))
                }
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('m') => {
                    self.result = None;
                    self.return_to_dashboard();
                }
                _ => {}
            },
            AppState::Editor => {
                let Some(editor) = &mut self.editor else {
                    self.state = AppState::Dashboard;
                    return;
                };
                match handle_editor_input(editor, key) {
                    EditorAction::None => {}
                    EditorAction::Save => self.save_editor(),
                    EditorAction::Close => self.return_to_dashboard(),
                    EditorAction::RequestSuggestions => self.request_suggestions(),
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        let rows = self.dashboard_rows();
        let row = self.selected_row();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                let exams = self.catalog.exams.len().max(1);
                self.dashboard.exam_index = (self.dashboard.exam_index + 1) % exams;
                self.dashboard.cursor = 0;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.catalog.exams.len() {
                    self.dashboard.exam_index = index;
                    self.dashboard.cursor = 0;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.dashboard.cursor = self.dashboard.cursor.min(rows.len().saturating_sub(1)).saturating_sub(1)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.dashboard.cursor + 1 < rows.len() {
                    self.dashboard.cursor += 1;
                }
            }
            KeyCode::Right | KeyCode::Char(' ') => match row {
                Some(DashboardRow::Module(id)) => {
                    if !self.dashboard.expanded_modules.insert(id) {
                        self.dashboard.expanded_modules.remove(&id);
                    }
                }
                Some(DashboardRow::SubTopic(id, s)) => {
                    let has_points = self
                        .catalog
                        .module(id)
                        .and_then(|m| m.sub_topics.get(s))
                        .is_some_and(|sub| !sub.content_points().is_empty());
                    if has_points && !self.dashboard.expanded_sub_topics.insert((id, s)) {
                        self.dashboard.expanded_sub_topics.remove(&(id, s));
                    }
                }
                _ => {}
            },
            KeyCode::Left => {
                if let Some(row) = row {
                    let id = row.module_id();
                    self.dashboard.expanded_modules.remove(&id);
                    if let Some(pos) = self
                        .dashboard_rows()
                        .iter()
                        .position(|r| *r == DashboardRow::Module(id))
                    {
                        self.dashboard.cursor = pos;
                    }
                }
            }
            KeyCode::Enter => {
                if let Some(target) = row.and_then(|r| self.target_for(r)) {
                    self.request_quiz(target);
                }
            }
            KeyCode::Char('r') => self.overlay = Some(Overlay::ResetConfirm),
            KeyCode::Char('a') => {
                if self.is_admin {
                    self.logout();
                } else {
                    self.overlay = Some(Overlay::Login(LoginForm::default()));
                }
            }
            _ if self.is_admin => self.handle_admin_key(key, row),
            _ => {}
        }
    }

    fn handle_admin_key(&mut self, key: KeyEvent, row: Option<DashboardRow>) {
        let topic = row
            .and_then(|r| self.target_for(r))
            .filter(|t| t.sub_topic.is_some());
        let prompt = |action: FileAction| {
            Some(Overlay::PathPrompt(PathPrompt {
                action,
                input: TextInput::default(),
                error: None,
            }))
        };
        match key.code {
            KeyCode::Char('v') => {
                if let Some(row) = row {
                    self.toggle_visibility(row.module_id());
                }
            }
            KeyCode::Char('e') => {
                if let Some(target) = topic {
                    self.open_editor(&target);
                }
            }
            KeyCode::Char('i') => {
                if let Some(QuizTarget { module_id, sub_topic: Some(sub_topic), .. }) = topic {
                    self.overlay = prompt(FileAction::ImportTopic { module_id, sub_topic });
                }
            }
            KeyCode::Char('x') => {
                if let Some(QuizTarget { module_id, sub_topic: Some(sub_topic), .. }) = topic {
                    self.overlay = prompt(FileAction::ExportTopic { module_id, sub_topic });
                }
            }
            KeyCode::Char('I') => self.overlay = prompt(FileAction::ImportBank),
            KeyCode::Char('X') => self.overlay = prompt(FileAction::ExportBank),
            _ => {}
        }
    }

    /// Returns the overlay to keep open, if any.
    fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyEvent) -> Option<Overlay> {
        match overlay {
            Overlay::ResetConfirm => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => self.reset_progress(),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
                    _ => return Some(Overlay::ResetConfirm),
                }
                None
            }
            Overlay::Login(mut form) => {
                match key.code {
                    KeyCode::Esc => return None,
                    KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                        form.on_password = !form.on_password
                    }
                    KeyCode::Enter if !form.on_password => form.on_password = true,
                    KeyCode::Enter => {
                        if self.login(&form.username.value, &form.password.value) {
                            return None;
                        }
                        form.error = Some("Invalid credentials!".to_string());
                        form.password.clear();
                    }
                    _ => {
                        let input = if form.on_password { &mut form.password } else { &mut form.username };
                        edit_text(input, key);
                    }
                }
                Some(Overlay::Login(form))
            }
            Overlay::PathPrompt(mut prompt) => {
                match key.code {
                    KeyCode::Esc => return None,
                    KeyCode::Enter => {
                        if prompt.action.is_import() && prompt.input.value.trim().is_empty() {
                            prompt.error = Some("Enter the path of a JSON file.".to_string());
                        } else {
                            self.run_file_action(&prompt.action, &prompt.input.value);
                            return None;
                        }
                    }
                    _ => {
                        edit_text(&mut prompt.input, key);
                        prompt.error = None;
                    }
                }
                Some(Overlay::PathPrompt(prompt))
            }
            Overlay::QuestionCount(mut prompt) => {
                match key.code {
                    KeyCode::Esc => return None,
                    KeyCode::Enter => match validate_question_count(&prompt.input.value, prompt.max) {
                        Ok(count) => {
                            self.start_quiz(prompt.target, count);
                            return None;
                        }
                        Err(e) => prompt.error = Some(e),
                    },
                    _ => {
                        edit_text(&mut prompt.input, key);
                        prompt.error = None;
                    }
                }
                Some(Overlay::QuestionCount(prompt))
            }
        }
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}
