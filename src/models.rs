use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ModuleId = u32;

/// module id -> sub-topic title -> ordered questions
pub type QuestionBank = BTreeMap<ModuleId, BTreeMap<String, Vec<Question>>>;

/// module id -> visible
pub type ModuleVisibility = BTreeMap<ModuleId, bool>;

/// A multiple-choice question as stored in the bank and in exported files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    /// Explanation text, if present and not blank.
    pub fn explanation_text(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubTopic {
    Simple { title: String },
    WithContent { title: String, content: Vec<String> },
}

impl SubTopic {
    pub fn title(&self) -> &str {
        match self {
            SubTopic::Simple { title } | SubTopic::WithContent { title, .. } => title,
        }
    }

    pub fn content_points(&self) -> &[String] {
        match self {
            SubTopic::Simple { .. } => &[],
            SubTopic::WithContent { content, .. } => content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub sub_topics: Vec<SubTopic>,
}

impl Module {
    pub fn sub_topic(&self, title: &str) -> Option<&SubTopic> {
        self.sub_topics.iter().find(|s| s.title() == title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub modules: Vec<Module>,
}

/// Outcome of one checked question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    Quiz,
    QuizQuitConfirm,
    Results,
    Editor,
}
