use crate::db::{load_json, SharedStorage, QUESTION_BANK_KEY};
use crate::error::{QuizError, Result};
use crate::models::{ModuleId, Question, QuestionBank};
use serde_json::Value;

pub const BANK_EXPORT_FILE_NAME: &str = "cyber-security-question-bank.json";

/// Question bank with write-through persistence.
pub struct QuestionBankStore {
    storage: SharedStorage,
    bank: QuestionBank,
}

impl QuestionBankStore {
    /// Load the persisted bank. Missing or corrupt data yields an empty bank.
    pub fn load(storage: SharedStorage) -> Self {
        let bank = match load_json::<QuestionBank>(storage.as_ref(), QUESTION_BANK_KEY) {
            Ok(Some(bank)) => bank,
            Ok(None) => QuestionBank::new(),
            Err(e) => {
                tracing::warn!("Failed to load question bank from storage: {}", e);
                QuestionBank::new()
            }
        };
        Self { storage, bank }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn get(&self, module_id: ModuleId, sub_topic: &str) -> Vec<Question> {
        self.bank
            .get(&module_id)
            .and_then(|topics| topics.get(sub_topic))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of questions for a sub-topic, or for the whole module when
    /// `sub_topic` is `None`.
    pub fn question_count(&self, module_id: ModuleId, sub_topic: Option<&str>) -> usize {
        let Some(topics) = self.bank.get(&module_id) else {
            return 0;
        };
        match sub_topic {
            Some(title) => topics.get(title).map_or(0, Vec::len),
            None => topics.values().map(Vec::len).sum(),
        }
    }

    pub fn save(&mut self, module_id: ModuleId, sub_topic: &str, questions: Vec<Question>) -> Result<()> {
        let mut next = self.bank.clone();
        next.entry(module_id)
            .or_default()
            .insert(sub_topic.to_string(), questions);
        self.replace(next)
    }

    /// Replace the whole bank from a JSON document. The top level must be an object.
    pub fn import_whole(&mut self, json: &str) -> Result<&QuestionBank> {
        let value: Value = serde_json::from_str(json).map_err(|e| QuizError::invalid_format(e.to_string()))?;
        if !value.is_object() {
            return Err(QuizError::invalid_format(
                "The file should contain a JSON object.",
            ));
        }
        let bank: QuestionBank =
            serde_json::from_value(value).map_err(|e| QuizError::invalid_format(e.to_string()))?;
        self.replace(bank)?;
        tracing::info!("Imported question bank with {} modules", self.bank.len());
        Ok(&self.bank)
    }

    pub fn export_whole(&self) -> Result<String> {
        let has_questions = self
            .bank
            .values()
            .any(|topics| topics.values().any(|list| !list.is_empty()));
        if !has_questions {
            return Err(QuizError::EmptyBank);
        }
        Ok(serde_json::to_string_pretty(&self.bank)?)
    }

    /// Replace one sub-topic list from a JSON array.
    ///
    /// Only the first element's shape is checked. Later elements are read
    /// leniently: missing or wrong-typed fields become empty values.
    pub fn import_sub_topic(&mut self, module_id: ModuleId, sub_topic: &str, json: &str) -> Result<Vec<Question>> {
        let value: Value = serde_json::from_str(json).map_err(|e| QuizError::invalid_format(e.to_string()))?;
        let Value::Array(items) = &value else {
            return Err(QuizError::invalid_format(
                "File must contain an array of questions.",
            ));
        };
        if let Some(first) = items.first()
            && !has_question_shape(first)
        {
            return Err(QuizError::invalid_format(
                "File must contain an array of questions.",
            ));
        }
        let questions: Vec<Question> = items.iter().map(lenient_question).collect();
        self.save(module_id, sub_topic, questions.clone())?;
        tracing::info!(
            "Imported {} questions for module {} / {}",
            questions.len(),
            module_id,
            sub_topic
        );
        Ok(questions)
    }

    pub fn export_sub_topic(&self, module_id: ModuleId, sub_topic: &str) -> Result<String> {
        let questions = self.get(module_id, sub_topic);
        if questions.is_empty() {
            return Err(QuizError::EmptyTopic(sub_topic.to_string()));
        }
        Ok(serde_json::to_string_pretty(&questions)?)
    }

    fn replace(&mut self, bank: QuestionBank) -> Result<()> {
        let json = serde_json::to_string(&bank)?;
        self.storage.set_item(QUESTION_BANK_KEY, &json)?;
        self.bank = bank;
        Ok(())
    }
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn lenient_question(value: &Value) -> Question {
    let options = value
        .get("options")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Question {
        id: string_field(value, "id"),
        question: string_field(value, "question"),
        options,
        correct_answer: string_field(value, "correctAnswer"),
        explanation: value
            .get("explanation")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn has_question_shape(value: &Value) -> bool {
    non_empty_str(value.get("id"))
        && non_empty_str(value.get("question"))
        && value.get("options").is_some_and(Value::is_array)
        && non_empty_str(value.get("correctAnswer"))
}

/// `<slug>_questions.json` where the slug keeps ASCII alphanumerics and
/// replaces everything else with `_`.
pub fn sub_topic_export_file_name(sub_topic: &str) -> String {
    let slug: String = sub_topic
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}_questions.json", slug)
}
