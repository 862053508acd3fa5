use crate::ai::client::OpenRouterClient;
use crate::editor::{new_question_id, validate_question};
use crate::error::{QuizError, Result};
use crate::models::Question;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Anything that can produce raw suggestion text for a sub-topic.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggest(&self, module_title: &str, sub_topic: &str) -> Result<String>;
}

#[async_trait]
impl SuggestionSource for OpenRouterClient {
    async fn suggest(&self, module_title: &str, sub_topic: &str) -> Result<String> {
        self.suggest_questions(module_title, sub_topic).await
    }
}

/// Strip markdown fences and surrounding prose, keeping the outermost array.
fn clean_json_response(response: &str) -> String {
    let mut cleaned = response.trim().to_string();

    if cleaned.starts_with("```") {
        let lines: Vec<&str> = cleaned.lines().collect();
        if lines.len() > 2 {
            cleaned = lines[1..lines.len() - 1].join("\n");
        }
    }

    if let Some(start) = cleaned.find('[')
        && let Some(end) = cleaned.rfind(']')
        && start < end
    {
        cleaned = cleaned[start..=end].to_string();
    }

    cleaned.trim().to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse the service output into questions with fresh ids. Candidates that
/// do not have the question shape or fail validation are dropped.
pub fn parse_suggestions(response: &str) -> Result<Vec<Question>> {
    let cleaned = clean_json_response(response);
    let candidates: Vec<Value> = serde_json::from_str(&cleaned).map_err(|e| {
        QuizError::SuggestionService(format!(
            "Failed to parse suggestions: {}\nCleaned: {}",
            e, cleaned
        ))
    })?;

    let mut accepted: Vec<Question> = Vec::new();
    for candidate in candidates {
        let Ok(raw) = serde_json::from_value::<SuggestedQuestion>(candidate) else {
            tracing::debug!("Dropping suggestion with unexpected shape");
            continue;
        };
        let question = Question {
            id: new_question_id(&accepted),
            question: raw.question.trim().to_string(),
            options: raw.options,
            correct_answer: raw.correct_answer,
            explanation: raw.explanation.filter(|e| !e.trim().is_empty()),
        };
        match validate_question(&question) {
            Ok(()) => accepted.push(question),
            Err(reason) => tracing::debug!("Dropping suggestion: {}", reason),
        }
    }
    Ok(accepted)
}

pub async fn suggest_questions(
    source: &dyn SuggestionSource,
    module_title: &str,
    sub_topic: &str,
) -> Result<Vec<Question>> {
    tracing::info!("Requesting suggestions for {} / {}", module_title, sub_topic);
    let raw = source.suggest(module_title, sub_topic).await?;
    tracing::debug!("Raw suggestion response: {}", raw);
    let questions = parse_suggestions(&raw)?;
    tracing::info!("{} valid suggestions", questions.len());
    Ok(questions)
}

#[cfg(test)]
use std::time::Duration;

/// Canned suggestion source with a simulated network delay.
#[cfg(test)]
pub struct MockSuggestionSource {
    pub response: std::result::Result<String, String>,
    pub delay: Duration,
}

#[cfg(test)]
#[async_trait]
impl SuggestionSource for MockSuggestionSource {
    async fn suggest(&self, _module_title: &str, _sub_topic: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        self.response
            .clone()
            .map_err(QuizError::SuggestionService)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SUGGESTIONS: &str = r#"```json
[
  {"question": "Which flag starts a TCP handshake?", "options": ["SYN", "ACK", "FIN", "RST"], "correctAnswer": "SYN", "explanation": "The client sends **SYN** first."},
  {"question": "Default port for DNS?", "options": ["53", "80"], "correctAnswer": "53"}
]
```"#;

    #[test]
    fn test_clean_json_response_markdown() {
        let cleaned = clean_json_response("```json\n[{\"a\": 1}]\n```");
        assert_eq!(cleaned, r#"[{"a": 1}]"#);
    }

    #[test]
    fn test_clean_json_response_with_text() {
        let cleaned = clean_json_response(r#"Here you go: [{"a": 1}] enjoy"#);
        assert_eq!(cleaned, r#"[{"a": 1}]"#);
    }

    #[test]
    fn test_parse_fenced_suggestions() {
        let questions = parse_suggestions(TWO_SUGGESTIONS).unwrap();
        assert_eq!(questions.len(), 2);
        assert_ne!(questions[0].id, questions[1].id);
        assert_eq!(questions[0].correct_answer, "SYN");
        assert!(questions[1].explanation.is_none());
    }

    #[test]
    fn test_invalid_candidates_are_dropped() {
        let raw = r#"[
            {"question": "Answer not among options", "options": ["a", "b"], "correctAnswer": "c"},
            {"question": "Only one option", "options": ["a"], "correctAnswer": "a"},
            {"question": "", "options": ["a", "b"], "correctAnswer": "a"},
            {"options": ["a", "b"], "correctAnswer": "a"},
            "not an object",
            {"question": "Fine", "options": ["a", "b"], "correctAnswer": "b"}
        ]"#;
        let questions = parse_suggestions(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Fine");
    }

    #[test]
    fn test_unparseable_response_is_an_error() {
        let result = parse_suggestions("I cannot help with that.");
        assert!(matches!(result, Err(QuizError::SuggestionService(_))));
    }

    #[tokio::test]
    async fn test_suggest_questions_with_mock() {
        let source = MockSuggestionSource {
            response: Ok(TWO_SUGGESTIONS.to_string()),
            delay: Duration::from_millis(20),
        };
        let questions = suggest_questions(&source, "Scanning Networks", "Port scanning")
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn test_suggest_questions_propagates_failure() {
        let source = MockSuggestionSource {
            response: Err("rate limited".to_string()),
            delay: Duration::from_millis(5),
        };
        let result = suggest_questions(&source, "Scanning Networks", "Port scanning").await;
        assert!(matches!(result, Err(QuizError::SuggestionService(msg)) if msg == "rate limited"));
    }
}
