use crate::error::{QuizError, Result};
use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const SUGGESTION_COUNT: usize = 5;

#[derive(Debug)]
pub struct OpenRouterClient {
    client: openrouter_api::OpenRouterClient<openrouter_api::Ready>,
    config: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }
}

pub fn suggestion_prompt(module_title: &str, sub_topic: &str) -> String {
    format!(
        r#"Write {} new multiple-choice exam questions and respond ONLY with valid JSON.

Module: {}
Sub-topic: {}

IMPORTANT:

- Respond ONLY with a JSON array of this exact structure (no markdown, no extra text):
[
    {{
        "question": "question text",
        "options": ["option A", "option B", "option C", "option D"],
        "correctAnswer": "the option that is correct, copied verbatim",
        "explanation": "why the correct answer is right"
    }}
]
- Every question has exactly four distinct options.
- correctAnswer must be identical to one of the options.
"#,
        SUGGESTION_COUNT, module_title, sub_topic
    )
}

impl OpenRouterClient {
    /// Reads `OPENROUTER_API_KEY` from the environment.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = openrouter_api::OpenRouterClient::quick().map_err(|e| {
            QuizError::SuggestionService(format!("Failed to create OpenRouter client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    pub async fn suggest_questions(&self, module_title: &str, sub_topic: &str) -> Result<String> {
        let prompt = suggestion_prompt(module_title, sub_topic);

        let messages = vec![
            Message::text(
                "system",
                "You are an exam author writing certification practice questions. Be accurate and concise.",
            ),
            Message::text("user", &prompt),
        ];

        let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            provider: Some(provider),
            stream: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            models: None,
            transforms: None,
            route: None,
            user: None,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            min_p: None,
            top_a: None,
            seed: None,
            stop: None,
            logit_bias: None,
            logprobs: None,
            top_logprobs: None,
            prediction: None,
            parallel_tool_calls: None,
            verbosity: None,
        };

        let response = self
            .client
            .chat()
            .map_err(|e| QuizError::SuggestionService(e.to_string()))?
            .chat_completion(request)
            .await
            .map_err(|e| QuizError::SuggestionService(format!("OpenRouter API error: {}", e)))?;

        let Some(choice) = response.choices.first() else {
            return Err(QuizError::SuggestionService(
                "No response choices received".to_string(),
            ));
        };
        match &choice.message.content {
            openrouter_api::MessageContent::Text(text) => Ok(text.clone()),
            openrouter_api::MessageContent::Parts(parts) => {
                let text_parts: Vec<String> = parts
                    .iter()
                    .filter_map(|p| {
                        if let openrouter_api::ContentPart::Text(tc) = p {
                            Some(tc.text.clone())
                        } else {
                            None
                        }
                    })
                    .collect();
                Ok(text_parts.join("\n"))
            }
        }
    }
}
