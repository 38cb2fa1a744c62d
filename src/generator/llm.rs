// src/generator/llm.rs

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::Config,
    error::AppError,
    generator::{QuestionGenerator, ensure_option_count, prompts},
    models::question::{Difficulty, GeneratedQuestion, QuestionKind},
};

pub const DEFAULT_EXPLANATION: &str = "No explanation available";

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object pattern"));

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Question generator backed by an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct LlmQuestionGenerator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl LlmQuestionGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.llm_api_key.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
        }
    }

    async fn complete(&self, prompt: String) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::GenerationFailed("no API key configured".to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.9,
            max_tokens: 800,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationFailed(format!(
                "completion API returned {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::GenerationFailed("completion had no choices".to_string()))
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(
        &self,
        topic: &str,
        difficulty: Difficulty,
        kind: QuestionKind,
    ) -> Result<GeneratedQuestion, AppError> {
        let content = self.complete(prompts::render(topic, difficulty, kind)).await?;
        tracing::debug!("Raw completion for '{}': {}", topic, content);
        parse_question(&content, kind)
    }
}

/// Extracts the first-to-last brace span and decodes it as a question.
pub fn parse_question(content: &str, kind: QuestionKind) -> Result<GeneratedQuestion, AppError> {
    let raw = JSON_OBJECT
        .find(content)
        .ok_or_else(|| AppError::GenerationFailed("no JSON object in completion".to_string()))?;

    let value: Value = serde_json::from_str(raw.as_str())
        .map_err(|e| AppError::GenerationFailed(format!("malformed question JSON: {}", e)))?;

    let question = text_field(&value, "question")
        .ok_or_else(|| AppError::GenerationFailed("missing 'question' field".to_string()))?;

    let explanation = text_field(&value, "explanation")
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    match kind {
        QuestionKind::MultipleChoice => {
            let options: Vec<String> = value
                .get("options")
                .and_then(Value::as_array)
                .map(|opts| opts.iter().filter_map(scalar_text).collect())
                .unwrap_or_default();
            ensure_option_count(&options)?;

            let correct_answer = text_field(&value, "correct_answer")
                .ok_or_else(|| AppError::GenerationFailed("missing 'correct_answer' field".to_string()))?;

            Ok(GeneratedQuestion {
                question,
                correct_answer,
                explanation,
                options,
            })
        }
        QuestionKind::FillBlank => {
            let correct_answer = text_field(&value, "answer")
                .or_else(|| text_field(&value, "correct_answer"))
                .ok_or_else(|| AppError::GenerationFailed("missing 'answer' field".to_string()))?;

            Ok(GeneratedQuestion {
                question,
                correct_answer,
                explanation,
                options: Vec::new(),
            })
        }
    }
}

/// Reads a text field, unwrapping `{"description": ...}` objects some models emit.
fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Object(map) => Some(
            map.get("description")
                .and_then(scalar_text)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
        ),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mcq_wrapped_in_prose() {
        let content = r#"Sure! Here it is:
{
  "question": "Which layer does TCP live in?",
  "options": ["Network", "Transport", "Session", "Link"],
  "correct_answer": "Transport",
  "explanation": "TCP is a transport protocol."
}
Good luck!"#;

        let q = parse_question(content, QuestionKind::MultipleChoice).unwrap();
        assert_eq!(q.question, "Which layer does TCP live in?");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.correct_answer, "Transport");
    }

    #[test]
    fn unwraps_description_objects() {
        let content = r#"{"question": {"description": "What does DNS resolve?"},
            "options": ["Names", "Routes", "Frames", "Ports"],
            "correct_answer": "Names"}"#;

        let q = parse_question(content, QuestionKind::MultipleChoice).unwrap();
        assert_eq!(q.question, "What does DNS resolve?");
        assert_eq!(q.explanation, DEFAULT_EXPLANATION);
    }

    #[test]
    fn rejects_wrong_option_count() {
        let content = r#"{"question": "q", "options": ["a", "b", "c"], "correct_answer": "a"}"#;
        assert!(matches!(
            parse_question(content, QuestionKind::MultipleChoice),
            Err(AppError::GenerationFailed(_))
        ));
    }

    #[test]
    fn fill_blank_reads_answer_field() {
        let content = r#"{"question": "The ___ algorithm", "answer": "SJF", "explanation": ""}"#;
        let q = parse_question(content, QuestionKind::FillBlank).unwrap();
        assert_eq!(q.correct_answer, "SJF");
        assert!(q.options.is_empty());
        assert_eq!(q.explanation, DEFAULT_EXPLANATION);
    }

    #[test]
    fn no_json_is_a_generation_failure() {
        assert!(parse_question("I cannot help with that.", QuestionKind::FillBlank).is_err());
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let generator = LlmQuestionGenerator {
            client: Client::new(),
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test".to_string(),
        };
        let err = generator
            .generate("Networks", Difficulty::Easy, QuestionKind::MultipleChoice)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed(_)));
    }
}
