//! Gemini client (API key-based).
//!
//! Two call sites into Google's Generative Language API: a structured
//! one-shot `generateContent` request that produces a [`BookRecord`], and
//! a non-streaming conversational turn used by the chat session. No
//! retries, no caching — identical queries re-invoke the model.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::core::book::{BookParseError, BookRecord};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub type Result<T> = std::result::Result<T, GeminiError>;

/// Errors from a single Gemini request.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no content")]
    EmptyResponse,

    #[error(transparent)]
    Book(#[from] BookParseError),
}

/// Role of a turn in a conversation, in the wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// A single turn of chat history.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Response-shape constraint for book generation.
///
/// Mirrors [`BookRecord`]: the model must return a JSON object with these
/// fields, of which title/author/synopsis/characters/emotionalArc are
/// required.
pub fn book_data_schema() -> Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "author": { "type": "STRING" },
            "tagline": { "type": "STRING" },
            "synopsis": { "type": "STRING" },
            "genres": { "type": "ARRAY", "items": { "type": "STRING" } },
            "publicationYear": { "type": "STRING" },
            "goodreadsUrl": { "type": "STRING" },
            "characters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "role": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    }
                }
            },
            "reviews": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "source": { "type": "STRING" },
                        "quote": { "type": "STRING" },
                        "rating": { "type": "NUMBER" }
                    }
                }
            },
            "themes": { "type": "ARRAY", "items": { "type": "STRING" } },
            "emotionalArc": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "chapter": { "type": "NUMBER" },
                        "tension": { "type": "NUMBER" },
                        "label": { "type": "STRING" }
                    }
                }
            }
        },
        "required": ["title", "author", "synopsis", "characters", "emotionalArc"]
    })
}

/// Instruction prompt for the landing-page content request.
fn build_book_prompt(query: &str) -> String {
    format!(
        "Create a rich, engaging, and structured JSON object for a book landing page.\n\
         The book is: \"{query}\".\n\n\
         If the book is real and well-known, use accurate details.\n\
         If the book is obscure or the title is generic, infer a plausible, \
         high-quality Thriller/Mystery/Fantasy plot based on the title \"{query}\".\n\
         Make it sound like a bestseller.\n\n\
         For the 'emotionalArc', generate 5-7 data points representing the \
         narrative tension curve (0-100) across the story."
    )
}

/// Pull the first candidate's text out of a `generateContent` response.
fn extract_text(json: &Value) -> Option<&str> {
    json["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())
        .and_then(|parts| parts.first())
        .and_then(|p| p["text"].as_str())
}

/// Gemini client bound to one model.
///
/// A missing API key produces a client whose requests fail with an API
/// error at call time — absence is never a startup failure.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        // Trim at construction so validation and headers agree
        Self {
            api_key: api_key.into().trim().to_string(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Build a client from the process environment.
    ///
    /// Reads `GEMINI_API_KEY`, falling back to `API_KEY`. An unset key
    /// yields an unauthenticated client.
    pub fn from_env(model: impl Into<String>) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .unwrap_or_default();
        if api_key.trim().is_empty() {
            log::warn!("No GEMINI_API_KEY/API_KEY in environment; requests will fail");
        }
        Self::new(api_key, model)
    }

    /// Override the endpoint base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate the structured book record for a search query.
    pub async fn generate_book(&self, query: &str) -> Result<BookRecord> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_book_prompt(query) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": book_data_schema(),
                "temperature": 0.7
            }
        });

        let json = self.generate_content(body).await?;
        let text = extract_text(&json).ok_or(GeminiError::EmptyResponse)?;
        Ok(BookRecord::from_json(text)?)
    }

    /// One conversational turn: system instruction plus the full
    /// alternating history, returning the reply text.
    pub async fn chat_turn(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        let contents: Vec<Value> = history
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": turn.role.as_str(),
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect();

        let body = serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": system_instruction }]
            }
        });

        let json = self.generate_content(body).await?;
        let text = extract_text(&json).ok_or(GeminiError::EmptyResponse)?;
        Ok(text.to_string())
    }

    async fn generate_content(&self, body: Value) -> Result<Value> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            log::error!("Gemini request failed ({status}): {message}");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_query() {
        let prompt = build_book_prompt("It's in the Blood");
        assert!(prompt.contains("The book is: \"It's in the Blood\""));
        assert!(prompt.contains("emotionalArc"));
        assert!(prompt.contains("5-7 data points"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = book_data_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["title", "author", "synopsis", "characters", "emotionalArc"]
        );
        assert_eq!(schema["properties"]["reviews"]["type"], "ARRAY");
    }

    #[test]
    fn test_extract_text_happy_path() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "hello" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&json), Some("hello"));
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        assert_eq!(extract_text(&serde_json::json!({})), None);
        assert_eq!(
            extract_text(&serde_json::json!({ "candidates": [] })),
            None
        );
        assert_eq!(
            extract_text(&serde_json::json!({
                "candidates": [{ "content": { "parts": [] } }]
            })),
            None
        );
    }

    #[test]
    fn test_api_key_trimmed() {
        let client = GeminiClient::new("  AIzaKey  ", "gemini-2.5-flash");
        assert_eq!(client.api_key, "AIzaKey");
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_chat_turn_constructors() {
        let user = ChatTurn::user("hi");
        let model = ChatTurn::model("hello");
        assert_eq!(user.role.as_str(), "user");
        assert_eq!(model.role.as_str(), "model");
    }
}
