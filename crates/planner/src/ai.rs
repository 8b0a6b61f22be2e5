//! Lesson content from the Anthropic Messages API, with template fallback.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AiSettings;
use crate::prompt;
use crate::templates;
use crate::types::{LessonContent, LessonRequest};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("response contained no JSON object")]
    NoJson,

    #[error("invalid content JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Minimal Messages API client
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    settings: AiSettings,
}

impl ClaudeClient {
    pub fn new(api_key: String, settings: AiSettings) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            api_key,
            settings,
        })
    }

    /// Send one user message and return the text of the reply
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, AiError> {
        let url = format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system,
            messages: [Message {
                role: "user",
                content: user,
            }],
        };

        debug!(model = %self.settings.model, "Calling Messages API");
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let reply: MessagesResponse = response.json().await?;
        reply
            .content
            .into_iter()
            .find(|block| block.kind == "text" && !block.text.trim().is_empty())
            .map(|block| block.text)
            .ok_or(AiError::EmptyResponse)
    }

    /// Ask the model for lesson content and parse its JSON reply
    pub async fn lesson_content(&self, request: &LessonRequest) -> Result<LessonContent, AiError> {
        let text = self
            .complete(prompt::system_prompt(), &prompt::lesson_prompt(request))
            .await?;
        extract_content(&text)
    }
}

/// Pull the content JSON out of a model reply.
///
/// Prefers a fenced ```json block, then the span from the first `{` to the
/// last `}`.
pub fn extract_content(text: &str) -> Result<LessonContent, AiError> {
    let json = if let Some((_, rest)) = text.split_once("```json") {
        rest.split("```").next().unwrap_or_default().trim()
    } else {
        match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => return Err(AiError::NoJson),
        }
    };

    Ok(serde_json::from_str(json)?)
}

/// Where lesson content comes from
pub enum ContentSource {
    Claude(ClaudeClient),
    Templates,
}

impl ContentSource {
    /// Claude when an API key is configured, templates otherwise
    pub fn from_settings(settings: &AiSettings) -> Result<Self, AiError> {
        match &settings.api_key {
            Some(key) => Ok(Self::Claude(ClaudeClient::new(key.clone(), settings.clone())?)),
            None => {
                warn!("ANTHROPIC_API_KEY not set, lesson content will come from templates");
                Ok(Self::Templates)
            }
        }
    }

    /// Lesson content for a request. Never fails: API errors fall back to templates.
    pub async fn lesson_content(&self, request: &LessonRequest) -> LessonContent {
        match self {
            Self::Claude(client) => {
                info!(topic = %request.topic, "Calling Claude AI");
                match client.lesson_content(request).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(error = %e, "Claude API error, falling back to templates");
                        templates::lesson_content(request)
                    }
                }
            }
            Self::Templates => templates::lesson_content(request),
        }
    }
}
