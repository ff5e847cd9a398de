//! Gemini implementation of [`LlmClient`] over the `generateContent` REST endpoint.
//!
//! Sends the whole history as `contents` (user / model roles), the system prompt as
//! `systemInstruction`, sampling parameters as `generationConfig` and the configured
//! `safetySettings`. See <https://ai.google.dev/api/generate-content>.

use async_trait::async_trait;
use prompt::{ChatMessage, MessageRole};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::{GenerationConfig, LlmConfig, SafetySetting, GEMINI_DEFAULT_BASE_URL, GEMINI_DEFAULT_MODEL};
use crate::{mask_token, LlmClient, LlmError};

/// Finish reasons that mean the candidate was withheld by a content filter.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiLlmClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    generation: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
    system_prompt: Option<String>,
}

impl GeminiLlmClient {
    /// Client for the public endpoint with default model, sampling and no safety settings.
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            model: GEMINI_DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            safety_settings: Vec::new(),
            system_prompt: None,
        }
    }

    /// Builds a client from the full LLM config.
    pub fn from_config(config: &dyn LlmConfig) -> Self {
        Self::new(config.api_key().to_string())
            .with_base_url(config.base_url().to_string())
            .with_model(config.model().to_string())
            .with_generation(config.generation().clone())
            .with_safety_settings(config.safety_settings().to_vec())
            .with_system_prompt_opt(config.system_prompt().map(String::from))
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }

    pub fn with_system_prompt_opt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Request body for the given history. System turns are folded into `systemInstruction`
    /// after the configured system prompt.
    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> GenerateContentRequest<'a> {
        let mut system_parts: Vec<Part<'a>> = self
            .system_prompt
            .as_deref()
            .map(|text| Part { text })
            .into_iter()
            .collect();
        let mut contents = Vec::with_capacity(messages.len());
        for m in messages {
            match m.role {
                MessageRole::System => system_parts.push(Part { text: &m.content }),
                MessageRole::User => contents.push(Content {
                    role: Some("user"),
                    parts: vec![Part { text: &m.content }],
                }),
                MessageRole::Assistant => contents.push(Content {
                    role: Some("model"),
                    parts: vec![Part { text: &m.content }],
                }),
            }
        }

        GenerateContentRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| Content {
                role: None,
                parts: system_parts,
            }),
            generation_config: GenerationConfigBody {
                temperature: self.generation.temperature,
                top_p: self.generation.top_p,
                top_k: self.generation.top_k,
                max_output_tokens: self.generation.max_output_tokens,
            },
            safety_settings: self
                .safety_settings
                .iter()
                .map(|s| SafetySettingBody {
                    category: s.category.as_str(),
                    threshold: s.threshold.as_str(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfigBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySettingBody>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySettingBody {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Human-readable message from a Gemini error body; falls back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if env.error.status.is_empty() => env.error.message,
        Ok(env) => format!("{}: {}", env.error.status, env.error.message),
        Err(_) => body.trim().to_string(),
    }
}

/// Text of the first candidate, or the reason there is none.
fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::SafetyBlocked(reason));
    }
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(LlmError::EmptyCompletion);
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if !text.trim().is_empty() {
        return Ok(text);
    }
    match candidate.finish_reason.as_deref() {
        Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason) => {
            Err(LlmError::SafetyBlocked(reason.to_string()))
        }
        _ => Err(LlmError::EmptyCompletion),
    }
}

#[async_trait]
impl LlmClient for GeminiLlmClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request = self.build_request(&messages);
        info!(
            model = %self.model,
            message_count = request.contents.len(),
            api_key = %mask_token(&self.api_key),
            "Gemini generateContent request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = LlmError::from_status(status.as_u16(), error_message(&body));
            warn!(status = status.as_u16(), error = %err, "Gemini generateContent failed");
            return Err(err);
        }

        let parsed: GenerateContentResponse = response.json().await?;
        if let Some(ref u) = parsed.usage_metadata {
            info!(
                prompt_tokens = u.prompt_token_count,
                completion_tokens = u.candidates_token_count,
                total_tokens = u.total_token_count,
                "Gemini generateContent usage"
            );
        }
        extract_text(parsed)
    }
}
