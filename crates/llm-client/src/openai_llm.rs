//! OpenAI-compatible implementation of [`LlmClient`] over async-openai chat completions.
//! Prepends the system prompt; top-k and safety settings have no equivalent and are not sent.

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, FinishReason,
};
use async_openai::Client;
use async_trait::async_trait;
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::{GenerationConfig, LlmConfig, OPENAI_DEFAULT_MODEL};
use crate::{mask_token, LlmClient, LlmError};

/// Chat completions client for OpenAI and compatible endpoints.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: Arc<Client<OpenAIConfig>>,
    /// Kept only for masked logging.
    api_key: String,
    model: String,
    generation: GenerationConfig,
    system_prompt: Option<String>,
}

impl OpenAILlmClient {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key,
            model: OPENAI_DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            system_prompt: None,
        }
    }

    pub fn from_config(config: &dyn LlmConfig) -> Self {
        Self::with_base_url(config.api_key().to_string(), config.base_url().to_string())
            .with_model(config.model().to_string())
            .with_generation(config.generation().clone())
            .with_system_prompt_opt(config.system_prompt().map(String::from))
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_system_prompt_opt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    #[allow(deprecated)] // max_tokens is what most compatible endpoints understand
    fn build_request(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut openai_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(ref system) = self.system_prompt {
            openai_messages.push(chat_message_to_openai(&ChatMessage::system(system.clone()))?);
        }
        for msg in messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }
        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(openai_messages)
            .temperature(self.generation.temperature)
            .top_p(self.generation.top_p)
            .max_tokens(self.generation.max_output_tokens)
            .build()
            .map_err(map_openai_error)
    }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, LlmError> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(map_openai_error)?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(map_openai_error)?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(map_openai_error)?
            .into(),
    };
    Ok(openai_msg)
}

fn map_openai_error(e: OpenAIError) -> LlmError {
    match e {
        OpenAIError::Reqwest(e) => e.into(),
        OpenAIError::ApiError(api) => {
            let is_rate_limit = api
                .r#type
                .as_deref()
                .is_some_and(|t| t.contains("rate_limit") || t.contains("insufficient_quota"));
            if is_rate_limit {
                LlmError::RateLimited(api.message)
            } else {
                LlmError::Api {
                    status: None,
                    message: api.message,
                }
            }
        }
        OpenAIError::JSONDeserialize(e) => LlmError::Api {
            status: None,
            message: format!("undecodable response: {}", e),
        },
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg),
        other => LlmError::Transport(other.to_string()),
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request = self.build_request(&messages)?;
        info!(
            model = %self.model,
            message_count = request.messages.len(),
            api_key = %mask_token(&self.api_key),
            "OpenAI chat_completion request"
        );

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        if let Some(ref u) = response.usage {
            info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(LlmError::EmptyCompletion);
        };
        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ if choice.finish_reason == Some(FinishReason::ContentFilter) => {
                Err(LlmError::SafetyBlocked("content_filter".to_string()))
            }
            _ => Err(LlmError::EmptyCompletion),
        }
    }
}
