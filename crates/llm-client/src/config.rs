//! LLM configuration: trait, generation parameters, safety settings and env-based implementation.

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which remote API the relay talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Native Gemini `generateContent` REST API.
    Gemini,
    /// Any OpenAI-compatible chat completions endpoint.
    OpenAi,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => GEMINI_DEFAULT_BASE_URL,
            LlmProvider::OpenAi => OPENAI_DEFAULT_BASE_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => GEMINI_DEFAULT_MODEL,
            LlmProvider::OpenAi => OPENAI_DEFAULT_MODEL,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "openai_compatible" => Ok(LlmProvider::OpenAi),
            other => anyhow::bail!("Unknown LLM_PROVIDER: {} (expected gemini or openai)", other),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Gemini => write!(f, "gemini"),
            LlmProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    /// Ignored by OpenAI-compatible endpoints.
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!("LLM_TEMPERATURE must be within 0.0..=2.0, got {}", self.temperature);
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            anyhow::bail!("LLM_TOP_P must be within 0.0..=1.0, got {}", self.top_p);
        }
        if self.top_k == 0 {
            anyhow::bail!("LLM_TOP_K must be at least 1");
        }
        if self.max_output_tokens == 0 {
            anyhow::bail!("LLM_MAX_OUTPUT_TOKENS must be at least 1");
        }
        Ok(())
    }
}

/// Harm categories a safety threshold is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];

    /// Gemini API enum name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// Block threshold for one harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

impl SafetyThreshold {
    /// Gemini API enum name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyThreshold::BlockNone => "BLOCK_NONE",
            SafetyThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            SafetyThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            SafetyThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
        }
    }
}

impl FromStr for SafetyThreshold {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLOCK_NONE" => Ok(SafetyThreshold::BlockNone),
            "BLOCK_ONLY_HIGH" => Ok(SafetyThreshold::BlockOnlyHigh),
            "BLOCK_MEDIUM_AND_ABOVE" => Ok(SafetyThreshold::BlockMediumAndAbove),
            "BLOCK_LOW_AND_ABOVE" => Ok(SafetyThreshold::BlockLowAndAbove),
            other => anyhow::bail!("Unknown LLM_SAFETY_THRESHOLD: {}", other),
        }
    }
}

/// One (category, threshold) pair sent with Gemini requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: SafetyThreshold,
}

/// The same threshold for all four harm categories.
pub fn safety_settings(threshold: SafetyThreshold) -> Vec<SafetySetting> {
    HarmCategory::ALL
        .iter()
        .map(|&category| SafetySetting {
            category,
            threshold,
        })
        .collect()
}

/// Harassment, hate speech, sexual and dangerous content all blocked at medium and above.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    safety_settings(SafetyThreshold::BlockMediumAndAbove)
}

/// LLM configuration interface.
pub trait LlmConfig: Send + Sync {
    fn provider(&self) -> LlmProvider;
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    fn generation(&self) -> &GenerationConfig;
    /// Empty when safety settings are disabled (provider defaults apply).
    fn safety_settings(&self) -> &[SafetySetting];
    fn system_prompt(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub generation: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

impl LlmConfig for EnvLlmConfig {
    fn provider(&self) -> LlmProvider {
        self.provider
    }
    fn api_key(&self) -> &str {
        &self.api_key
    }
    fn base_url(&self) -> &str {
        &self.base_url
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn generation(&self) -> &GenerationConfig {
        &self.generation
    }
    fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }
    fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reads `key` and parses it; unset or empty means `default`, unparsable is an error.
pub fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        _ => Ok(default),
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| env::var(k).ok())
        .find(|v| !v.trim().is_empty())
}

impl EnvLlmConfig {
    /// Load from environment variables. The API key variable depends on `LLM_PROVIDER`:
    /// `GEN_AI_API_KEY` or `GEMINI_API_KEY` for Gemini, `OPENAI_API_KEY` for OpenAI.
    pub fn from_env() -> Result<Self> {
        let provider = env_parse("LLM_PROVIDER", LlmProvider::Gemini)?;
        let api_key = match provider {
            LlmProvider::Gemini => first_env(&["GEN_AI_API_KEY", "GEMINI_API_KEY"])
                .context("GEN_AI_API_KEY (or GEMINI_API_KEY) not set")?,
            LlmProvider::OpenAi => {
                first_env(&["OPENAI_API_KEY"]).context("OPENAI_API_KEY not set")?
            }
        };
        let base_url = first_env(&["LLM_BASE_URL"])
            .unwrap_or_else(|| provider.default_base_url().to_string());
        let model = first_env(&["MODEL"]).unwrap_or_else(|| provider.default_model().to_string());

        let defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            temperature: env_parse("LLM_TEMPERATURE", defaults.temperature)?,
            top_p: env_parse("LLM_TOP_P", defaults.top_p)?,
            top_k: env_parse("LLM_TOP_K", defaults.top_k)?,
            max_output_tokens: env_parse("LLM_MAX_OUTPUT_TOKENS", defaults.max_output_tokens)?,
        };

        let safety_settings = match first_env(&["LLM_SAFETY_THRESHOLD"]) {
            Some(v) if v.trim().eq_ignore_ascii_case("off") => Vec::new(),
            Some(v) => safety_settings(v.parse()?),
            None => default_safety_settings(),
        };

        let system_prompt = first_env(&["LLM_SYSTEM_PROMPT", "SYSTEM_PROMPT"]);
        let timeout_secs = env_parse("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            provider,
            api_key,
            base_url,
            model,
            generation,
            safety_settings,
            system_prompt,
            timeout_secs,
        })
    }

    /// Validate config: sampling ranges, base URL, timeout.
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        if reqwest::Url::parse(&self.base_url).is_err() {
            anyhow::bail!("LLM_BASE_URL is not a valid URL: {}", self.base_url);
        }
        if self.model.trim().is_empty() {
            anyhow::bail!("MODEL must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("LLM_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }
}
