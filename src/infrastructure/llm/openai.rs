use crate::domain::entities::reflection::ReflectionLevel;
use crate::domain::error::DomainError;
use crate::domain::ports::collaborators::*;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::decision::Decision;
use crate::infrastructure::llm::extract_json;
use crate::infrastructure::llm::prompts;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, DomainError> {
        info!(model = %self.model, max_tokens, "Calling LLM");
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage { role: "system", content: system },
                    ChatMessage { role: "user", content: user },
                ],
                temperature,
                max_tokens,
                response_format: json_mode.then(|| serde_json::json!({ "type": "json_object" })),
            })
            .send()
            .await
            .map_err(|e| DomainError::Provider(format!("LLM API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Provider(format!("LLM API {status}: {body}")));
        }

        let result: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("LLM response: {e}")))?;
        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(chars = content.len(), "LLM response received");
        Ok(content)
    }

    pub async fn complete_json(&self, system: &str, user: &str) -> Result<serde_json::Value, DomainError> {
        let system = format!("{system}{}", prompts::JSON_ONLY);
        let raw = self.complete(&system, user, 0.2, 4096, true).await?;
        extract_json(&raw).ok_or_else(|| {
            let head: String = raw.chars().take(500).collect();
            DomainError::Parse(format!("Could not parse JSON from LLM response: {head}"))
        })
    }
}

/// Which report an [`LlmAnalyst`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalystKind {
    Research,
    Sentiment,
}

pub struct LlmAnalyst {
    chat: Arc<OpenAiChat>,
    kind: AnalystKind,
}

impl LlmAnalyst {
    pub fn new(chat: Arc<OpenAiChat>, kind: AnalystKind) -> Self {
        Self { chat, kind }
    }
}

#[async_trait]
impl Analyst for LlmAnalyst {
    fn name(&self) -> &str {
        match self.kind {
            AnalystKind::Research => "research",
            AnalystKind::Sentiment => "sentiment",
        }
    }

    async fn report(&self, ctx: &CycleContext) -> Result<String, DomainError> {
        let (system, user) = match self.kind {
            AnalystKind::Research => (prompts::RESEARCH_SYSTEM, prompts::research_prompt(ctx)),
            AnalystKind::Sentiment => (prompts::SENTIMENT_SYSTEM, prompts::sentiment_prompt(ctx)),
        };
        self.chat.complete(system, &user, 0.3, 4096, false).await
    }
}

pub struct LlmDecisionMaker {
    chat: Arc<OpenAiChat>,
}

impl LlmDecisionMaker {
    pub fn new(chat: Arc<OpenAiChat>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl DecisionMaker for LlmDecisionMaker {
    async fn decide(&self, ctx: &CycleContext) -> Result<serde_json::Value, DomainError> {
        self.chat
            .complete_json(prompts::DECISION_SYSTEM, &prompts::decision_prompt(ctx))
            .await
    }
}

pub struct LlmTradeValidator {
    chat: Arc<OpenAiChat>,
}

impl LlmTradeValidator {
    pub fn new(chat: Arc<OpenAiChat>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl TradeValidator for LlmTradeValidator {
    async fn validate(&self, decision: &Decision, ctx: &CycleContext) -> Result<serde_json::Value, DomainError> {
        self.chat
            .complete_json(prompts::VALIDATION_SYSTEM, &prompts::validation_prompt(decision, ctx))
            .await
    }
}

pub struct LlmSummarizer {
    chat: Arc<OpenAiChat>,
}

impl LlmSummarizer {
    pub fn new(chat: Arc<OpenAiChat>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DomainError> {
        let (temperature, max_tokens) = match request.level {
            ReflectionLevel::Cycle => (0.3, 256),
            ReflectionLevel::CrossTrial => (0.4, 512),
        };
        let text = self
            .chat
            .complete(
                prompts::reflection_system(request.level),
                &request.prompt,
                temperature,
                max_tokens,
                false,
            )
            .await?;
        if text.trim().is_empty() {
            return Err(DomainError::Provider("Empty reflection from LLM".into()));
        }
        Ok(text.trim().to_string())
    }
}
