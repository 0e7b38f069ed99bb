//! OpenAI-compatible chat-completions client used as the rich-mode evaluator.
//!
//! We only request strict JSON objects. Calls are instrumented and log model
//! names, latencies and token usage (never essay contents or the API key).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::{Evaluator, EvaluatorReply};
use crate::error::ProviderError;
use crate::util::trunc_for_log;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct OpenAiEvaluator {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
  system_prompt: String,
}

impl OpenAiEvaluator {
  pub fn new(api_key: String, base_url: String, model: String, system_prompt: String) -> Result<Self, ProviderError> {
    let client = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| ProviderError::Transport(e.to_string()))?;
    Ok(Self { client, api_key, base_url, model, system_prompt })
  }

  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(system_prompt: &str) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    let model = std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
    match Self::new(api_key, base_url, model, system_prompt.to_string()) {
      Ok(client) => Some(client),
      Err(e) => {
        error!(target: "bandscore", error = %e, "Failed to build OpenAI client");
        None
      }
    }
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(&self, system: &str, user: &str, temperature: f32) -> Result<T, ProviderError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "bandscore/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| ProviderError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      error!(target: "assessment", status, message = %trunc_for_log(&message, 200), "OpenAI returned an error status");
      return Err(ProviderError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| ProviderError::Malformed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(target: "assessment", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    serde_json::from_str::<T>(&text).map_err(|e| ProviderError::Malformed(format!("JSON parse error: {}", e)))
  }
}

#[async_trait]
impl Evaluator for OpenAiEvaluator {
  fn name(&self) -> &str {
    "openai"
  }

  #[instrument(level = "info", skip(self, rubric_prompt, essay_text), fields(rubric_len = rubric_prompt.len(), essay_len = essay_text.len()))]
  async fn evaluate(&self, rubric_prompt: &str, essay_text: &str) -> Result<EvaluatorReply, ProviderError> {
    let user = format!("{}\n\nEssay:\n{}", rubric_prompt, essay_text);
    let start = Instant::now();
    let result = self.chat_json::<EvaluatorReply>(&self.system_prompt, &user, 0.2).await;
    let elapsed = start.elapsed();
    match &result {
      Ok(r) => info!(target: "assessment", ?elapsed, score = r.score, "Evaluator reply received"),
      Err(e) => error!(target: "assessment", ?elapsed, error = %e, "Evaluator call failed"),
    }
    result?.validate()
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}
#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  r#type: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_provider_error_message() {
    let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("<html>502</html>"), None);
  }

  #[test]
  fn request_omits_missing_response_format() {
    let req = ChatCompletionRequest {
      model: "m".into(),
      messages: vec![],
      temperature: 0.2,
      response_format: None,
    };
    let json = serde_json::to_value(&req).unwrap();
    assert!(json.get("response_format").is_none());
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_a_transport_error() {
    let ev = OpenAiEvaluator::new("k".into(), "http://127.0.0.1:9".into(), "m".into(), "sys".into()).unwrap();
    let err = ev.evaluate("rubric", "essay").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
  }
}
