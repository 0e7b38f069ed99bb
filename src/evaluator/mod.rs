//! The external evaluator capability and its implementations.
//!
//! A `CriterionEvaluator` talks to whatever sits behind `Evaluator` through a
//! single call: rubric prompt + essay in, structured judgment out. Any failure
//! comes back as `ProviderError` and is absorbed by the caller.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;

pub mod openai;

pub use openai::OpenAiEvaluator;

/// Structured reply expected from the provider.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EvaluatorReply {
  pub score: f32,
  #[serde(default = "default_confidence")]
  pub confidence: f32,
  #[serde(default)]
  pub reasoning: String,
  #[serde(default)]
  pub strengths: Vec<String>,
  #[serde(default)]
  pub weaknesses: Vec<String>,
  #[serde(default)]
  pub suggestions: Vec<String>,
  #[serde(default)]
  pub errors: Vec<String>,
}

fn default_confidence() -> f32 {
  0.8
}

impl EvaluatorReply {
  /// Reject replies that cannot be turned into a band.
  pub fn validate(self) -> Result<Self, ProviderError> {
    if !self.score.is_finite() {
      return Err(ProviderError::Malformed(format!("non-finite score {}", self.score)));
    }
    if !(0.0..=9.5).contains(&self.score) {
      return Err(ProviderError::Malformed(format!("score {} outside band range", self.score)));
    }
    let confidence = if self.confidence.is_finite() { self.confidence.clamp(0.0, 1.0) } else { 0.0 };
    Ok(Self { confidence, ..self })
  }
}

#[async_trait]
pub trait Evaluator: Send + Sync {
  /// Short provider name for logs.
  fn name(&self) -> &str;

  async fn evaluate(&self, rubric_prompt: &str, essay_text: &str) -> Result<EvaluatorReply, ProviderError>;
}

/// Stand-in used when no provider is configured: every call reports unavailability,
/// which keeps the whole system on the local heuristic path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEvaluator;

#[async_trait]
impl Evaluator for NoopEvaluator {
  fn name(&self) -> &str {
    "none"
  }

  async fn evaluate(&self, _rubric_prompt: &str, _essay_text: &str) -> Result<EvaluatorReply, ProviderError> {
    Err(ProviderError::Unavailable("no evaluator configured".into()))
  }
}
