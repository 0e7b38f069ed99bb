//! One generic evaluator per rubric dimension.
//!
//! A `CriterionEvaluator` is parameterized by a `CriterionSpec` (rubric text and
//! local heuristic) selected from the `Criterion` tag. It first delegates to the
//! external `Evaluator`; on any provider failure or timeout it falls back to the
//! local heuristic. Both paths produce the same `CriterionResult` shape.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::{FallbackConfig, Prompts};
use crate::domain::{
  Criterion, CriterionResult, EssaySubmission, ErrorCategory, ErrorInstance, ErrorReport, FeatureSet,
  JudgmentSource, TaskKind,
};
use crate::error::ProviderError;
use crate::evaluator::{Evaluator, EvaluatorReply};
use crate::fallback::{self, Judgment};
use crate::features::{relevance, TextFeatureExtractor};
use crate::patterns::ErrorPatternDetector;
use crate::util::{fill_template, quantize_band};

/// Immutable per-submission inputs shared (read-only) by all four evaluators.
#[derive(Clone, Debug)]
pub struct EssayContext {
  pub submission: EssaySubmission,
  pub features: FeatureSet,
  pub errors: ErrorReport,
  pub relevance: f32,
}

impl EssayContext {
  pub fn build(submission: EssaySubmission, extractor: &TextFeatureExtractor, detector: &ErrorPatternDetector) -> Self {
    let features = extractor.extract(&submission.body_text);
    let errors = detector.detect(&submission.body_text);
    let relevance = relevance(&submission.prompt_text, &submission.body_text);
    Self { submission, features, errors, relevance }
  }

  /// Build with the default extractor and built-in pattern dictionary.
  pub fn analyze(submission: EssaySubmission) -> Self {
    Self::build(submission, &TextFeatureExtractor::new(), &ErrorPatternDetector::default())
  }
}

type Heuristic = fn(&EssayContext, &FallbackConfig) -> Judgment;

/// Per-dimension configuration record.
#[derive(Clone, Copy)]
pub struct CriterionSpec {
  pub criterion: Criterion,
  pub rubric: &'static str,
  pub heuristic: Heuristic,
  /// Pattern family whose instances are attached to fallback results.
  pub error_family: Option<ErrorCategory>,
}

impl CriterionSpec {
  pub fn for_criterion(criterion: Criterion) -> Self {
    match criterion {
      Criterion::TaskAchievement => Self {
        criterion,
        rubric: "Criterion: Task Achievement / Task Response. Judge how fully the essay addresses every part of the prompt, \
          whether a clear position is presented and sustained, and whether main ideas are extended and supported. \
          An essay that does not address the prompt must score 1-2 regardless of language quality.",
        heuristic: fallback::task_achievement,
        error_family: None,
      },
      Criterion::CoherenceCohesion => Self {
        criterion,
        rubric: "Criterion: Coherence and Cohesion. Judge logical organisation and progression, paragraphing with a clear \
          central topic each, and the accurate, flexible use of cohesive devices and referencing.",
        heuristic: fallback::coherence_cohesion,
        error_family: Some(ErrorCategory::Discourse),
      },
      Criterion::LexicalResource => Self {
        criterion,
        rubric: "Criterion: Lexical Resource. Judge the range and precision of vocabulary, use of less common items and \
          collocations, and errors in word choice, word formation and spelling.",
        heuristic: fallback::lexical_resource,
        error_family: Some(ErrorCategory::L1Influence),
      },
      Criterion::GrammaticalRange => Self {
        criterion,
        rubric: "Criterion: Grammatical Range and Accuracy. Judge the range of sentence structures, the proportion of \
          error-free sentences, and control of grammar and punctuation.",
        heuristic: fallback::grammatical_range,
        error_family: Some(ErrorCategory::Interlanguage),
      },
    }
  }
}

pub struct CriterionEvaluator {
  spec: CriterionSpec,
  evaluator: Arc<dyn Evaluator>,
  prompts: Arc<Prompts>,
  fallback: Arc<FallbackConfig>,
  timeout: Duration,
}

impl CriterionEvaluator {
  pub fn new(
    criterion: Criterion,
    evaluator: Arc<dyn Evaluator>,
    prompts: Arc<Prompts>,
    fallback: Arc<FallbackConfig>,
    timeout: Duration,
  ) -> Self {
    Self { spec: CriterionSpec::for_criterion(criterion), evaluator, prompts, fallback, timeout }
  }

  pub fn criterion(&self) -> Criterion {
    self.spec.criterion
  }

  /// Convenience form: analyze the text, then evaluate.
  pub async fn evaluate(&self, prompt: &str, essay_text: &str, task_kind: TaskKind) -> CriterionResult {
    let ctx = EssayContext::analyze(EssaySubmission {
      prompt_text: prompt.to_string(),
      body_text: essay_text.to_string(),
      task_kind,
    });
    self.evaluate_context(&ctx).await
  }

  /// Never fails: provider errors and timeouts degrade to the local heuristic.
  #[instrument(level = "info", skip(self, ctx), fields(criterion = self.spec.criterion.key(), provider = self.evaluator.name()))]
  pub async fn evaluate_context(&self, ctx: &EssayContext) -> CriterionResult {
    let rubric_prompt = self.rubric_prompt(ctx);
    let call = self.evaluator.evaluate(&rubric_prompt, &ctx.submission.body_text);
    let outcome = match tokio::time::timeout(self.timeout, call).await {
      Ok(res) => res.and_then(EvaluatorReply::validate),
      Err(_) => Err(ProviderError::Timeout(self.timeout.as_millis() as u64)),
    };

    match outcome {
      Ok(reply) => {
        debug!(target: "assessment", criterion = self.spec.criterion.key(), score = reply.score, "External judgment accepted");
        self.from_reply(reply)
      }
      Err(e) => {
        warn!(target: "assessment", criterion = self.spec.criterion.key(), error = %e, "Evaluator failed; using local heuristics");
        self.local(ctx)
      }
    }
  }

  /// Local heuristic path on its own.
  pub fn local(&self, ctx: &EssayContext) -> CriterionResult {
    let judgment = (self.spec.heuristic)(ctx, &self.fallback);
    let error_instances = self
      .spec
      .error_family
      .map(|family| ctx.errors.instances_of(family))
      .unwrap_or_default();
    CriterionResult {
      criterion: self.spec.criterion,
      criterion_name: self.spec.criterion.label().to_string(),
      score: quantize_band(judgment.score),
      confidence: self.fallback.confidence(self.spec.criterion),
      reasoning: judgment.reasoning(),
      strengths: judgment.strengths,
      weaknesses: judgment.weaknesses,
      suggestions: judgment.suggestions,
      error_instances,
      source: JudgmentSource::Fallback,
    }
  }

  fn rubric_prompt(&self, ctx: &EssayContext) -> String {
    let rubric = self.prompts.rubric_override(self.spec.criterion).unwrap_or(self.spec.rubric);
    let task_kind = ctx.submission.task_kind.to_string();
    fill_template(
      &self.prompts.evaluator_user_template,
      &[("rubric", rubric), ("prompt", &ctx.submission.prompt_text), ("task_kind", &task_kind)],
    )
  }

  fn from_reply(&self, reply: EvaluatorReply) -> CriterionResult {
    let error_instances = reply
      .errors
      .into_iter()
      .map(|e| ErrorInstance {
        category: ErrorCategory::Reported,
        subtype: self.spec.criterion.key().to_string(),
        excerpt: e,
        offset: None,
        note: String::new(),
      })
      .collect();
    CriterionResult {
      criterion: self.spec.criterion,
      criterion_name: self.spec.criterion.label().to_string(),
      score: quantize_band(reply.score),
      confidence: reply.confidence,
      reasoning: reply.reasoning,
      strengths: reply.strengths,
      weaknesses: reply.weaknesses,
      suggestions: reply.suggestions,
      error_instances,
      source: JudgmentSource::External,
    }
  }
}
