//! Loading assessor configuration (prompts, scoring policy, fallback tuning and
//! an optional pattern dictionary) from TOML.
//!
//! Every section is optional; missing sections take the defaults below.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Criterion, TaskKind};
use crate::error::ConfigError;
use crate::patterns::PatternSet;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AssessorConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub scoring: ScoringConfig,
  #[serde(default)]
  pub fallback: FallbackConfig,
  #[serde(default)]
  pub patterns: Option<PatternSet>,
}

/// Prompts sent to the external evaluator.
/// `{rubric}`, `{prompt}` and `{task_kind}` are filled per call; the essay travels
/// separately in the evaluator request.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub evaluator_system: String,
  pub evaluator_user_template: String,
  /// Per-criterion rubric overrides keyed by snake_case criterion name.
  pub rubrics: HashMap<String, String>,
}

impl Prompts {
  pub fn rubric_override(&self, criterion: Criterion) -> Option<&str> {
    self.rubrics.get(criterion.key()).map(String::as_str)
  }
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      evaluator_system: "You are a strict, calibrated examiner of English academic writing. Score one rubric criterion only. Respond ONLY with strict JSON.".into(),
      evaluator_user_template: "{rubric}\n\nEssay prompt ({task_kind}): {prompt}\n\nReturn JSON {\"score\": number 1-9 in 0.5 steps, \"confidence\": number 0-1, \"reasoning\": string, \"strengths\": [string], \"weaknesses\": [string], \"suggestions\": [string], \"errors\": [string]}.".into(),
      rubrics: HashMap::new(),
    }
  }
}

/// How evaluators are scheduled by the orchestrator.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStrategy {
  #[default]
  Concurrent,
  Sequential,
}

/// Gating cascade and aggregation weights. Calibration constants, not invariants.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
  /// Task Achievement at or below this is treated as off-topic.
  pub off_topic_threshold: f32,
  pub off_topic_lift: f32,
  pub off_topic_cap: f32,
  /// Task Achievement at or below this (and above off-topic) is a weak response.
  pub weak_task_threshold: f32,
  pub weak_task_cap: f32,
  pub weights: CriterionWeights,
  pub evaluator_timeout_ms: u64,
  pub strategy: EvaluationStrategy,
}

impl Default for ScoringConfig {
  fn default() -> Self {
    Self {
      off_topic_threshold: 2.0,
      off_topic_lift: 1.0,
      off_topic_cap: 3.0,
      weak_task_threshold: 4.0,
      weak_task_cap: 5.0,
      weights: CriterionWeights::default(),
      evaluator_timeout_ms: 20_000,
      strategy: EvaluationStrategy::Concurrent,
    }
  }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CriterionWeights {
  pub task_achievement: f32,
  pub coherence_cohesion: f32,
  pub lexical_resource: f32,
  pub grammatical_range: f32,
}

impl Default for CriterionWeights {
  fn default() -> Self {
    Self {
      task_achievement: 0.35,
      coherence_cohesion: 0.25,
      lexical_resource: 0.20,
      grammatical_range: 0.20,
    }
  }
}

impl CriterionWeights {
  pub fn weight(&self, criterion: Criterion) -> f32 {
    match criterion {
      Criterion::TaskAchievement => self.task_achievement,
      Criterion::CoherenceCohesion => self.coherence_cohesion,
      Criterion::LexicalResource => self.lexical_resource,
      Criterion::GrammaticalRange => self.grammatical_range,
    }
  }
}

/// Tuning for the local heuristic path.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FallbackConfig {
  pub task1_min_words: usize,
  pub task2_min_words: usize,
  pub confidence_task_achievement: f32,
  pub confidence_coherence_cohesion: f32,
  pub confidence_lexical_resource: f32,
  pub confidence_grammatical_range: f32,
}

impl Default for FallbackConfig {
  fn default() -> Self {
    Self {
      task1_min_words: 150,
      task2_min_words: 250,
      confidence_task_achievement: 0.65,
      confidence_coherence_cohesion: 0.65,
      confidence_lexical_resource: 0.7,
      confidence_grammatical_range: 0.6,
    }
  }
}

impl FallbackConfig {
  pub fn min_words(&self, kind: TaskKind) -> usize {
    match kind {
      TaskKind::Task1 => self.task1_min_words,
      TaskKind::Task2 => self.task2_min_words,
    }
  }

  /// Fixed fallback confidence, kept inside [0.6, 0.7].
  pub fn confidence(&self, criterion: Criterion) -> f32 {
    let c = match criterion {
      Criterion::TaskAchievement => self.confidence_task_achievement,
      Criterion::CoherenceCohesion => self.confidence_coherence_cohesion,
      Criterion::LexicalResource => self.confidence_lexical_resource,
      Criterion::GrammaticalRange => self.confidence_grammatical_range,
    };
    c.clamp(0.6, 0.7)
  }
}

pub fn parse_config(path: &str, raw: &str) -> Result<AssessorConfig, ConfigError> {
  toml::from_str::<AssessorConfig>(raw).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
}

pub fn load_config_file(path: &str) -> Result<AssessorConfig, ConfigError> {
  let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  parse_config(path, &raw)
}

/// Attempt to load `AssessorConfig` from ASSESSOR_CONFIG_PATH. On any IO/parse error, returns None.
pub fn load_config_from_env() -> Option<AssessorConfig> {
  let path = std::env::var("ASSESSOR_CONFIG_PATH").ok()?;
  match load_config_file(&path) {
    Ok(cfg) => {
      info!(target: "bandscore", %path, "Loaded assessor config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "bandscore", %path, error = %e, "Failed to load assessor config; using defaults");
      None
    }
  }
}
