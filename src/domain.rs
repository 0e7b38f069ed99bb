//! Domain models shared by every stage: submissions, derived features, error
//! reports, per-criterion and overall results, difficulty, and the adapted output.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which writing task the essay answers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
  /// Report/description task (shorter minimum length).
  Task1,
  /// Argumentative essay.
  #[default]
  Task2,
}

impl fmt::Display for TaskKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TaskKind::Task1 => write!(f, "Task 1"),
      TaskKind::Task2 => write!(f, "Task 2"),
    }
  }
}

/// Immutable input to the assessment pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssaySubmission {
  pub prompt_text: String,
  pub body_text: String,
  pub task_kind: TaskKind,
}

/// The four rubric dimensions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
  TaskAchievement,
  CoherenceCohesion,
  LexicalResource,
  GrammaticalRange,
}

impl Criterion {
  /// Fixed reporting order.
  pub const ALL: [Criterion; 4] = [
    Criterion::TaskAchievement,
    Criterion::CoherenceCohesion,
    Criterion::LexicalResource,
    Criterion::GrammaticalRange,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Criterion::TaskAchievement => "Task Achievement",
      Criterion::CoherenceCohesion => "Coherence & Cohesion",
      Criterion::LexicalResource => "Lexical Resource",
      Criterion::GrammaticalRange => "Grammatical Range & Accuracy",
    }
  }

  /// snake_case key used in configuration and logs.
  pub fn key(self) -> &'static str {
    match self {
      Criterion::TaskAchievement => "task_achievement",
      Criterion::CoherenceCohesion => "coherence_cohesion",
      Criterion::LexicalResource => "lexical_resource",
      Criterion::GrammaticalRange => "grammatical_range",
    }
  }

  pub fn index(self) -> usize {
    match self {
      Criterion::TaskAchievement => 0,
      Criterion::CoherenceCohesion => 1,
      Criterion::LexicalResource => 2,
      Criterion::GrammaticalRange => 3,
    }
  }
}

impl fmt::Display for Criterion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Lexical and sentence statistics, computed once per submission.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
  pub word_count: usize,
  pub sentence_count: usize,
  pub paragraph_count: usize,
  pub unique_word_ratio: f32,
  pub avg_sentence_length: f32,
  pub sentence_length_std_dev: f32,
  pub academic_word_count: usize,
  pub linking_word_count: usize,
  pub has_stated_opinion: bool,
  pub example_count: usize,
  pub has_conclusion: bool,
  pub complex_sentence_count: usize,
  pub long_word_ratio: f32,
}

/// Error pattern family.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
  L1Influence,
  Interlanguage,
  Discourse,
  /// Reported by the external evaluator rather than found by pattern matching.
  Reported,
}

/// One located (or reported) error.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInstance {
  pub category: ErrorCategory,
  pub subtype: String,
  pub excerpt: String,
  pub offset: Option<usize>,
  pub note: String,
}

/// Pattern-scan summary. `total_count` always equals the sum of the three family counts.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
  pub l1_influenced_count: usize,
  pub interlanguage_count: usize,
  pub discourse_count: usize,
  pub total_count: usize,
  pub categorized_instances: Vec<ErrorInstance>,
}

impl ErrorReport {
  /// Build a report from located instances; counts are derived, never supplied.
  pub fn from_instances(instances: Vec<ErrorInstance>) -> Self {
    let count = |c: ErrorCategory| instances.iter().filter(|i| i.category == c).count();
    let l1 = count(ErrorCategory::L1Influence);
    let inter = count(ErrorCategory::Interlanguage);
    let disc = count(ErrorCategory::Discourse);
    Self {
      l1_influenced_count: l1,
      interlanguage_count: inter,
      discourse_count: disc,
      total_count: l1 + inter + disc,
      categorized_instances: instances,
    }
  }

  pub fn instances_of(&self, category: ErrorCategory) -> Vec<ErrorInstance> {
    self
      .categorized_instances
      .iter()
      .filter(|i| i.category == category)
      .cloned()
      .collect()
  }
}

/// Which path produced a criterion judgment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JudgmentSource {
  External,
  Fallback,
}

/// Scored judgment for one rubric dimension.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
  pub criterion: Criterion,
  pub criterion_name: String,
  pub score: f32,
  pub confidence: f32,
  pub reasoning: String,
  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
  pub suggestions: Vec<String>,
  pub error_instances: Vec<ErrorInstance>,
  pub source: JudgmentSource,
}

/// Overall producing path of an assessment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentMethod {
  External,
  RuleBased,
  Hybrid,
}

/// Branch of the gating cascade that produced the overall band.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatingBranch {
  Unscorable,
  OffTopic,
  WeakTask,
  Weighted,
}

/// Deduplicated union of per-criterion feedback.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedFeedback {
  pub summary: String,
  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
  pub suggestions: Vec<String>,
}

/// Orchestrator output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
  pub criterion_results: Vec<CriterionResult>,
  pub overall_band: f32,
  pub aggregate_confidence: f32,
  pub combined_feedback: CombinedFeedback,
  pub is_gibberish: bool,
  pub method: AssessmentMethod,
  pub gating_branch: GatingBranch,
}

impl AssessmentResult {
  pub fn score_of(&self, criterion: Criterion) -> Option<f32> {
    self
      .criterion_results
      .iter()
      .find(|r| r.criterion == criterion)
      .map(|r| r.score)
  }

  /// Criterion scores in fixed order; missing criteria read as the lowest band.
  pub fn score_array(&self) -> [f32; 4] {
    Criterion::ALL.map(|c| self.score_of(c).unwrap_or(crate::util::BAND_MIN))
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
  Beginner,
  Intermediate,
  Advanced,
  Expert,
}

/// Intrinsic text complexity, independent of correctness.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAssessment {
  pub vocab_complexity: f32,
  pub grammar_complexity: f32,
  pub coherence_level: f32,
  pub overall_tier: DifficultyTier,
  pub challenge_rating: f32,
}

/// How strictly the adaptive layer treats a submission.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
  #[default]
  Standard,
  Adaptive,
  Challenging,
  Supportive,
}

impl ScoringMode {
  pub fn strictness(self) -> f32 {
    match self {
      ScoringMode::Standard => 1.0,
      ScoringMode::Adaptive => 0.8,
      ScoringMode::Challenging => 1.2,
      ScoringMode::Supportive => 0.7,
    }
  }

  pub fn tone(self) -> FeedbackTone {
    match self {
      ScoringMode::Standard => FeedbackTone::Neutral,
      ScoringMode::Adaptive => FeedbackTone::Balanced,
      ScoringMode::Challenging => FeedbackTone::Direct,
      ScoringMode::Supportive => FeedbackTone::Encouraging,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
  Neutral,
  Balanced,
  Direct,
  Encouraging,
}

/// Adjusted score for one criterion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdaptedScore {
  pub criterion: Criterion,
  pub base_score: f32,
  pub adjusted_score: f32,
}

/// Final output of `assess`; composed here, persisted elsewhere (if at all).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdaptedResult {
  pub assessment_id: String,
  pub scores: Vec<AdaptedScore>,
  pub overall_band: f32,
  pub adaptive_feedback: String,
  pub performance_insights: Vec<String>,
  pub next_recommendations: Vec<String>,
  pub confidence: f32,
  pub method: AssessmentMethod,
  pub is_gibberish: bool,
  pub mode: ScoringMode,
  pub tone: FeedbackTone,
  pub difficulty: DifficultyAssessment,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inst(category: ErrorCategory) -> ErrorInstance {
    ErrorInstance {
      category,
      subtype: "x".into(),
      excerpt: "x".into(),
      offset: Some(0),
      note: String::new(),
    }
  }

  #[test]
  fn report_total_ignores_reported_instances() {
    let r = ErrorReport::from_instances(vec![
      inst(ErrorCategory::L1Influence),
      inst(ErrorCategory::Interlanguage),
      inst(ErrorCategory::Interlanguage),
      inst(ErrorCategory::Discourse),
      inst(ErrorCategory::Reported),
    ]);
    assert_eq!(r.total_count, 4);
    assert_eq!(r.total_count, r.l1_influenced_count + r.interlanguage_count + r.discourse_count);
  }

  #[test]
  fn strictness_per_mode() {
    assert_eq!(ScoringMode::Standard.strictness(), 1.0);
    assert_eq!(ScoringMode::Adaptive.strictness(), 0.8);
    assert_eq!(ScoringMode::Challenging.strictness(), 1.2);
    assert_eq!(ScoringMode::Supportive.strictness(), 0.7);
  }

  #[test]
  fn criterion_order_is_stable() {
    for (i, c) in Criterion::ALL.iter().enumerate() {
      assert_eq!(c.index(), i);
    }
  }
}
