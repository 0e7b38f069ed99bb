//! Runs the four criterion evaluators, applies the gating cascade and merges
//! their feedback into one `AssessmentResult`.
//!
//! Flow:
//! 1) Degenerate text short-circuits to the all-1.0 unscorable result.
//! 2) Otherwise the four evaluators run against one shared, immutable context
//!    (concurrently by default; each carries its own timeout).
//! 3) Task Achievement gates the overall band; only a response that actually
//!    addresses the task reaches the weighted sum.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::config::{AssessorConfig, EvaluationStrategy, ScoringConfig};
use crate::criterion::{CriterionEvaluator, EssayContext};
use crate::domain::{
  AssessmentMethod, AssessmentResult, CombinedFeedback, Criterion, CriterionResult, EssaySubmission, GatingBranch,
  JudgmentSource, TaskKind,
};
use crate::evaluator::Evaluator;
use crate::features::TextFeatureExtractor;
use crate::patterns::{ErrorPatternDetector, PatternSet};
use crate::util::{extend_dedup, mean, quantize_band, BAND_MIN};

pub struct ScoringOrchestrator {
  extractor: TextFeatureExtractor,
  detector: ErrorPatternDetector,
  evaluators: Vec<CriterionEvaluator>,
  scoring: ScoringConfig,
}

impl ScoringOrchestrator {
  pub fn new(evaluator: Arc<dyn Evaluator>, config: &AssessorConfig) -> Self {
    let patterns = config.patterns.clone().unwrap_or_else(PatternSet::builtin);
    let prompts = Arc::new(config.prompts.clone());
    let fallback = Arc::new(config.fallback.clone());
    let timeout = Duration::from_millis(config.scoring.evaluator_timeout_ms);
    let evaluators = Criterion::ALL
      .iter()
      .map(|c| CriterionEvaluator::new(*c, evaluator.clone(), prompts.clone(), fallback.clone(), timeout))
      .collect();
    let detector = ErrorPatternDetector::new(&patterns);
    info!(target: "assessment", patterns = detector.version(), count = detector.pattern_count(), strategy = ?config.scoring.strategy, "Scoring orchestrator ready");
    Self {
      extractor: TextFeatureExtractor::new(),
      detector,
      evaluators,
      scoring: config.scoring.clone(),
    }
  }

  pub async fn score(&self, prompt: &str, essay_text: &str, task_kind: TaskKind) -> AssessmentResult {
    self
      .score_submission(&EssaySubmission {
        prompt_text: prompt.to_string(),
        body_text: essay_text.to_string(),
        task_kind,
      })
      .await
  }

  #[instrument(level = "info", skip(self, submission), fields(task_kind = %submission.task_kind, essay_len = submission.body_text.len()))]
  pub async fn score_submission(&self, submission: &EssaySubmission) -> AssessmentResult {
    if self.extractor.is_degenerate(&submission.body_text) {
      info!(target: "assessment", "Degenerate input; reporting unscorable result");
      return unscorable_result();
    }

    let ctx = EssayContext::build(submission.clone(), &self.extractor, &self.detector);
    let results = match self.scoring.strategy {
      EvaluationStrategy::Concurrent => {
        let (ta, cc, lr, gr) = tokio::join!(
          self.evaluators[0].evaluate_context(&ctx),
          self.evaluators[1].evaluate_context(&ctx),
          self.evaluators[2].evaluate_context(&ctx),
          self.evaluators[3].evaluate_context(&ctx),
        );
        vec![ta, cc, lr, gr]
      }
      EvaluationStrategy::Sequential => {
        let mut out = Vec::with_capacity(self.evaluators.len());
        for ev in &self.evaluators {
          out.push(ev.evaluate_context(&ctx).await);
        }
        out
      }
    };

    let result = assemble(results, &self.scoring);
    info!(
      target: "assessment",
      overall = result.overall_band,
      method = ?result.method,
      branch = ?result.gating_branch,
      "Assessment complete"
    );
    result
  }
}

/// Apply the gating cascade to criterion scores in `Criterion::ALL` order.
pub fn aggregate(scores: [f32; 4], cfg: &ScoringConfig) -> (f32, GatingBranch) {
  let ta = scores[Criterion::TaskAchievement.index()];
  let others = [
    scores[Criterion::CoherenceCohesion.index()],
    scores[Criterion::LexicalResource.index()],
    scores[Criterion::GrammaticalRange.index()],
  ];

  let (raw, branch) = if ta <= cfg.off_topic_threshold {
    ((ta + cfg.off_topic_lift).min(cfg.off_topic_cap), GatingBranch::OffTopic)
  } else if ta <= cfg.weak_task_threshold {
    ((ta * 0.5 + mean(&others) * 0.5).min(cfg.weak_task_cap), GatingBranch::WeakTask)
  } else {
    let total_weight: f32 = Criterion::ALL.iter().map(|c| cfg.weights.weight(*c)).sum();
    let weighted: f32 = Criterion::ALL
      .iter()
      .map(|c| scores[c.index()] * cfg.weights.weight(*c))
      .sum();
    let value = if total_weight > 0.0 { weighted / total_weight } else { mean(&scores) };
    (value, GatingBranch::Weighted)
  };
  debug!(target: "assessment", ta, raw, ?branch, "Gating cascade applied");
  (quantize_band(raw), branch)
}

fn assemble(results: Vec<CriterionResult>, cfg: &ScoringConfig) -> AssessmentResult {
  let mut scores = [BAND_MIN; 4];
  for r in &results {
    scores[r.criterion.index()] = r.score;
  }
  let (overall_band, gating_branch) = aggregate(scores, cfg);

  let external = results.iter().filter(|r| r.source == JudgmentSource::External).count();
  let method = match external {
    0 => AssessmentMethod::RuleBased,
    n if n == results.len() => AssessmentMethod::External,
    _ => AssessmentMethod::Hybrid,
  };
  let confidences: Vec<f32> = results.iter().map(|r| r.confidence).collect();
  let combined_feedback = combine_feedback(&results, overall_band, gating_branch);

  AssessmentResult {
    criterion_results: results,
    overall_band,
    aggregate_confidence: mean(&confidences),
    combined_feedback,
    is_gibberish: false,
    method,
    gating_branch,
  }
}

fn combine_feedback(results: &[CriterionResult], overall: f32, branch: GatingBranch) -> CombinedFeedback {
  let mut fb = CombinedFeedback::default();
  for r in results {
    extend_dedup(&mut fb.strengths, &r.strengths);
    extend_dedup(&mut fb.weaknesses, &r.weaknesses);
    extend_dedup(&mut fb.suggestions, &r.suggestions);
  }

  let strongest = results.iter().max_by(|a, b| a.score.total_cmp(&b.score));
  let weakest = results.iter().min_by(|a, b| a.score.total_cmp(&b.score));
  let mut summary = format!("Overall band {overall:.1}.");
  if let (Some(s), Some(w)) = (strongest, weakest) {
    summary.push_str(&format!(
      " Strongest area: {} ({:.1}); weakest area: {} ({:.1}).",
      s.criterion_name, s.score, w.criterion_name, w.score
    ));
  }
  match branch {
    GatingBranch::OffTopic => summary.push_str(" The response does not address the task, which limits the overall band."),
    GatingBranch::WeakTask => summary.push_str(" Partial task coverage limits the overall band."),
    GatingBranch::Weighted | GatingBranch::Unscorable => {}
  }
  fb.summary = summary;
  fb
}

/// Fixed result for degenerate input: certainty that the text is unscorable.
pub fn unscorable_result() -> AssessmentResult {
  let criterion_results = Criterion::ALL
    .iter()
    .map(|c| CriterionResult {
      criterion: *c,
      criterion_name: c.label().to_string(),
      score: BAND_MIN,
      confidence: 1.0,
      reasoning: "The submission is not assessable text.".into(),
      strengths: vec![],
      weaknesses: vec!["The submission could not be read as an essay.".into()],
      suggestions: vec!["Write complete sentences in English that respond to the prompt.".into()],
      error_instances: vec![],
      source: JudgmentSource::Fallback,
    })
    .collect::<Vec<_>>();
  let mut combined_feedback = CombinedFeedback {
    summary: "Overall band 1.0. The submission is empty, too short or not meaningful text, so it cannot be assessed.".into(),
    ..CombinedFeedback::default()
  };
  for r in &criterion_results {
    extend_dedup(&mut combined_feedback.weaknesses, &r.weaknesses);
    extend_dedup(&mut combined_feedback.suggestions, &r.suggestions);
  }
  AssessmentResult {
    criterion_results,
    overall_band: BAND_MIN,
    aggregate_confidence: 1.0,
    combined_feedback,
    is_gibberish: true,
    method: AssessmentMethod::RuleBased,
    gating_branch: GatingBranch::Unscorable,
  }
}
