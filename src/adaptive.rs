//! Adapts an assessment to the writer: strictness per scoring mode, profile-aware
//! score adjustments, tone-specific feedback and deterministic recommendations.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::domain::{
  AdaptedResult, AdaptedScore, AssessmentResult, Criterion, DifficultyAssessment, DifficultyTier, FeedbackTone,
  ScoringMode,
};
use crate::orchestrator::aggregate;
use crate::profile::{PerformanceProfile, Trend};
use crate::util::{extend_dedup, quantize_band};

const MEMBERSHIP_BONUS: f32 = 0.5;
const LOW_CONSISTENCY: f32 = 0.6;
const FAST_PROGRESS: f32 = 0.3;

pub struct AdaptiveScorer {
  scoring: ScoringConfig,
}

impl AdaptiveScorer {
  pub fn new(scoring: ScoringConfig) -> Self {
    Self { scoring }
  }

  /// `profile` is the writer's profile as it stood before this submission.
  #[instrument(level = "info", skip_all, fields(user_id = %profile.user_id, ?mode, gibberish = result.is_gibberish))]
  pub fn adapt(
    &self,
    result: &AssessmentResult,
    profile: &PerformanceProfile,
    difficulty: &DifficultyAssessment,
    mode: ScoringMode,
  ) -> AdaptedResult {
    let strictness = mode.strictness();
    let challenge_term = difficulty.challenge_rating - 0.5;
    let profile_term = profile.profile_factor() - 0.5;

    let scores: Vec<AdaptedScore> = Criterion::ALL
      .iter()
      .map(|c| {
        let base = result.score_of(*c).unwrap_or(1.0);
        let adjusted = if result.is_gibberish {
          base
        } else {
          let membership = if profile.is_strength(*c) {
            MEMBERSHIP_BONUS
          } else if profile.is_weakness(*c) {
            -MEMBERSHIP_BONUS
          } else {
            0.0
          };
          quantize_band(base + (membership + challenge_term + profile_term) * strictness)
        };
        AdaptedScore { criterion: *c, base_score: base, adjusted_score: adjusted }
      })
      .collect();

    let overall_band = if result.is_gibberish {
      result.overall_band
    } else {
      let mut arr = [1.0f32; 4];
      for s in &scores {
        arr[s.criterion.index()] = s.adjusted_score;
      }
      aggregate(arr, &self.scoring).0
    };
    debug!(target: "assessment", base = result.overall_band, adapted = overall_band, strictness, "Scores adapted");

    let tone = mode.tone();
    AdaptedResult {
      assessment_id: Uuid::new_v4().to_string(),
      adaptive_feedback: feedback(result, profile, tone),
      performance_insights: insights(result, profile),
      next_recommendations: recommendations(result, profile, difficulty),
      scores,
      overall_band,
      confidence: result.aggregate_confidence,
      method: result.method,
      is_gibberish: result.is_gibberish,
      mode,
      tone,
      difficulty: difficulty.clone(),
    }
  }
}

fn trend_word(t: Trend) -> &'static str {
  match t {
    Trend::Improving => "improving",
    Trend::Stable => "stable",
    Trend::Declining => "declining",
    Trend::Volatile => "uneven",
  }
}

fn feedback(result: &AssessmentResult, profile: &PerformanceProfile, tone: FeedbackTone) -> String {
  let opener = match tone {
    FeedbackTone::Neutral => "Assessment complete.",
    FeedbackTone::Balanced => "Here is a balanced view of this essay, measured against your recent work.",
    FeedbackTone::Direct => "This essay was held to a demanding standard.",
    FeedbackTone::Encouraging => "Good effort: every essay you write moves you forward.",
  };
  let mut parts = vec![opener.to_string(), result.combined_feedback.summary.clone()];

  if !result.is_gibberish && profile.history.len() >= 3 {
    parts.push(format!("Your recent scores are {}.", trend_word(profile.trend)));
  }

  let fb = &result.combined_feedback;
  let closing = match tone {
    FeedbackTone::Direct => fb.weaknesses.first().map(|w| format!("Fix this first: {w}")),
    FeedbackTone::Encouraging => fb
      .strengths
      .first()
      .map(|s| format!("Build on what works: {s}"))
      .or_else(|| fb.suggestions.first().map(|s| format!("One step at a time: {s}"))),
    FeedbackTone::Balanced => match (fb.strengths.first(), fb.weaknesses.first()) {
      (Some(s), Some(w)) => Some(format!("Keep: {s} Improve: {w}")),
      (Some(s), None) => Some(format!("Keep: {s}")),
      (None, Some(w)) => Some(format!("Improve: {w}")),
      (None, None) => None,
    },
    FeedbackTone::Neutral => fb.suggestions.first().map(|s| format!("Next step: {s}")),
  };
  if let Some(c) = closing {
    parts.push(c);
  }
  parts.join(" ")
}

fn insights(result: &AssessmentResult, profile: &PerformanceProfile) -> Vec<String> {
  let mut out = vec![];
  let n = profile.history.len();
  if n == 0 {
    out.push("First assessed submission: this essay sets your performance baseline.".to_string());
  } else {
    out.push(format!("Trend across {} previous submission(s): {}.", n, trend_word(profile.trend)));
    if n >= 2 {
      out.push(format!("Learning velocity: {:+.2} bands per submission.", profile.learning_velocity));
      out.push(format!("Consistency score: {:.2}.", profile.consistency_score));
    }
    if !result.is_gibberish {
      let relation = if result.overall_band > profile.current_level {
        "above"
      } else if result.overall_band < profile.current_level {
        "below"
      } else {
        "in line with"
      };
      out.push(format!(
        "This essay ({:.1}) is {} your current level ({:.1}).",
        result.overall_band, relation, profile.current_level
      ));
    }
  }
  let gap = profile.target_level - profile.current_level;
  if gap > 0.0 {
    out.push(format!("{:.1} band(s) to reach your target of {:.1}.", gap, profile.target_level));
  } else if n > 0 {
    out.push(format!("Target of {:.1} reached.", profile.target_level));
  }
  for c in &profile.strength_areas {
    out.push(format!("Consistent strength: {}.", c.label()));
  }
  for c in &profile.weakness_areas {
    out.push(format!("Recurring weakness: {}.", c.label()));
  }
  out
}

fn criterion_advice(c: Criterion) -> &'static str {
  match c {
    Criterion::TaskAchievement => "Plan before writing: answer every part of the prompt and support each main point with an example.",
    Criterion::CoherenceCohesion => "Give each paragraph one central idea and link paragraphs with clear transitions.",
    Criterion::LexicalResource => "Build topic vocabulary lists and practise paraphrasing the prompt in your own words.",
    Criterion::GrammaticalRange => "Practise complex sentences (relative and concessive clauses) and proofread for articles and tense.",
  }
}

fn tier_advice(t: DifficultyTier) -> &'static str {
  match t {
    DifficultyTier::Beginner => "Combine short sentences with linking words and subordinate clauses to raise complexity.",
    DifficultyTier::Intermediate => "Introduce more academic vocabulary and a wider range of sentence structures.",
    DifficultyTier::Advanced => "Refine precision with less common collocations and careful hedging.",
    DifficultyTier::Expert => "Keep the complexity, but check that every long sentence stays clear and controlled.",
  }
}

/// Deterministic: same inputs, same list, same order.
fn recommendations(result: &AssessmentResult, profile: &PerformanceProfile, difficulty: &DifficultyAssessment) -> Vec<String> {
  let mut recs: Vec<String> = vec![];
  if result.is_gibberish {
    recs.push("Submit a complete essay in English that responds to the prompt.".to_string());
    return recs;
  }

  let mut focus: Vec<Criterion> = profile.weakness_areas.clone();
  if focus.is_empty() {
    let scores = result.score_array();
    if let Some(lowest) = Criterion::ALL
      .iter()
      .copied()
      .min_by(|a, b| scores[a.index()].total_cmp(&scores[b.index()]))
    {
      focus.push(lowest);
    }
  }
  let advice: Vec<String> = focus.iter().map(|c| criterion_advice(*c).to_string()).collect();
  extend_dedup(&mut recs, &advice);
  extend_dedup(&mut recs, &[tier_advice(difficulty.overall_tier).to_string()]);

  let n = profile.history.len();
  if n >= 3 && profile.consistency_score < LOW_CONSISTENCY {
    recs.push("Your scores vary widely; use the same planning routine for every essay.".to_string());
  }
  if n >= 2 && profile.learning_velocity < 0.0 {
    recs.push("Recent scores are slipping; revisit the feedback on your earlier essays before writing the next one.".to_string());
  } else if n >= 2 && profile.learning_velocity > FAST_PROGRESS {
    recs.push("You are progressing quickly; try Challenging mode with harder prompts.".to_string());
  }
  recs
}
