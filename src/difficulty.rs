//! Intrinsic complexity of a text, independent of whether it is correct.

use tracing::{debug, instrument};

use crate::domain::{DifficultyAssessment, DifficultyTier};
use crate::lexicon::COHESION_MARKERS;
use crate::util::{count_phrases, sentences, word_tokens};

#[derive(Clone, Copy, Debug, Default)]
pub struct DifficultyAssessor;

impl DifficultyAssessor {
  pub fn new() -> Self {
    Self
  }

  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn assess(&self, text: &str) -> DifficultyAssessment {
    let tokens = word_tokens(text);
    // Division guard only; an empty text produces zeros everywhere.
    let sentence_count = sentences(text).len().max(1) as f32;

    let vocab_complexity = if tokens.is_empty() {
      0.0
    } else {
      tokens.iter().filter(|t| t.chars().count() > 6).count() as f32 / tokens.len() as f32
    };
    let clause_marks = text.chars().filter(|c| matches!(c, ',' | ';' | ':')).count() as f32;
    let grammar_complexity = clause_marks / sentence_count;
    let coherence_level = count_phrases(&tokens, COHESION_MARKERS) as f32 / sentence_count;

    let mean = (vocab_complexity + grammar_complexity + coherence_level) / 3.0;
    let overall_tier = tier_for(mean);
    let challenge_rating = (mean * 2.0).min(1.0);

    debug!(target: "assessment", vocab_complexity, grammar_complexity, coherence_level, ?overall_tier, "Difficulty assessed");
    DifficultyAssessment {
      vocab_complexity,
      grammar_complexity,
      coherence_level,
      overall_tier,
      challenge_rating,
    }
  }
}

fn tier_for(mean: f32) -> DifficultyTier {
  if mean < 0.2 {
    DifficultyTier::Beginner
  } else if mean < 0.4 {
    DifficultyTier::Intermediate
  } else if mean < 0.6 {
    DifficultyTier::Advanced
  } else {
    DifficultyTier::Expert
  }
}
