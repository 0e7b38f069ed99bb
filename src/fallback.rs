//! Local heuristic judgments used when the external evaluator is unavailable.
//!
//! Each criterion starts from a neutral base and collects additive contributions
//! from the feature set and error report. The caller quantizes the result.

use crate::config::FallbackConfig;
use crate::criterion::EssayContext;
use crate::domain::TaskKind;

const BASE_SCORE: f32 = 4.0;

/// Unquantized output of a heuristic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Judgment {
  pub score: f32,
  pub notes: Vec<String>,
  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
  pub suggestions: Vec<String>,
}

impl Judgment {
  fn new() -> Self {
    Self { score: BASE_SCORE, ..Self::default() }
  }

  fn add(&mut self, delta: f32, note: &str) {
    self.score += delta;
    self.notes.push(format!("{note} ({delta:+.1})"));
  }

  fn strength(&mut self, s: &str) {
    self.strengths.push(s.to_string());
  }

  fn weakness(&mut self, w: &str, suggestion: &str) {
    self.weaknesses.push(w.to_string());
    self.suggestions.push(suggestion.to_string());
  }

  fn cap(&mut self, ceiling: f32, note: &str) {
    if self.score > ceiling {
      self.score = ceiling;
      self.notes.push(format!("{note} (capped at {ceiling:.1})"));
    }
  }

  pub fn reasoning(&self) -> String {
    if self.notes.is_empty() {
      "Local heuristic assessment: baseline only.".into()
    } else {
      format!("Local heuristic assessment: {}.", self.notes.join("; "))
    }
  }
}

pub fn task_achievement(ctx: &EssayContext, cfg: &FallbackConfig) -> Judgment {
  let mut j = Judgment::new();
  let f = &ctx.features;
  let min_words = cfg.min_words(ctx.submission.task_kind) as f32;
  let words = f.word_count as f32;

  if words >= min_words {
    j.add(1.0, "meets minimum length");
    j.strength("Response meets the required length.");
    if words >= min_words * 1.1 {
      j.add(0.5, "develops ideas beyond the minimum");
    }
  } else if words < min_words * 0.6 {
    j.add(-1.0, "well under minimum length");
    j.weakness("Response is far shorter than required.", &format!("Write at least {} words.", min_words as usize));
  } else {
    j.weakness("Response is slightly under the required length.", &format!("Aim for at least {} words.", min_words as usize));
  }

  match ctx.submission.task_kind {
    TaskKind::Task2 => {
      if f.has_stated_opinion {
        j.add(1.0, "position is stated");
        j.strength("Clear position on the question.");
      } else {
        j.weakness("No clear position is stated.", "State your opinion explicitly in the introduction and conclusion.");
      }
      match f.example_count {
        0 => j.weakness("Ideas are not supported with examples.", "Support each main idea with a specific example."),
        1 => j.add(0.5, "one supporting example"),
        _ => {
          j.add(1.0, "multiple supporting examples");
          j.strength("Main ideas are supported with examples.");
        }
      }
      if f.has_conclusion {
        j.add(0.5, "concluding statement present");
      } else {
        j.weakness("The essay lacks a conclusion.", "End with a conclusion that restates your position.");
      }
    }
    TaskKind::Task1 => {
      if f.has_conclusion {
        j.add(1.0, "overview present");
        j.strength("Includes an overview of the main trends.");
      } else {
        j.weakness("No overview of the main features.", "Add an overview sentence starting with 'Overall'.");
      }
      let data_points = ctx
        .submission
        .body_text
        .split_whitespace()
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .count();
      if data_points >= 3 {
        j.add(1.0, "key figures reported");
        j.strength("Key figures are reported accurately.");
      } else {
        j.weakness("Few figures support the description.", "Quote specific figures to support each key feature.");
      }
    }
  }

  if ctx.relevance >= 0.5 {
    j.add(0.5, "addresses the prompt topic");
    j.strength("Stays on the topic of the prompt.");
  }
  if ctx.relevance <= 0.0 {
    j.weakness("The response does not address the prompt.", "Re-read the prompt and answer the question that was asked.");
    j.cap(2.0, "off-topic");
  } else if ctx.relevance < 0.3 {
    j.weakness("The response only partially addresses the prompt.", "Cover every part of the prompt directly.");
    j.cap(4.0, "weak topic coverage");
  }
  j
}

pub fn coherence_cohesion(ctx: &EssayContext, _cfg: &FallbackConfig) -> Judgment {
  let mut j = Judgment::new();
  let f = &ctx.features;

  match f.paragraph_count {
    0 | 1 => {
      j.add(-0.5, "no paragraphing");
      j.weakness("Text is not divided into paragraphs.", "Organise the essay into an introduction, body paragraphs and a conclusion.");
    }
    2 => j.add(0.5, "basic paragraphing"),
    3 => j.add(1.0, "clear paragraphing"),
    _ => {
      j.add(1.5, "well-developed paragraph structure");
      j.strength("Logical paragraph structure.");
    }
  }

  let density = if f.sentence_count == 0 { 0.0 } else { f.linking_word_count as f32 / f.sentence_count as f32 };
  if density > 1.5 {
    j.add(-0.5, "mechanical overuse of connectives");
    j.weakness("Linking words are overused.", "Use connectives only where they add meaning.");
  } else if density >= 0.3 {
    j.add(1.0, "good range of cohesive devices");
    j.strength("Effective use of linking words.");
  } else if density >= 0.15 {
    j.add(0.5, "some cohesive devices");
  } else {
    j.weakness("Few linking words connect the ideas.", "Use linking words such as 'however', 'therefore' and 'in addition'.");
  }

  if f.sentence_length_std_dev >= 3.0 {
    j.add(0.5, "varied sentence rhythm");
  }
  if f.has_conclusion {
    j.add(0.5, "clear progression to a conclusion");
  }

  let discourse = ctx.errors.discourse_count;
  if discourse > 0 {
    let penalty = (discourse as f32 * 0.5).min(1.5);
    j.add(-penalty, "discourse irregularities");
    j.weakness("Some connectives are misused.", "Review the flagged linking phrases.");
  }
  j
}

pub fn lexical_resource(ctx: &EssayContext, _cfg: &FallbackConfig) -> Judgment {
  let mut j = Judgment::new();
  let f = &ctx.features;

  if f.unique_word_ratio >= 0.6 {
    j.add(1.5, "wide vocabulary range");
    j.strength("Wide range of vocabulary.");
  } else if f.unique_word_ratio >= 0.5 {
    j.add(1.0, "adequate vocabulary range");
  } else if f.unique_word_ratio >= 0.4 {
    j.add(0.5, "limited vocabulary range");
  } else {
    j.weakness("Vocabulary is repetitive.", "Use synonyms and paraphrase to avoid repeating words.");
  }

  let academic_density = if f.word_count == 0 { 0.0 } else { f.academic_word_count as f32 / f.word_count as f32 };
  if academic_density >= 0.04 {
    j.add(1.0, "strong academic vocabulary");
    j.strength("Appropriate academic vocabulary.");
  } else if academic_density >= 0.02 {
    j.add(0.5, "some academic vocabulary");
  } else {
    j.weakness("Little academic vocabulary.", "Introduce topic-specific academic words.");
  }

  if f.long_word_ratio >= 0.25 {
    j.add(0.5, "sophisticated word choice");
  }
  if f.word_count < 50 {
    j.add(-1.0, "too little text to show range");
  }

  let l1 = ctx.errors.l1_influenced_count;
  if l1 > 0 {
    let penalty = (l1 as f32 * 0.5).min(1.5);
    j.add(-penalty, "first-language interference in word choice");
    j.weakness("Some phrasing reflects first-language patterns.", "Check collocations in a learner's dictionary.");
  }
  j
}

pub fn grammatical_range(ctx: &EssayContext, _cfg: &FallbackConfig) -> Judgment {
  let mut j = Judgment::new();
  let f = &ctx.features;

  let complex_ratio = if f.sentence_count == 0 { 0.0 } else { f.complex_sentence_count as f32 / f.sentence_count as f32 };
  if complex_ratio >= 0.4 {
    j.add(1.5, "frequent complex sentences");
    j.strength("Good mix of simple and complex sentences.");
  } else if complex_ratio >= 0.2 {
    j.add(1.0, "some complex sentences");
  } else if complex_ratio > 0.0 {
    j.add(0.5, "few complex sentences");
  } else {
    j.weakness("Only simple sentences are used.", "Combine ideas with subordinate clauses (because, although, which).");
  }

  if (12.0..=25.0).contains(&f.avg_sentence_length) {
    j.add(0.5, "controlled sentence length");
  } else if f.avg_sentence_length > 35.0 {
    j.add(-0.5, "run-on sentences");
    j.weakness("Sentences run on too long.", "Split long sentences and check punctuation.");
  }
  if f.sentence_length_std_dev >= 4.0 {
    j.add(0.5, "varied sentence structures");
  }

  let inter = ctx.errors.interlanguage_count;
  if inter == 0 {
    if f.word_count >= 100 {
      j.add(1.0, "no systematic grammar errors detected");
      j.strength("Grammar is largely accurate.");
    }
  } else {
    let penalty = (inter as f32 * 0.5).min(2.0);
    j.add(-penalty, "systematic grammar errors");
    j.weakness("Recurring errors with articles, prepositions, tense or word order.", "Review the flagged sentences for article, preposition and tense errors.");
  }
  j
}
