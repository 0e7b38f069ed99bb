//! Text feature extraction and degenerate-input detection.
//!
//! Both entry points are total: any string (including empty or binary-looking
//! input) yields a value, never a panic.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::FeatureSet;
use crate::lexicon::{
  ACADEMIC_WORDS, CONCLUSION_MARKERS, EXAMPLE_MARKERS, LINKING_WORDS, OPINION_MARKERS,
  PROMPT_STOP_WORDS, SUBORDINATORS,
};
use crate::util::{count_phrases, mean, sentences, std_dev, word_tokens};

const MIN_TRIMMED_CHARS: usize = 10;
const MIN_TOKENS: usize = 3;
const MAX_RUN: usize = 4;
const MAX_FOREIGN_CHAR_RATIO: f32 = 0.3;
const MIN_ALPHA_TOKEN_RATIO: f32 = 0.4;
const MIN_MEAN_SENTENCE_TOKENS: f32 = 3.0;

/// Stateless extractor. Word lists live in `crate::lexicon`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFeatureExtractor;

impl TextFeatureExtractor {
  pub fn new() -> Self {
    Self
  }

  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn extract(&self, text: &str) -> FeatureSet {
    let tokens = word_tokens(text);
    if tokens.is_empty() {
      return FeatureSet::default();
    }

    let sents = sentences(text);
    let lengths: Vec<f32> = sents
      .iter()
      .map(|s| s.split_whitespace().count() as f32)
      .collect();

    let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    let academic: HashSet<&str> = ACADEMIC_WORDS.iter().copied().collect();
    let academic_word_count = tokens.iter().filter(|t| academic.contains(t.as_str())).count();
    let long_words = tokens.iter().filter(|t| t.chars().count() > 6).count();

    let complex_sentence_count = sents
      .iter()
      .filter(|s| {
        let st = word_tokens(s);
        st.iter().any(|t| SUBORDINATORS.contains(&t.as_str()))
      })
      .count();

    let fs = FeatureSet {
      word_count: tokens.len(),
      sentence_count: sents.len(),
      paragraph_count: paragraph_count(text),
      unique_word_ratio: unique.len() as f32 / tokens.len() as f32,
      avg_sentence_length: mean(&lengths),
      sentence_length_std_dev: std_dev(&lengths),
      academic_word_count,
      linking_word_count: count_phrases(&tokens, LINKING_WORDS),
      has_stated_opinion: count_phrases(&tokens, OPINION_MARKERS) > 0,
      example_count: count_phrases(&tokens, EXAMPLE_MARKERS),
      has_conclusion: count_phrases(&tokens, CONCLUSION_MARKERS) > 0,
      complex_sentence_count,
      long_word_ratio: long_words as f32 / tokens.len() as f32,
    };
    debug!(target: "assessment", words = fs.word_count, sentences = fs.sentence_count, paragraphs = fs.paragraph_count, "Features extracted");
    fs
  }

  /// True when the text cannot be meaningfully scored. Any single rule suffices.
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn is_degenerate(&self, text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_TRIMMED_CHARS {
      return true;
    }

    let raw_tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if raw_tokens.len() < MIN_TOKENS {
      return true;
    }

    if has_long_run(trimmed) {
      return true;
    }

    let total_chars = trimmed.chars().count();
    let foreign = trimmed.chars().filter(|c| !is_plain_text_char(*c)).count();
    if foreign as f32 / total_chars as f32 > MAX_FOREIGN_CHAR_RATIO {
      return true;
    }

    let alpha_tokens = raw_tokens
      .iter()
      .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
      .filter(|t| t.chars().count() > 2 && t.chars().all(char::is_alphabetic))
      .count();
    if (alpha_tokens as f32 / raw_tokens.len() as f32) < MIN_ALPHA_TOKEN_RATIO {
      return true;
    }

    let sents = sentences(trimmed);
    let mean_len = if sents.is_empty() {
      0.0
    } else {
      sents.iter().map(|s| s.split_whitespace().count()).sum::<usize>() as f32 / sents.len() as f32
    };
    mean_len < MIN_MEAN_SENTENCE_TOKENS
  }
}

/// Fraction of prompt content words that also appear in the essay.
/// Returns 1.0 when the prompt carries no content words (nothing to miss).
pub fn relevance(prompt: &str, text: &str) -> f32 {
  let prompt_words: HashSet<String> = word_tokens(prompt)
    .into_iter()
    .filter(|w| w.len() > 2 && !PROMPT_STOP_WORDS.contains(&w.as_str()))
    .collect();
  if prompt_words.is_empty() {
    return 1.0;
  }
  let essay: Vec<String> = word_tokens(text);
  let hits = prompt_words
    .iter()
    .filter(|pw| essay.iter().any(|w| shares_stem(pw, w)))
    .count();
  hits as f32 / prompt_words.len() as f32
}

/// Crude stem match: identical, or sharing a prefix of at least five characters
/// ("technology" ~ "technological").
fn shares_stem(a: &str, b: &str) -> bool {
  if a == b {
    return true;
  }
  let prefix = a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count();
  prefix >= 5 && prefix * 10 >= a.chars().count().min(b.chars().count()) * 7
}

fn paragraph_count(text: &str) -> usize {
  let mut blocks = 0;
  let mut in_block = false;
  let mut lines = 0;
  for line in text.lines() {
    if line.trim().is_empty() {
      in_block = false;
    } else {
      lines += 1;
      if !in_block {
        blocks += 1;
        in_block = true;
      }
    }
  }
  // Single-newline layouts: treat each non-empty line as a paragraph.
  if blocks == 1 && lines > 1 {
    lines
  } else {
    blocks
  }
}

fn is_plain_text_char(c: char) -> bool {
  c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '.' | ',' | ';' | '\'' | '"' | '-')
}

/// Any non-whitespace character repeated `MAX_RUN` or more times in a row.
fn has_long_run(text: &str) -> bool {
  let mut prev: Option<char> = None;
  let mut run = 0usize;
  for c in text.chars() {
    if Some(c) == prev {
      run += 1;
    } else {
      prev = Some(c);
      run = 1;
    }
    if run >= MAX_RUN && !c.is_whitespace() {
      return true;
    }
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;

  const ESSAY: &str = "Technology has changed the way people live and work. In my opinion, \
    the benefits outweigh the drawbacks, although some concerns remain.\n\n\
    For example, smartphones allow families to stay connected across long distances. \
    However, constant notifications can reduce concentration.\n\n\
    In conclusion, technology is a powerful tool when it is used responsibly.";

  #[test]
  fn empty_text_yields_zero_features() {
    let fs = TextFeatureExtractor::new().extract("");
    assert_eq!(fs, FeatureSet::default());
    let fs = TextFeatureExtractor::new().extract("   \n\t ");
    assert_eq!(fs.word_count, 0);
  }

  #[test]
  fn extracts_structure_and_markers() {
    let fs = TextFeatureExtractor::new().extract(ESSAY);
    assert_eq!(fs.paragraph_count, 3);
    assert_eq!(fs.sentence_count, 5);
    assert!(fs.has_stated_opinion);
    assert!(fs.has_conclusion);
    assert_eq!(fs.example_count, 1);
    assert!(fs.linking_word_count >= 3);
    assert!(fs.complex_sentence_count >= 1);
    assert!(fs.unique_word_ratio > 0.5 && fs.unique_word_ratio <= 1.0);
    assert!(fs.academic_word_count >= 2);
  }

  #[test]
  fn single_newline_paragraphs_are_counted() {
    assert_eq!(paragraph_count("One line here.\nSecond line here.\nThird."), 3);
    assert_eq!(paragraph_count("Just one paragraph."), 1);
  }

  #[test]
  fn degenerate_rules_each_fire() {
    let x = TextFeatureExtractor::new();
    assert!(x.is_degenerate(""));
    assert!(x.is_degenerate("short"));
    assert!(x.is_degenerate("asdasdasdasd"));
    assert!(x.is_degenerate("this is soooo good and fine."));
    assert!(x.is_degenerate("1234 5678 9012 3456 7890 1234"));
    assert!(x.is_degenerate("qw er ty ui op as df gh jk"));
    assert!(x.is_degenerate("Yes. No. Maybe so. Fine. Okay then."));
  }

  #[test]
  fn well_formed_text_is_not_degenerate() {
    assert!(!TextFeatureExtractor::new().is_degenerate(ESSAY));
  }

  #[test]
  fn indentation_does_not_count_as_a_run() {
    let text = "Technology shapes modern life.    People rely on it daily.";
    assert!(!TextFeatureExtractor::new().is_degenerate(text));
  }

  #[test]
  fn relevance_tracks_prompt_content_words() {
    let r = relevance("Discuss the impact of technology", ESSAY);
    assert!(r >= 0.5, "got {r}");
    let off = relevance("Discuss the impact of technology", "My favourite food is pasta with tomato sauce.");
    assert_eq!(off, 0.0);
    assert_eq!(relevance("Discuss", "anything"), 1.0);
  }
}
