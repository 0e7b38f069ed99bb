//! Small utility helpers used across modules: templating, band quantization,
//! tokenization and phrase counting.

/// Lowest reportable band.
pub const BAND_MIN: f32 = 1.0;
/// Highest reportable band.
pub const BAND_MAX: f32 = 9.0;

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Round to the nearest 0.5 and clamp into [1.0, 9.0].
/// Non-finite input collapses to the lowest band.
pub fn quantize_band(score: f32) -> f32 {
  if !score.is_finite() {
    return BAND_MIN;
  }
  let rounded = (score * 2.0).round() / 2.0;
  rounded.clamp(BAND_MIN, BAND_MAX)
}

/// Lowercased word tokens with surrounding punctuation stripped.
/// Inner apostrophes and hyphens survive ("don't", "well-known").
pub fn word_tokens(text: &str) -> Vec<String> {
  text
    .split_whitespace()
    .map(|raw| {
      raw
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
    })
    .filter(|t| !t.is_empty())
    .collect()
}

/// Sentences split on `.`, `!` and `?`, trimmed, empty pieces dropped.
pub fn sentences(text: &str) -> Vec<&str> {
  text
    .split(|c| matches!(c, '.' | '!' | '?'))
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

/// Count how many times a (possibly multi-word) phrase appears in a token stream.
pub fn count_phrase(tokens: &[String], phrase: &str) -> usize {
  let needle: Vec<&str> = phrase.split_whitespace().collect();
  if needle.is_empty() || needle.len() > tokens.len() {
    return 0;
  }
  tokens
    .windows(needle.len())
    .filter(|w| w.iter().zip(needle.iter()).all(|(a, b)| a == b))
    .count()
}

/// Total occurrences of any phrase in `phrases`.
pub fn count_phrases(tokens: &[String], phrases: &[&str]) -> usize {
  phrases.iter().map(|p| count_phrase(tokens, p)).sum()
}

/// Mean of a slice; 0.0 when empty.
pub fn mean(values: &[f32]) -> f32 {
  if values.is_empty() {
    0.0
  } else {
    values.iter().sum::<f32>() / values.len() as f32
  }
}

/// Population standard deviation; 0.0 when fewer than two values.
pub fn std_dev(values: &[f32]) -> f32 {
  if values.len() < 2 {
    return 0.0;
  }
  let m = mean(values);
  let var = values.iter().map(|v| (v - m).powi(2)).sum::<f32>() / values.len() as f32;
  var.sqrt()
}

/// Append items to `out` skipping ones already present (order preserving).
pub fn extend_dedup(out: &mut Vec<String>, items: &[String]) {
  for item in items {
    let trimmed = item.trim();
    if trimmed.is_empty() {
      continue;
    }
    if !out.iter().any(|existing| existing.eq_ignore_ascii_case(trimmed)) {
      out.push(trimmed.to_string());
    }
  }
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quantize_rounds_to_half_steps_and_clamps() {
    assert_eq!(quantize_band(6.74), 6.5);
    assert_eq!(quantize_band(6.76), 7.0);
    assert_eq!(quantize_band(0.2), 1.0);
    assert_eq!(quantize_band(12.0), 9.0);
    assert_eq!(quantize_band(f32::NAN), 1.0);
  }

  #[test]
  fn tokens_strip_punctuation_and_lowercase() {
    let t = word_tokens("Hello, World! Don't (panic).");
    assert_eq!(t, vec!["hello", "world", "don't", "panic"]);
  }

  #[test]
  fn phrase_counting_matches_multiword_sequences() {
    let t = word_tokens("For example, cars. For example, phones. Example.");
    assert_eq!(count_phrase(&t, "for example"), 2);
    assert_eq!(count_phrase(&t, "example"), 3);
    assert_eq!(count_phrase(&[], "for example"), 0);
  }

  #[test]
  fn dedup_is_case_insensitive() {
    let mut out = vec!["Use more linking words".to_string()];
    extend_dedup(&mut out, &["use more linking words".into(), "Vary sentences".into(), " ".into()]);
    assert_eq!(out.len(), 2);
  }

  #[test]
  fn template_fills_placeholders() {
    assert_eq!(fill_template("{a}-{b}-{a}", &[("a", "x"), ("b", "y")]), "x-y-x");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "ééééé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with('é'));
  }
}
