//! Error-pattern dictionaries and the detector that scans text against them.
//!
//! Dictionaries are plain data (`PatternSet`) so deployments can ship a new
//! version through TOML and tests can substitute minimal sets. Patterns are
//! case-insensitive regexes; `^`/`$` match at line boundaries.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::{ErrorCategory, ErrorInstance, ErrorReport};

/// One dictionary entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatternEntry {
  /// Language family for L1 entries, sub-area for the other two families.
  pub subtype: String,
  pub pattern: String,
  #[serde(default)]
  pub note: String,
}

impl PatternEntry {
  fn new(subtype: &str, pattern: &str, note: &str) -> Self {
    Self { subtype: subtype.into(), pattern: pattern.into(), note: note.into() }
  }
}

/// Versioned set of the three pattern families.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatternSet {
  pub version: String,
  #[serde(default)]
  pub l1_influence: Vec<PatternEntry>,
  #[serde(default)]
  pub interlanguage: Vec<PatternEntry>,
  #[serde(default)]
  pub discourse: Vec<PatternEntry>,
}

impl Default for PatternSet {
  fn default() -> Self {
    Self::builtin()
  }
}

impl PatternSet {
  pub fn empty(version: &str) -> Self {
    Self {
      version: version.into(),
      l1_influence: vec![],
      interlanguage: vec![],
      discourse: vec![],
    }
  }

  /// Built-in dictionary shipped with the crate.
  pub fn builtin() -> Self {
    let l1_influence = vec![
      PatternEntry::new("romance", r"\bmore (?:better|worse|easier|bigger)\b", "Double comparative; use the -er form alone."),
      PatternEntry::new("romance", r"\bexplain me\b", "Use 'explain to me'."),
      PatternEntry::new("romance", r"\bdepend(?:s|ed|ing)? of\b", "Use 'depend on'."),
      PatternEntry::new("romance", r"\baccording to me\b", "Use 'in my opinion'."),
      PatternEntry::new("romance", r"\bmake a (?:party|photo|question)\b", "Collocation: 'have a party', 'take a photo', 'ask a question'."),
      PatternEntry::new("germanic", r"\bsince \d+ (?:years|months|days)\b", "Use 'for' with a duration."),
      PatternEntry::new("germanic", r"\bi am agree\b", "Use 'I agree'."),
      PatternEntry::new("sinitic", r"\balthough\b[^.!?]*,\s*but\b", "Do not pair 'although' with 'but'."),
      PatternEntry::new("sinitic", r"\bbecause\b[^.!?]*,\s*so\b", "Do not pair 'because' with 'so'."),
      PatternEntry::new("sinitic", r"\b(?:open|close) the light\b", "Use 'turn on/off the light'."),
      PatternEntry::new("slavic", r"\bthe (?:life|nature|society) is\b", "Abstract nouns usually take no article."),
      PatternEntry::new("slavic", r"\bpeople (?:is|was|has)\b", "'People' is plural."),
    ];
    let interlanguage = vec![
      PatternEntry::new("article", r"\ba (?:important|interesting|example|advantage|effect|issue|opinion|idea|increase|individual|hour|honest)\b", "Use 'an' before a vowel sound."),
      PatternEntry::new("article", r"\ban (?:university|useful|european|one|unique)\b", "Use 'a' before a consonant sound."),
      PatternEntry::new("preposition", r"\bdiscuss about\b", "'Discuss' takes a direct object."),
      PatternEntry::new("preposition", r"\bemphasi[sz]e on\b", "'Emphasise' takes a direct object."),
      PatternEntry::new("preposition", r"\barrived? to\b", "Use 'arrive at/in'."),
      PatternEntry::new("preposition", r"\bmarried with\b", "Use 'married to'."),
      PatternEntry::new("tense", r"\b(?:has|have|had) went\b", "Past participle is 'gone'."),
      PatternEntry::new("tense", r"\bdid(?:n't| not) \w+ed\b", "Use the base form after 'did'."),
      PatternEntry::new("tense", r"\b(?:is|are|was|were) (?:go|come|write|take)\b", "Missing -ing or wrong auxiliary."),
      PatternEntry::new("word_order", r"\b(?:can|must|should|will) to\b", "Modal verbs take the bare infinitive."),
      PatternEntry::new("word_order", r"\bdon't know what is\b", "Embedded question order: 'what it is'."),
      PatternEntry::new("word_order", r"\balways (?:i|we|they) (?:go|do|have)\b", "Frequency adverb goes before the main verb."),
    ];
    let discourse = vec![
      PatternEntry::new("coherence", r"\bin my opinion,? i think\b", "Redundant opinion markers."),
      PatternEntry::new("coherence", r"\blast but not the least\b", "Fixed phrase is 'last but not least'."),
      PatternEntry::new("coherence", r"\band so on\b", "Vague list ending; give a concrete example."),
      PatternEntry::new("cohesion", r"\bin the other hand\b", "Use 'on the other hand'."),
      PatternEntry::new("cohesion", r"\bbut however\b", "Use one contrast marker."),
      PatternEntry::new("cohesion", r"\bso therefore\b", "Use one result marker."),
      PatternEntry::new("cohesion", r"\bbesides of\b", "Use 'besides' or 'apart from'."),
      PatternEntry::new("paragraph_structure", r"(?m)^\s*(?:and|but|so)\b", "Avoid opening a paragraph with a coordinator."),
    ];
    Self { version: "builtin-v1".into(), l1_influence, interlanguage, discourse }
  }
}

struct CompiledPattern {
  category: ErrorCategory,
  subtype: String,
  note: String,
  regex: Regex,
}

/// Scans text against a compiled `PatternSet`.
pub struct ErrorPatternDetector {
  version: String,
  patterns: Vec<CompiledPattern>,
}

impl Default for ErrorPatternDetector {
  fn default() -> Self {
    Self::new(&PatternSet::builtin())
  }
}

impl ErrorPatternDetector {
  /// Compile a pattern set. Entries that fail to compile are skipped with a warning.
  #[instrument(level = "info", skip(set), fields(version = %set.version))]
  pub fn new(set: &PatternSet) -> Self {
    let families = [
      (ErrorCategory::L1Influence, &set.l1_influence),
      (ErrorCategory::Interlanguage, &set.interlanguage),
      (ErrorCategory::Discourse, &set.discourse),
    ];
    let mut patterns = Vec::new();
    for (category, entries) in families {
      for e in entries {
        match RegexBuilder::new(&e.pattern).case_insensitive(true).multi_line(true).build() {
          Ok(regex) => patterns.push(CompiledPattern {
            category,
            subtype: e.subtype.clone(),
            note: e.note.clone(),
            regex,
          }),
          Err(err) => {
            warn!(target: "assessment", pattern = %e.pattern, error = %err, "Skipping invalid error pattern");
          }
        }
      }
    }
    Self { version: set.version.clone(), patterns }
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn pattern_count(&self) -> usize {
    self.patterns.len()
  }

  /// Every match of every pattern becomes one instance; counts derive from instances.
  #[instrument(level = "debug", skip(self, text), fields(text_len = text.len()))]
  pub fn detect(&self, text: &str) -> ErrorReport {
    let mut instances = Vec::new();
    for p in &self.patterns {
      for m in p.regex.find_iter(text) {
        instances.push(ErrorInstance {
          category: p.category,
          subtype: p.subtype.clone(),
          excerpt: m.as_str().trim().to_string(),
          offset: Some(m.start()),
          note: p.note.clone(),
        });
      }
    }
    instances.sort_by_key(|i| i.offset);
    let report = ErrorReport::from_instances(instances);
    debug!(target: "assessment", total = report.total_count, l1 = report.l1_influenced_count, interlanguage = report.interlanguage_count, discourse = report.discourse_count, "Error patterns scanned");
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_patterns_all_compile() {
    let set = PatternSet::builtin();
    let total = set.l1_influence.len() + set.interlanguage.len() + set.discourse.len();
    assert_eq!(ErrorPatternDetector::new(&set).pattern_count(), total);
  }

  #[test]
  fn detects_each_family_case_insensitively() {
    let d = ErrorPatternDetector::default();
    let r = d.detect("According to me this is MORE BETTER. He has went home. In the other hand, it rains.");
    assert_eq!(r.l1_influenced_count, 2);
    assert_eq!(r.interlanguage_count, 1);
    assert_eq!(r.discourse_count, 1);
    assert_eq!(r.total_count, 4);
    assert!(r.categorized_instances.iter().all(|i| i.offset.is_some()));
  }

  #[test]
  fn repeated_matches_each_count() {
    let d = ErrorPatternDetector::default();
    let r = d.detect("We discuss about it. They discuss about it again.");
    assert_eq!(r.interlanguage_count, 2);
  }

  #[test]
  fn paragraph_openers_use_line_anchors() {
    let d = ErrorPatternDetector::default();
    let r = d.detect("First point is clear.\nBut the second is not.\nAnd a third.");
    assert_eq!(r.discourse_count, 2);
  }

  #[test]
  fn minimal_set_substitutes_builtin() {
    let mut set = PatternSet::empty("test-1");
    set.discourse.push(PatternEntry::new("cohesion", r"\bfoo\b", ""));
    set.discourse.push(PatternEntry::new("cohesion", r"(unclosed", ""));
    let d = ErrorPatternDetector::new(&set);
    assert_eq!(d.version(), "test-1");
    assert_eq!(d.pattern_count(), 1);
    let r = d.detect("foo bar FOO");
    assert_eq!(r.discourse_count, 2);
    assert_eq!(r.total_count, 2);
  }

  #[test]
  fn clean_text_has_no_errors() {
    let r = ErrorPatternDetector::default().detect("Public transport reduces congestion in large cities.");
    assert_eq!(r.total_count, 0);
    assert!(r.categorized_instances.is_empty());
  }
}
