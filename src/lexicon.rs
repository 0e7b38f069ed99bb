//! Fixed word lists used by feature extraction, difficulty scoring and the
//! local fallback heuristics. Multi-word entries are matched as token sequences.

/// Subset of the Academic Word List (headwords and common inflections).
pub const ACADEMIC_WORDS: &[&str] = &[
  "analyse", "analyze", "analysis", "approach", "assess", "assessment", "assume", "authority",
  "available", "benefit", "benefits", "concept", "consist", "constitute", "context", "contract",
  "create", "data", "define", "derive", "distribute", "economic", "economy", "environment",
  "environmental", "establish", "estimate", "evident", "evidence", "export", "factor", "factors",
  "finance", "financial", "formula", "function", "identify", "impact", "income", "indicate",
  "individual", "individuals", "interpret", "involve", "issue", "issues", "labour", "legal",
  "legislation", "major", "method", "occur", "percent", "period", "policy", "policies",
  "principle", "proceed", "process", "require", "research", "respond", "role", "section",
  "sector", "significant", "significantly", "similar", "source", "specific", "structure",
  "theory", "variable", "vary", "access", "achieve", "acquire", "administration", "affect",
  "appropriate", "aspect", "aspects", "assist", "category", "community", "consequence",
  "consequences", "considerable", "consistent", "crucial", "demonstrate", "enhance", "ensure",
  "exclude", "framework", "fundamental", "generate", "generation", "global", "impose",
  "infrastructure", "initial", "instance", "integrate", "interaction", "investment", "maintain",
  "perspective", "potential", "previous", "primary", "promote", "range", "regulation",
  "relevant", "resource", "resources", "strategy", "sufficient", "sustainable", "technology",
  "technological", "traditional", "transfer", "ultimately", "widespread",
];

/// Linking words and connectives.
pub const LINKING_WORDS: &[&str] = &[
  "however", "moreover", "furthermore", "therefore", "consequently", "nevertheless",
  "nonetheless", "additionally", "in addition", "on the other hand", "in contrast",
  "as a result", "for example", "for instance", "in conclusion", "to sum up", "firstly",
  "secondly", "thirdly", "finally", "meanwhile", "similarly", "likewise", "thus", "hence",
  "although", "whereas", "while", "because", "since", "despite", "in spite of", "overall",
  "in particular", "besides", "also", "then", "otherwise", "instead",
];

/// Cohesion markers counted by the difficulty assessor.
pub const COHESION_MARKERS: &[&str] = &[
  "however", "moreover", "furthermore", "therefore", "consequently", "nevertheless",
  "in addition", "on the other hand", "in contrast", "as a result", "for example",
  "for instance", "in conclusion", "firstly", "secondly", "finally", "similarly", "thus",
  "hence", "whereas", "although",
];

/// Phrases that state the writer's position.
pub const OPINION_MARKERS: &[&str] = &[
  "i believe", "i think", "in my opinion", "in my view", "i agree", "i disagree",
  "i strongly", "from my perspective", "personally", "i would argue", "i feel that",
  "it is my belief",
];

/// Phrases that introduce supporting examples.
pub const EXAMPLE_MARKERS: &[&str] = &[
  "for example", "for instance", "such as", "to illustrate", "a case in point", "namely",
];

/// Phrases that introduce a conclusion.
pub const CONCLUSION_MARKERS: &[&str] = &[
  "in conclusion", "to conclude", "to sum up", "in summary", "to summarise", "to summarize",
  "all in all", "overall",
];

/// Subordinators marking a complex sentence.
pub const SUBORDINATORS: &[&str] = &[
  "because", "although", "though", "which", "that", "while", "whereas", "if", "when",
  "unless", "since", "whether", "who", "whom", "whose", "where", "until", "after", "before",
];

/// Stop words and task-instruction verbs ignored when measuring prompt relevance.
pub const PROMPT_STOP_WORDS: &[&str] = &[
  "the", "a", "an", "of", "to", "and", "or", "in", "on", "for", "with", "is", "are", "be",
  "this", "that", "these", "those", "it", "its", "your", "you", "own", "some", "people",
  "what", "which", "how", "why", "do", "does", "should", "would", "extent", "agree",
  "disagree", "discuss", "describe", "explain", "give", "reasons", "reason", "answer",
  "include", "relevant", "examples", "example", "knowledge", "experience", "write", "least",
  "words", "both", "views", "view", "opinion", "summarise", "summarize", "information",
  "selecting", "reporting", "main", "features", "make", "comparisons", "where", "whether",
  "there", "than", "more", "many", "about", "from", "has", "have", "been", "by", "as",
];
