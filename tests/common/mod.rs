#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bandscore::{AssessorConfig, Assessor, Criterion, Evaluator, EvaluatorReply, InMemoryProfileStore, ProviderError};

pub const TECH_PROMPT: &str = "Discuss the impact of technology";

/// On-topic Task 2 essay: stated opinion, two examples, a conclusion, four paragraphs.
pub const ON_TOPIC_ESSAY: &str = "Technology has transformed everyday life in ways that previous generations could hardly imagine. From the moment people wake up until they go to sleep, digital devices shape how they communicate, learn and work. In my opinion, the impact of technology on modern society has been largely positive, although it also brings challenges that deserve careful attention.

The most significant benefit is access to information and services. For example, a student living in a small village can now attend lectures from leading universities through online platforms, which was impossible only a generation ago. Similarly, patients in remote areas can consult doctors by video call instead of travelling long distances to a hospital. These developments demonstrate that technology can reduce inequality and create opportunities for individuals who were previously excluded.

Technology has also changed the world of work. Many routine tasks are now automated, so employees can focus on creative and analytical activities. For instance, accountants use software to process data in seconds, while designers rely on digital tools to produce complex models quickly. However, this shift requires workers to update their skills constantly, and those who cannot adapt may lose their jobs. Governments and companies therefore have a responsibility to invest in training programmes that help people keep pace with change.

On the other hand, constant connection can harm wellbeing. Some people spend hours scrolling through social media, which may lead to anxiety and poor sleep.

In conclusion, I believe that the advantages of technology clearly outweigh its disadvantages, provided that society manages its risks sensibly. If individuals set healthy limits and institutions support lifelong learning, technology will continue to improve the quality of everyday life for the majority of people.";

/// Longer well-formed essay used where only "real prose" matters.
pub const WELL_FORMED_ESSAY: &str = "Technology has transformed everyday life in ways that previous generations could hardly imagine. From the moment people wake up until they go to sleep, digital devices shape how they communicate, learn and work. In my opinion, the impact of technology on modern society has been largely positive, although it also brings challenges that deserve careful attention.

The most significant benefit is access to information and services. For example, a student living in a small village can now attend lectures from leading universities through online platforms, which was impossible only a generation ago. Similarly, patients in remote areas can consult doctors by video call instead of travelling long distances to a hospital. These developments demonstrate that technology can reduce inequality and create opportunities for individuals who were previously excluded.

Technology has also changed the world of work. Many routine tasks are now automated, so employees can focus on creative and analytical activities. For instance, accountants use software to process data in seconds, while designers rely on digital tools to produce complex models quickly. However, this shift requires workers to update their skills constantly, and those who cannot adapt may lose their jobs. Governments and companies therefore have a responsibility to invest in training programmes that help people keep pace with change.

On the other hand, constant connection can harm wellbeing. Some people spend hours scrolling through social media, which may lead to anxiety and poor sleep. Families sometimes sit together in the same room while everyone looks at a separate screen, and genuine conversation becomes rare.

In conclusion, I believe that the advantages of technology clearly outweigh its disadvantages, provided that society manages its risks sensibly. If individuals set healthy limits and institutions support lifelong learning, technology will continue to improve the quality of everyday life for the majority of people.";

pub fn reply(score: f32) -> EvaluatorReply {
  EvaluatorReply {
    score,
    confidence: 0.9,
    reasoning: format!("Scripted judgment {score}"),
    strengths: vec!["Clear argument.".into()],
    weaknesses: vec!["Some repetition.".into()],
    suggestions: vec!["Vary vocabulary.".into()],
    errors: vec![],
  }
}

/// Which criterion a rubric prompt is for.
pub fn criterion_of(rubric_prompt: &str) -> Option<Criterion> {
  [
    ("Criterion: Task Achievement", Criterion::TaskAchievement),
    ("Criterion: Coherence", Criterion::CoherenceCohesion),
    ("Criterion: Lexical", Criterion::LexicalResource),
    ("Criterion: Grammatical", Criterion::GrammaticalRange),
  ]
  .into_iter()
  .find(|(marker, _)| rubric_prompt.contains(marker))
  .map(|(_, c)| c)
}

/// Always answers with the same score; counts calls.
#[derive(Default)]
pub struct FixedEvaluator {
  pub score: f32,
  pub calls: AtomicUsize,
}

impl FixedEvaluator {
  pub fn new(score: f32) -> Self {
    Self { score, calls: AtomicUsize::new(0) }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl Evaluator for FixedEvaluator {
  fn name(&self) -> &str {
    "fixed"
  }

  async fn evaluate(&self, _rubric_prompt: &str, _essay_text: &str) -> Result<EvaluatorReply, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(reply(self.score))
  }
}

/// Per-criterion scores; `None` means that criterion's call fails.
pub struct ScriptedEvaluator {
  pub scores: [Option<f32>; 4],
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
  fn name(&self) -> &str {
    "scripted"
  }

  async fn evaluate(&self, rubric_prompt: &str, _essay_text: &str) -> Result<EvaluatorReply, ProviderError> {
    let criterion = criterion_of(rubric_prompt).ok_or_else(|| ProviderError::Malformed("unknown rubric".into()))?;
    match self.scores[criterion.index()] {
      Some(score) => Ok(reply(score)),
      None => Err(ProviderError::Http { status: 503, message: "overloaded".into() }),
    }
  }
}

/// Answers after `delay`, but only for criteria listed in `slow`; others answer at once.
pub struct SlowEvaluator {
  pub delay: Duration,
  pub slow: Vec<Criterion>,
  pub score: f32,
}

#[async_trait]
impl Evaluator for SlowEvaluator {
  fn name(&self) -> &str {
    "slow"
  }

  async fn evaluate(&self, rubric_prompt: &str, _essay_text: &str) -> Result<EvaluatorReply, ProviderError> {
    if criterion_of(rubric_prompt).is_some_and(|c| self.slow.contains(&c)) {
      tokio::time::sleep(self.delay).await;
    }
    Ok(reply(self.score))
  }
}

pub fn assessor_with(evaluator: Arc<dyn Evaluator>) -> (Assessor, Arc<InMemoryProfileStore>) {
  let store = Arc::new(InMemoryProfileStore::new());
  let assessor = Assessor::new(evaluator, store.clone(), &AssessorConfig::default());
  (assessor, store)
}
