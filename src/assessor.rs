//! Public entry point: score an essay, adapt it to the writer and update their profile.
//!
//! Scoring runs outside any lock. The per-user lock only covers the
//! load, adapt, record and save sequence, so concurrent assessments for one user
//! never lose an update while different users proceed independently.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::adaptive::AdaptiveScorer;
use crate::config::{load_config_from_env, AssessorConfig};
use crate::difficulty::DifficultyAssessor;
use crate::domain::{AdaptedResult, ScoringMode, TaskKind};
use crate::error::{AssessError, Result};
use crate::evaluator::{Evaluator, NoopEvaluator, OpenAiEvaluator};
use crate::orchestrator::ScoringOrchestrator;
use crate::profile::{load_or_baseline, InMemoryProfileStore, PerformanceProfile, ProfileStore, UserLocks};

pub struct Assessor {
  orchestrator: ScoringOrchestrator,
  difficulty: DifficultyAssessor,
  adaptive: AdaptiveScorer,
  store: Arc<dyn ProfileStore>,
  locks: UserLocks,
}

impl Assessor {
  pub fn new(evaluator: Arc<dyn Evaluator>, store: Arc<dyn ProfileStore>, config: &AssessorConfig) -> Self {
    Self {
      orchestrator: ScoringOrchestrator::new(evaluator, config),
      difficulty: DifficultyAssessor::new(),
      adaptive: AdaptiveScorer::new(config.scoring.clone()),
      store,
      locks: UserLocks::new(),
    }
  }

  /// Config from ASSESSOR_CONFIG_PATH, OpenAI when OPENAI_API_KEY is set, in-memory profiles.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Self {
    let config = load_config_from_env().unwrap_or_default();
    let evaluator: Arc<dyn Evaluator> = match OpenAiEvaluator::from_env(&config.prompts.evaluator_system) {
      Some(oa) => {
        info!(target: "bandscore", base_url = %oa.base_url, model = %oa.model, "OpenAI evaluator enabled");
        Arc::new(oa)
      }
      None => {
        info!(target: "bandscore", "OpenAI disabled (no OPENAI_API_KEY). Scoring with local heuristics.");
        Arc::new(NoopEvaluator)
      }
    };
    Self::new(evaluator, Arc::new(InMemoryProfileStore::new()), &config)
  }

  #[instrument(level = "info", skip(self, prompt, essay_text), fields(%task_kind, ?mode, essay_len = essay_text.len()))]
  pub async fn assess(
    &self,
    user_id: &str,
    prompt: &str,
    essay_text: &str,
    task_kind: TaskKind,
    mode: ScoringMode,
  ) -> Result<AdaptedResult> {
    if user_id.trim().is_empty() {
      return Err(AssessError::InvalidInput("user id must not be empty".into()));
    }

    let result = self.orchestrator.score(prompt, essay_text, task_kind).await;
    let difficulty = self.difficulty.assess(essay_text);

    let _guard = self.locks.acquire(user_id).await;
    let prior = load_or_baseline(self.store.as_ref(), user_id).await;
    let adapted = self.adaptive.adapt(&result, &prior, &difficulty, mode);
    let updated = prior.record(&result, Utc::now());
    if let Err(e) = self.store.save(&updated).await {
      warn!(target: "profile", %user_id, error = %e, "Profile save failed; assessment still returned");
    }

    info!(
      target: "assessment",
      %user_id,
      id = %adapted.assessment_id,
      base = result.overall_band,
      adapted = adapted.overall_band,
      method = ?adapted.method,
      "Assessment delivered"
    );
    Ok(adapted)
  }

  /// Synchronous form of `assess` for callers without a runtime.
  /// Inside an async context it returns `AssessError::Runtime`; use `assess` there.
  pub fn assess_blocking(
    &self,
    user_id: &str,
    prompt: &str,
    essay_text: &str,
    task_kind: TaskKind,
    mode: ScoringMode,
  ) -> Result<AdaptedResult> {
    if tokio::runtime::Handle::try_current().is_ok() {
      return Err(AssessError::Runtime("assess_blocking called inside an async runtime".into()));
    }
    let rt = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(|e| AssessError::Runtime(e.to_string()))?;
    rt.block_on(self.assess(user_id, prompt, essay_text, task_kind, mode))
  }

  /// Current stored profile, or the baseline for unknown users.
  pub async fn profile(&self, user_id: &str) -> PerformanceProfile {
    load_or_baseline(self.store.as_ref(), user_id).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::AssessmentMethod;

  fn assessor() -> Assessor {
    Assessor::new(Arc::new(NoopEvaluator), Arc::new(InMemoryProfileStore::new()), &AssessorConfig::default())
  }

  #[tokio::test]
  async fn empty_user_id_is_rejected() {
    let err = assessor()
      .assess("  ", "Discuss technology", "Some text here.", TaskKind::Task2, ScoringMode::Standard)
      .await
      .unwrap_err();
    assert!(matches!(err, AssessError::InvalidInput(_)));
  }

  #[tokio::test]
  async fn gibberish_is_scored_but_not_recorded() {
    let a = assessor();
    let r = a
      .assess("u1", "Discuss technology", "asdf asdf", TaskKind::Task2, ScoringMode::Supportive)
      .await
      .unwrap();
    assert!(r.is_gibberish);
    assert_eq!(r.overall_band, 1.0);
    assert_eq!(r.method, AssessmentMethod::RuleBased);
    let p = a.profile("u1").await;
    assert!(p.history.is_empty());
    assert!(p.last_updated.is_some());
  }

  #[tokio::test]
  async fn blocking_entry_point_refuses_to_nest_runtimes() {
    let err = assessor()
      .assess_blocking("u3", "Discuss technology", "Technology changes how people work every day.", TaskKind::Task2, ScoringMode::Standard)
      .unwrap_err();
    assert!(matches!(err, AssessError::Runtime(_)));
  }

  #[test]
  fn blocking_entry_point_works_without_runtime() {
    let a = assessor();
    let r = a
      .assess_blocking(
        "u2",
        "Discuss the role of technology",
        "Technology changes how people work. However, it also creates new problems for families.",
        TaskKind::Task2,
        ScoringMode::Standard,
      )
      .unwrap();
    assert_eq!(r.scores.len(), 4);
    assert_eq!(r.method, AssessmentMethod::RuleBased);
  }
}
