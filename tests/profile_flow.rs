mod common;

use std::sync::Arc;

use bandscore::profile::{ProfileStore, Trend};
use bandscore::{AssessError, Assessor, AssessorConfig, InMemoryProfileStore, ScoringMode, TaskKind};

use common::*;

/// Submit one essay per band, each scored uniformly at that band, sharing one store.
async fn submit_series(store: Arc<InMemoryProfileStore>, user: &str, bands: &[f32]) {
  for band in bands {
    let assessor = Assessor::new(Arc::new(FixedEvaluator::new(*band)), store.clone(), &AssessorConfig::default());
    assessor
      .assess(user, TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Standard)
      .await
      .unwrap();
  }
}

#[tokio::test]
async fn rising_scores_produce_improving_trend() {
  let store = Arc::new(InMemoryProfileStore::new());
  submit_series(store.clone(), "rising", &[5.0, 5.0, 5.0, 6.0, 6.5, 7.0]).await;

  let p = store.load("rising").await.unwrap().unwrap();
  assert_eq!(p.trend, Trend::Improving);
  assert_eq!(p.history.len(), 6);
  assert_eq!(p.current_level, 6.5);
  assert!(p.learning_velocity > 0.0);
}

#[tokio::test]
async fn flat_scores_produce_stable_trend() {
  let store = Arc::new(InMemoryProfileStore::new());
  submit_series(store.clone(), "flat", &[7.0, 7.0, 7.0, 7.0, 7.0]).await;

  let p = store.load("flat").await.unwrap().unwrap();
  assert_eq!(p.trend, Trend::Stable);
  assert_eq!(p.consistency_score, 1.0);
}

#[tokio::test]
async fn falling_scores_produce_declining_trend_and_a_recommendation() {
  let store = Arc::new(InMemoryProfileStore::new());
  submit_series(store.clone(), "falling", &[7.5, 7.0, 6.5, 6.0, 5.5]).await;

  let p = store.load("falling").await.unwrap().unwrap();
  assert_eq!(p.trend, Trend::Declining);

  let assessor = Assessor::new(Arc::new(FixedEvaluator::new(5.0)), store.clone(), &AssessorConfig::default());
  let r = assessor
    .assess("falling", TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Adaptive)
    .await
    .unwrap();
  assert!(r.next_recommendations.iter().any(|s| s.contains("slipping")));
  assert!(r.performance_insights.iter().any(|s| s.contains("declining")));
}

#[tokio::test]
async fn corrupt_profile_is_replaced_not_fatal() {
  let store = Arc::new(InMemoryProfileStore::new());
  store.insert_raw("broken", "{\"userId\": 42").await;
  let assessor = Assessor::new(Arc::new(FixedEvaluator::new(6.0)), store.clone(), &AssessorConfig::default());

  let r = assessor
    .assess("broken", TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Standard)
    .await
    .unwrap();
  assert!(r.performance_insights[0].starts_with("First assessed submission"));

  let p = store.load("broken").await.unwrap().unwrap();
  assert_eq!(p.history.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_for_one_user_lose_no_update() {
  let (assessor, store) = assessor_with(Arc::new(FixedEvaluator::new(6.0)));
  let assessor = Arc::new(assessor);

  let mut handles = vec![];
  for i in 0..12 {
    let a = assessor.clone();
    let user = if i % 3 == 0 { "other" } else { "same" };
    handles.push(tokio::spawn(async move {
      a.assess(user, TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Standard).await
    }));
  }
  for h in handles {
    h.await.unwrap().unwrap();
  }

  assert_eq!(store.load("same").await.unwrap().unwrap().history.len(), 8);
  assert_eq!(store.load("other").await.unwrap().unwrap().history.len(), 4);
}

#[tokio::test]
async fn supportive_mode_softens_and_challenging_mode_sharpens_adjustments() {
  let store = Arc::new(InMemoryProfileStore::new());
  let ev = Arc::new(ScriptedEvaluator { scores: [Some(7.0), Some(6.0), Some(6.0), Some(5.0)] });
  let assessor = Assessor::new(ev, store.clone(), &AssessorConfig::default());
  for _ in 0..2 {
    assessor
      .assess("modes", TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Standard)
      .await
      .unwrap();
  }

  let supportive = assessor
    .assess("modes", TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Supportive)
    .await
    .unwrap();
  let challenging = assessor
    .assess("modes", TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Challenging)
    .await
    .unwrap();

  for r in [&supportive, &challenging] {
    for s in &r.scores {
      assert!((1.0..=9.0).contains(&s.adjusted_score));
      assert_eq!((s.adjusted_score * 2.0).fract(), 0.0);
    }
  }
  let gr = |r: &bandscore::AdaptedResult| r.scores[3].adjusted_score - r.scores[3].base_score;
  let ta = |r: &bandscore::AdaptedResult| r.scores[0].adjusted_score - r.scores[0].base_score;
  // Grammar is the recurring weakness, task achievement the recurring strength.
  assert!(ta(&challenging) - gr(&challenging) >= ta(&supportive) - gr(&supportive));
  assert_ne!(supportive.tone, challenging.tone);
}

#[tokio::test]
async fn blank_user_id_is_the_only_caller_visible_error() {
  let (assessor, store) = assessor_with(Arc::new(FixedEvaluator::new(6.0)));
  let err = assessor
    .assess("", TECH_PROMPT, ON_TOPIC_ESSAY, TaskKind::Task2, ScoringMode::Standard)
    .await
    .unwrap_err();
  assert!(matches!(err, AssessError::InvalidInput(_)));
  assert!(store.is_empty().await);
}
