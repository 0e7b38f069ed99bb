//! Per-user performance profile, its analysis, and the storage boundary.
//!
//! A profile is a value: `record` returns a new profile and never touches the
//! old one. Every derived field (trend, velocity, consistency, strength and
//! weakness areas) is recomputed from the full history on each update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::domain::{AssessmentResult, Criterion};
use crate::error::ProfileError;
use crate::util::{mean, quantize_band, std_dev, BAND_MAX};

/// Most recent snapshots kept per user.
pub const MAX_HISTORY: usize = 50;
const TREND_MIN_POINTS: usize = 3;
const TREND_DELTA: f32 = 0.2;
const VOLATILE_STD_DEV: f32 = 1.0;
const AREA_MARGIN: f32 = 0.3;
const BASELINE_LEVEL: f32 = 5.0;
const DEFAULT_TARGET: f32 = 7.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
  Improving,
  Stable,
  Declining,
  Volatile,
}

/// One scored submission as remembered by the profile.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
  pub overall_band: f32,
  pub criterion_scores: [f32; 4],
  pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfile {
  pub user_id: String,
  pub current_level: f32,
  pub target_level: f32,
  pub trend: Trend,
  pub strength_areas: Vec<Criterion>,
  pub weakness_areas: Vec<Criterion>,
  pub learning_velocity: f32,
  pub consistency_score: f32,
  pub last_updated: Option<DateTime<Utc>>,
  #[serde(default)]
  pub history: Vec<ProfileSnapshot>,
}

impl PerformanceProfile {
  /// Zero-valued profile used for new users and in place of corrupt records.
  pub fn baseline(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      current_level: BASELINE_LEVEL,
      target_level: DEFAULT_TARGET,
      trend: Trend::Stable,
      strength_areas: vec![],
      weakness_areas: vec![],
      learning_velocity: 0.0,
      consistency_score: 0.0,
      last_updated: None,
      history: vec![],
    }
  }

  pub fn with_target(self, target_level: f32) -> Self {
    Self { target_level: quantize_band(target_level), ..self }
  }

  /// New profile including `result`. Unscorable submissions only bump `last_updated`.
  pub fn record(&self, result: &AssessmentResult, at: DateTime<Utc>) -> Self {
    let mut history = self.history.clone();
    if !result.is_gibberish {
      history.push(ProfileSnapshot {
        overall_band: result.overall_band,
        criterion_scores: result.score_array(),
        recorded_at: at,
      });
      if history.len() > MAX_HISTORY {
        let excess = history.len() - MAX_HISTORY;
        history.drain(..excess);
      }
    }
    Self::from_history(&self.user_id, self.target_level, history, Some(at))
  }

  /// Recompute every derived field from `history`.
  pub fn from_history(user_id: &str, target_level: f32, history: Vec<ProfileSnapshot>, last_updated: Option<DateTime<Utc>>) -> Self {
    if history.is_empty() {
      return Self { last_updated, ..Self::baseline(user_id).with_target(target_level) };
    }
    let bands: Vec<f32> = history.iter().map(|s| s.overall_band).collect();
    let recent = &bands[bands.len().saturating_sub(3)..];
    let (strength_areas, weakness_areas) = criterion_areas(&history);
    Self {
      user_id: user_id.to_string(),
      current_level: quantize_band(mean(recent)),
      target_level,
      trend: trend(&bands),
      strength_areas,
      weakness_areas,
      learning_velocity: learning_velocity(&bands),
      consistency_score: consistency(&bands),
      last_updated,
      history,
    }
  }

  /// Blend of consistency and progress in [0, 1]; neutral (0.5) until there is enough history.
  pub fn profile_factor(&self) -> f32 {
    if self.history.len() < TREND_MIN_POINTS {
      return 0.5;
    }
    let velocity = (0.5 + self.learning_velocity).clamp(0.0, 1.0);
    ((self.consistency_score + velocity) / 2.0).clamp(0.0, 1.0)
  }

  pub fn is_strength(&self, c: Criterion) -> bool {
    self.strength_areas.contains(&c)
  }

  pub fn is_weakness(&self, c: Criterion) -> bool {
    self.weakness_areas.contains(&c)
  }

  fn validate(&self, expected_user: &str) -> Result<(), String> {
    if self.user_id != expected_user {
      return Err(format!("record belongs to '{}'", self.user_id));
    }
    let in_range = |v: f32| v.is_finite() && (0.0..=BAND_MAX).contains(&v);
    if !in_range(self.current_level) || !in_range(self.target_level) {
      return Err("level outside band range".into());
    }
    if self.history.iter().any(|s| !in_range(s.overall_band)) {
      return Err("history contains out-of-range band".into());
    }
    Ok(())
  }
}

/// Split history into halves and compare their means.
pub fn trend(bands: &[f32]) -> Trend {
  if bands.len() < TREND_MIN_POINTS {
    return Trend::Stable;
  }
  let (first, second) = bands.split_at(bands.len() / 2);
  let diff = mean(second) - mean(first);
  if diff > TREND_DELTA {
    Trend::Improving
  } else if diff < -TREND_DELTA {
    Trend::Declining
  } else if std_dev(bands) >= VOLATILE_STD_DEV {
    Trend::Volatile
  } else {
    Trend::Stable
  }
}

/// Mean of consecutive score deltas.
pub fn learning_velocity(bands: &[f32]) -> f32 {
  if bands.len() < 2 {
    return 0.0;
  }
  let deltas: Vec<f32> = bands.windows(2).map(|w| w[1] - w[0]).collect();
  mean(&deltas)
}

pub fn consistency(bands: &[f32]) -> f32 {
  (1.0 - std_dev(bands) / 2.0).max(0.0)
}

/// Criteria whose historical average sits more than `AREA_MARGIN` above/below the grand mean.
fn criterion_areas(history: &[ProfileSnapshot]) -> (Vec<Criterion>, Vec<Criterion>) {
  let averages: Vec<f32> = Criterion::ALL
    .iter()
    .map(|c| {
      let values: Vec<f32> = history.iter().map(|s| s.criterion_scores[c.index()]).collect();
      mean(&values)
    })
    .collect();
  let grand = mean(&averages);
  let mut strengths = vec![];
  let mut weaknesses = vec![];
  for c in Criterion::ALL {
    let avg = averages[c.index()];
    if avg > grand + AREA_MARGIN {
      strengths.push(c);
    } else if avg < grand - AREA_MARGIN {
      weaknesses.push(c);
    }
  }
  (strengths, weaknesses)
}

/// Storage boundary. The core loads a profile before scoring and saves the
/// replacement afterwards; it never owns the database.
#[async_trait]
pub trait ProfileStore: Send + Sync {
  async fn load(&self, user_id: &str) -> Result<Option<PerformanceProfile>, ProfileError>;
  async fn save(&self, profile: &PerformanceProfile) -> Result<(), ProfileError>;
}

/// Load a profile, substituting the baseline for missing or corrupt records.
#[instrument(level = "debug", skip(store))]
pub async fn load_or_baseline(store: &dyn ProfileStore, user_id: &str) -> PerformanceProfile {
  match store.load(user_id).await {
    Ok(Some(p)) => match p.validate(user_id) {
      Ok(()) => p,
      Err(reason) => {
        warn!(target: "profile", %user_id, %reason, "Profile failed validation; using baseline");
        PerformanceProfile::baseline(user_id)
      }
    },
    Ok(None) => {
      debug!(target: "profile", %user_id, "No stored profile; using baseline");
      PerformanceProfile::baseline(user_id)
    }
    Err(e) => {
      warn!(target: "profile", %user_id, error = %e, "Profile load failed; using baseline");
      PerformanceProfile::baseline(user_id)
    }
  }
}

/// Profiles held as serialized JSON, the way an external store would hand them over.
#[derive(Default)]
pub struct InMemoryProfileStore {
  records: RwLock<HashMap<String, String>>,
}

impl InMemoryProfileStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store an arbitrary raw record (used to simulate foreign or damaged data).
  pub async fn insert_raw(&self, user_id: &str, raw: &str) {
    self.records.write().await.insert(user_id.to_string(), raw.to_string());
  }

  pub async fn len(&self) -> usize {
    self.records.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.records.read().await.is_empty()
  }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
  async fn load(&self, user_id: &str) -> Result<Option<PerformanceProfile>, ProfileError> {
    let raw = { self.records.read().await.get(user_id).cloned() };
    match raw {
      None => Ok(None),
      Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| ProfileError::Corrupt {
        user_id: user_id.to_string(),
        reason: e.to_string(),
      }),
    }
  }

  async fn save(&self, profile: &PerformanceProfile) -> Result<(), ProfileError> {
    let raw = serde_json::to_string(profile).map_err(|e| ProfileError::Unavailable(e.to_string()))?;
    self.records.write().await.insert(profile.user_id.clone(), raw);
    info!(target: "profile", user_id = %profile.user_id, history = profile.history.len(), "Profile replaced");
    Ok(())
  }
}

/// One async mutex per user: read-modify-replace for a user is serialized,
/// different users never wait on each other. An entry lives only while some
/// caller holds or waits on it.
#[derive(Default)]
pub struct UserLocks {
  locks: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn acquire(&self, user_id: &str) -> UserLockGuard {
    let lock = {
      let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
      map.entry(user_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    };
    UserLockGuard {
      guard: Some(lock.lock_owned().await),
      user_id: user_id.to_string(),
      locks: self.locks.clone(),
    }
  }

  /// Users with a live lock entry.
  pub fn len(&self) -> usize {
    self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Held for the duration of one user's read-modify-replace; prunes the entry on drop
/// when no other caller references it.
pub struct UserLockGuard {
  guard: Option<OwnedMutexGuard<()>>,
  user_id: String,
  locks: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Drop for UserLockGuard {
  fn drop(&mut self) {
    self.guard.take();
    let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    if map.get(&self.user_id).is_some_and(|l| Arc::strong_count(l) == 1) {
      map.remove(&self.user_id);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snap(overall: f32, scores: [f32; 4]) -> ProfileSnapshot {
    ProfileSnapshot { overall_band: overall, criterion_scores: scores, recorded_at: Utc::now() }
  }

  #[test]
  fn trend_scenarios() {
    assert_eq!(trend(&[5.0, 5.2, 5.1, 6.0, 6.5, 6.8]), Trend::Improving);
    assert_eq!(trend(&[7.0, 6.8, 7.0, 7.1, 6.9]), Trend::Stable);
    assert_eq!(trend(&[7.0, 6.5, 6.0, 5.5]), Trend::Declining);
    assert_eq!(trend(&[6.0, 7.0]), Trend::Stable);
    assert_eq!(trend(&[3.0, 8.0, 3.0, 8.0]), Trend::Volatile);
  }

  #[test]
  fn velocity_and_consistency() {
    assert!((learning_velocity(&[5.0, 5.5, 6.5]) - 0.75).abs() < 1e-6);
    assert_eq!(learning_velocity(&[5.0]), 0.0);
    assert_eq!(consistency(&[6.0, 6.0, 6.0]), 1.0);
    assert_eq!(consistency(&[1.0, 9.0]), 0.0);
  }

  #[test]
  fn strengths_and_weaknesses_relative_to_grand_mean() {
    let history = vec![snap(6.0, [7.0, 6.0, 6.0, 5.0]), snap(6.0, [7.0, 6.0, 6.0, 5.0])];
    let p = PerformanceProfile::from_history("u", 7.0, history, None);
    assert_eq!(p.strength_areas, vec![Criterion::TaskAchievement]);
    assert_eq!(p.weakness_areas, vec![Criterion::GrammaticalRange]);
  }

  #[test]
  fn baseline_is_zero_valued() {
    let p = PerformanceProfile::baseline("u1");
    assert_eq!(p.current_level, 5.0);
    assert_eq!(p.trend, Trend::Stable);
    assert!(p.strength_areas.is_empty() && p.weakness_areas.is_empty());
    assert_eq!(p.profile_factor(), 0.5);
  }

  #[test]
  fn history_is_bounded() {
    let history: Vec<_> = (0..MAX_HISTORY + 5).map(|_| snap(6.0, [6.0; 4])).collect();
    let p = PerformanceProfile::from_history("u", 7.0, history, None);
    let result = crate::orchestrator::unscorable_result();
    let p2 = p.record(&AssessmentResult { is_gibberish: false, ..result }, Utc::now());
    assert_eq!(p2.history.len(), MAX_HISTORY);
  }

  #[test]
  fn gibberish_is_not_added_to_history() {
    let p = PerformanceProfile::baseline("u");
    let p2 = p.record(&crate::orchestrator::unscorable_result(), Utc::now());
    assert!(p2.history.is_empty());
    assert!(p2.last_updated.is_some());
    assert!(p.last_updated.is_none());
  }

  #[tokio::test]
  async fn corrupt_and_foreign_records_fall_back_to_baseline() {
    let store = InMemoryProfileStore::new();
    store.insert_raw("u1", "{not json").await;
    let p = load_or_baseline(&store, "u1").await;
    assert_eq!(p, PerformanceProfile::baseline("u1"));

    let other = PerformanceProfile::baseline("someone-else");
    store.insert_raw("u2", &serde_json::to_string(&other).unwrap()).await;
    assert_eq!(load_or_baseline(&store, "u2").await.user_id, "u2");
  }

  #[tokio::test]
  async fn save_then_load_returns_same_profile() {
    let store = InMemoryProfileStore::new();
    let p = PerformanceProfile::from_history("u", 7.5, vec![snap(6.5, [7.0, 6.5, 6.0, 6.5])], Some(Utc::now()));
    store.save(&p).await.unwrap();
    assert_eq!(load_or_baseline(&store, "u").await, p);
    assert_eq!(store.len().await, 1);
  }

  #[tokio::test]
  async fn user_locks_serialize_same_user_only() {
    let locks = UserLocks::new();
    let held = locks.acquire("a").await;
    // A different user is not blocked.
    let _b = locks.acquire("b").await;
    let pending = tokio::time::timeout(std::time::Duration::from_millis(20), locks.acquire("a")).await;
    assert!(pending.is_err());
    drop(held);
    assert!(tokio::time::timeout(std::time::Duration::from_millis(20), locks.acquire("a")).await.is_ok());
  }

  #[tokio::test]
  async fn released_user_locks_are_pruned() {
    let locks = UserLocks::new();
    for i in 0..1000 {
      let guard = locks.acquire(&format!("user-{i}")).await;
      assert_eq!(locks.len(), 1);
      drop(guard);
    }
    assert!(locks.is_empty());
  }

  #[tokio::test]
  async fn lock_entry_survives_while_another_caller_waits() {
    let locks = Arc::new(UserLocks::new());
    let held = locks.acquire("a").await;
    let waiter = {
      let locks = locks.clone();
      tokio::spawn(async move {
        let _g = locks.acquire("a").await;
      })
    };
    tokio::task::yield_now().await;
    // The waiter's clone keeps the entry alive across the release.
    drop(held);
    assert_eq!(locks.len(), 1);
    waiter.await.unwrap();
    assert!(locks.is_empty());
  }
}
