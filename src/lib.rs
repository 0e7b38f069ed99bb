//! Band scoring for English academic essays.
//!
//! - Feature extraction, error-pattern detection and difficulty assessment
//! - Four rubric criterion evaluators (external evaluator with local fallback)
//! - Gating cascade producing an overall band
//! - Per-user performance profiles and adaptive scoring modes
//!
//! The entry point is [`Assessor::assess`].

pub mod adaptive;
pub mod assessor;
pub mod config;
pub mod criterion;
pub mod difficulty;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod fallback;
pub mod features;
pub mod lexicon;
pub mod orchestrator;
pub mod patterns;
pub mod profile;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod util;

pub use adaptive::AdaptiveScorer;
pub use assessor::Assessor;
pub use config::AssessorConfig;
pub use domain::{
  AdaptedResult, AssessmentMethod, AssessmentResult, Criterion, ScoringMode, TaskKind,
};
pub use error::{AssessError, ProfileError, ProviderError};
pub use evaluator::{Evaluator, EvaluatorReply, NoopEvaluator, OpenAiEvaluator};
pub use orchestrator::ScoringOrchestrator;
pub use profile::{InMemoryProfileStore, PerformanceProfile, ProfileStore};
