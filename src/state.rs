//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use crate::assessor::Assessor;

#[derive(Clone)]
pub struct AppState {
    pub assessor: Arc<Assessor>,
}

impl AppState {
    pub fn new(assessor: Assessor) -> Self {
        Self { assessor: Arc::new(assessor) }
    }

    /// Build state from env: TOML config, optional OpenAI evaluator, in-memory profiles.
    pub fn from_env() -> Self {
        Self::new(Assessor::from_env())
    }
}
