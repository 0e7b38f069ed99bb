//! Public HTTP protocol structs (serde ready).
//! Keep this small and stable so clients and the scorer can evolve independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ScoringMode, TaskKind};

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessIn {
    pub user_id: String,
    pub prompt: String,
    pub essay_text: String,
    pub task_kind: TaskKind,
    #[serde(default)]
    pub mode: ScoringMode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
