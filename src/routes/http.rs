//! HTTP endpoint handlers. These are thin wrappers that forward to the assessor.
//! Each handler is instrumented; essay text is never logged.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{info, instrument, warn};

use crate::error::AssessError;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id, task_kind = %body.task_kind, mode = ?body.mode, essay_len = body.essay_text.len()))]
pub async fn http_post_assess(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AssessIn>,
) -> Response {
  match state
    .assessor
    .assess(&body.user_id, &body.prompt, &body.essay_text, body.task_kind, body.mode)
    .await
  {
    Ok(result) => {
      info!(target: "assessment", id = %result.assessment_id, band = result.overall_band, "HTTP assessment served");
      Json(result).into_response()
    }
    Err(e) => {
      let status = match e {
        AssessError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AssessError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
      };
      warn!(target: "assessment", error = %e, "HTTP assessment rejected");
      (status, Json(ErrorOut { error: e.to_string() })).into_response()
    }
  }
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_profile(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProfileQuery>,
) -> impl IntoResponse {
  let profile = state.assessor.profile(&q.user_id).await;
  Json(profile)
}
