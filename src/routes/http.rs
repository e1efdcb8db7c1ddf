//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::domain::Activity;
use crate::logic::*;
use crate::placement::CourseMeta;
use crate::protocol::*;
use crate::state::AppState;
use crate::taxonomy;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info")]
pub async fn http_get_taxonomy() -> impl IntoResponse { Json(taxonomy::registry()) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_course(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(get_course(&state).await)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_patch_course(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CourseMeta>,
) -> impl IntoResponse {
  Json(update_course(&state, body).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_week(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let snap = add_week(&state).await;
  info!(target: "planner", num_weeks = snap.course.num_weeks, "HTTP week added");
  Json(snap)
}

#[instrument(level = "info", skip(state), fields(confirm = body.confirm))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ConfirmIn>,
) -> impl IntoResponse {
  Json(reset_matrix(&state, body.confirm).await)
}

#[instrument(level = "info", skip(state), fields(confirm = body.confirm))]
pub async fn http_post_new_course(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ConfirmIn>,
) -> impl IntoResponse {
  Json(new_course(&state, body.confirm).await)
}

#[instrument(level = "info", skip(state, body), fields(learning_type = %body.learning_type, week = body.week, mode = ?body.mode))]
pub async fn http_post_activity(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AddIn>,
) -> impl IntoResponse {
  let snap = add_activity(&state, &body.learning_type, body.week, body.mode).await;
  info!(target: "planner", version = snap.version, activities = snap.course.activities.len(), "HTTP add_activity");
  Json(snap)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_drop(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DropIn>,
) -> impl IntoResponse {
  Json(drop_item(&state, body).await)
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_put_activity(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<Activity>,
) -> impl IntoResponse {
  Json(update_activity(&state, Some(&id), body).await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_activity(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  Json(delete_activity(&state, &id).await)
}

#[instrument(level = "info", skip(state, body), fields(%id, week = body.week, mode = ?body.mode))]
pub async fn http_post_move(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<MoveIn>,
) -> impl IntoResponse {
  Json(move_activity(&state, &id, body.target_id.as_deref(), body.week, body.mode).await)
}

#[instrument(level = "info", skip(state, body), fields(%id, direction = ?body.direction))]
pub async fn http_post_reorder(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ReorderIn>,
) -> impl IntoResponse {
  Json(reorder_activity(&state, &id, body.direction).await)
}

#[instrument(level = "info", skip(state, body), fields(%id, level = ?body.level))]
pub async fn http_post_bloom(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<BloomIn>,
) -> impl IntoResponse {
  Json(select_bloom_level(&state, &id, body.level).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_analytics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(get_analytics(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(get_report(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(topic_len = body.topic.len(), weeks = ?body.weeks))]
pub async fn http_post_scenario(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ScenarioIn>,
) -> impl IntoResponse {
  let out = generate_scenario(&state, body).await;
  info!(target: "scenario", added = out.added, received = out.received, "HTTP scenario served");
  Json(out)
}
