//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Every mutation is one `CourseStore::apply` with a placement function, so
//! each command produces at most one new course version. Unresolvable ids and
//! unknown labels come back as the unchanged course.

use tracing::{info, warn, instrument};

use crate::analytics::{self, Analytics, CourseReport};
use crate::domain::{Activity, BloomLevel, LearningType, Modality};
use crate::placement::{self, CourseMeta, Direction, DropPayload};
use crate::protocol::{DropIn, ScenarioIn, ScenarioOut};
use crate::scenario::{self, ScenarioError};
use crate::state::AppState;
use crate::store::CourseSnapshot;
use crate::util::trunc_for_log;

/// Longest scenario we ask the generator for.
pub const MAX_SCENARIO_WEEKS: u32 = 52;

pub async fn get_course(state: &AppState) -> CourseSnapshot {
  state.store.snapshot().await
}

pub async fn get_analytics(state: &AppState) -> Analytics {
  let snap = state.store.snapshot().await;
  analytics::analytics(&snap.course.activities)
}

pub async fn get_report(state: &AppState) -> CourseReport {
  let snap = state.store.snapshot().await;
  analytics::report(&snap.course)
}

#[instrument(level = "info", skip(state))]
pub async fn add_activity(state: &AppState, learning_type: &str, week: u32, mode: Modality) -> CourseSnapshot {
  let Some(kind) = LearningType::from_label(learning_type) else {
    warn!(target: "planner", %learning_type, "add with unknown learning type ignored");
    return state.store.snapshot().await;
  };
  let defaults = &state.defaults;
  let (snap, _) = state.store.apply("add", |c| placement::add(c, defaults, kind, week, mode)).await;
  snap
}

/// Drop-target resolution. A card target wins over cell coordinates; on a
/// cell, a palette type adds and an activity id moves.
#[instrument(level = "info", skip(state))]
pub async fn drop_item(state: &AppState, drop: DropIn) -> CourseSnapshot {
  if let (Some(dragged), Some(target)) = (drop.activity_id.as_deref(), drop.target_id.as_deref()) {
    let (snap, _) = state.store.apply("drop_on_card", |c| placement::drop_on_card(c, dragged, target)).await;
    return snap;
  }

  let payload = match (drop.learning_type.as_deref(), drop.activity_id) {
    (Some(t), _) if !t.is_empty() => LearningType::from_label(t).map(DropPayload::LearningType),
    (_, Some(id)) if !id.is_empty() => Some(DropPayload::ActivityId(id)),
    _ => None,
  };
  let (Some(payload), Some(week), Some(mode)) = (payload, drop.week, drop.mode) else {
    warn!(target: "planner", "drop without a usable payload or cell ignored");
    return state.store.snapshot().await;
  };

  let defaults = &state.defaults;
  let (snap, _) = state
    .store
    .apply("drop_on_cell", |c| placement::drop_on_cell(c, defaults, &payload, week, mode))
    .await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn move_activity(state: &AppState, id: &str, target_id: Option<&str>, week: u32, mode: Modality) -> CourseSnapshot {
  let (snap, _) = state
    .store
    .apply("move", |c| placement::move_activity(c, id, target_id, week, mode))
    .await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn reorder_activity(state: &AppState, id: &str, direction: Direction) -> CourseSnapshot {
  let (snap, _) = state.store.apply("reorder", |c| placement::reorder(c, id, direction)).await;
  snap
}

/// `path_id` is the id the client addressed; a body carrying another id is ignored.
#[instrument(level = "info", skip(state, activity), fields(id = %activity.id))]
pub async fn update_activity(state: &AppState, path_id: Option<&str>, activity: Activity) -> CourseSnapshot {
  if path_id.is_some_and(|p| p != activity.id) {
    warn!(target: "planner", path_id = ?path_id, body_id = %activity.id, "update with mismatched id ignored");
    return state.store.snapshot().await;
  }
  let (snap, _) = state.store.apply("update", |c| placement::update(c, activity)).await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn delete_activity(state: &AppState, id: &str) -> CourseSnapshot {
  let (snap, _) = state.store.apply("delete", |c| placement::delete(c, id)).await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn select_bloom_level(state: &AppState, id: &str, level: BloomLevel) -> CourseSnapshot {
  let (snap, _) = state.store.apply("select_bloom_level", |c| placement::select_bloom_level(c, id, level)).await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn update_course(state: &AppState, meta: CourseMeta) -> CourseSnapshot {
  let (snap, _) = state.store.apply("update_course", |c| placement::update_meta(c, meta)).await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn add_week(state: &AppState) -> CourseSnapshot {
  let (snap, _) = state.store.apply("add_week", placement::add_week).await;
  snap
}

#[instrument(level = "info", skip(state))]
pub async fn reset_matrix(state: &AppState, confirm: bool) -> CourseSnapshot {
  let (snap, changed) = state.store.apply("reset", |c| placement::reset(c, confirm)).await;
  if changed {
    info!(target: "planner", version = snap.version, "matrix cleared");
  }
  snap
}

/// Replace the whole course with a fresh default one.
#[instrument(level = "info", skip(state))]
pub async fn new_course(state: &AppState, confirm: bool) -> CourseSnapshot {
  let defaults = &state.defaults;
  let (snap, _) = state
    .store
    .apply("new_course", |c| if confirm { defaults.fresh_course() } else { c.clone() })
    .await;
  snap
}

/// Ask the generator for a scenario and merge the valid part as one batch.
/// Failures of any kind add nothing; the reply says why.
#[instrument(level = "info", skip(state, req), fields(topic_len = req.topic.len(), weeks = ?req.weeks))]
pub async fn generate_scenario(state: &AppState, req: ScenarioIn) -> ScenarioOut {
  let current = state.store.snapshot().await;
  let weeks = req.weeks.unwrap_or(current.course.num_weeks).clamp(1, MAX_SCENARIO_WEEKS);

  let validated = match &state.openai {
    None => Err(ScenarioError::Disabled),
    Some(oa) => match oa.generate_scenario(&state.prompts, &req.topic, &req.audience, weeks).await {
      Ok(text) => {
        let v = scenario::validate_reply(&text, weeks, &current.course, &state.defaults);
        if let Err(e) = &v {
          warn!(target: "scenario", error = %e, reply = %trunc_for_log(&text, 200), "generator reply discarded");
        }
        v
      }
      Err(e) => Err(ScenarioError::from(e)),
    },
  };

  let batch = match validated {
    Ok(b) => b,
    Err(e) => {
      warn!(target: "scenario", error = %e, "no activities added");
      return ScenarioOut {
        received: 0,
        added: 0,
        rejected: Vec::new(),
        reason: Some(e.to_string()),
        version: current.version,
        course: current.course,
      };
    }
  };

  let mut added = 0;
  let (snap, _) = state
    .store
    .apply("generate_scenario", |c| {
      let mut next = placement::append_all(c, batch.activities);
      added = next.activities.len() - c.activities.len();
      if added == 0 {
        return c.clone();
      }
      // Generating N weeks is an explicit request for N columns.
      next.num_weeks = next.num_weeks.max(weeks);
      next
    })
    .await;
  info!(target: "scenario", received = batch.received, added, rejected = batch.rejected.len(), version = snap.version, "scenario merged");

  ScenarioOut {
    received: batch.received,
    added,
    reason: (added == 0).then(|| "generator returned no usable activities".to_string()),
    rejected: batch.rejected,
    version: snap.version,
    course: snap.course,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::{routing::post, Json, Router};
  use serde_json::json;
  use tokio::sync::OnceCell;

  use crate::config::PlannerConfig;
  use crate::openai::OpenAI;

  fn state() -> AppState {
    AppState::from_config(PlannerConfig::default(), None)
  }

  /// Course state and an activity id deleted while the generator is answering.
  type Interloper = Arc<OnceCell<(Arc<AppState>, String)>>;

  /// Local chat-completions endpoint that always answers with `reply` as the
  /// message content.
  async fn spawn_generator(reply: String, interloper: Interloper) -> OpenAI {
    let app = Router::new().route(
      "/chat/completions",
      post(move || {
        let reply = reply.clone();
        let interloper = interloper.clone();
        async move {
          if let Some((s, id)) = interloper.get() {
            delete_activity(s, id).await;
          }
          Json(json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] }))
        }
      }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    OpenAI::new("test-key".into(), format!("http://{addr}"), "test-model".into()).unwrap()
  }

  async fn state_with_generator(reply: serde_json::Value) -> AppState {
    let oa = spawn_generator(reply.to_string(), Arc::new(OnceCell::new())).await;
    AppState::from_config(PlannerConfig::default(), Some(oa))
  }

  fn request(weeks: u32) -> ScenarioIn {
    ScenarioIn { topic: "SQL".into(), audience: "adults".into(), weeks: Some(weeks) }
  }

  #[tokio::test]
  async fn add_then_drop_card_on_cell_moves_it() {
    let s = state();
    let snap = add_activity(&s, "Acquisition", 1, Modality::F2F).await;
    let id = snap.course.activities[0].id.clone();

    let drop = DropIn { activity_id: Some(id.clone()), week: Some(3), mode: Some(Modality::Async), ..Default::default() };
    let snap = drop_item(&s, drop).await;
    assert_eq!(snap.version, 2);
    let a = snap.course.find(&id).unwrap();
    assert_eq!((a.week, a.mode), (3, Modality::Async));
  }

  #[tokio::test]
  async fn palette_drop_prefers_learning_type() {
    let s = state();
    let drop = DropIn {
      learning_type: Some("Production".into()),
      activity_id: Some("ignored".into()),
      week: Some(2),
      mode: Some(Modality::Sync),
      ..Default::default()
    };
    let snap = drop_item(&s, drop).await;
    assert_eq!(snap.course.activities.len(), 1);
    assert_eq!(snap.course.activities[0].kind, LearningType::Production);
  }

  #[tokio::test]
  async fn unusable_commands_leave_version_untouched() {
    let s = state();
    assert_eq!(add_activity(&s, "Lecture", 1, Modality::F2F).await.version, 0);
    assert_eq!(drop_item(&s, DropIn::default()).await.version, 0);
    assert_eq!(delete_activity(&s, "nope").await.version, 0);
    assert_eq!(reset_matrix(&s, true).await.version, 0);
  }

  #[tokio::test]
  async fn update_with_mismatched_path_id_is_ignored() {
    let s = state();
    let snap = add_activity(&s, "Discussion", 1, Modality::Sync).await;
    let mut a = snap.course.activities[0].clone();
    a.title = "Débat".into();

    let same = update_activity(&s, Some("other"), a.clone()).await;
    assert_eq!(same.version, snap.version);
    let changed = update_activity(&s, Some(&a.id.clone()), a).await;
    assert_eq!(changed.course.activities[0].title, "Débat");
  }

  #[tokio::test]
  async fn reset_and_new_course_need_confirmation() {
    let s = state();
    add_activity(&s, "Acquisition", 1, Modality::F2F).await;
    update_course(&s, CourseMeta { title: Some("Git".into()), ..Default::default() }).await;
    add_week(&s).await;

    let declined = reset_matrix(&s, false).await;
    assert_eq!(declined.course.activities.len(), 1);

    let cleared = reset_matrix(&s, true).await;
    assert!(cleared.course.activities.is_empty());
    assert_eq!(cleared.course.title, "Git");
    assert_eq!(cleared.course.num_weeks, 5);

    assert_eq!(new_course(&s, false).await.course.title, "Git");
    let fresh = new_course(&s, true).await;
    assert_eq!(fresh.course.title, s.defaults.title);
    assert_eq!(fresh.course.num_weeks, 4);
  }

  #[tokio::test]
  async fn scenario_without_generator_adds_nothing() {
    let s = state();
    let out = generate_scenario(&s, ScenarioIn { topic: "SQL".into(), audience: "adults".into(), weeks: Some(3) }).await;
    assert_eq!(out.added, 0);
    assert_eq!(out.version, 0);
    assert!(out.reason.is_some());
    assert!(out.course.activities.is_empty());
  }

  #[tokio::test]
  async fn update_into_week_zero_keeps_report_consistent() {
    let s = state();
    let snap = add_activity(&s, "Acquisition", 1, Modality::F2F).await;
    let mut a = snap.course.activities[0].clone();
    a.week = 0;

    let after = update_activity(&s, None, a).await;
    assert_eq!(after.version, snap.version);
    assert_eq!(after.course.activities[0].week, 1);

    let report = get_report(&s).await;
    let listed: u64 = report.weeks.iter().map(|w| w.total_duration).sum();
    assert_eq!(listed, report.total_duration);
    assert!(report.out_of_range.is_empty());
  }

  #[tokio::test]
  async fn generated_scenario_merges_as_one_version() {
    let s = state_with_generator(json!({ "activities": [
      { "type": "Acquisition", "icapLevel": "Passif", "mode": "F2F", "week": 1, "duration": 45, "title": "Cours magistral" },
      { "type": "Discussion", "icapLevel": "Interactif", "mode": "Sync", "week": 6, "title": "Débat" },
      { "type": "Lecture", "mode": "F2F", "week": 2 }
    ]}))
    .await;

    let out = generate_scenario(&s, request(6)).await;
    assert_eq!((out.received, out.added), (3, 2));
    assert_eq!(out.rejected.len(), 1);
    assert_eq!(out.rejected[0].index, 2);
    assert_eq!(out.reason, None);
    assert_eq!(out.version, 1);
    assert_eq!(out.course.num_weeks, 6);

    let titles: Vec<&str> = out.course.activities.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Cours magistral", "Débat"]);
    assert_eq!(out.course.activities[0].duration, 45);
    assert_eq!(out.course.activities[1].duration, 30);
    assert_eq!(get_course(&s).await.version, 1);
  }

  #[tokio::test]
  async fn malformed_generator_reply_leaves_course_unchanged() {
    let oa = spawn_generator("désolé, je ne peux pas".into(), Arc::new(OnceCell::new())).await;
    let s = AppState::from_config(PlannerConfig::default(), Some(oa));
    add_activity(&s, "Production", 2, Modality::Async).await;
    let before = get_course(&s).await;

    let out = generate_scenario(&s, request(10)).await;
    assert_eq!(out.added, 0);
    assert!(out.reason.is_some());
    assert_eq!(out.version, before.version);
    assert_eq!(out.course, before.course);
    assert_eq!(get_course(&s).await.course.num_weeks, 4);
  }

  #[tokio::test]
  async fn fully_rejected_reply_does_not_grow_weeks() {
    let s = state_with_generator(json!({ "activities": [
      { "type": "Lecture", "mode": "F2F", "week": 1 },
      { "type": "Production", "mode": "Hybride", "week": 2 }
    ]}))
    .await;
    let mut updates = s.store.subscribe();

    let out = generate_scenario(&s, request(10)).await;
    assert_eq!((out.received, out.added, out.rejected.len()), (2, 0, 2));
    assert!(out.reason.is_some());
    assert_eq!(out.version, 0);
    assert_eq!(out.course.num_weeks, 4);
    assert!(updates.try_recv().is_err());
  }

  #[tokio::test]
  async fn added_count_ignores_concurrent_deletes() {
    let interloper: Interloper = Arc::new(OnceCell::new());
    let reply = json!([{ "type": "Collaboration", "mode": "Async", "week": 1, "title": "Wiki" }]);
    let oa = spawn_generator(reply.to_string(), interloper.clone()).await;
    let s = Arc::new(AppState::from_config(PlannerConfig::default(), Some(oa)));

    let existing = add_activity(&s, "Acquisition", 1, Modality::F2F).await.course.activities[0].id.clone();
    interloper.set((s.clone(), existing.clone())).ok().unwrap();

    let out = generate_scenario(&s, request(2)).await;
    assert_eq!(out.added, 1);
    assert_eq!(out.reason, None);
    assert!(out.course.find(&existing).is_none());
    assert_eq!(out.course.activities.len(), 1);
    assert_eq!(out.course.activities[0].title, "Wiki");
  }

  #[tokio::test]
  async fn analytics_follow_the_store() {
    let s = state();
    let snap = add_activity(&s, "Entraînement", 2, Modality::Sync).await;
    let mut a = snap.course.activities[0].clone();
    a.duration = 45;
    update_activity(&s, None, a).await;

    let an = get_analytics(&s).await;
    assert_eq!(an.total_duration, 45);
    assert_eq!(an.modality[1].value, 1);
    assert_eq!(get_report(&s).await.weeks.len(), 1);
  }
}
