//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request, and
//! push course snapshots produced by other clients' changes.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, error, instrument, debug};

use crate::logic::*;
use crate::placement::CourseMeta;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::taxonomy;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "abc_planner_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "abc_planner_backend", "WebSocket connected");
  let mut updates = state.store.subscribe();
  // Highest course version this client has already been sent.
  let mut seen_version = 0u64;

  loop {
    let reply_msg = tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(incoming) => {
              debug!(target: "abc_planner_backend", "WS received: {:?}", &incoming);
              handle_client_ws(incoming, &state).await
            }
            Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
          },
          Message::Ping(payload) => {
            let _ = socket.send(Message::Pong(payload)).await;
            continue;
          }
          Message::Close(_) => break,
          _ => continue,
        }
      }
      pushed = updates.recv() => match pushed {
        Ok(snap) if snap.version > seen_version => ServerWsMessage::from(snap),
        Ok(_) => continue,
        Err(RecvError::Lagged(skipped)) => {
          warn!(target: "abc_planner_backend", skipped, "WS subscriber lagged; sending current course");
          ServerWsMessage::from(get_course(&state).await)
        }
        Err(RecvError::Closed) => break,
      },
    };

    match &reply_msg {
      ServerWsMessage::Course { version, .. } => seen_version = seen_version.max(*version),
      ServerWsMessage::Scenario { outcome } => seen_version = seen_version.max(outcome.version),
      _ => {}
    }

    let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });

    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "abc_planner_backend", error = %e, "WS send error");
      break;
    }
  }
  info!(target: "abc_planner_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::GetCourse => get_course(state).await.into(),

    ClientWsMessage::GetAnalytics => ServerWsMessage::Analytics { analytics: get_analytics(state).await },

    ClientWsMessage::GetReport => ServerWsMessage::Report { report: get_report(state).await },

    ClientWsMessage::GetTaxonomy => ServerWsMessage::Taxonomy { taxonomy: taxonomy::registry() },

    ClientWsMessage::AddActivity { learning_type, week, mode } =>
      add_activity(state, &learning_type, week, mode).await.into(),

    ClientWsMessage::Drop { drop } => drop_item(state, drop).await.into(),

    ClientWsMessage::MoveActivity { id, target_id, week, mode } =>
      move_activity(state, &id, target_id.as_deref(), week, mode).await.into(),

    ClientWsMessage::ReorderActivity { id, direction } =>
      reorder_activity(state, &id, direction).await.into(),

    ClientWsMessage::UpdateActivity { activity } => update_activity(state, None, activity).await.into(),

    ClientWsMessage::DeleteActivity { id } => delete_activity(state, &id).await.into(),

    ClientWsMessage::SelectBloomLevel { id, level } => select_bloom_level(state, &id, level).await.into(),

    ClientWsMessage::UpdateCourse { title, description, target_audience } =>
      update_course(state, CourseMeta { title, description, target_audience }).await.into(),

    ClientWsMessage::AddWeek => add_week(state).await.into(),

    ClientWsMessage::ResetMatrix { confirm } => reset_matrix(state, confirm).await.into(),

    ClientWsMessage::NewCourse { confirm } => new_course(state, confirm).await.into(),

    ClientWsMessage::GenerateScenario { request } => {
      let outcome = generate_scenario(state, request).await;
      tracing::info!(target: "scenario", added = outcome.added, "WS generate_scenario served");
      ServerWsMessage::Scenario { outcome }
    }
  }
}
