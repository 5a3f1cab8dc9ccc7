//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! checklist store, dashboard source and partner profiles.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::completion::StoreError;
use crate::dashboard::{build_view, DashboardError, ViewFilter};
use crate::engagement::EngagementRecord;
use crate::partners::PartnerSummary;
use crate::protocol::*;
use crate::state::AppState;

/// Error surfaced to the browser as a status code plus a one-line message.
#[derive(Debug)]
pub struct ApiError {
  status: StatusCode,
  code: &'static str,
  message: String,
}

impl ApiError {
  fn not_found(message: String) -> Self {
    Self { status: StatusCode::NOT_FOUND, code: "not_found", message }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = ErrorOut { error: self.code.to_string(), message: self.message };
    (self.status, Json(body)).into_response()
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::InvalidNamespace(_) | StoreError::EmptyItem => {
        Self { status: StatusCode::BAD_REQUEST, code: "bad_request", message: e.to_string() }
      }
      StoreError::Io(_) | StoreError::Encode(_) => Self {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "storage_failed",
        message: "Could not save your checklist. Please try again.".into(),
      },
    }
  }
}

impl From<DashboardError> for ApiError {
  fn from(e: DashboardError) -> Self {
    match e {
      DashboardError::Unauthorized => Self {
        status: StatusCode::FORBIDDEN,
        code: "access_denied",
        message: "Access Denied. Sign in again or ask your coach for access.".into(),
      },
      DashboardError::UnknownPartnership(_) | DashboardError::UnknownActionItem(_) => Self::not_found(e.to_string()),
      DashboardError::Upstream(_) | DashboardError::Transport(_) | DashboardError::BadBaseUrl(_) => Self {
        status: StatusCode::BAD_GATEWAY,
        code: "dashboard_unavailable",
        message: "Dashboard data is unavailable right now. Please try again.".into(),
      },
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_games(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let games: Vec<GameOut> = state.games.values().map(|g| GameOut::from(g.as_ref())).collect();
  Json(games)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_checklist(
  State(state): State<Arc<AppState>>,
  Path(namespace): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let set = state.completions.load(&namespace).await?;
  Ok(Json(set))
}

#[instrument(level = "info", skip(state, body), fields(done = body.done))]
pub async fn http_put_checklist_item(
  State(state): State<Arc<AppState>>,
  Path((namespace, item)): Path<(String, String)>,
  Json(body): Json<ChecklistItemIn>,
) -> Result<impl IntoResponse, ApiError> {
  let set = state.completions.mark(&namespace, &item, body.done).await?;
  info!(target: "checklist", %namespace, %item, done = body.done, items = set.len(), "Checklist item set");
  Ok(Json(set))
}

#[instrument(level = "info", skip(state))]
pub async fn http_toggle_checklist_item(
  State(state): State<Arc<AppState>>,
  Path((namespace, item)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
  let set = state.completions.toggle(&namespace, &item).await?;
  info!(target: "checklist", %namespace, %item, done = set.contains(&item), "Checklist item toggled");
  Ok(Json(set))
}

#[instrument(level = "info", skip(state))]
pub async fn http_clear_checklist(
  State(state): State<Arc<AppState>>,
  Path(namespace): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let set = state.completions.clear(&namespace).await?;
  Ok(Json(set))
}

#[instrument(level = "info", skip(state, filter), fields(status = ?filter.status, category = ?filter.category))]
pub async fn http_get_dashboard(
  State(state): State<Arc<AppState>>,
  Path(partnership): Path<String>,
  Query(filter): Query<ViewFilter>,
) -> Result<impl IntoResponse, ApiError> {
  let data = state.dashboard.fetch(&partnership).await?;
  let view = build_view(&data, &filter);
  info!(target: "dashboard", %partnership, items = view.action_items.len(), completion = view.completion_percent, "Dashboard served");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(status = ?body.status))]
pub async fn http_patch_action_item(
  State(state): State<Arc<AppState>>,
  Path((partnership, item)): Path<(String, String)>,
  Json(body): Json<ActionStatusIn>,
) -> Result<impl IntoResponse, ApiError> {
  let updated = state
    .dashboard
    .update_action_status(&partnership, &item, body.status)
    .await
    .inspect_err(|e| warn!(target: "dashboard", %partnership, %item, error = %e, "Action item update failed"))?;
  Ok(Json(updated))
}

/// Beacon-style flush for pages that track tabs without a socket.
/// Always answers 202; delivery happens in the background.
#[instrument(level = "debug", skip(state, body), fields(tab = %body.tab, elapsed_ms = body.elapsed_ms))]
pub async fn http_post_engagement(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EngagementRecord>,
) -> impl IntoResponse {
  state.engagement.dispatch(body);
  StatusCode::ACCEPTED
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_partners(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let partners: Vec<PartnerSummary> = state.partners.iter().map(PartnerSummary::from).collect();
  Json(partners)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_partner(
  State(state): State<Arc<AppState>>,
  Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let partner = state
    .partner(&slug)
    .ok_or_else(|| ApiError::not_found(format!("unknown partner '{slug}'")))?;
  Ok(Json(partner.clone()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_partner_tip(
  State(state): State<Arc<AppState>>,
  Path(slug): Path<String>,
  Query(q): Query<TipQuery>,
) -> Result<impl IntoResponse, ApiError> {
  let partner = state
    .partner(&slug)
    .ok_or_else(|| ApiError::not_found(format!("unknown partner '{slug}'")))?;
  let tip = partner
    .tip(q.index)
    .ok_or_else(|| ApiError::not_found(format!("partner '{slug}' has no tips")))?;
  Ok(Json(TipOut { index: q.index, tip: tip.to_string() }))
}
