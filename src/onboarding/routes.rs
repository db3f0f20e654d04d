//! REST endpoints for the onboarding wizard.
//!
//! The dashboard frontend is purely presentational; every state change it
//! wants goes through these routes. Mutations always answer 200 with the
//! post-operation status, since the underlying operations are total.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorRegistry;

use super::manager::{OnboardingManager, OnboardingStatus};
use super::model::{BusinessProfilePatch, ConnectionState, OnboardingRecord};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub manager: Arc<OnboardingManager>,
    pub anchors: Arc<AnchorRegistry>,
}

/// GET /api/onboarding/status
async fn get_status(State(state): State<OnboardingRouteState>) -> Json<OnboardingStatus> {
    Json(state.manager.status().await)
}

/// GET /api/onboarding/record
async fn get_record(State(state): State<OnboardingRouteState>) -> Json<OnboardingRecord> {
    Json(state.manager.record().await)
}

/// POST /api/onboarding/open
async fn open_wizard(State(state): State<OnboardingRouteState>) -> Json<OnboardingStatus> {
    state.manager.open().await;
    Json(state.manager.status().await)
}

#[derive(Debug, Deserialize)]
struct CloseRequest {
    persist: bool,
}

/// POST /api/onboarding/close
///
/// Body is optional; the default persists the dismissal.
async fn close_wizard(
    State(state): State<OnboardingRouteState>,
    body: Option<Json<CloseRequest>>,
) -> Json<OnboardingStatus> {
    let persist = body.map(|Json(req)| req.persist).unwrap_or(true);
    state.manager.close(persist).await;
    Json(state.manager.status().await)
}

/// POST /api/onboarding/advance
async fn advance_step(State(state): State<OnboardingRouteState>) -> Json<OnboardingStatus> {
    state.manager.advance_step().await;
    Json(state.manager.status().await)
}

/// POST /api/onboarding/retreat
async fn retreat_step(State(state): State<OnboardingRouteState>) -> Json<OnboardingStatus> {
    state.manager.retreat_step().await;
    Json(state.manager.status().await)
}

/// POST /api/onboarding/complete
async fn complete_onboarding(State(state): State<OnboardingRouteState>) -> Json<OnboardingStatus> {
    state.manager.complete_onboarding().await;
    Json(state.manager.status().await)
}

/// POST /api/onboarding/reset
async fn reset_onboarding(State(state): State<OnboardingRouteState>) -> Json<OnboardingStatus> {
    state.manager.reset_onboarding().await;
    Json(state.manager.status().await)
}

/// POST /api/onboarding/profile
async fn update_profile(
    State(state): State<OnboardingRouteState>,
    Json(patch): Json<BusinessProfilePatch>,
) -> Json<OnboardingStatus> {
    state.manager.update_business_profile(patch).await;
    Json(state.manager.status().await)
}

#[derive(Debug, Deserialize)]
struct ConnectionRequest {
    tool_id: String,
    state: ConnectionState,
}

/// POST /api/onboarding/connections
async fn set_connection(
    State(state): State<OnboardingRouteState>,
    Json(req): Json<ConnectionRequest>,
) -> Json<OnboardingStatus> {
    state.manager.set_tool_connection(&req.tool_id, req.state).await;
    Json(state.manager.status().await)
}

#[derive(Debug, Deserialize)]
struct InviteRequest {
    email: String,
    role: String,
}

/// POST /api/onboarding/invites
async fn add_invite(
    State(state): State<OnboardingRouteState>,
    Json(req): Json<InviteRequest>,
) -> Json<OnboardingStatus> {
    state.manager.add_team_invite(&req.email, &req.role).await;
    Json(state.manager.status().await)
}

/// DELETE /api/onboarding/invites/{email}
async fn remove_invite(
    State(state): State<OnboardingRouteState>,
    Path(email): Path<String>,
) -> Json<OnboardingStatus> {
    state.manager.remove_team_invite(&email).await;
    Json(state.manager.status().await)
}

/// POST /api/onboarding/modules/{module_id}
async fn toggle_module(
    State(state): State<OnboardingRouteState>,
    Path(module_id): Path<String>,
) -> Json<OnboardingStatus> {
    state.manager.toggle_module(&module_id).await;
    Json(state.manager.status().await)
}

#[derive(Debug, Deserialize)]
struct InteractionRequest {
    feature: String,
}

/// POST /api/onboarding/interaction
async fn record_interaction(
    State(state): State<OnboardingRouteState>,
    Json(req): Json<InteractionRequest>,
) -> Json<OnboardingStatus> {
    state.manager.update_last_interaction(&req.feature).await;
    Json(state.manager.status().await)
}

#[derive(Debug, Deserialize)]
struct AnchorReport {
    selectors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AnchorReportAck {
    mounted: usize,
}

/// PUT /api/onboarding/anchors
///
/// The host page reports the anchor selectors it currently has mounted.
/// Each report replaces the previous set.
async fn report_anchors(
    State(state): State<OnboardingRouteState>,
    Json(report): Json<AnchorReport>,
) -> Json<AnchorReportAck> {
    state.anchors.set_mounted(report.selectors);
    Json(AnchorReportAck {
        mounted: state.anchors.len(),
    })
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/record", get(get_record))
        .route("/api/onboarding/open", post(open_wizard))
        .route("/api/onboarding/close", post(close_wizard))
        .route("/api/onboarding/advance", post(advance_step))
        .route("/api/onboarding/retreat", post(retreat_step))
        .route("/api/onboarding/complete", post(complete_onboarding))
        .route("/api/onboarding/reset", post(reset_onboarding))
        .route("/api/onboarding/profile", post(update_profile))
        .route("/api/onboarding/connections", post(set_connection))
        .route("/api/onboarding/invites", post(add_invite))
        .route("/api/onboarding/invites/{email}", delete(remove_invite))
        .route("/api/onboarding/modules/{module_id}", post(toggle_module))
        .route("/api/onboarding/interaction", post(record_interaction))
        .route("/api/onboarding/anchors", put(report_anchors))
        .with_state(state)
}
