use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::{AppError, Toast};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::common::{bearer_token, request_id, ApiResponse};
use crate::domains::widget::{
    community_selection_form, render, FormSpec, FormValues, ViewNode, WidgetPhase,
    WidgetSession, WidgetState,
};
use crate::state::AppState;

/// Create router for widget session endpoints
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(mount_session))
        .route("/sessions/:id", get(get_session).delete(unmount_session))
        .route("/sessions/:id/form", post(submit_form))
}

#[derive(Debug, Default, Deserialize)]
pub struct MountParams {
    /// Respond only after identity and balance have resolved.
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: WidgetPhase,
    pub state: WidgetState,
    pub view: ViewNode,
    pub form: FormSpec,
    pub toasts: Vec<Toast>,
}

impl SessionView {
    fn of(session: &WidgetSession) -> Self {
        let state = session.snapshot();
        Self {
            session_id: session.id(),
            phase: state.phase(),
            view: render(&state),
            state,
            form: community_selection_form(),
            toasts: session.take_toasts(),
        }
    }
}

fn lookup(state: &AppState, id: Uuid) -> Result<Arc<WidgetSession>, AppError> {
    state
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("widget session {}", id)))
}

/// Mount a widget session
/// POST /api/v1/widgets/sessions
pub async fn mount_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<MountParams>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>), AppError> {
    let request_id = request_id(&headers);
    let start_time = Instant::now();

    let platform = state.platform.connect(bearer_token(&headers).as_deref());
    let session = Arc::new(WidgetSession::new(
        state.widget_services.clone(),
        platform.directory.clone(),
    ));
    state.sessions.insert(session.clone());
    info!(session = %session.id(), request_id = %request_id, "🧩 Widget session mounted");

    let mounting = {
        let session = session.clone();
        let identity = platform.identity.clone();
        tokio::spawn(async move { session.mount(identity.as_ref()).await })
    };

    if params.wait {
        mounting
            .await
            .map_err(|e| AppError::internal(format!("Mount task failed: {}", e)))?;
    }

    let execution_time = start_time.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            SessionView::of(&session),
            request_id,
            Some(execution_time),
        )),
    ))
}

/// Current render state, view tree and pending toasts
/// GET /api/v1/widgets/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let session = lookup(&state, id)?;
    debug!(session = %id, "session polled");
    Ok(Json(ApiResponse::success(
        SessionView::of(&session),
        request_id(&headers),
        None,
    )))
}

/// Submit the community selection form
/// POST /api/v1/widgets/sessions/:id/form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(values): Json<FormValues>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let request_id = request_id(&headers);
    let start_time = Instant::now();
    let session = lookup(&state, id)?;

    session.submit_form(&values).await;

    let execution_time = start_time.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        SessionView::of(&session),
        request_id,
        Some(execution_time),
    )))
}

/// Unmount a session; results still in flight are discarded
/// DELETE /api/v1/widgets/sessions/:id
pub async fn unmount_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(&id) {
        info!(session = %id, "👋 Widget session unmounted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("widget session {}", id)))
    }
}
