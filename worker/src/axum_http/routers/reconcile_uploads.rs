use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{
    config::config_model::Reconcile,
    usecases::reconcile_orphaned_uploads::{ReconcileOrphanedUploadsUseCase, ReconcileUploadsParams},
};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/reconcile/uploads" \
//     -H "Authorization: Bearer $INTERNAL_RECONCILE_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"stale_after_minutes":60,"limit":100,"dry_run":true}'

#[derive(Clone)]
pub struct ReconcileRouteState {
    config: Arc<Reconcile>,
    usecase: Arc<ReconcileOrphanedUploadsUseCase>,
}

pub fn routes(config: Arc<Reconcile>, usecase: Arc<ReconcileOrphanedUploadsUseCase>) -> Router {
    Router::new()
        .route("/uploads", post(reconcile_uploads))
        .with_state(ReconcileRouteState { config, usecase })
}

#[derive(Debug, Default, Deserialize)]
pub struct ReconcileUploadsRequest {
    pub stale_after_minutes: Option<i64>,
    pub limit: Option<i64>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileUploadsResponse {
    pub scanned: usize,
    pub reconciled: usize,
    pub skipped: usize,
    pub objects_deleted: usize,
    pub objects_kept: usize,
    pub dry_run: bool,
    pub candidate_ids: Vec<Uuid>,
    pub reconciled_ids: Vec<Uuid>,
    pub skipped_ids: Vec<Uuid>,
}

pub async fn reconcile_uploads(
    State(state): State<ReconcileRouteState>,
    headers: HeaderMap,
    Json(payload): Json<ReconcileUploadsRequest>,
) -> Response {
    let Some(expected_token) = state.config.internal_token.as_deref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "reconcile token is not configured",
        )
            .into_response();
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        return (status, "unauthorized").into_response();
    }

    let params = ReconcileUploadsParams {
        stale_after_minutes: payload
            .stale_after_minutes
            .unwrap_or(state.config.stale_after_minutes),
        limit: payload.limit.or(state.config.batch_limit),
        dry_run: payload.dry_run.unwrap_or(false),
    };
    let dry_run = params.dry_run;

    match state.usecase.run(params).await {
        Ok(result) => Json(ReconcileUploadsResponse {
            scanned: result.scanned,
            reconciled: result.reconciled,
            skipped: result.skipped,
            objects_deleted: result.objects_deleted,
            objects_kept: result.objects_kept,
            dry_run,
            candidate_ids: result.candidate_ids,
            reconciled_ids: result.reconciled_ids,
            skipped_ids: result.skipped_ids,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "reconcile_uploads: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "reconcile failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
