use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use offszn::{
    domain::{
        repositories::{
            collaborations::CollaborationRepository, products::ProductRepository,
            users::UserRepository,
        },
        value_objects::collaborations::{
            CollabInvitationDto, CollaborationsDto, ReplaceCollaboratorsRequest,
            RespondInvitationRequest,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            collaborations::CollaborationPostgres, products::ProductPostgres, users::UserPostgres,
        },
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::collaborations::CollaborationUseCase,
};

/// Mounted under `/api`; the split editor lives on the product resource.
pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let usecase = CollaborationUseCase::new(
        Arc::new(CollaborationPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ProductPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/collaborations", get(overview))
        .route("/collaborations/:id/respond", post(respond))
        .route("/products/:id/collaborators", put(replace_collaborators))
        .with_state(Arc::new(usecase))
}

pub async fn overview<C, P, U>(
    State(usecase): State<Arc<CollaborationUseCase<C, P, U>>>,
    AuthUser { user_id, email, .. }: AuthUser,
) -> Result<Json<CollaborationsDto>, AppError>
where
    C: CollaborationRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.overview(user_id, email).await?))
}

pub async fn replace_collaborators<C, P, U>(
    State(usecase): State<Arc<CollaborationUseCase<C, P, U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(request): Json<ReplaceCollaboratorsRequest>,
) -> Result<Json<Vec<CollabInvitationDto>>, AppError>
where
    C: CollaborationRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    info!(%user_id, %product_id, "collaborations: replace split request received");
    Ok(Json(
        usecase
            .replace_collaborators(user_id, product_id, request)
            .await?,
    ))
}

pub async fn respond<C, P, U>(
    State(usecase): State<Arc<CollaborationUseCase<C, P, U>>>,
    AuthUser { user_id, email, .. }: AuthUser,
    Path(invitation_id): Path<Uuid>,
    Json(request): Json<RespondInvitationRequest>,
) -> Result<Json<CollabInvitationDto>, AppError>
where
    C: CollaborationRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(
        usecase
            .respond(user_id, email, invitation_id, request.accept)
            .await?,
    ))
}
