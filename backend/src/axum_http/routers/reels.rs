use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use offszn::{
    domain::{
        repositories::reels::ReelRepository,
        value_objects::reels::{CreateReelRequest, ReelDto, UpdateReelRequest},
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::reels::ReelPostgres},
    media::cloudinary_client::CloudinaryClient,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{avatars::CloudinaryGateway, reels::ReelUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, cloudinary: Arc<CloudinaryClient>) -> Router {
    let usecase = ReelUseCase::new(Arc::new(ReelPostgres::new(Arc::clone(&db_pool))), cloudinary);

    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", put(update).delete(remove))
        .with_state(Arc::new(usecase))
}

pub async fn list<R, C>(
    State(usecase): State<Arc<ReelUseCase<R, C>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<Vec<ReelDto>>, AppError>
where
    R: ReelRepository + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    Ok(Json(usecase.list(user_id).await?))
}

pub async fn create<R, C>(
    State(usecase): State<Arc<ReelUseCase<R, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<CreateReelRequest>,
) -> Result<(StatusCode, Json<ReelDto>), AppError>
where
    R: ReelRepository + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    let reel = usecase.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(reel)))
}

pub async fn update<R, C>(
    State(usecase): State<Arc<ReelUseCase<R, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(reel_id): Path<Uuid>,
    Json(request): Json<UpdateReelRequest>,
) -> Result<Json<ReelDto>, AppError>
where
    R: ReelRepository + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    Ok(Json(usecase.update(user_id, reel_id, request).await?))
}

pub async fn remove<R, C>(
    State(usecase): State<Arc<ReelUseCase<R, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(reel_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    R: ReelRepository + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    usecase.delete(user_id, reel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
