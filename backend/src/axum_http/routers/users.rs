use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use offszn::{
    domain::{
        repositories::{storage::AssetStorage, users::UserRepository},
        value_objects::profiles::{
            AvatarDto, AvatarUploadRequest, CompleteProfileRequest, CurrentUserDto,
            NicknameAvailabilityDto, NicknameQuery, PublicProfileDto,
        },
    },
    infra::{
        db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        storages::supabase_storage::SupabaseStorageClient,
    },
    media::cloudinary_client::CloudinaryClient,
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{
        avatars::{AvatarUseCase, CloudinaryGateway},
        profiles::ProfileUseCase,
    },
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    storage: Arc<SupabaseStorageClient>,
    cloudinary: Arc<CloudinaryClient>,
) -> Router {
    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));

    let profile_usecase = ProfileUseCase::new(Arc::clone(&user_repository));
    let avatar_usecase = AvatarUseCase::new(user_repository, storage, cloudinary);

    let profiles = Router::new()
        .route("/me", get(current_user))
        .route("/complete-profile", put(complete_profile))
        .route("/nickname-available", get(nickname_available))
        .route("/:nickname", get(public_profile))
        .with_state(Arc::new(profile_usecase));

    let avatars = Router::new()
        .route("/avatar", post(upload_avatar))
        .with_state(Arc::new(avatar_usecase));

    profiles.merge(avatars)
}

pub async fn public_profile<U>(
    State(usecase): State<Arc<ProfileUseCase<U>>>,
    Path(nickname): Path<String>,
) -> Result<Json<PublicProfileDto>, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.public_profile(&nickname).await?))
}

pub async fn current_user<U>(
    State(usecase): State<Arc<ProfileUseCase<U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<CurrentUserDto>, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.current_user(user_id).await?))
}

pub async fn nickname_available<U>(
    State(usecase): State<Arc<ProfileUseCase<U>>>,
    Query(query): Query<NicknameQuery>,
) -> Result<Json<NicknameAvailabilityDto>, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.nickname_available(&query.nickname).await?))
}

pub async fn complete_profile<U>(
    State(usecase): State<Arc<ProfileUseCase<U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<CompleteProfileRequest>,
) -> Result<Json<CurrentUserDto>, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    info!(%user_id, "users: complete profile request received");
    Ok(Json(usecase.complete_profile(user_id, request).await?))
}

pub async fn upload_avatar<U, S, C>(
    State(usecase): State<Arc<AvatarUseCase<U, S, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<AvatarUploadRequest>,
) -> Result<Json<AvatarDto>, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    info!(%user_id, "users: avatar upload request received");
    Ok(Json(usecase.upload_avatar(user_id, request).await?))
}
