use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use offszn::{
    domain::{
        repositories::{gift_cards::GiftCardRepository, users::UserRepository},
        value_objects::gift_cards::{GiftCardDto, GiftCardsOverviewDto},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{gift_cards::GiftCardPostgres, users::UserPostgres},
    },
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::gift_cards::GiftCardUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let usecase = GiftCardUseCase::new(
        Arc::new(GiftCardPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/", get(overview))
        .route("/welcome", post(claim_welcome))
        .route("/spin", post(spin))
        .with_state(Arc::new(usecase))
}

pub async fn overview<G, U>(
    State(usecase): State<Arc<GiftCardUseCase<G, U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<GiftCardsOverviewDto>, AppError>
where
    G: GiftCardRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.overview(user_id).await?))
}

pub async fn claim_welcome<G, U>(
    State(usecase): State<Arc<GiftCardUseCase<G, U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<GiftCardDto>, AppError>
where
    G: GiftCardRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.claim_welcome(user_id).await?))
}

pub async fn spin<G, U>(
    State(usecase): State<Arc<GiftCardUseCase<G, U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<GiftCardDto>, AppError>
where
    G: GiftCardRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.spin(user_id).await?))
}
