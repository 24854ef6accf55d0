use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use offszn::{
    domain::{
        repositories::{coupons::CouponRepository, products::ProductRepository},
        value_objects::coupons::{
            CouponModel, CouponValidationDto, InsertCouponModel, ValidateCouponRequest,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{coupons::CouponPostgres, products::ProductPostgres},
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::coupons::CouponUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let coupon_repository = CouponPostgres::new(Arc::clone(&db_pool));
    let product_repository = ProductPostgres::new(Arc::clone(&db_pool));
    let usecase = CouponUseCase::new(Arc::new(coupon_repository), Arc::new(product_repository));

    Router::new()
        .route("/", get(list).post(create))
        .route("/validate", post(validate))
        .route("/:id", delete(remove))
        .with_state(Arc::new(usecase))
}

pub async fn list<C, P>(
    State(usecase): State<Arc<CouponUseCase<C, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<Vec<CouponModel>>, AppError>
where
    C: CouponRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.list(user_id).await?))
}

pub async fn create<C, P>(
    State(usecase): State<Arc<CouponUseCase<C, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<InsertCouponModel>,
) -> Result<(StatusCode, Json<CouponModel>), AppError>
where
    C: CouponRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
{
    info!(%user_id, "coupons: create request received");
    let coupon = usecase.create(user_id, model).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn remove<C, P>(
    State(usecase): State<Arc<CouponUseCase<C, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(coupon_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    C: CouponRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
{
    usecase.delete(user_id, coupon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn validate<C, P>(
    State(usecase): State<Arc<CouponUseCase<C, P>>>,
    Json(request): Json<ValidateCouponRequest>,
) -> Result<Json<CouponValidationDto>, AppError>
where
    C: CouponRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.validate(request).await?))
}
