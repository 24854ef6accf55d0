use std::sync::Arc;

use chrono::{DateTime, Utc};
use offszn::domain::{
    repositories::{coupons::CouponRepository, products::ProductRepository},
    value_objects::coupons::{
        CouponCart, CouponModel, CouponRejection, CouponValidationDto, InsertCouponModel,
        ValidateCouponRequest, normalize_coupon_code,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("{0}")]
    InvalidCoupon(String),
    #[error("a coupon with this code already exists")]
    DuplicateCode,
    #[error("coupon not found")]
    NotFound,
    #[error(transparent)]
    Rejected(#[from] CouponRejection),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CouponError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CouponError::InvalidCoupon(_) | CouponError::Rejected(_) => StatusCode::BAD_REQUEST,
            CouponError::DuplicateCode => StatusCode::CONFLICT,
            CouponError::NotFound => StatusCode::NOT_FOUND,
            CouponError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CouponError>;

pub struct CouponUseCase<C, P>
where
    C: CouponRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
{
    coupon_repo: Arc<C>,
    product_repo: Arc<P>,
}

impl<C, P> CouponUseCase<C, P>
where
    C: CouponRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
{
    pub fn new(coupon_repo: Arc<C>, product_repo: Arc<P>) -> Self {
        Self {
            coupon_repo,
            product_repo,
        }
    }

    /// Status is derived at read time from the validity window.
    pub async fn list(&self, producer_id: Uuid) -> UseCaseResult<Vec<CouponModel>> {
        let now = Utc::now();
        let coupons = self
            .coupon_repo
            .list_by_producer(producer_id)
            .await
            .map_err(|err| {
                error!(%producer_id, db_error = ?err, "coupons: failed to list coupons");
                CouponError::Internal(err)
            })?;

        Ok(coupons
            .into_iter()
            .filter_map(|coupon| {
                let coupon_id = coupon.id;
                let model = CouponModel::from_entity(coupon, now);
                if model.is_none() {
                    warn!(%coupon_id, "coupons: skipping row with inconsistent discount");
                }
                model
            })
            .collect())
    }

    pub async fn create(
        &self,
        producer_id: Uuid,
        model: InsertCouponModel,
    ) -> UseCaseResult<CouponModel> {
        let now = Utc::now();
        let entity = model
            .validate(producer_id, now)
            .map_err(|err| CouponError::InvalidCoupon(err.to_string()))?;

        let existing = self
            .coupon_repo
            .find_by_code(producer_id, &entity.code)
            .await
            .map_err(|err| {
                error!(%producer_id, db_error = ?err, "coupons: failed to check code");
                CouponError::Internal(err)
            })?;
        if existing.is_some() {
            return Err(CouponError::DuplicateCode);
        }

        let coupon = self.coupon_repo.insert(entity).await.map_err(|err| {
            error!(%producer_id, db_error = ?err, "coupons: failed to insert coupon");
            CouponError::Internal(err)
        })?;

        info!(%producer_id, coupon_id = %coupon.id, code = %coupon.code, "coupons: coupon created");
        CouponModel::from_entity(coupon, now)
            .ok_or_else(|| CouponError::Internal(anyhow::anyhow!("inserted coupon has no discount")))
    }

    pub async fn delete(&self, producer_id: Uuid, coupon_id: Uuid) -> UseCaseResult<()> {
        let deleted = self
            .coupon_repo
            .delete(coupon_id, producer_id)
            .await
            .map_err(|err| {
                error!(%producer_id, %coupon_id, db_error = ?err, "coupons: failed to delete coupon");
                CouponError::Internal(err)
            })?;

        if deleted {
            info!(%producer_id, %coupon_id, "coupons: coupon deleted");
            Ok(())
        } else {
            Err(CouponError::NotFound)
        }
    }

    pub async fn validate(&self, request: ValidateCouponRequest) -> UseCaseResult<CouponValidationDto> {
        self.validate_at(request, Utc::now()).await
    }

    pub async fn validate_at(
        &self,
        request: ValidateCouponRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CouponValidationDto> {
        if !request.subtotal.is_finite() || request.subtotal < 0.0 {
            return Err(CouponError::InvalidCoupon("Invalid subtotal".to_string()));
        }
        let code = normalize_coupon_code(&request.code).map_err(|_| CouponError::NotFound)?;

        let coupon = self
            .coupon_repo
            .find_by_code(request.producer_id, &code)
            .await
            .map_err(|err| {
                error!(producer_id = %request.producer_id, db_error = ?err, "coupons: failed to load coupon");
                CouponError::Internal(err)
            })?
            .and_then(|coupon| CouponModel::from_entity(coupon, now))
            .ok_or(CouponError::NotFound)?;

        let category = match request.product_id {
            Some(product_id) => self
                .product_repo
                .find_by_id(product_id)
                .await
                .map_err(|err| {
                    error!(%product_id, db_error = ?err, "coupons: failed to load product");
                    CouponError::Internal(err)
                })?
                .map(|product| product.product_type),
            None => None,
        };

        let cart = CouponCart {
            subtotal: request.subtotal,
            product_id: request.product_id,
            category,
        };
        let discount = coupon.discount_for(&cart, now)?;

        Ok(CouponValidationDto {
            coupon_id: coupon.id,
            code: coupon.code,
            discount,
            total: ((request.subtotal - discount) * 100.0).round() / 100.0,
        })
    }
}
