use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::coupons::{CouponEntity, InsertCouponEntity};

#[async_trait]
#[automock]
pub trait CouponRepository {
    async fn list_by_producer(&self, producer_id: Uuid) -> Result<Vec<CouponEntity>>;

    async fn find_by_code(&self, producer_id: Uuid, code: &str) -> Result<Option<CouponEntity>>;

    async fn insert(&self, entity: InsertCouponEntity) -> Result<CouponEntity>;

    async fn delete(&self, coupon_id: Uuid, producer_id: Uuid) -> Result<bool>;
}
