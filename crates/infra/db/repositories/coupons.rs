use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::coupons},
};
use domain::{
    entities::coupons::{CouponEntity, InsertCouponEntity},
    repositories::coupons::CouponRepository,
};

pub struct CouponPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CouponPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CouponRepository for CouponPostgres {
    async fn list_by_producer(&self, producer_id: Uuid) -> Result<Vec<CouponEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<CouponEntity>> {
            let mut conn = db_pool.get()?;

            let results = coupons::table
                .filter(coupons::producer_id.eq(producer_id))
                .order(coupons::created_at.desc())
                .select(CouponEntity::as_select())
                .load::<CouponEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn find_by_code(&self, producer_id: Uuid, code: &str) -> Result<Option<CouponEntity>> {
        let db_pool = Arc::clone(&self.db_pool);
        let code = code.trim().to_uppercase();

        Ok(task::spawn_blocking(move || -> Result<Option<CouponEntity>> {
            let mut conn = db_pool.get()?;

            let result = coupons::table
                .filter(coupons::producer_id.eq(producer_id))
                .filter(coupons::code.eq(code))
                .select(CouponEntity::as_select())
                .first::<CouponEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn insert(&self, entity: InsertCouponEntity) -> Result<CouponEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<CouponEntity> {
            let mut conn = db_pool.get()?;

            let result = insert_into(coupons::table)
                .values(&entity)
                .returning(CouponEntity::as_returning())
                .get_result::<CouponEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn delete(&self, coupon_id: Uuid, producer_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let deleted = delete(
                coupons::table
                    .filter(coupons::id.eq(coupon_id))
                    .filter(coupons::producer_id.eq(producer_id)),
            )
            .execute(&mut conn)?;

            Ok(deleted > 0)
        })
        .await??)
    }
}
