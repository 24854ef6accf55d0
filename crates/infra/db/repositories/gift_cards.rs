use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{PgExpressionMethods, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{gift_cards, users},
    },
};
use domain::{
    entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity},
    repositories::gift_cards::GiftCardRepository,
};

pub struct GiftCardPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GiftCardPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GiftCardRepository for GiftCardPostgres {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<GiftCardEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<GiftCardEntity>> {
            let mut conn = db_pool.get()?;

            let results = gift_cards::table
                .filter(gift_cards::owner_id.eq(owner_id))
                .order(gift_cards::created_at.desc())
                .select(GiftCardEntity::as_select())
                .load::<GiftCardEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn claim_monthly_spin(
        &self,
        owner_id: Uuid,
        month: String,
        card: InsertGiftCardEntity,
    ) -> Result<Option<GiftCardEntity>> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        Ok(task::spawn_blocking(move || -> Result<Option<GiftCardEntity>> {
            let mut conn = db_pool.get()?;

            // The conditional update is the gate: two concurrent spins cannot both claim the month.
            let result = conn.transaction::<Option<GiftCardEntity>, diesel::result::Error, _>(|tx| {
                let claimed = update(
                    users::table
                        .filter(users::id.eq(owner_id))
                        .filter(users::last_spin_month.is_distinct_from(Some(month.clone()))),
                )
                .set((
                    users::last_spin_month.eq(Some(month.clone())),
                    users::updated_at.eq(now),
                ))
                .execute(tx)?;

                if claimed != 1 {
                    return Ok(None);
                }

                let created = insert_into(gift_cards::table)
                    .values(&card)
                    .returning(GiftCardEntity::as_returning())
                    .get_result::<GiftCardEntity>(tx)?;

                Ok(Some(created))
            })?;

            Ok(result)
        })
        .await??)
    }

    async fn claim_welcome(
        &self,
        owner_id: Uuid,
        card: InsertGiftCardEntity,
    ) -> Result<Option<GiftCardEntity>> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        Ok(task::spawn_blocking(move || -> Result<Option<GiftCardEntity>> {
            let mut conn = db_pool.get()?;

            let result = conn.transaction::<Option<GiftCardEntity>, diesel::result::Error, _>(|tx| {
                let claimed = update(
                    users::table
                        .filter(users::id.eq(owner_id))
                        .filter(users::welcome_claimed.eq(false)),
                )
                .set((users::welcome_claimed.eq(true), users::updated_at.eq(now)))
                .execute(tx)?;

                if claimed != 1 {
                    return Ok(None);
                }

                let created = insert_into(gift_cards::table)
                    .values(&card)
                    .returning(GiftCardEntity::as_returning())
                    .get_result::<GiftCardEntity>(tx)?;

                Ok(Some(created))
            })?;

            Ok(result)
        })
        .await??)
    }
}
