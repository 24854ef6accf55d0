use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::reels},
};
use domain::{
    entities::reels::{InsertReelEntity, ReelEntity, UpdateReelEntity},
    repositories::reels::ReelRepository,
};

pub struct ReelPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReelPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReelRepository for ReelPostgres {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ReelEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<ReelEntity>> {
            let mut conn = db_pool.get()?;

            let results = reels::table
                .filter(reels::owner_id.eq(owner_id))
                .order(reels::created_at.desc())
                .select(ReelEntity::as_select())
                .load::<ReelEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn find_owned(&self, reel_id: Uuid, owner_id: Uuid) -> Result<Option<ReelEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ReelEntity>> {
            let mut conn = db_pool.get()?;

            let result = reels::table
                .filter(reels::id.eq(reel_id))
                .filter(reels::owner_id.eq(owner_id))
                .select(ReelEntity::as_select())
                .first::<ReelEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn insert(&self, entity: InsertReelEntity) -> Result<ReelEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<ReelEntity> {
            let mut conn = db_pool.get()?;

            let result = insert_into(reels::table)
                .values(&entity)
                .returning(ReelEntity::as_returning())
                .get_result::<ReelEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn update(
        &self,
        reel_id: Uuid,
        owner_id: Uuid,
        changes: UpdateReelEntity,
    ) -> Result<Option<ReelEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ReelEntity>> {
            let mut conn = db_pool.get()?;

            let result = update(
                reels::table
                    .filter(reels::id.eq(reel_id))
                    .filter(reels::owner_id.eq(owner_id)),
            )
            .set(&changes)
            .returning(ReelEntity::as_returning())
            .get_result::<ReelEntity>(&mut conn)
            .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn delete(&self, reel_id: Uuid, owner_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let deleted = delete(
                reels::table
                    .filter(reels::id.eq(reel_id))
                    .filter(reels::owner_id.eq(owner_id)),
            )
            .execute(&mut conn)?;

            Ok(deleted > 0)
        })
        .await??)
    }
}
