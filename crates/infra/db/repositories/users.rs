use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::users},
};
use domain::{
    entities::users::{CompleteProfileEntity, UserEntity},
    repositories::users::UserRepository,
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .filter(users::id.eq(user_id))
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);
        let nickname = nickname.to_lowercase();

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .filter(users::nickname.eq(nickname))
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);
        let email = email.trim().to_lowercase();

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .filter(users::email.eq(email))
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn complete_profile(
        &self,
        user_id: Uuid,
        changes: CompleteProfileEntity,
    ) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let result = update(users::table.filter(users::id.eq(user_id)))
                .set(&changes)
                .returning(UserEntity::as_returning())
                .get_result::<UserEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn update_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);
        let avatar_url = avatar_url.to_string();
        let now = Utc::now();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(users::table.filter(users::id.eq(user_id)))
                .set((
                    users::avatar_url.eq(Some(avatar_url)),
                    users::updated_at.eq(now),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??;

        Ok(())
    }
}
