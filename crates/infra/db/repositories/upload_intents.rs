use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{products, upload_intents},
    },
};
use domain::{
    entities::upload_intents::{InsertUploadIntentEntity, UploadIntentEntity},
    repositories::upload_intents::UploadIntentRepository,
    value_objects::{
        enums::upload_intent_statuses::UploadIntentStatus, storage::StoredObject,
    },
};

pub struct UploadIntentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UploadIntentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UploadIntentRepository for UploadIntentPostgres {
    async fn create(&self, owner_id: Uuid, product_id: Option<Uuid>) -> Result<Uuid> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Uuid> {
            let mut conn = db_pool.get()?;

            let entity = InsertUploadIntentEntity {
                owner_id,
                product_id,
                objects: serde_json::json!([]),
                status: UploadIntentStatus::Pending.to_string(),
            };

            let id = insert_into(upload_intents::table)
                .values(&entity)
                .returning(upload_intents::id)
                .get_result::<Uuid>(&mut conn)?;

            Ok(id)
        })
        .await??)
    }

    async fn append_object(&self, intent_id: Uuid, object: StoredObject) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            conn.transaction::<(), anyhow::Error, _>(|tx| {
                let current = upload_intents::table
                    .filter(upload_intents::id.eq(intent_id))
                    .select(upload_intents::objects)
                    .for_update()
                    .first::<serde_json::Value>(tx)?;

                let mut objects: Vec<StoredObject> =
                    serde_json::from_value(current).unwrap_or_default();
                objects.push(object);
                let objects =
                    serde_json::to_value(&objects).context("failed to encode intent objects")?;

                update(upload_intents::table.filter(upload_intents::id.eq(intent_id)))
                    .set((
                        upload_intents::objects.eq(objects),
                        upload_intents::updated_at.eq(now),
                    ))
                    .execute(tx)?;

                Ok(())
            })
        })
        .await??;

        Ok(())
    }

    async fn finalize(&self, intent_id: Uuid, product_id: Uuid) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(upload_intents::table.filter(upload_intents::id.eq(intent_id)))
                .set((
                    upload_intents::status.eq(UploadIntentStatus::Finalized.to_string()),
                    upload_intents::product_id.eq(Some(product_id)),
                    upload_intents::updated_at.eq(now),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??;

        Ok(())
    }

    async fn list_stale_pending(
        &self,
        older_than: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<UploadIntentEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<UploadIntentEntity>> {
            let mut conn = db_pool.get()?;

            let mut query = upload_intents::table
                .select(UploadIntentEntity::as_select())
                .filter(upload_intents::status.eq(UploadIntentStatus::Pending.to_string()))
                .filter(upload_intents::created_at.lt(older_than))
                .order(upload_intents::created_at.asc())
                .into_boxed();

            if let Some(limit) = limit {
                query = query.limit(limit);
            }

            let result = query.load::<UploadIntentEntity>(&mut conn)?;
            Ok(result)
        })
        .await??)
    }

    async fn is_object_referenced(&self, object: StoredObject) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            // Public slots store full URLs, restricted slots store the bare path.
            let public_suffix = format!("%/object/public/{}/{}", object.bucket, object.path);

            let referenced = products::table
                .filter(
                    products::image_url
                        .like(public_suffix.clone())
                        .or(products::mp3_url.like(public_suffix))
                        .or(products::wav_url.eq(object.path.clone()))
                        .or(products::stems_url.eq(object.path)),
                )
                .select(products::id)
                .first::<Uuid>(&mut conn)
                .optional()?;

            Ok(referenced.is_some())
        })
        .await??)
    }

    async fn mark_reconciled(&self, intent_id: Uuid) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(upload_intents::table.filter(upload_intents::id.eq(intent_id)))
                .set((
                    upload_intents::status.eq(UploadIntentStatus::Reconciled.to_string()),
                    upload_intents::updated_at.eq(now),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??;

        Ok(())
    }
}
