use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{products, users},
    },
};
use domain::{
    entities::{
        products::{InsertProductEntity, ProductEntity, UpdateProductEntity},
        users::ProducerSnippetEntity,
    },
    repositories::products::ProductRepository,
    value_objects::{
        enums::{
            product_sorts::ProductSort, product_statuses::ProductStatus, visibilities::Visibility,
        },
        products::ProductFilter,
    },
};

pub struct ProductPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProductPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProductRepository for ProductPostgres {
    async fn find_approved(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<(ProductEntity, ProducerSnippetEntity)>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<(ProductEntity, ProducerSnippetEntity)>> {
            let mut conn = db_pool.get()?;

            let mut query = products::table
                .inner_join(users::table)
                .filter(products::status.eq(ProductStatus::Approved.to_string()))
                .filter(products::visibility.eq(Visibility::Public.to_string()))
                .select((ProductEntity::as_select(), ProducerSnippetEntity::as_select()))
                .into_boxed();

            if let Some(nickname) = filter.nickname {
                query = query.filter(users::nickname.eq(nickname.to_lowercase()));
            }
            if let Some(product_type) = filter.product_type {
                query = query.filter(products::product_type.eq(product_type.to_string()));
            }

            query = match filter.sort {
                ProductSort::Newest => query.order(products::created_at.desc()),
                ProductSort::Oldest => query.order(products::created_at.asc()),
                ProductSort::PriceAsc => {
                    query.order((products::price_basic.asc(), products::created_at.desc()))
                }
                ProductSort::PriceDesc => {
                    query.order((products::price_basic.desc(), products::created_at.desc()))
                }
                ProductSort::Popular => {
                    query.order((products::play_count.desc(), products::created_at.desc()))
                }
            };

            let results = query.load::<(ProductEntity, ProducerSnippetEntity)>(&mut conn)?;
            Ok(results)
        })
        .await??)
    }

    async fn find_by_id(&self, product_id: Uuid) -> Result<Option<ProductEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ProductEntity>> {
            let mut conn = db_pool.get()?;

            let result = products::table
                .filter(products::id.eq(product_id))
                .select(ProductEntity::as_select())
                .first::<ProductEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn find_owned(&self, product_id: Uuid, producer_id: Uuid) -> Result<Option<ProductEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ProductEntity>> {
            let mut conn = db_pool.get()?;

            let result = products::table
                .filter(products::id.eq(product_id))
                .filter(products::producer_id.eq(producer_id))
                .select(ProductEntity::as_select())
                .first::<ProductEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn find_by_ids(&self, product_ids: Vec<Uuid>) -> Result<Vec<ProductEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<ProductEntity>> {
            let mut conn = db_pool.get()?;

            let results = products::table
                .filter(products::id.eq_any(product_ids))
                .select(ProductEntity::as_select())
                .load::<ProductEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn insert(&self, entity: InsertProductEntity) -> Result<ProductEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<ProductEntity> {
            let mut conn = db_pool.get()?;

            let result = insert_into(products::table)
                .values(&entity)
                .returning(ProductEntity::as_returning())
                .get_result::<ProductEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn update(
        &self,
        product_id: Uuid,
        producer_id: Uuid,
        changes: UpdateProductEntity,
    ) -> Result<Option<ProductEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ProductEntity>> {
            let mut conn = db_pool.get()?;

            let result = update(
                products::table
                    .filter(products::id.eq(product_id))
                    .filter(products::producer_id.eq(producer_id)),
            )
            .set(&changes)
            .returning(ProductEntity::as_returning())
            .get_result::<ProductEntity>(&mut conn)
            .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn increment_play_count(&self, product_id: Uuid) -> Result<Option<i32>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<i32>> {
            let mut conn = db_pool.get()?;

            let result = update(products::table.filter(products::id.eq(product_id)))
                .set(products::play_count.eq(products::play_count + 1))
                .returning(products::play_count)
                .get_result::<i32>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }
}
