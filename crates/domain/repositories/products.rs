use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        products::{InsertProductEntity, ProductEntity, UpdateProductEntity},
        users::ProducerSnippetEntity,
    },
    value_objects::products::ProductFilter,
};

#[async_trait]
#[automock]
pub trait ProductRepository {
    /// Approved, public products joined with their producer.
    async fn find_approved(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<(ProductEntity, ProducerSnippetEntity)>>;

    async fn find_by_id(&self, product_id: Uuid) -> Result<Option<ProductEntity>>;

    async fn find_owned(&self, product_id: Uuid, producer_id: Uuid) -> Result<Option<ProductEntity>>;

    async fn find_by_ids(&self, product_ids: Vec<Uuid>) -> Result<Vec<ProductEntity>>;

    async fn insert(&self, entity: InsertProductEntity) -> Result<ProductEntity>;

    /// Returns `None` when no row matches both the id and the producer.
    async fn update(
        &self,
        product_id: Uuid,
        producer_id: Uuid,
        changes: UpdateProductEntity,
    ) -> Result<Option<ProductEntity>>;

    async fn increment_play_count(&self, product_id: Uuid) -> Result<Option<i32>>;
}
