use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::upload_intents::UploadIntentEntity, value_objects::storage::StoredObject,
};

#[async_trait]
#[automock]
pub trait UploadIntentRepository {
    async fn create(&self, owner_id: Uuid, product_id: Option<Uuid>) -> Result<Uuid>;

    async fn append_object(&self, intent_id: Uuid, object: StoredObject) -> Result<()>;

    async fn finalize(&self, intent_id: Uuid, product_id: Uuid) -> Result<()>;

    async fn list_stale_pending(
        &self,
        older_than: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<UploadIntentEntity>>;

    /// Whether any product row still points at the object.
    async fn is_object_referenced(&self, object: StoredObject) -> Result<bool>;

    async fn mark_reconciled(&self, intent_id: Uuid) -> Result<()>;
}
