use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::reels::{InsertReelEntity, ReelEntity, UpdateReelEntity};

#[async_trait]
#[automock]
pub trait ReelRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ReelEntity>>;

    async fn find_owned(&self, reel_id: Uuid, owner_id: Uuid) -> Result<Option<ReelEntity>>;

    async fn insert(&self, entity: InsertReelEntity) -> Result<ReelEntity>;

    async fn update(
        &self,
        reel_id: Uuid,
        owner_id: Uuid,
        changes: UpdateReelEntity,
    ) -> Result<Option<ReelEntity>>;

    async fn delete(&self, reel_id: Uuid, owner_id: Uuid) -> Result<bool>;
}
