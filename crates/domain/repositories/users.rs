use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::{CompleteProfileEntity, UserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn complete_profile(
        &self,
        user_id: Uuid,
        changes: CompleteProfileEntity,
    ) -> Result<Option<UserEntity>>;

    async fn update_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<()>;
}
