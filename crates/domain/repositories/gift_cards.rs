use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity};

#[async_trait]
#[automock]
pub trait GiftCardRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<GiftCardEntity>>;

    /// Records `month` as the owner's last spin and inserts the card, both only if
    /// the owner has not spun in `month` yet. `None` means the month was already claimed.
    async fn claim_monthly_spin(
        &self,
        owner_id: Uuid,
        month: String,
        card: InsertGiftCardEntity,
    ) -> Result<Option<GiftCardEntity>>;

    /// Same as [`GiftCardRepository::claim_monthly_spin`] for the one-time welcome card.
    async fn claim_welcome(
        &self,
        owner_id: Uuid,
        card: InsertGiftCardEntity,
    ) -> Result<Option<GiftCardEntity>>;
}
