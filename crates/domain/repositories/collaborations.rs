use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::collaborations::{CollabInvitationEntity, InsertCollabInvitationEntity},
    value_objects::enums::invitation_statuses::InvitationStatus,
};

#[async_trait]
#[automock]
pub trait CollaborationRepository {
    async fn list_sent(&self, inviter_id: Uuid) -> Result<Vec<CollabInvitationEntity>>;

    /// Invitations matched to the user id or addressed to the email.
    async fn list_received(
        &self,
        collaborator_id: Uuid,
        email: Option<String>,
    ) -> Result<Vec<CollabInvitationEntity>>;

    /// Replaces every invitation of the product in one transaction.
    async fn replace_for_product(
        &self,
        product_id: Uuid,
        invitations: Vec<InsertCollabInvitationEntity>,
    ) -> Result<Vec<CollabInvitationEntity>>;

    async fn find_by_id(&self, invitation_id: Uuid) -> Result<Option<CollabInvitationEntity>>;

    async fn respond(
        &self,
        invitation_id: Uuid,
        collaborator_id: Uuid,
        status: InvitationStatus,
    ) -> Result<CollabInvitationEntity>;
}
