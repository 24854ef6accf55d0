use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::collab_invitations},
};
use domain::{
    entities::collaborations::{CollabInvitationEntity, InsertCollabInvitationEntity},
    repositories::collaborations::CollaborationRepository,
    value_objects::enums::invitation_statuses::InvitationStatus,
};

pub struct CollaborationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CollaborationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CollaborationRepository for CollaborationPostgres {
    async fn list_sent(&self, inviter_id: Uuid) -> Result<Vec<CollabInvitationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<CollabInvitationEntity>> {
            let mut conn = db_pool.get()?;

            let results = collab_invitations::table
                .filter(collab_invitations::inviter_id.eq(inviter_id))
                .order(collab_invitations::created_at.desc())
                .select(CollabInvitationEntity::as_select())
                .load::<CollabInvitationEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn list_received(
        &self,
        collaborator_id: Uuid,
        email: Option<String>,
    ) -> Result<Vec<CollabInvitationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<CollabInvitationEntity>> {
            let mut conn = db_pool.get()?;

            let mut query = collab_invitations::table
                .order(collab_invitations::created_at.desc())
                .select(CollabInvitationEntity::as_select())
                .into_boxed();

            query = match email {
                Some(email) => query.filter(
                    collab_invitations::collaborator_id
                        .eq(collaborator_id)
                        .or(collab_invitations::collaborator_email
                            .eq(email.to_lowercase())
                            .nullable()),
                ),
                None => query.filter(collab_invitations::collaborator_id.eq(collaborator_id)),
            };

            let results = query.load::<CollabInvitationEntity>(&mut conn)?;
            Ok(results)
        })
        .await??)
    }

    async fn replace_for_product(
        &self,
        product_id: Uuid,
        invitations: Vec<InsertCollabInvitationEntity>,
    ) -> Result<Vec<CollabInvitationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<CollabInvitationEntity>> {
            let mut conn = db_pool.get()?;

            let result = conn.transaction::<Vec<CollabInvitationEntity>, diesel::result::Error, _>(
                |tx| {
                    delete(
                        collab_invitations::table
                            .filter(collab_invitations::product_id.eq(product_id)),
                    )
                    .execute(tx)?;

                    if invitations.is_empty() {
                        return Ok(Vec::new());
                    }

                    insert_into(collab_invitations::table)
                        .values(&invitations)
                        .returning(CollabInvitationEntity::as_returning())
                        .get_results::<CollabInvitationEntity>(tx)
                },
            )?;

            Ok(result)
        })
        .await??)
    }

    async fn find_by_id(&self, invitation_id: Uuid) -> Result<Option<CollabInvitationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<CollabInvitationEntity>> {
            let mut conn = db_pool.get()?;

            let result = collab_invitations::table
                .filter(collab_invitations::id.eq(invitation_id))
                .select(CollabInvitationEntity::as_select())
                .first::<CollabInvitationEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn respond(
        &self,
        invitation_id: Uuid,
        collaborator_id: Uuid,
        status: InvitationStatus,
    ) -> Result<CollabInvitationEntity> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        Ok(task::spawn_blocking(move || -> Result<CollabInvitationEntity> {
            let mut conn = db_pool.get()?;

            let result = update(
                collab_invitations::table.filter(collab_invitations::id.eq(invitation_id)),
            )
            .set((
                collab_invitations::status.eq(status.to_string()),
                collab_invitations::collaborator_id.eq(Some(collaborator_id)),
                collab_invitations::updated_at.eq(now),
            ))
            .returning(CollabInvitationEntity::as_returning())
            .get_result::<CollabInvitationEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}
