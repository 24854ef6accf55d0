use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::collab_invitations;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = collab_invitations)]
pub struct CollabInvitationEntity {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub collaborator_email: String,
    pub collaborator_id: Option<Uuid>, // matched once the email belongs to a user
    pub product_id: Uuid,
    pub percentage: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = collab_invitations)]
pub struct InsertCollabInvitationEntity {
    pub inviter_id: Uuid,
    pub collaborator_email: String,
    pub collaborator_id: Option<Uuid>,
    pub product_id: Uuid,
    pub percentage: i32,
    pub status: String,
}
