use std::collections::HashSet;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::collaborations::CollabInvitationEntity,
    value_objects::enums::invitation_statuses::InvitationStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollaboratorShare {
    pub email: String,
    pub percentage: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceCollaboratorsRequest {
    pub owner_percentage: i32,
    #[serde(default)]
    pub collaborators: Vec<CollaboratorShare>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondInvitationRequest {
    pub accept: bool,
}

/// Checks a royalty split and returns the collaborators with normalized emails.
///
/// The owner share plus every collaborator share must add up to exactly 100.
pub fn validate_split(
    owner_percentage: i32,
    collaborators: &[CollaboratorShare],
) -> Result<Vec<CollaboratorShare>> {
    if !(0..=100).contains(&owner_percentage) {
        bail!("Owner percentage must be between 0 and 100");
    }

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(collaborators.len());
    for share in collaborators {
        let email = share.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            bail!("Invalid collaborator email: {}", share.email);
        }
        if !(1..=99).contains(&share.percentage) {
            bail!("Collaborator percentage must be between 1 and 99");
        }
        if !seen.insert(email.clone()) {
            bail!("Collaborator {} is listed twice", email);
        }
        normalized.push(CollaboratorShare {
            email,
            percentage: share.percentage,
        });
    }

    let total = owner_percentage + normalized.iter().map(|share| share.percentage).sum::<i32>();
    if total != 100 {
        bail!("Split must add up to 100%, got {}%", total);
    }

    Ok(normalized)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollabInvitationDto {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub collaborator_email: String,
    pub collaborator_id: Option<Uuid>,
    pub product_id: Uuid,
    pub percentage: i32,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<CollabInvitationEntity> for CollabInvitationDto {
    fn from(value: CollabInvitationEntity) -> Self {
        Self {
            id: value.id,
            inviter_id: value.inviter_id,
            collaborator_email: value.collaborator_email,
            collaborator_id: value.collaborator_id,
            product_id: value.product_id,
            percentage: value.percentage,
            status: InvitationStatus::from_str(&value.status),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollaborationsDto {
    pub sent: Vec<CollabInvitationDto>,
    pub received: Vec<CollabInvitationDto>,
}
