use std::sync::Arc;

use offszn::domain::{
    entities::collaborations::InsertCollabInvitationEntity,
    repositories::{
        collaborations::CollaborationRepository, products::ProductRepository,
        users::UserRepository,
    },
    value_objects::{
        collaborations::{
            CollabInvitationDto, CollaborationsDto, ReplaceCollaboratorsRequest, validate_split,
        },
        enums::invitation_statuses::InvitationStatus,
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CollaborationError {
    #[error("{0}")]
    InvalidSplit(String),
    #[error("product not found")]
    ProductNotFound,
    #[error("invitation not found")]
    InvitationNotFound,
    #[error("invitation is addressed to someone else")]
    NotInvitee,
    #[error("invitation was already answered")]
    AlreadyAnswered,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CollaborationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CollaborationError::InvalidSplit(_) => StatusCode::BAD_REQUEST,
            CollaborationError::ProductNotFound | CollaborationError::InvitationNotFound => {
                StatusCode::NOT_FOUND
            }
            CollaborationError::NotInvitee => StatusCode::FORBIDDEN,
            CollaborationError::AlreadyAnswered => StatusCode::CONFLICT,
            CollaborationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CollaborationError>;

pub struct CollaborationUseCase<C, P, U>
where
    C: CollaborationRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    collaboration_repo: Arc<C>,
    product_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<C, P, U> CollaborationUseCase<C, P, U>
where
    C: CollaborationRepository + Send + Sync + 'static,
    P: ProductRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(collaboration_repo: Arc<C>, product_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            collaboration_repo,
            product_repo,
            user_repo,
        }
    }

    pub async fn overview(&self, user_id: Uuid, email: Option<String>) -> UseCaseResult<CollaborationsDto> {
        let sent = self
            .collaboration_repo
            .list_sent(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "collaborations: failed to list sent invitations");
                CollaborationError::Internal(err)
            })?;

        let received = self
            .collaboration_repo
            .list_received(user_id, email.map(|email| email.to_lowercase()))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "collaborations: failed to list received invitations");
                CollaborationError::Internal(err)
            })?;

        Ok(CollaborationsDto {
            sent: sent.into_iter().map(CollabInvitationDto::from).collect(),
            received: received.into_iter().map(CollabInvitationDto::from).collect(),
        })
    }

    /// Replaces the whole split of an owned product.
    pub async fn replace_collaborators(
        &self,
        owner_id: Uuid,
        product_id: Uuid,
        request: ReplaceCollaboratorsRequest,
    ) -> UseCaseResult<Vec<CollabInvitationDto>> {
        let shares = validate_split(request.owner_percentage, &request.collaborators)
            .map_err(|err| CollaborationError::InvalidSplit(err.to_string()))?;

        self.product_repo
            .find_owned(product_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %product_id, db_error = ?err, "collaborations: failed to load product");
                CollaborationError::Internal(err)
            })?
            .ok_or(CollaborationError::ProductNotFound)?;

        let mut invitations = Vec::with_capacity(shares.len());
        for share in shares {
            let collaborator_id = self
                .user_repo
                .find_by_email(&share.email)
                .await
                .map_err(|err| {
                    error!(%owner_id, db_error = ?err, "collaborations: failed to match collaborator");
                    CollaborationError::Internal(err)
                })?
                .map(|user| user.id);

            invitations.push(InsertCollabInvitationEntity {
                inviter_id: owner_id,
                collaborator_email: share.email,
                collaborator_id,
                product_id,
                percentage: share.percentage,
                status: InvitationStatus::Pending.to_string(),
            });
        }

        let saved = self
            .collaboration_repo
            .replace_for_product(product_id, invitations)
            .await
            .map_err(|err| {
                error!(%owner_id, %product_id, db_error = ?err, "collaborations: failed to save split");
                CollaborationError::Internal(err)
            })?;

        info!(%owner_id, %product_id, count = saved.len(), "collaborations: split replaced");
        Ok(saved.into_iter().map(CollabInvitationDto::from).collect())
    }

    pub async fn respond(
        &self,
        user_id: Uuid,
        email: Option<String>,
        invitation_id: Uuid,
        accept: bool,
    ) -> UseCaseResult<CollabInvitationDto> {
        let invitation = self
            .collaboration_repo
            .find_by_id(invitation_id)
            .await
            .map_err(|err| {
                error!(%user_id, %invitation_id, db_error = ?err, "collaborations: failed to load invitation");
                CollaborationError::Internal(err)
            })?
            .ok_or(CollaborationError::InvitationNotFound)?;

        let is_invitee = match invitation.collaborator_id {
            Some(collaborator_id) => collaborator_id == user_id,
            None => email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(&invitation.collaborator_email)),
        };
        if !is_invitee {
            return Err(CollaborationError::NotInvitee);
        }
        if InvitationStatus::from_str(&invitation.status) != InvitationStatus::Pending {
            return Err(CollaborationError::AlreadyAnswered);
        }

        let status = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Rejected
        };

        let updated = self
            .collaboration_repo
            .respond(invitation_id, user_id, status)
            .await
            .map_err(|err| {
                error!(%user_id, %invitation_id, db_error = ?err, "collaborations: failed to record answer");
                CollaborationError::Internal(err)
            })?;

        info!(%user_id, %invitation_id, %status, "collaborations: invitation answered");
        Ok(CollabInvitationDto::from(updated))
    }
}
