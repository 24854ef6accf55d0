use std::sync::Arc;

use chrono::Utc;
use offszn::{
    domain::{
        repositories::reels::ReelRepository,
        value_objects::reels::{CreateReelRequest, ReelDto, UpdateReelRequest, cloudinary_public_id},
    },
    media::cloudinary_client::CloudinaryResource,
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::avatars::CloudinaryGateway;

#[derive(Debug, Error)]
pub enum ReelError {
    #[error("{0}")]
    InvalidReel(String),
    #[error("reel not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReelError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReelError::InvalidReel(_) => StatusCode::BAD_REQUEST,
            ReelError::NotFound => StatusCode::NOT_FOUND,
            ReelError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReelError>;

pub struct ReelUseCase<R, C>
where
    R: ReelRepository + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    reel_repo: Arc<R>,
    cloudinary: Arc<C>,
}

impl<R, C> ReelUseCase<R, C>
where
    R: ReelRepository + Send + Sync + 'static,
    C: CloudinaryGateway + 'static,
{
    pub fn new(reel_repo: Arc<R>, cloudinary: Arc<C>) -> Self {
        Self {
            reel_repo,
            cloudinary,
        }
    }

    pub async fn list(&self, owner_id: Uuid) -> UseCaseResult<Vec<ReelDto>> {
        let reels = self.reel_repo.list_by_owner(owner_id).await.map_err(|err| {
            error!(%owner_id, db_error = ?err, "reels: failed to list reels");
            ReelError::Internal(err)
        })?;

        Ok(reels.into_iter().map(ReelDto::from).collect())
    }

    pub async fn create(&self, owner_id: Uuid, request: CreateReelRequest) -> UseCaseResult<ReelDto> {
        let entity = request
            .to_entity(owner_id)
            .map_err(|err| ReelError::InvalidReel(err.to_string()))?;

        let reel = self.reel_repo.insert(entity).await.map_err(|err| {
            error!(%owner_id, db_error = ?err, "reels: failed to insert reel");
            ReelError::Internal(err)
        })?;

        info!(%owner_id, reel_id = %reel.id, "reels: reel created");
        Ok(ReelDto::from(reel))
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        reel_id: Uuid,
        request: UpdateReelRequest,
    ) -> UseCaseResult<ReelDto> {
        let current = self
            .reel_repo
            .find_owned(reel_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %reel_id, db_error = ?err, "reels: failed to load reel");
                ReelError::Internal(err)
            })?
            .ok_or(ReelError::NotFound)?;

        let changes = request
            .apply_to(&current, Utc::now())
            .map_err(|err| ReelError::InvalidReel(err.to_string()))?;

        let updated = self
            .reel_repo
            .update(reel_id, owner_id, changes)
            .await
            .map_err(|err| {
                error!(%owner_id, %reel_id, db_error = ?err, "reels: failed to update reel");
                ReelError::Internal(err)
            })?
            .ok_or(ReelError::NotFound)?;

        Ok(ReelDto::from(updated))
    }

    /// Deletes the row, then the Cloudinary video on a best-effort basis.
    pub async fn delete(&self, owner_id: Uuid, reel_id: Uuid) -> UseCaseResult<()> {
        let current = self
            .reel_repo
            .find_owned(reel_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %reel_id, db_error = ?err, "reels: failed to load reel");
                ReelError::Internal(err)
            })?
            .ok_or(ReelError::NotFound)?;

        let deleted = self
            .reel_repo
            .delete(reel_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %reel_id, db_error = ?err, "reels: failed to delete reel");
                ReelError::Internal(err)
            })?;
        if !deleted {
            return Err(ReelError::NotFound);
        }

        if let Some(public_id) = cloudinary_public_id(&current.video_url) {
            if let Err(err) = self
                .cloudinary
                .destroy(&public_id, CloudinaryResource::Video)
                .await
            {
                warn!(%reel_id, %public_id, error = ?err, "reels: failed to delete video from Cloudinary");
            }
        }

        info!(%owner_id, %reel_id, "reels: reel deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use offszn::domain::{entities::reels::ReelEntity, repositories::reels::MockReelRepository};

    use crate::usecases::avatars::MockCloudinaryGateway;

    fn reel(id: Uuid, owner_id: Uuid) -> ReelEntity {
        let now = Utc::now();
        ReelEntity {
            id,
            owner_id,
            video_url: "https://res.cloudinary.com/demo/video/upload/v17/reels/clip.mp4".to_string(),
            product_id: None,
            title: None,
            trim_start: 0.0,
            trim_end: 20.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn short_reels_are_rejected_before_insert() {
        let mut repo = MockReelRepository::new();
        repo.expect_insert().never();

        let err = ReelUseCase::new(Arc::new(repo), Arc::new(MockCloudinaryGateway::new()))
            .create(
                Uuid::new_v4(),
                CreateReelRequest {
                    video_url: "https://res.cloudinary.com/demo/video/upload/clip.mp4".to_string(),
                    product_id: None,
                    title: None,
                    trim_start: 0.0,
                    trim_end: 4.0,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReelError::InvalidReel(_)));
    }

    #[tokio::test]
    async fn delete_survives_a_cloudinary_failure() {
        let owner_id = Uuid::new_v4();
        let reel_id = Uuid::new_v4();

        let mut repo = MockReelRepository::new();
        repo.expect_find_owned().returning(|id, owner| {
            let row = reel(id, owner);
            Box::pin(async move { Ok(Some(row)) })
        });
        repo.expect_delete()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(true) }));

        let mut cloudinary = MockCloudinaryGateway::new();
        cloudinary
            .expect_destroy()
            .withf(|public_id, resource| {
                public_id == "reels/clip" && *resource == CloudinaryResource::Video
            })
            .times(1)
            .returning(|_, _| Err(anyhow!("cloudinary down")));

        ReelUseCase::new(Arc::new(repo), Arc::new(cloudinary))
            .delete(owner_id, reel_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn updating_someone_elses_reel_is_not_found() {
        let mut repo = MockReelRepository::new();
        repo.expect_find_owned()
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        repo.expect_update().never();

        let err = ReelUseCase::new(Arc::new(repo), Arc::new(MockCloudinaryGateway::new()))
            .update(Uuid::new_v4(), Uuid::new_v4(), UpdateReelRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ReelError::NotFound));
    }
}
