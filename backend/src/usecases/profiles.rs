use std::sync::Arc;

use chrono::Utc;
use offszn::domain::{
    entities::users::CompleteProfileEntity,
    repositories::users::UserRepository,
    value_objects::profiles::{
        CompleteProfileRequest, CurrentUserDto, NicknameAvailabilityDto, PublicProfileDto,
        normalize_nickname,
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0}")]
    InvalidProfile(String),
    #[error("profile not found")]
    NotFound,
    #[error("nickname is already taken")]
    NicknameTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProfileError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ProfileError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
            ProfileError::NotFound => StatusCode::NOT_FOUND,
            ProfileError::NicknameTaken => StatusCode::CONFLICT,
            ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ProfileError>;

pub struct ProfileUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn public_profile(&self, nickname: &str) -> UseCaseResult<PublicProfileDto> {
        let nickname = nickname.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_nickname(&nickname)
            .await
            .map_err(|err| {
                error!(%nickname, db_error = ?err, "profiles: failed to load profile");
                ProfileError::Internal(err)
            })?
            .ok_or(ProfileError::NotFound)?;

        Ok(PublicProfileDto::from(user))
    }

    pub async fn current_user(&self, user_id: Uuid) -> UseCaseResult<CurrentUserDto> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "profiles: failed to load current user");
                ProfileError::Internal(err)
            })?
            .ok_or(ProfileError::NotFound)?;

        Ok(CurrentUserDto::from(user))
    }

    pub async fn nickname_available(&self, nickname: &str) -> UseCaseResult<NicknameAvailabilityDto> {
        let nickname =
            normalize_nickname(nickname).map_err(|err| ProfileError::InvalidProfile(err.to_string()))?;

        let existing = self
            .user_repo
            .find_by_nickname(&nickname)
            .await
            .map_err(|err| {
                error!(%nickname, db_error = ?err, "profiles: failed to check nickname");
                ProfileError::Internal(err)
            })?;

        Ok(NicknameAvailabilityDto {
            available: existing.is_none(),
            nickname,
        })
    }

    pub async fn complete_profile(
        &self,
        user_id: Uuid,
        request: CompleteProfileRequest,
    ) -> UseCaseResult<CurrentUserDto> {
        let profile = request
            .validate()
            .map_err(|err| ProfileError::InvalidProfile(err.to_string()))?;

        let holder = self
            .user_repo
            .find_by_nickname(&profile.nickname)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "profiles: failed to check nickname");
                ProfileError::Internal(err)
            })?;
        if holder.is_some_and(|holder| holder.id != user_id) {
            return Err(ProfileError::NicknameTaken);
        }

        let changes = CompleteProfileEntity {
            nickname: Some(profile.nickname),
            display_name: profile.display_name,
            bio: profile.bio,
            onboarding_completed: true,
            updated_at: Utc::now(),
        };

        let user = self
            .user_repo
            .complete_profile(user_id, changes)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "profiles: failed to complete profile");
                ProfileError::Internal(err)
            })?
            .ok_or(ProfileError::NotFound)?;

        info!(%user_id, "profiles: onboarding completed");
        Ok(CurrentUserDto::from(user))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use offszn::domain::{entities::users::UserEntity, repositories::users::MockUserRepository};

    pub(crate) fn sample_user(id: Uuid, nickname: &str) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id,
            email: Some(format!("{nickname}@example.com")),
            nickname: Some(nickname.to_string()),
            display_name: None,
            bio: None,
            avatar_url: None,
            plan: "free".to_string(),
            onboarding_completed: false,
            welcome_claimed: false,
            last_spin_month: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn nickname_held_by_another_user_conflicts() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_nickname().returning(|nickname| {
            let user = sample_user(Uuid::new_v4(), nickname);
            Box::pin(async move { Ok(Some(user)) })
        });
        repo.expect_complete_profile().never();

        let usecase = ProfileUseCase::new(Arc::new(repo));
        let err = usecase
            .complete_profile(
                Uuid::new_v4(),
                CompleteProfileRequest {
                    nickname: "Metro".to_string(),
                    display_name: None,
                    bio: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProfileError::NicknameTaken));
    }

    #[tokio::test]
    async fn keeping_own_nickname_completes_onboarding() {
        let user_id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_nickname().returning(move |nickname| {
            let user = sample_user(user_id, nickname);
            Box::pin(async move { Ok(Some(user)) })
        });
        repo.expect_complete_profile()
            .withf(|_, changes| {
                changes.nickname.as_deref() == Some("metro.boomin")
                    && changes.display_name.as_deref() == Some("Metro")
                    && changes.onboarding_completed
            })
            .returning(move |_, _| {
                let mut user = sample_user(user_id, "metro.boomin");
                user.onboarding_completed = true;
                Box::pin(async move { Ok(Some(user)) })
            });

        let usecase = ProfileUseCase::new(Arc::new(repo));
        let user = usecase
            .complete_profile(
                user_id,
                CompleteProfileRequest {
                    nickname: " Metro.Boomin ".to_string(),
                    display_name: Some("Metro".to_string()),
                    bio: Some("   ".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(user.onboarding_completed);
    }

    #[tokio::test]
    async fn availability_reports_free_nicknames() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_nickname()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = ProfileUseCase::new(Arc::new(repo));
        let availability = usecase.nickname_available("New_Producer").await.unwrap();

        assert!(availability.available);
        assert_eq!(availability.nickname, "new_producer");
    }

    #[tokio::test]
    async fn invalid_nickname_is_rejected_before_lookup() {
        let usecase = ProfileUseCase::new(Arc::new(MockUserRepository::new()));

        let err = usecase.nickname_available("no spaces!").await.unwrap_err();

        assert!(matches!(err, ProfileError::InvalidProfile(_)));
    }
}
