use std::sync::Arc;

use chrono::{DateTime, Utc};
use offszn::domain::{
    entities::users::UserEntity,
    repositories::{gift_cards::GiftCardRepository, users::UserRepository},
    value_objects::gift_cards::{
        GiftCardDto, GiftCardPrize, GiftCardsOverviewDto, WELCOME_PRIZE, can_spin, draw_prize,
        spin_month_key,
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GiftCardError {
    #[error("already spun this month")]
    AlreadySpunThisMonth,
    #[error("welcome gift already claimed")]
    WelcomeAlreadyClaimed,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GiftCardError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            GiftCardError::AlreadySpunThisMonth | GiftCardError::WelcomeAlreadyClaimed => {
                StatusCode::CONFLICT
            }
            GiftCardError::UserNotFound => StatusCode::NOT_FOUND,
            GiftCardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, GiftCardError>;

pub struct GiftCardUseCase<G, U>
where
    G: GiftCardRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    gift_card_repo: Arc<G>,
    user_repo: Arc<U>,
}

impl<G, U> GiftCardUseCase<G, U>
where
    G: GiftCardRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(gift_card_repo: Arc<G>, user_repo: Arc<U>) -> Self {
        Self {
            gift_card_repo,
            user_repo,
        }
    }

    pub async fn overview(&self, user_id: Uuid) -> UseCaseResult<GiftCardsOverviewDto> {
        let user = self.require_user(user_id).await?;

        let cards = self
            .gift_card_repo
            .list_by_owner(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "gift_cards: failed to list cards");
                GiftCardError::Internal(err)
            })?;

        Ok(GiftCardsOverviewDto {
            cards: cards.into_iter().map(GiftCardDto::from).collect(),
            can_spin: can_spin(user.last_spin_month.as_deref(), Utc::now()),
            welcome_claimed: user.welcome_claimed,
        })
    }

    async fn require_user(&self, user_id: Uuid) -> UseCaseResult<UserEntity> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "gift_cards: failed to load user");
                GiftCardError::Internal(err)
            })?
            .ok_or(GiftCardError::UserNotFound)
    }

    pub async fn claim_welcome(&self, user_id: Uuid) -> UseCaseResult<GiftCardDto> {
        let claimed = self
            .gift_card_repo
            .claim_welcome(user_id, WELCOME_PRIZE.to_entity(user_id))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "gift_cards: failed to claim welcome card");
                GiftCardError::Internal(err)
            })?;
        // No row updated: either the card was claimed or the user does not exist.
        let Some(card) = claimed else {
            self.require_user(user_id).await?;
            return Err(GiftCardError::WelcomeAlreadyClaimed);
        };

        info!(%user_id, card_id = %card.id, "gift_cards: welcome card claimed");
        Ok(GiftCardDto::from(card))
    }

    pub async fn spin(&self, user_id: Uuid) -> UseCaseResult<GiftCardDto> {
        let prize = draw_prize(&mut rand::thread_rng())?;
        self.spin_with(user_id, Utc::now(), prize).await
    }

    /// Awards `prize` unless the user already spun in the month of `now`.
    ///
    /// The month gate is enforced by the conditional claim, so two racing spins
    /// yield one card and one `AlreadySpunThisMonth`.
    pub async fn spin_with(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        prize: GiftCardPrize,
    ) -> UseCaseResult<GiftCardDto> {
        let month = spin_month_key(now);

        let claimed = self
            .gift_card_repo
            .claim_monthly_spin(user_id, month.clone(), prize.to_entity(user_id))
            .await
            .map_err(|err| {
                error!(%user_id, %month, db_error = ?err, "gift_cards: failed to claim spin");
                GiftCardError::Internal(err)
            })?;
        let Some(card) = claimed else {
            self.require_user(user_id).await?;
            return Err(GiftCardError::AlreadySpunThisMonth);
        };

        info!(%user_id, %month, card_type = prize.card_type, "gift_cards: spin awarded");
        Ok(GiftCardDto::from(card))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use chrono::TimeZone;
    use offszn::domain::{
        entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity},
        repositories::{gift_cards::MockGiftCardRepository, users::MockUserRepository},
        value_objects::gift_cards::SPIN_PRIZES,
    };

    use crate::usecases::profiles::tests::sample_user;

    fn saved(card: InsertGiftCardEntity) -> GiftCardEntity {
        GiftCardEntity {
            id: Uuid::new_v4(),
            owner_id: card.owner_id,
            card_type: card.card_type,
            label: card.label,
            value: card.value,
            is_discount: card.is_discount,
            is_used: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn second_spin_in_the_same_month_is_rejected() {
        let user_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let claimed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let mut repo = MockGiftCardRepository::new();
        let months = Arc::clone(&claimed);
        repo.expect_claim_monthly_spin()
            .times(2)
            .returning(move |_, month, card| {
                let mut months = months.lock().unwrap();
                let result = if months.contains(&month) {
                    None
                } else {
                    months.push(month);
                    Some(saved(card))
                };
                Box::pin(async move { Ok(result) })
            });

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(1).returning(|id| {
            let user = sample_user(id, "spinner");
            Box::pin(async move { Ok(Some(user)) })
        });

        let usecase = GiftCardUseCase::new(Arc::new(repo), Arc::new(users));

        let card = usecase.spin_with(user_id, now, SPIN_PRIZES[0]).await.unwrap();
        assert_eq!(card.card_type, SPIN_PRIZES[0].card_type);

        let err = usecase
            .spin_with(user_id, now, SPIN_PRIZES[1])
            .await
            .unwrap_err();
        assert!(matches!(err, GiftCardError::AlreadySpunThisMonth));
        assert_eq!(err.to_string(), "already spun this month");
        assert_eq!(*claimed.lock().unwrap(), vec!["2024-06".to_string()]);
    }

    #[tokio::test]
    async fn welcome_card_is_claimed_once() {
        let mut repo = MockGiftCardRepository::new();
        repo.expect_claim_welcome()
            .withf(|_, card| card.card_type == WELCOME_PRIZE.card_type)
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let user = sample_user(id, "claimer");
            Box::pin(async move { Ok(Some(user)) })
        });

        let err = GiftCardUseCase::new(Arc::new(repo), Arc::new(users))
            .claim_welcome(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, GiftCardError::WelcomeAlreadyClaimed));
    }

    #[tokio::test]
    async fn unknown_user_gets_not_found_instead_of_conflict() {
        let mut repo = MockGiftCardRepository::new();
        repo.expect_claim_monthly_spin()
            .returning(|_, _, _| Box::pin(async move { Ok(None) }));
        repo.expect_claim_welcome()
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(2)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let usecase = GiftCardUseCase::new(Arc::new(repo), Arc::new(users));
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        let spin = usecase
            .spin_with(Uuid::new_v4(), now, SPIN_PRIZES[0])
            .await
            .unwrap_err();
        assert!(matches!(spin, GiftCardError::UserNotFound));
        assert_eq!(spin.status_code(), axum::http::StatusCode::NOT_FOUND);

        let welcome = usecase.claim_welcome(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(welcome, GiftCardError::UserNotFound));
    }

    #[tokio::test]
    async fn overview_reports_the_spin_gate() {
        let user_id = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |id| {
            let mut user = sample_user(id, "spinner");
            user.welcome_claimed = true;
            user.last_spin_month = Some(spin_month_key(Utc::now()));
            Box::pin(async move { Ok(Some(user)) })
        });

        let mut repo = MockGiftCardRepository::new();
        repo.expect_list_by_owner().returning(move |owner_id| {
            let card = saved(WELCOME_PRIZE.to_entity(owner_id));
            Box::pin(async move { Ok(vec![card]) })
        });

        let overview = GiftCardUseCase::new(Arc::new(repo), Arc::new(users))
            .overview(user_id)
            .await
            .unwrap();

        assert!(!overview.can_spin);
        assert!(overview.welcome_claimed);
        assert_eq!(overview.cards.len(), 1);
    }
}
