use std::sync::Arc;

use offszn::domain::{
    repositories::products::ProductRepository,
    value_objects::products::{ProductDto, ProductQuery},
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{0}")]
    InvalidQuery(String),
    #[error("product not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProductError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ProductError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ProductError::NotFound => StatusCode::NOT_FOUND,
            ProductError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ProductError>;

pub struct ProductCatalogUseCase<P>
where
    P: ProductRepository + Send + Sync + 'static,
{
    product_repo: Arc<P>,
}

impl<P> ProductCatalogUseCase<P>
where
    P: ProductRepository + Send + Sync + 'static,
{
    pub fn new(product_repo: Arc<P>) -> Self {
        Self { product_repo }
    }

    pub async fn list(&self, query: ProductQuery) -> UseCaseResult<Vec<ProductDto>> {
        let filter = query
            .to_filter()
            .map_err(|err| ProductError::InvalidQuery(err.to_string()))?;

        let rows = self
            .product_repo
            .find_approved(filter)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "products: failed to list catalog");
                ProductError::Internal(err)
            })?;

        info!(count = rows.len(), "products: catalog loaded");
        Ok(rows
            .into_iter()
            .map(|(product, producer)| ProductDto::from_entity(product, Some(producer)))
            .collect())
    }

    pub async fn record_play(&self, product_id: Uuid) -> UseCaseResult<i32> {
        self.product_repo
            .increment_play_count(product_id)
            .await
            .map_err(|err| {
                error!(%product_id, db_error = ?err, "products: failed to increment play count");
                ProductError::Internal(err)
            })?
            .ok_or(ProductError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use offszn::domain::{
        entities::{products::ProductEntity, users::ProducerSnippetEntity},
        repositories::products::MockProductRepository,
        value_objects::enums::{product_sorts::ProductSort, product_types::ProductType},
    };

    fn sample_product() -> ProductEntity {
        let now = Utc::now();
        ProductEntity {
            id: Uuid::new_v4(),
            producer_id: Uuid::new_v4(),
            name: "Night Drive".to_string(),
            description: None,
            product_type: "beat".to_string(),
            status: "approved".to_string(),
            visibility: "public".to_string(),
            tags: vec!["trap".to_string()],
            bpm: Some(140),
            musical_key: Some("Am".to_string()),
            image_url: Some("https://x.supabase.co/storage/v1/object/public/products/a.png".to_string()),
            mp3_url: None,
            wav_url: Some("u/wav/1_a.wav".to_string()),
            stems_url: None,
            price_basic: 24.99,
            price_premium: None,
            price_stems: None,
            price_exclusive: None,
            licenses: serde_json::json!({}),
            is_free: false,
            discount_amount: None,
            discount_type: None,
            play_count: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_passes_typed_filter_and_embeds_producer() {
        let mut repo = MockProductRepository::new();
        let product = sample_product();

        repo.expect_find_approved()
            .withf(|filter| {
                filter.product_type == Some(ProductType::Beat)
                    && filter.sort == ProductSort::Popular
                    && filter.nickname.as_deref() == Some("metro")
            })
            .returning(move |_| {
                let product = product.clone();
                Box::pin(async move {
                    Ok(vec![(
                        product,
                        ProducerSnippetEntity {
                            nickname: Some("metro".to_string()),
                            avatar_url: None,
                        },
                    )])
                })
            });

        let usecase = ProductCatalogUseCase::new(Arc::new(repo));
        let products = usecase
            .list(ProductQuery {
                nickname: Some("metro".to_string()),
                product_type: Some("beat".to_string()),
                sort: Some("popular".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(
            products[0].producer.as_ref().and_then(|p| p.nickname.as_deref()),
            Some("metro")
        );
    }

    #[tokio::test]
    async fn unknown_sort_is_a_bad_request() {
        let repo = MockProductRepository::new();
        let usecase = ProductCatalogUseCase::new(Arc::new(repo));

        let err = usecase
            .list(ProductQuery {
                nickname: None,
                product_type: None,
                sort: Some("random".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn play_on_unknown_product_is_not_found() {
        let mut repo = MockProductRepository::new();
        let product_id = Uuid::new_v4();

        repo.expect_increment_play_count()
            .with(eq(product_id))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = ProductCatalogUseCase::new(Arc::new(repo));
        let err = usecase.record_play(product_id).await.unwrap_err();

        assert!(matches!(err, ProductError::NotFound));
    }
}
