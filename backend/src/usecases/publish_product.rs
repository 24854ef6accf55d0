use std::sync::Arc;

use chrono::Utc;
use offszn::domain::{
    entities::products::ProductEntity,
    repositories::{
        products::ProductRepository, storage::AssetStorage,
        upload_intents::UploadIntentRepository,
    },
    value_objects::{
        enums::{asset_slots::AssetSlot, product_statuses::ProductStatus},
        licenses::derive_pricing,
        products::{AssetRefs, ProductDto, ProductPayload, ProductRecord},
        publish_wizard::SaveMode,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::asset_uploads::{AssetUploader, UploadedFile};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0}")]
    Validation(String),
    #[error("product not found")]
    ProductNotFound,
    #[error("{0}")]
    Upload(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PublishError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PublishError::Validation(_) => StatusCode::BAD_REQUEST,
            PublishError::ProductNotFound => StatusCode::NOT_FOUND,
            PublishError::Upload(_) => StatusCode::BAD_GATEWAY,
            PublishError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PublishError>;

/// Files attached to a save, keyed by slot.
#[derive(Debug, Clone, Default)]
pub struct ProductFiles {
    files: Vec<(AssetSlot, UploadedFile)>,
}

impl ProductFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// A second file for the same slot replaces the first.
    pub fn insert(&mut self, slot: AssetSlot, file: UploadedFile) {
        self.files.retain(|(existing, _)| *existing != slot);
        self.files.push((slot, file));
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in cover, mp3, wav, stems order.
    fn into_upload_order(mut self) -> Vec<(AssetSlot, UploadedFile)> {
        self.files
            .sort_by_key(|(slot, _)| AssetSlot::ALL.iter().position(|s| s == slot));
        self.files
    }
}

/// Upload, price, then write: the server half of the publish wizard.
pub struct PublishProductUseCase<P, S, U>
where
    P: ProductRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    product_repo: Arc<P>,
    upload_intent_repo: Arc<U>,
    uploader: AssetUploader<S, U>,
}

impl<P, S, U> PublishProductUseCase<P, S, U>
where
    P: ProductRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    pub fn new(product_repo: Arc<P>, storage: Arc<S>, upload_intent_repo: Arc<U>) -> Self {
        let uploader = AssetUploader::new(storage, Arc::clone(&upload_intent_repo));
        Self {
            product_repo,
            upload_intent_repo,
            uploader,
        }
    }

    pub async fn save(
        &self,
        producer_id: Uuid,
        mode: SaveMode,
        payload: ProductPayload,
        files: ProductFiles,
    ) -> UseCaseResult<ProductDto> {
        let validation = match mode {
            SaveMode::Publish => payload.validate_for_publish(),
            SaveMode::Draft => payload.validate_common(),
        };
        validation.map_err(|err| PublishError::Validation(err.to_string()))?;

        let existing = match payload.id {
            Some(product_id) => Some(self.load_owned(product_id, producer_id).await?),
            None => None,
        };

        let mut assets = existing
            .as_ref()
            .map(|product| AssetRefs {
                image_url: product.image_url.clone(),
                mp3_url: product.mp3_url.clone(),
                wav_url: product.wav_url.clone(),
                stems_url: product.stems_url.clone(),
            })
            .unwrap_or_default();

        let intent_id = if files.is_empty() {
            None
        } else {
            let intent_id = self
                .upload_intent_repo
                .create(producer_id, payload.id)
                .await
                .map_err(|err| {
                    error!(%producer_id, db_error = ?err, "publish: failed to open upload intent");
                    PublishError::Internal(err)
                })?;
            Some(intent_id)
        };

        if let Some(intent_id) = intent_id {
            for (slot, file) in files.into_upload_order() {
                let previous = assets.get(slot).map(str::to_string);
                let stored = self
                    .uploader
                    .replace_asset(
                        intent_id,
                        producer_id,
                        slot,
                        file,
                        previous.as_deref(),
                        Utc::now().timestamp_millis(),
                    )
                    .await
                    .map_err(|err| {
                        error!(%producer_id, %slot, error = ?err, "publish: asset upload failed");
                        PublishError::Upload(err.to_string())
                    })?;
                assets.set(slot, stored.reference);
            }
        }

        let pricing = derive_pricing(&payload.licenses);
        let status = match mode {
            SaveMode::Publish => ProductStatus::Approved,
            SaveMode::Draft => ProductStatus::Draft,
        };
        let record = ProductRecord::merge(payload, assets, pricing, status);

        let written = match existing {
            Some(product) => self
                .product_repo
                .update(product.id, producer_id, record.to_update_entity(Utc::now()))
                .await
                .map_err(|err| {
                    error!(%producer_id, product_id = %product.id, db_error = ?err, "publish: product update failed");
                    PublishError::Internal(err)
                })?
                .ok_or(PublishError::ProductNotFound)?,
            None => self
                .product_repo
                .insert(record.to_insert_entity(producer_id))
                .await
                .map_err(|err| {
                    error!(%producer_id, db_error = ?err, "publish: product insert failed");
                    PublishError::Internal(err)
                })?,
        };

        if let Some(intent_id) = intent_id {
            // A pending intent whose objects are referenced is left alone by the sweep.
            if let Err(err) = self
                .upload_intent_repo
                .finalize(intent_id, written.id)
                .await
            {
                warn!(%intent_id, product_id = %written.id, error = ?err, "publish: failed to finalize upload intent");
            }
        }

        info!(
            %producer_id,
            product_id = %written.id,
            status = %written.status,
            price_basic = written.price_basic,
            is_free = written.is_free,
            "publish: product saved"
        );

        Ok(ProductDto::from_entity(written, None))
    }

    async fn load_owned(&self, product_id: Uuid, producer_id: Uuid) -> UseCaseResult<ProductEntity> {
        self.product_repo
            .find_owned(product_id, producer_id)
            .await
            .map_err(|err| {
                error!(%producer_id, %product_id, db_error = ?err, "publish: failed to load product");
                PublishError::Internal(err)
            })?
            .ok_or(PublishError::ProductNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offszn::domain::{
        entities::products::InsertProductEntity,
        repositories::{
            products::MockProductRepository, storage::MockAssetStorage,
            upload_intents::MockUploadIntentRepository,
        },
        value_objects::{
            enums::asset_slots::BucketKind,
            licenses::{LicenseSet, LicenseTier, LicenseTierName},
        },
    };
    use std::sync::Mutex;

    fn entity_from_insert(entity: InsertProductEntity) -> ProductEntity {
        let now = Utc::now();
        ProductEntity {
            id: Uuid::new_v4(),
            producer_id: entity.producer_id,
            name: entity.name,
            description: entity.description,
            product_type: entity.product_type,
            status: entity.status,
            visibility: entity.visibility,
            tags: entity.tags,
            bpm: entity.bpm,
            musical_key: entity.musical_key,
            image_url: entity.image_url,
            mp3_url: entity.mp3_url,
            wav_url: entity.wav_url,
            stems_url: entity.stems_url,
            price_basic: entity.price_basic,
            price_premium: entity.price_premium,
            price_stems: entity.price_stems,
            price_exclusive: entity.price_exclusive,
            licenses: entity.licenses,
            is_free: entity.is_free,
            discount_amount: entity.discount_amount,
            discount_type: entity.discount_type,
            play_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn storage() -> MockAssetStorage {
        let mut storage = MockAssetStorage::new();
        storage.expect_bucket_name().returning(|kind| match kind {
            BucketKind::Public => "products".to_string(),
            BucketKind::Secure => "secure-products".to_string(),
        });
        storage.expect_public_url().returning(|bucket, path| {
            format!("https://proj.supabase.co/storage/v1/object/public/{bucket}/{path}")
        });
        storage
    }

    fn basic_only_payload() -> ProductPayload {
        ProductPayload {
            name: "Night Drive".to_string(),
            bpm: Some(140),
            licenses: LicenseSet::new().with_tier(
                LicenseTierName::Basic,
                LicenseTier::new("Basic", true, 24.99),
            ),
            ..ProductPayload::default()
        }
    }

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes: vec![0; 16],
        }
    }

    #[tokio::test]
    async fn publishing_with_cover_and_mp3_writes_one_priced_row() {
        let producer_id = Uuid::new_v4();
        let intent_id = Uuid::new_v4();
        let mut storage = storage();
        let mut intents = MockUploadIntentRepository::new();
        let mut products = MockProductRepository::new();

        let uploaded = Arc::new(Mutex::new(Vec::new()));
        let uploaded_log = Arc::clone(&uploaded);

        intents
            .expect_create()
            .times(1)
            .returning(move |_, _| Box::pin(async move { Ok(intent_id) }));
        intents
            .expect_append_object()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        storage
            .expect_put_object()
            .times(2)
            .returning(move |bucket, path, _, _| {
                uploaded_log
                    .lock()
                    .unwrap()
                    .push(format!("{bucket}/{path}"));
                Box::pin(async { Ok(()) })
            });
        products
            .expect_insert()
            .times(1)
            .withf(move |entity| {
                entity.producer_id == producer_id
                    && entity.status == "approved"
                    && entity.product_type == "beat"
                    && entity.price_basic == 24.99
                    && !entity.is_free
                    && entity.image_url.is_some()
                    && entity.mp3_url.is_some()
                    && entity.wav_url.is_none()
            })
            .returning(|entity| {
                let product = entity_from_insert(entity);
                Box::pin(async move { Ok(product) })
            });
        intents
            .expect_finalize()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let usecase =
            PublishProductUseCase::new(Arc::new(products), Arc::new(storage), Arc::new(intents));

        let mut files = ProductFiles::new();
        files.insert(AssetSlot::Mp3, upload("night drive.mp3"));
        files.insert(AssetSlot::Cover, upload("cover.png"));

        let product = usecase
            .save(producer_id, SaveMode::Publish, basic_only_payload(), files)
            .await
            .unwrap();

        assert_eq!(product.price_basic, 24.99);
        assert!(!product.is_free);
        assert!(product.image_url.is_some());
        assert!(product.mp3_url.is_some());

        let uploaded = uploaded.lock().unwrap();
        assert!(uploaded[0].starts_with(&format!("products/{producer_id}/covers/")));
        assert!(uploaded[1].starts_with(&format!("products/{producer_id}/mp3/")));
    }

    #[tokio::test]
    async fn publishing_without_enabled_license_is_rejected() {
        let usecase = PublishProductUseCase::new(
            Arc::new(MockProductRepository::new()),
            Arc::new(storage()),
            Arc::new(MockUploadIntentRepository::new()),
        );

        let payload = ProductPayload {
            licenses: LicenseSet::new(),
            ..basic_only_payload()
        };

        let err = usecase
            .save(Uuid::new_v4(), SaveMode::Publish, payload, ProductFiles::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Validation(_)));
    }

    #[tokio::test]
    async fn draft_without_licenses_or_title_is_saved_free() {
        let mut products = MockProductRepository::new();
        products
            .expect_insert()
            .withf(|entity| {
                entity.status == "draft"
                    && entity.name == "Untitled draft"
                    && entity.price_basic == 0.0
                    && entity.is_free
            })
            .returning(|entity| {
                let product = entity_from_insert(entity);
                Box::pin(async move { Ok(product) })
            });

        let usecase = PublishProductUseCase::new(
            Arc::new(products),
            Arc::new(storage()),
            Arc::new(MockUploadIntentRepository::new()),
        );

        let product = usecase
            .save(
                Uuid::new_v4(),
                SaveMode::Draft,
                ProductPayload::default(),
                ProductFiles::new(),
            )
            .await
            .unwrap();

        assert_eq!(product.status, ProductStatus::Draft);
    }

    #[tokio::test]
    async fn failed_write_leaves_intent_pending() {
        let mut storage = storage();
        let mut intents = MockUploadIntentRepository::new();
        let mut products = MockProductRepository::new();

        intents
            .expect_create()
            .returning(|_, _| Box::pin(async { Ok(Uuid::new_v4()) }));
        intents
            .expect_append_object()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        storage
            .expect_put_object()
            .returning(|_, _, _, _| Box::pin(async { Ok(()) }));
        products
            .expect_insert()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection refused")) }));
        intents.expect_finalize().never();

        let usecase =
            PublishProductUseCase::new(Arc::new(products), Arc::new(storage), Arc::new(intents));

        let mut files = ProductFiles::new();
        files.insert(AssetSlot::Cover, upload("cover.png"));

        let err = usecase
            .save(Uuid::new_v4(), SaveMode::Publish, basic_only_payload(), files)
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Internal(_)));
    }

    #[tokio::test]
    async fn editing_someone_elses_product_is_not_found() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_owned()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = PublishProductUseCase::new(
            Arc::new(products),
            Arc::new(storage()),
            Arc::new(MockUploadIntentRepository::new()),
        );

        let payload = ProductPayload {
            id: Some(Uuid::new_v4()),
            ..basic_only_payload()
        };

        let err = usecase
            .save(Uuid::new_v4(), SaveMode::Publish, payload, ProductFiles::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::ProductNotFound));
    }
}
