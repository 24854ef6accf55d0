use std::sync::Arc;

use anyhow::{Context, Result};
use offszn::domain::{
    repositories::{storage::AssetStorage, upload_intents::UploadIntentRepository},
    value_objects::{
        enums::asset_slots::{AssetSlot, BucketKind},
        filenames::{asset_object_path, content_type_for},
        storage::{StoredAsset, StoredObject, object_path_from_reference},
    },
};
use tracing::{info, warn};
use uuid::Uuid;

/// A file part received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Moves product files into the right bucket, replacing whatever the slot held before.
pub struct AssetUploader<S, U>
where
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    storage: Arc<S>,
    upload_intent_repo: Arc<U>,
}

impl<S, U> AssetUploader<S, U>
where
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    pub fn new(storage: Arc<S>, upload_intent_repo: Arc<U>) -> Self {
        Self {
            storage,
            upload_intent_repo,
        }
    }

    /// Uploads `file` into the slot's bucket under
    /// `{owner}/{category}/{timestamp}_{name}.{ext}`.
    ///
    /// The previous reference, if any, is deleted first on a best-effort basis.
    /// The new object is recorded on the intent before it is written so that an
    /// interrupted save can be reconciled later.
    pub async fn replace_asset(
        &self,
        intent_id: Uuid,
        owner_id: Uuid,
        slot: AssetSlot,
        file: UploadedFile,
        previous: Option<&str>,
        timestamp_millis: i64,
    ) -> Result<StoredAsset> {
        let bucket = self.storage.bucket_name(slot.bucket_kind());

        if let Some(previous) = previous {
            self.delete_previous(&bucket, slot, previous).await;
        }

        let path = asset_object_path(owner_id, slot, timestamp_millis, &file.file_name);
        let content_type = content_type_for(&file.file_name, file.content_type.as_deref());
        let object = StoredObject {
            bucket: bucket.clone(),
            path: path.clone(),
        };

        self.upload_intent_repo
            .append_object(intent_id, object.clone())
            .await
            .with_context(|| format!("failed to record {} upload on intent", slot))?;

        let size = file.bytes.len();
        self.storage
            .put_object(&bucket, &path, file.bytes, &content_type)
            .await
            .with_context(|| format!("failed to upload {}", slot))?;

        info!(%owner_id, %slot, %bucket, %path, size, "asset_uploads: object stored");

        let reference = match slot.bucket_kind() {
            BucketKind::Public => self.storage.public_url(&bucket, &path),
            BucketKind::Secure => path,
        };

        Ok(StoredAsset { object, reference })
    }

    async fn delete_previous(&self, bucket: &str, slot: AssetSlot, previous: &str) {
        let Some(previous_path) = object_path_from_reference(previous, bucket) else {
            warn!(%slot, %bucket, previous, "asset_uploads: previous reference is not in this bucket, skipping delete");
            return;
        };

        if let Err(err) = self.storage.delete_object(bucket, &previous_path).await {
            warn!(
                %slot,
                %bucket,
                path = %previous_path,
                error = ?err,
                "asset_uploads: failed to delete previous object"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use offszn::domain::repositories::{
        storage::MockAssetStorage, upload_intents::MockUploadIntentRepository,
    };

    fn storage_with_buckets() -> MockAssetStorage {
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

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn public_slot_returns_url_and_replaces_previous_object() {
        let owner_id = Uuid::nil();
        let intent_id = Uuid::new_v4();
        let mut storage = storage_with_buckets();
        let mut intents = MockUploadIntentRepository::new();

        storage
            .expect_delete_object()
            .withf(|bucket, path| bucket == "products" && path == "old/covers/1_old.png")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        intents
            .expect_append_object()
            .with(
                eq(intent_id),
                eq(StoredObject {
                    bucket: "products".to_string(),
                    path: format!("{owner_id}/covers/1700000000000_Cover_Art.png"),
                }),
            )
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));
        storage
            .expect_put_object()
            .withf(|bucket, _, bytes, content_type| {
                bucket == "products" && bytes.len() == 3 && content_type == "image/png"
            })
            .times(1)
            .returning(|_, _, _, _| Box::pin(async { Ok(()) }));

        let uploader = AssetUploader::new(Arc::new(storage), Arc::new(intents));
        let stored = uploader
            .replace_asset(
                intent_id,
                owner_id,
                AssetSlot::Cover,
                file("Cover Art.PNG"),
                Some("https://proj.supabase.co/storage/v1/object/public/products/old/covers/1_old.png"),
                1_700_000_000_000,
            )
            .await
            .unwrap();

        assert_eq!(
            stored.reference,
            format!(
                "https://proj.supabase.co/storage/v1/object/public/products/{owner_id}/covers/1700000000000_Cover_Art.png"
            )
        );
    }

    #[tokio::test]
    async fn restricted_slot_returns_bare_path_even_if_delete_fails() {
        let owner_id = Uuid::nil();
        let mut storage = storage_with_buckets();
        let mut intents = MockUploadIntentRepository::new();

        storage
            .expect_delete_object()
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("status 500")) }));
        intents
            .expect_append_object()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        storage
            .expect_put_object()
            .withf(|bucket, _, _, _| bucket == "secure-products")
            .returning(|_, _, _, _| Box::pin(async { Ok(()) }));

        let uploader = AssetUploader::new(Arc::new(storage), Arc::new(intents));
        let stored = uploader
            .replace_asset(
                Uuid::new_v4(),
                owner_id,
                AssetSlot::Wav,
                file("Über Beat (Final) v2.wav"),
                Some("old/wav/1_old.wav"),
                42,
            )
            .await
            .unwrap();

        assert_eq!(stored.reference, format!("{owner_id}/wav/42_Uber_Beat_Final_v2.wav"));
        assert_eq!(stored.object.bucket, "secure-products");
    }

    #[tokio::test]
    async fn upload_failure_aborts() {
        let mut storage = storage_with_buckets();
        let mut intents = MockUploadIntentRepository::new();

        intents
            .expect_append_object()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        storage
            .expect_put_object()
            .returning(|_, _, _, _| Box::pin(async { Err(anyhow::anyhow!("connection reset")) }));

        let uploader = AssetUploader::new(Arc::new(storage), Arc::new(intents));
        let err = uploader
            .replace_asset(Uuid::new_v4(), Uuid::nil(), AssetSlot::Mp3, file("a.mp3"), None, 1)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to upload mp3");
    }
}
