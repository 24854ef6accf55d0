use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use offszn::domain::{
    entities::upload_intents::UploadIntentEntity,
    repositories::{storage::AssetStorage, upload_intents::UploadIntentRepository},
};
use tracing::{error, info, warn};
use uuid::Uuid;

const MAX_REPORTED_IDS: usize = 20;

#[derive(Debug, Clone)]
pub struct ReconcileUploadsParams {
    pub stale_after_minutes: i64,
    pub limit: Option<i64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileUploadsResult {
    pub scanned: usize,
    pub reconciled: usize,
    pub skipped: usize,
    pub objects_deleted: usize,
    pub objects_kept: usize,
    pub candidate_ids: Vec<Uuid>,
    pub reconciled_ids: Vec<Uuid>,
    pub skipped_ids: Vec<Uuid>,
}

enum IntentSweep {
    Cleaned { deleted: usize, kept: usize },
    Failed,
}

pub struct ReconcileOrphanedUploadsUseCase {
    repository: Arc<dyn UploadIntentRepository + Send + Sync>,
    storage: Arc<dyn AssetStorage + Send + Sync>,
}

impl ReconcileOrphanedUploadsUseCase {
    pub fn new(
        repository: Arc<dyn UploadIntentRepository + Send + Sync>,
        storage: Arc<dyn AssetStorage + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            storage,
        }
    }

    pub async fn run(&self, params: ReconcileUploadsParams) -> Result<ReconcileUploadsResult> {
        self.run_at(params, Utc::now()).await
    }

    /// Sweeps intents still pending `stale_after_minutes` before `now`.
    pub async fn run_at(
        &self,
        params: ReconcileUploadsParams,
        now: DateTime<Utc>,
    ) -> Result<ReconcileUploadsResult> {
        let older_than = now - Duration::minutes(params.stale_after_minutes.max(0));
        let limit = params.limit.filter(|l| *l > 0);

        let intents = self
            .repository
            .list_stale_pending(older_than, limit)
            .await?;

        let mut result = ReconcileUploadsResult {
            scanned: intents.len(),
            ..Default::default()
        };

        for intent in intents {
            push_capped(&mut result.candidate_ids, intent.id);

            if params.dry_run {
                continue;
            }

            match self.sweep_intent(&intent).await {
                IntentSweep::Failed => {
                    result.skipped += 1;
                    push_capped(&mut result.skipped_ids, intent.id);
                    continue;
                }
                IntentSweep::Cleaned { deleted, kept } => {
                    result.objects_deleted += deleted;
                    result.objects_kept += kept;
                }
            }

            match self.repository.mark_reconciled(intent.id).await {
                Ok(()) => {
                    result.reconciled += 1;
                    push_capped(&mut result.reconciled_ids, intent.id);
                }
                Err(err) => {
                    error!(
                        intent_id = %intent.id,
                        db_error = ?err,
                        "reconcile_uploads: failed to mark intent reconciled"
                    );
                    result.skipped += 1;
                    push_capped(&mut result.skipped_ids, intent.id);
                }
            }
        }

        info!(
            scanned = result.scanned,
            reconciled = result.reconciled,
            skipped = result.skipped,
            objects_deleted = result.objects_deleted,
            objects_kept = result.objects_kept,
            dry_run = params.dry_run,
            "reconcile_uploads: completed"
        );

        Ok(result)
    }

    async fn sweep_intent(&self, intent: &UploadIntentEntity) -> IntentSweep {
        let mut deleted = 0;
        let mut kept = 0;

        for object in intent.stored_objects() {
            // A later save may have adopted the object.
            match self.repository.is_object_referenced(object.clone()).await {
                Ok(true) => {
                    kept += 1;
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    error!(
                        intent_id = %intent.id,
                        bucket = %object.bucket,
                        path = %object.path,
                        db_error = ?err,
                        "reconcile_uploads: failed to check object references; skipping intent"
                    );
                    return IntentSweep::Failed;
                }
            }

            match self.storage.delete_object(&object.bucket, &object.path).await {
                Ok(()) => deleted += 1,
                Err(err) if looks_like_missing_object_error(&err) => {
                    warn!(
                        intent_id = %intent.id,
                        bucket = %object.bucket,
                        path = %object.path,
                        "reconcile_uploads: object already missing; continuing"
                    );
                    deleted += 1;
                }
                Err(err) => {
                    error!(
                        intent_id = %intent.id,
                        bucket = %object.bucket,
                        path = %object.path,
                        error = ?err,
                        "reconcile_uploads: failed to delete object; skipping intent"
                    );
                    return IntentSweep::Failed;
                }
            }
        }

        IntentSweep::Cleaned { deleted, kept }
    }
}

fn push_capped(ids: &mut Vec<Uuid>, id: Uuid) {
    if ids.len() < MAX_REPORTED_IDS {
        ids.push(id);
    }
}

fn looks_like_missing_object_error(err: &anyhow::Error) -> bool {
    let message = format!("{err:#}").to_ascii_lowercase();
    message.contains("status 404")
        || message.contains("nosuchkey")
        || message.contains("no such key")
        || message.contains("notfound")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use offszn::domain::{
        repositories::{storage::MockAssetStorage, upload_intents::MockUploadIntentRepository},
        value_objects::storage::StoredObject,
    };
    use serde_json::json;

    fn intent(objects: serde_json::Value) -> UploadIntentEntity {
        let created = Utc::now() - Duration::hours(3);
        UploadIntentEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            product_id: None,
            objects,
            status: "pending".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    fn params(dry_run: bool) -> ReconcileUploadsParams {
        ReconcileUploadsParams {
            stale_after_minutes: 60,
            limit: Some(10),
            dry_run,
        }
    }

    fn usecase(
        repository: MockUploadIntentRepository,
        storage: MockAssetStorage,
    ) -> ReconcileOrphanedUploadsUseCase {
        ReconcileOrphanedUploadsUseCase::new(Arc::new(repository), Arc::new(storage))
    }

    #[tokio::test]
    async fn dry_run_only_lists_candidates() {
        let pending = intent(json!([{ "bucket": "products", "path": "u1/covers/1_a.png" }]));
        let pending_id = pending.id;

        let mut repository = MockUploadIntentRepository::new();
        repository
            .expect_list_stale_pending()
            .returning(move |_, _| {
                let rows = vec![pending.clone()];
                Box::pin(async move { Ok(rows) })
            });
        repository.expect_mark_reconciled().never();

        let mut storage = MockAssetStorage::new();
        storage.expect_delete_object().never();

        let result = usecase(repository, storage).run(params(true)).await.unwrap();

        assert_eq!(result.scanned, 1);
        assert_eq!(result.candidate_ids, vec![pending_id]);
        assert_eq!(result.reconciled, 0);
    }

    #[tokio::test]
    async fn missing_objects_count_as_deleted() {
        let pending = intent(json!([
            { "bucket": "products", "path": "u1/covers/1_a.png" },
            { "bucket": "secure-products", "path": "u1/wav/1_a.wav" }
        ]));

        let mut repository = MockUploadIntentRepository::new();
        repository
            .expect_list_stale_pending()
            .returning(move |_, _| {
                let rows = vec![pending.clone()];
                Box::pin(async move { Ok(rows) })
            });
        repository
            .expect_is_object_referenced()
            .returning(|_| Box::pin(async move { Ok(false) }));
        repository
            .expect_mark_reconciled()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(()) }));

        let mut storage = MockAssetStorage::new();
        storage.expect_delete_object().returning(|bucket, _| {
            let missing = bucket == "secure-products";
            Box::pin(async move {
                if missing {
                    Err(anyhow!("service error: NoSuchKey"))
                } else {
                    Ok(())
                }
            })
        });

        let result = usecase(repository, storage).run(params(false)).await.unwrap();

        assert_eq!(result.reconciled, 1);
        assert_eq!(result.objects_deleted, 2);
        assert_eq!(result.skipped, 0);
    }

    #[tokio::test]
    async fn referenced_objects_are_kept() {
        let pending = intent(json!([{ "bucket": "products", "path": "u1/mp3/1_a.mp3" }]));

        let mut repository = MockUploadIntentRepository::new();
        repository
            .expect_list_stale_pending()
            .returning(move |_, _| {
                let rows = vec![pending.clone()];
                Box::pin(async move { Ok(rows) })
            });
        repository
            .expect_is_object_referenced()
            .withf(|object: &StoredObject| object.path == "u1/mp3/1_a.mp3")
            .returning(|_| Box::pin(async move { Ok(true) }));
        repository
            .expect_mark_reconciled()
            .returning(|_| Box::pin(async move { Ok(()) }));

        let mut storage = MockAssetStorage::new();
        storage.expect_delete_object().never();

        let result = usecase(repository, storage).run(params(false)).await.unwrap();

        assert_eq!(result.objects_kept, 1);
        assert_eq!(result.objects_deleted, 0);
        assert_eq!(result.reconciled, 1);
    }

    #[tokio::test]
    async fn storage_failure_leaves_intent_pending() {
        let pending = intent(json!([{ "bucket": "products", "path": "u1/covers/1_a.png" }]));
        let pending_id = pending.id;

        let mut repository = MockUploadIntentRepository::new();
        repository
            .expect_list_stale_pending()
            .returning(move |_, _| {
                let rows = vec![pending.clone()];
                Box::pin(async move { Ok(rows) })
            });
        repository
            .expect_is_object_referenced()
            .returning(|_| Box::pin(async move { Ok(false) }));
        repository.expect_mark_reconciled().never();

        let mut storage = MockAssetStorage::new();
        storage
            .expect_delete_object()
            .returning(|_, _| Box::pin(async move { Err(anyhow!("connection reset")) }));

        let result = usecase(repository, storage).run(params(false)).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.skipped_ids, vec![pending_id]);
        assert_eq!(result.reconciled, 0);
    }

    #[test]
    fn missing_object_errors_are_recognized() {
        assert!(looks_like_missing_object_error(&anyhow!("status 404 Not Found")));
        assert!(looks_like_missing_object_error(
            &anyhow!("NoSuchKey").context("failed to delete object")
        ));
        assert!(!looks_like_missing_object_error(&anyhow!("access denied")));
    }
}
