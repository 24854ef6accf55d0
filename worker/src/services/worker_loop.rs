use std::{sync::Arc, time::Duration};

use tracing::{error, info};

use crate::{
    config::config_model::Reconcile,
    usecases::reconcile_orphaned_uploads::{ReconcileOrphanedUploadsUseCase, ReconcileUploadsParams},
};

pub async fn run_worker_loop(
    usecase: Arc<ReconcileOrphanedUploadsUseCase>,
    config: Reconcile,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));

    loop {
        interval.tick().await;
        info!("worker_loop: sweeping stale upload intents");

        let params = ReconcileUploadsParams {
            stale_after_minutes: config.stale_after_minutes,
            limit: config.batch_limit,
            dry_run: false,
        };

        if let Err(err) = usecase.run(params).await {
            error!(error = ?err, "worker_loop: reconcile sweep failed");
        }
    }
}
