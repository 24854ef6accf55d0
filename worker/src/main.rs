use std::sync::Arc;

use anyhow::Result;
use offszn::{
    domain::repositories::{storage::AssetStorage, upload_intents::UploadIntentRepository},
    infra::{
        db::{postgres::postgres_connection, repositories::upload_intents::UploadIntentPostgres},
        storages::supabase_storage::{SupabaseStorageClient, SupabaseStorageConfig},
    },
    observability::{init_observability, report_config_warnings},
};
use tracing::{error, info};
use worker::{
    axum_http, config, services,
    usecases::reconcile_orphaned_uploads::ReconcileOrphanedUploadsUseCase,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    report_config_warnings("worker", &dotenvy_env.warnings);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let upload_intent_repository: Arc<dyn UploadIntentRepository + Send + Sync> =
        Arc::new(UploadIntentPostgres::new(Arc::new(postgres_pool)));

    let supa = &dotenvy_env.supabase;
    let storage: Arc<dyn AssetStorage + Send + Sync> = Arc::new(
        SupabaseStorageClient::new(SupabaseStorageConfig {
            project_url: supa.project_url.clone(),
            endpoint: supa.s3_endpoint.clone(),
            region: supa.s3_region.clone(),
            access_key: supa.s3_access_key.clone(),
            secret_key: supa.s3_secret_key.clone(),
            public_bucket: supa.public_bucket.clone(),
            secure_bucket: supa.secure_bucket.clone(),
        })
        .await?,
    );

    let reconcile_usecase = Arc::new(ReconcileOrphanedUploadsUseCase::new(
        upload_intent_repository,
        storage,
    ));

    let sweep_loop = tokio::spawn(services::worker_loop::run_worker_loop(
        Arc::clone(&reconcile_usecase),
        dotenvy_env.reconcile.clone(),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server = tokio::spawn(async move {
        axum_http::http_serve::start(server_config, reconcile_usecase).await
    });

    info!("Worker started");

    tokio::select! {
        result = sweep_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
