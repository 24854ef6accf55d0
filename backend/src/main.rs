use std::sync::Arc;

use anyhow::Result;
use backend::{axum_http::http_serve, config::config_loader};
use offszn::{
    infra::db::postgres::postgres_connection,
    observability::{init_observability, report_config_warnings},
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    report_config_warnings("backend", &dotenvy_env.warnings);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool)).await?;

    Ok(())
}
