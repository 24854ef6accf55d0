use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use offszn::{
    infra::{
        db::postgres::postgres_connection::PgPoolSquad,
        storages::supabase_storage::{SupabaseStorageClient, SupabaseStorageConfig},
    },
    media::cloudinary_client::{CloudinaryClient, CloudinaryConfig},
    payments::mercadopago_client::{MercadoPagoClient, MercadoPagoConfig},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    auth::SupabaseJwt,
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::checkout::CheckoutRates,
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let storage = Arc::new(
        SupabaseStorageClient::new(SupabaseStorageConfig {
            project_url: config.supabase.project_url.clone(),
            endpoint: config.supabase.s3_endpoint.clone(),
            region: config.supabase.s3_region.clone(),
            access_key: config.supabase.s3_access_key.clone(),
            secret_key: config.supabase.s3_secret_key.clone(),
            public_bucket: config.supabase.public_bucket.clone(),
            secure_bucket: config.supabase.secure_bucket.clone(),
        })
        .await?,
    );
    info!("Supabase storage client has been built");

    let mercadopago = Arc::new(MercadoPagoClient::new(MercadoPagoConfig {
        access_token: config.mercadopago.access_token.clone(),
        webhook_secret: config.mercadopago.webhook_secret.clone(),
        notification_url: config.mercadopago.notification_url.clone(),
        success_url: config.mercadopago.success_url.clone(),
        failure_url: config.mercadopago.failure_url.clone(),
        pending_url: config.mercadopago.pending_url.clone(),
    }));

    let cloudinary = Arc::new(CloudinaryClient::new(CloudinaryConfig {
        cloud_name: config.cloudinary.cloud_name.clone(),
        api_key: config.cloudinary.api_key.clone(),
        api_secret: config.cloudinary.api_secret.clone(),
    }));

    let rates = CheckoutRates {
        usd_to_cop_rate: config.checkout.usd_to_cop_rate,
        min_unit_price_cop: config.checkout.min_unit_price_cop,
    };

    let body_limit: usize = (config.backend_server.body_limit * 1024 * 1024)
        .try_into()
        .context("SERVER_BODY_LIMIT does not fit in memory")?;

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/products",
            routers::products::routes(Arc::clone(&db_pool), Arc::clone(&storage)),
        )
        .nest(
            "/api/users",
            routers::users::routes(
                Arc::clone(&db_pool),
                Arc::clone(&storage),
                Arc::clone(&cloudinary),
            ),
        )
        .nest(
            "/api/reels",
            routers::reels::routes(Arc::clone(&db_pool), Arc::clone(&cloudinary)),
        )
        .nest("/api/coupons", routers::coupons::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/gift-cards",
            routers::gift_cards::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api",
            routers::checkout::routes(Arc::clone(&db_pool), mercadopago, rates)
                .merge(routers::collaborations::routes(Arc::clone(&db_pool))),
        )
        .route("/health", get(default_routers::health_check))
        .layer(Extension(SupabaseJwt::new(config.supabase.jwt_secret.clone())))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static("x-signature"),
                    HeaderName::from_static("x-request-id"),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
