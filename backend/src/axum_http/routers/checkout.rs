use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use offszn::{
    domain::{
        repositories::{orders::OrderRepository, products::ProductRepository},
        value_objects::checkout::{CheckoutRequest, OrderDto, PaymentNotification, PreferenceDto},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{orders::OrderPostgres, products::ProductPostgres},
    },
    payments::mercadopago_client::MercadoPagoClient,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::checkout::{
        CheckoutRates, CheckoutUseCase, MercadoPagoGateway, WebhookEnvelope, WebhookOutcome,
    },
};

const SIGNATURE_HEADER: &str = "x-signature";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Query string Mercado Pago appends to the notification URL.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "data.id")]
    data_id: Option<String>,
    #[serde(rename = "type")]
    topic: Option<String>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    mercadopago: Arc<MercadoPagoClient>,
    rates: CheckoutRates,
) -> Router {
    let product_repository = ProductPostgres::new(Arc::clone(&db_pool));
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));

    let usecase = CheckoutUseCase::new(
        Arc::new(product_repository),
        Arc::new(order_repository),
        mercadopago,
        rates,
    );

    Router::new()
        .route("/create-mercadopago-preference", post(create_preference))
        .route("/mercadopago-webhook", post(mercadopago_webhook))
        .route("/free", post(claim_free))
        .route("/orders", get(list_orders))
        .with_state(Arc::new(usecase))
}

pub async fn create_preference<P, O, G>(
    State(usecase): State<Arc<CheckoutUseCase<P, O, G>>>,
    AuthUser { user_id, email, .. }: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<PreferenceDto>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: MercadoPagoGateway + Send + Sync + 'static,
{
    info!(%user_id, items = request.product_ids.len(), "checkout: preference request received");
    let preference = usecase
        .create_preference(user_id, email, request.product_ids)
        .await?;
    Ok(Json(preference))
}

pub async fn mercadopago_webhook<P, O, G>(
    State(usecase): State<Arc<CheckoutUseCase<P, O, G>>>,
    headers: HeaderMap,
    Query(query): Query<WebhookQuery>,
    body: String,
) -> Result<Json<Value>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: MercadoPagoGateway + Send + Sync + 'static,
{
    let notification = if body.trim().is_empty() {
        PaymentNotification::default()
    } else {
        serde_json::from_str::<PaymentNotification>(&body)
            .map_err(|err| AppError::bad_request(format!("Invalid notification body: {err}")))?
    };

    let envelope = WebhookEnvelope {
        signature: header_value(&headers, SIGNATURE_HEADER),
        request_id: header_value(&headers, REQUEST_ID_HEADER),
        query_data_id: query.data_id,
        query_topic: query.topic,
    };

    let outcome = usecase.handle_webhook(envelope, notification).await?;
    let status = match outcome {
        WebhookOutcome::Ignored => "ignored".to_string(),
        WebhookOutcome::Unchanged => "unchanged".to_string(),
        WebhookOutcome::Transitioned(status) => status.to_string(),
    };

    Ok(Json(json!({ "received": true, "result": status })))
}

pub async fn claim_free<P, O, G>(
    State(usecase): State<Arc<CheckoutUseCase<P, O, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<OrderDto>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: MercadoPagoGateway + Send + Sync + 'static,
{
    info!(%user_id, items = request.product_ids.len(), "checkout: free claim received");
    Ok(Json(usecase.claim_free(user_id, request.product_ids).await?))
}

pub async fn list_orders<P, O, G>(
    State(usecase): State<Arc<CheckoutUseCase<P, O, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<Vec<OrderDto>>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: MercadoPagoGateway + Send + Sync + 'static,
{
    Ok(Json(usecase.list_orders(user_id).await?))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
