use std::{collections::HashSet, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use offszn::{
    domain::{
        entities::products::ProductEntity,
        repositories::{orders::OrderRepository, products::ProductRepository},
        value_objects::{
            checkout::{
                NewOrder, NewOrderItem, OrderDto, OrderItemDto, PaymentNotification, PreferenceDto,
                usd_to_cop,
            },
            enums::{order_statuses::OrderStatus, product_statuses::ProductStatus},
        },
    },
    payments::mercadopago_client::{
        MercadoPagoClient, MercadoPagoPayment, Preference, PreferenceItem, PreferenceRequest,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

const CHECKOUT_CURRENCY: &str = "COP";
const PAYMENT_TOPIC: &str = "payment";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MercadoPagoGateway: Send + Sync {
    async fn create_preference(&self, request: PreferenceRequest) -> AnyResult<Preference>;

    async fn get_payment(&self, payment_id: &str) -> AnyResult<MercadoPagoPayment>;

    fn verify_webhook_signature(
        &self,
        signature_header: &str,
        request_id: &str,
        data_id: &str,
    ) -> AnyResult<()>;
}

#[async_trait]
impl MercadoPagoGateway for MercadoPagoClient {
    async fn create_preference(&self, request: PreferenceRequest) -> AnyResult<Preference> {
        self.create_preference(&request).await
    }

    async fn get_payment(&self, payment_id: &str) -> AnyResult<MercadoPagoPayment> {
        self.get_payment(payment_id).await
    }

    fn verify_webhook_signature(
        &self,
        signature_header: &str,
        request_id: &str,
        data_id: &str,
    ) -> AnyResult<()> {
        self.verify_webhook_signature(signature_header, request_id, data_id)
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("product {0} is not available for sale")]
    ProductUnavailable(Uuid),
    #[error("product {0} is not free")]
    NotFree(Uuid),
    #[error("product {0} is free and must be claimed instead")]
    FreeInPaidCheckout(Uuid),
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error("payment provider request failed")]
    Upstream,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CheckoutError::EmptyCart
            | CheckoutError::ProductUnavailable(_)
            | CheckoutError::NotFree(_)
            | CheckoutError::FreeInPaidCheckout(_)
            | CheckoutError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            CheckoutError::InvalidSignature => StatusCode::UNAUTHORIZED,
            CheckoutError::Upstream => StatusCode::BAD_GATEWAY,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CheckoutError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutRates {
    pub usd_to_cop_rate: f64,
    pub min_unit_price_cop: i64,
}

/// Headers and query values Mercado Pago sends alongside a notification.
#[derive(Debug, Clone, Default)]
pub struct WebhookEnvelope {
    pub signature: Option<String>,
    pub request_id: Option<String>,
    pub query_data_id: Option<String>,
    pub query_topic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Not a payment notification, or nothing to match it to.
    Ignored,
    /// The order already left `pending` or the payment is still in flight.
    Unchanged,
    Transitioned(OrderStatus),
}

pub struct CheckoutUseCase<P, O, G>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: MercadoPagoGateway + Send + Sync + 'static,
{
    product_repo: Arc<P>,
    order_repo: Arc<O>,
    mercadopago: Arc<G>,
    rates: CheckoutRates,
}

impl<P, O, G> CheckoutUseCase<P, O, G>
where
    P: ProductRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    G: MercadoPagoGateway + Send + Sync + 'static,
{
    pub fn new(product_repo: Arc<P>, order_repo: Arc<O>, mercadopago: Arc<G>, rates: CheckoutRates) -> Self {
        Self {
            product_repo,
            order_repo,
            mercadopago,
            rates,
        }
    }

    pub async fn create_preference(
        &self,
        buyer_id: Uuid,
        buyer_email: Option<String>,
        product_ids: Vec<Uuid>,
    ) -> UseCaseResult<PreferenceDto> {
        let products = self.load_sellable(buyer_id, product_ids).await?;
        if let Some(free) = products.iter().find(|product| product.is_free) {
            return Err(CheckoutError::FreeInPaidCheckout(free.id));
        }

        let order = NewOrder::new(
            buyer_id,
            OrderStatus::Pending,
            products
                .iter()
                .map(|product| NewOrderItem {
                    product_id: product.id,
                    quantity: 1,
                    price_at_purchase: product.price_basic,
                })
                .collect(),
        );
        let total_usd = order.total_price();

        let order = self
            .order_repo
            .create_with_items(order)
            .await
            .map_err(|err| {
                error!(%buyer_id, db_error = ?err, "checkout: failed to create order");
                CheckoutError::Internal(err)
            })?;

        let items = products
            .iter()
            .map(|product| PreferenceItem {
                id: product.id.to_string(),
                title: product.name.clone(),
                quantity: 1,
                unit_price: usd_to_cop(
                    product.price_basic,
                    self.rates.usd_to_cop_rate,
                    self.rates.min_unit_price_cop,
                ),
                currency_id: CHECKOUT_CURRENCY.to_string(),
            })
            .collect();

        let preference = self
            .mercadopago
            .create_preference(PreferenceRequest {
                external_reference: order.id.to_string(),
                items,
                payer_email: buyer_email,
            })
            .await
            .map_err(|err| {
                error!(%buyer_id, order_id = %order.id, error = ?err, "checkout: failed to create preference");
                CheckoutError::Upstream
            })?;

        info!(
            %buyer_id,
            order_id = %order.id,
            preference_id = %preference.id,
            total_usd,
            "checkout: preference created"
        );

        Ok(PreferenceDto {
            preference_id: preference.id,
            init_point: preference.init_point,
            order_id: order.id,
        })
    }

    pub async fn handle_webhook(
        &self,
        envelope: WebhookEnvelope,
        notification: PaymentNotification,
    ) -> UseCaseResult<WebhookOutcome> {
        let data_id = envelope
            .query_data_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| notification.data_id())
            .ok_or_else(|| CheckoutError::InvalidWebhook("missing data.id".to_string()))?;

        let signature = envelope
            .signature
            .as_deref()
            .ok_or(CheckoutError::InvalidSignature)?;
        self.mercadopago
            .verify_webhook_signature(
                signature,
                envelope.request_id.as_deref().unwrap_or_default(),
                &data_id,
            )
            .map_err(|err| {
                warn!(%data_id, error = ?err, "checkout: webhook signature rejected");
                CheckoutError::InvalidSignature
            })?;

        let topic = notification
            .topic
            .clone()
            .or(envelope.query_topic.clone())
            .unwrap_or_default();
        if topic != PAYMENT_TOPIC {
            info!(%topic, %data_id, "checkout: ignoring non-payment notification");
            return Ok(WebhookOutcome::Ignored);
        }

        let payment = self
            .mercadopago
            .get_payment(&data_id)
            .await
            .map_err(|err| {
                error!(%data_id, error = ?err, "checkout: failed to fetch payment");
                CheckoutError::Upstream
            })?;

        let Some(order_id) = payment
            .external_reference
            .as_deref()
            .and_then(|reference| Uuid::parse_str(reference).ok())
        else {
            warn!(payment_id = payment.id, "checkout: payment has no order reference");
            return Ok(WebhookOutcome::Ignored);
        };

        let next = OrderStatus::from_payment_status(&payment.status);

        let Some(order) = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "checkout: failed to load order");
                CheckoutError::Internal(err)
            })?
        else {
            warn!(%order_id, payment_id = payment.id, "checkout: payment references unknown order");
            return Ok(WebhookOutcome::Ignored);
        };

        let current = OrderStatus::from_str(&order.status);
        if !current.can_transition_to(next) {
            info!(%order_id, %current, %next, "checkout: order unchanged");
            return Ok(WebhookOutcome::Unchanged);
        }

        let moved = self
            .order_repo
            .transition_status(order_id, current, next, Some(payment.id.to_string()))
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "checkout: failed to update order status");
                CheckoutError::Internal(err)
            })?;

        if !moved {
            info!(%order_id, %next, "checkout: order moved concurrently");
            return Ok(WebhookOutcome::Unchanged);
        }

        info!(%order_id, payment_id = payment.id, %next, "checkout: order status updated");
        Ok(WebhookOutcome::Transitioned(next))
    }

    pub async fn claim_free(&self, buyer_id: Uuid, product_ids: Vec<Uuid>) -> UseCaseResult<OrderDto> {
        let products = self.load_sellable(buyer_id, product_ids).await?;
        if let Some(paid) = products.iter().find(|product| !product.is_free) {
            return Err(CheckoutError::NotFree(paid.id));
        }

        let items: Vec<NewOrderItem> = products
            .iter()
            .map(|product| NewOrderItem {
                product_id: product.id,
                quantity: 1,
                price_at_purchase: 0.0,
            })
            .collect();

        let order = self
            .order_repo
            .create_with_items(NewOrder::new(buyer_id, OrderStatus::Completed, items.clone()))
            .await
            .map_err(|err| {
                error!(%buyer_id, db_error = ?err, "checkout: failed to create free order");
                CheckoutError::Internal(err)
            })?;

        info!(%buyer_id, order_id = %order.id, count = items.len(), "checkout: free products claimed");

        Ok(OrderDto {
            id: order.id,
            status: OrderStatus::from_str(&order.status),
            total_price: order.total_price,
            transaction_id: order.transaction_id,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|item| OrderItemDto {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price_at_purchase: item.price_at_purchase,
                })
                .collect(),
        })
    }

    pub async fn list_orders(&self, buyer_id: Uuid) -> UseCaseResult<Vec<OrderDto>> {
        let orders = self
            .order_repo
            .list_by_buyer(buyer_id)
            .await
            .map_err(|err| {
                error!(%buyer_id, db_error = ?err, "checkout: failed to list orders");
                CheckoutError::Internal(err)
            })?;

        Ok(orders
            .into_iter()
            .map(|(order, items)| OrderDto::from_entities(order, items))
            .collect())
    }

    /// Server-side lookup of the cart. Prices sent by the client are never used.
    async fn load_sellable(&self, buyer_id: Uuid, product_ids: Vec<Uuid>) -> UseCaseResult<Vec<ProductEntity>> {
        let mut seen = HashSet::new();
        let product_ids: Vec<Uuid> = product_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        if product_ids.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let products = self
            .product_repo
            .find_by_ids(product_ids.clone())
            .await
            .map_err(|err| {
                error!(%buyer_id, db_error = ?err, "checkout: failed to load products");
                CheckoutError::Internal(err)
            })?;

        product_ids
            .into_iter()
            .map(|id| {
                products
                    .iter()
                    .find(|product| {
                        product.id == id && ProductStatus::from_str(&product.status) == ProductStatus::Approved
                    })
                    .cloned()
                    .ok_or(CheckoutError::ProductUnavailable(id))
            })
            .collect()
    }
}
