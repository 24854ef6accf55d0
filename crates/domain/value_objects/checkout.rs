use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::orders::{InsertOrderEntity, InsertOrderItemEntity, OrderEntity, OrderItemEntity},
    value_objects::enums::order_statuses::OrderStatus,
};

pub const DEFAULT_USD_TO_COP_RATE: f64 = 4200.0;
pub const DEFAULT_MIN_UNIT_PRICE_COP: i64 = 500;
pub const USD_TO_PEN_RATE: f64 = 3.75;

/// Mercado Pago charges in whole COP with a minimum unit price.
pub fn usd_to_cop(usd: f64, rate: f64, min_unit_price: i64) -> i64 {
    let cop = (usd * rate).round() as i64;
    cop.max(min_unit_price)
}

/// Display-only conversion, never persisted.
pub fn usd_to_pen(usd: f64) -> f64 {
    (usd * USD_TO_PEN_RATE * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

/// An order about to be written. The total is always computed from the items.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    buyer_id: Uuid,
    status: OrderStatus,
    items: Vec<NewOrderItem>,
    total_price: f64,
}

impl NewOrder {
    pub fn new(buyer_id: Uuid, status: OrderStatus, items: Vec<NewOrderItem>) -> Self {
        let total: f64 = items
            .iter()
            .map(|item| item.price_at_purchase * f64::from(item.quantity))
            .sum();

        Self {
            buyer_id,
            status,
            items,
            total_price: (total * 100.0).round() / 100.0,
        }
    }

    pub fn buyer_id(&self) -> Uuid {
        self.buyer_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[NewOrderItem] {
        &self.items
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn to_entity(&self) -> InsertOrderEntity {
        InsertOrderEntity {
            buyer_id: self.buyer_id,
            status: self.status.to_string(),
            total_price: self.total_price,
            transaction_id: None,
        }
    }

    pub fn item_entities(&self, order_id: Uuid) -> Vec<InsertOrderItemEntity> {
        self.items
            .iter()
            .map(|item| InsertOrderItemEntity {
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceDto {
    pub preference_id: String,
    pub init_point: String,
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderItemDto {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

impl From<OrderItemEntity> for OrderItemDto {
    fn from(value: OrderItemEntity) -> Self {
        Self {
            product_id: value.product_id,
            quantity: value.quantity,
            price_at_purchase: value.price_at_purchase,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderDto {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total_price: f64,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemDto>,
}

impl OrderDto {
    pub fn from_entities(order: OrderEntity, items: Vec<OrderItemEntity>) -> Self {
        Self {
            id: order.id,
            status: OrderStatus::from_str(&order.status),
            total_price: order.total_price,
            transaction_id: order.transaction_id,
            created_at: order.created_at,
            items: items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}

/// Body of a Mercado Pago webhook notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentNotification {
    #[serde(rename = "type")]
    pub topic: Option<String>,
    pub action: Option<String>,
    pub data: Option<PaymentNotificationData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotificationData {
    pub id: serde_json::Value,
}

impl PaymentNotification {
    /// `data.id` as a string; Mercado Pago sends it either as a number or a string.
    pub fn data_id(&self) -> Option<String> {
        match &self.data.as_ref()?.id {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cop_prices_are_rounded_with_a_floor() {
        assert_eq!(usd_to_cop(24.99, DEFAULT_USD_TO_COP_RATE, DEFAULT_MIN_UNIT_PRICE_COP), 104958);
        assert_eq!(usd_to_cop(0.05, DEFAULT_USD_TO_COP_RATE, DEFAULT_MIN_UNIT_PRICE_COP), 500);
        assert_eq!(usd_to_cop(0.0, DEFAULT_USD_TO_COP_RATE, DEFAULT_MIN_UNIT_PRICE_COP), 500);
    }

    #[test]
    fn pen_display_price() {
        assert_eq!(usd_to_pen(10.0), 37.5);
        assert_eq!(usd_to_pen(24.99), 93.71);
    }

    #[test]
    fn order_total_is_the_sum_of_its_items() {
        let order = NewOrder::new(
            Uuid::new_v4(),
            OrderStatus::Pending,
            vec![
                NewOrderItem {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                    price_at_purchase: 24.99,
                },
                NewOrderItem {
                    product_id: Uuid::new_v4(),
                    quantity: 2,
                    price_at_purchase: 10.0,
                },
            ],
        );

        assert_eq!(order.total_price(), 44.99);
        assert_eq!(order.to_entity().total_price, 44.99);
        assert_eq!(order.item_entities(Uuid::new_v4()).len(), 2);
    }

    #[test]
    fn notification_ids_accept_numbers_and_strings() {
        let numeric: PaymentNotification =
            serde_json::from_str(r#"{"type":"payment","data":{"id":123456}}"#).unwrap();
        let text: PaymentNotification =
            serde_json::from_str(r#"{"type":"payment","data":{"id":"123456"}}"#).unwrap();

        assert_eq!(numeric.data_id().as_deref(), Some("123456"));
        assert_eq!(text.data_id().as_deref(), Some("123456"));
        assert_eq!(numeric.topic.as_deref(), Some("payment"));
    }
}
