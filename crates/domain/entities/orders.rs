use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{order_items, orders};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub transaction_id: Option<String>,
    pub status: String,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
    pub buyer_id: Uuid,
    pub status: String,
    pub total_price: f64,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Associations, PartialEq)]
#[diesel(belongs_to(OrderEntity, foreign_key = order_id))]
#[diesel(table_name = order_items)]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub struct InsertOrderItemEntity {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: f64,
}
