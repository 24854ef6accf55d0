use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::products;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = products)]
pub struct ProductEntity {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_type: String,
    pub status: String,
    pub visibility: String,
    pub tags: Vec<String>,
    pub bpm: Option<i32>,
    pub musical_key: Option<String>,
    pub image_url: Option<String>,
    pub mp3_url: Option<String>,
    pub wav_url: Option<String>, // bare path in the secure bucket, not a URL
    pub stems_url: Option<String>, // bare path in the secure bucket, not a URL
    pub price_basic: f64,
    pub price_premium: Option<f64>,
    pub price_stems: Option<f64>,
    pub price_exclusive: Option<f64>,
    pub licenses: serde_json::Value,
    pub is_free: bool,
    pub discount_amount: Option<f64>,
    pub discount_type: Option<String>,
    pub play_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub struct InsertProductEntity {
    pub producer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_type: String,
    pub status: String,
    pub visibility: String,
    pub tags: Vec<String>,
    pub bpm: Option<i32>,
    pub musical_key: Option<String>,
    pub image_url: Option<String>,
    pub mp3_url: Option<String>,
    pub wav_url: Option<String>,
    pub stems_url: Option<String>,
    pub price_basic: f64,
    pub price_premium: Option<f64>,
    pub price_stems: Option<f64>,
    pub price_exclusive: Option<f64>,
    pub licenses: serde_json::Value,
    pub is_free: bool,
    pub discount_amount: Option<f64>,
    pub discount_type: Option<String>,
}

/// Full overwrite of the editable columns; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = products, treat_none_as_null = true)]
pub struct UpdateProductEntity {
    pub name: String,
    pub description: Option<String>,
    pub product_type: String,
    pub status: String,
    pub visibility: String,
    pub tags: Vec<String>,
    pub bpm: Option<i32>,
    pub musical_key: Option<String>,
    pub image_url: Option<String>,
    pub mp3_url: Option<String>,
    pub wav_url: Option<String>,
    pub stems_url: Option<String>,
    pub price_basic: f64,
    pub price_premium: Option<f64>,
    pub price_stems: Option<f64>,
    pub price_exclusive: Option<f64>,
    pub licenses: serde_json::Value,
    pub is_free: bool,
    pub discount_amount: Option<f64>,
    pub discount_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}
