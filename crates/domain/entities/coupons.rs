use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::coupons;

/// Exactly one of `discount_percent` and `discount_amount` is set.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = coupons)]
pub struct CouponEntity {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub code: String,
    pub discount_percent: Option<i32>,
    pub discount_amount: Option<f64>,
    pub scope: String,
    pub target_id: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub min_purchase: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = coupons)]
pub struct InsertCouponEntity {
    pub producer_id: Uuid,
    pub code: String,
    pub discount_percent: Option<i32>,
    pub discount_amount: Option<f64>,
    pub scope: String,
    pub target_id: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub min_purchase: f64,
}
