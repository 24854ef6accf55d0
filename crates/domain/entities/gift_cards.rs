use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::gift_cards;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = gift_cards)]
pub struct GiftCardEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub card_type: String,
    pub label: String,
    pub value: f64,
    pub is_discount: bool, // true: percent off, false: account credit
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = gift_cards)]
pub struct InsertGiftCardEntity {
    pub owner_id: Uuid,
    pub card_type: String,
    pub label: String,
    pub value: f64,
    pub is_discount: bool,
}
