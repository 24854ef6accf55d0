use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::reels;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = reels)]
pub struct ReelEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub video_url: String,
    pub product_id: Option<Uuid>,
    pub title: Option<String>,
    pub trim_start: f64,
    pub trim_end: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = reels)]
pub struct InsertReelEntity {
    pub owner_id: Uuid,
    pub video_url: String,
    pub product_id: Option<Uuid>,
    pub title: Option<String>,
    pub trim_start: f64,
    pub trim_end: f64,
}

#[derive(Debug, Clone, AsChangeset, PartialEq)]
#[diesel(table_name = reels, treat_none_as_null = true)]
pub struct UpdateReelEntity {
    pub product_id: Option<Uuid>,
    pub title: Option<String>,
    pub trim_start: f64,
    pub trim_end: f64,
    pub updated_at: DateTime<Utc>,
}
