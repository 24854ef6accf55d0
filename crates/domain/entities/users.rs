use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::users;

/// Profile row. The id is the Supabase Auth user id.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub plan: String,
    pub onboarding_completed: bool,
    pub welcome_claimed: bool,
    pub last_spin_month: Option<String>, // YYYY-MM
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Producer fields embedded in catalog rows.
#[derive(Debug, Clone, Selectable, Queryable, PartialEq)]
#[diesel(table_name = users)]
pub struct ProducerSnippetEntity {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct CompleteProfileEntity {
    pub nickname: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub onboarding_completed: bool,
    pub updated_at: DateTime<Utc>,
}
