use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::upload_intent_statuses::UploadIntentStatus, storage::StoredObject,
    },
    infra::db::postgres::schema::upload_intents,
};

/// Objects written during one product save. Intents left `pending` belong to
/// saves that never reached the product write and are swept by the worker.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable, PartialEq)]
#[diesel(table_name = upload_intents)]
pub struct UploadIntentEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub product_id: Option<Uuid>,
    pub objects: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UploadIntentEntity {
    pub fn stored_objects(&self) -> Vec<StoredObject> {
        serde_json::from_value(self.objects.clone()).unwrap_or_default()
    }

    pub fn intent_status(&self) -> UploadIntentStatus {
        UploadIntentStatus::from_str(&self.status)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = upload_intents)]
pub struct InsertUploadIntentEntity {
    pub owner_id: Uuid,
    pub product_id: Option<Uuid>,
    pub objects: serde_json::Value,
    pub status: String,
}
