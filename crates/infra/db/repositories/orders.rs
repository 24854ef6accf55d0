use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{order_items, orders},
    },
};
use domain::{
    entities::orders::{OrderEntity, OrderItemEntity},
    repositories::orders::OrderRepository,
    value_objects::{checkout::NewOrder, enums::order_statuses::OrderStatus},
};

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn create_with_items(&self, order: NewOrder) -> Result<OrderEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<OrderEntity> {
            let mut conn = db_pool.get()?;

            let created = conn.transaction::<OrderEntity, diesel::result::Error, _>(|tx| {
                let created = insert_into(orders::table)
                    .values(&order.to_entity())
                    .returning(OrderEntity::as_returning())
                    .get_result::<OrderEntity>(tx)?;

                let items = order.item_entities(created.id);
                if !items.is_empty() {
                    insert_into(order_items::table).values(&items).execute(tx)?;
                }

                Ok(created)
            })?;

            Ok(created)
        })
        .await??)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<OrderEntity>> {
            let mut conn = db_pool.get()?;

            let result = orders::table
                .filter(orders::id.eq(order_id))
                .select(OrderEntity::as_select())
                .first::<OrderEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<(OrderEntity, Vec<OrderItemEntity>)>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<(OrderEntity, Vec<OrderItemEntity>)>> {
            let mut conn = db_pool.get()?;

            let buyer_orders = orders::table
                .filter(orders::buyer_id.eq(buyer_id))
                .order(orders::created_at.desc())
                .select(OrderEntity::as_select())
                .load::<OrderEntity>(&mut conn)?;

            let items = OrderItemEntity::belonging_to(&buyer_orders)
                .select(OrderItemEntity::as_select())
                .load::<OrderItemEntity>(&mut conn)?
                .grouped_by(&buyer_orders);

            Ok(buyer_orders.into_iter().zip(items).collect())
        })
        .await??)
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        transaction_id: Option<String>,
    ) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let target = orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(from.to_string()));

            let updated = match transaction_id {
                Some(transaction_id) => update(target)
                    .set((
                        orders::status.eq(to.to_string()),
                        orders::transaction_id.eq(Some(transaction_id)),
                        orders::updated_at.eq(now),
                    ))
                    .execute(&mut conn)?,
                None => update(target)
                    .set((orders::status.eq(to.to_string()), orders::updated_at.eq(now)))
                    .execute(&mut conn)?,
            };

            Ok(updated == 1)
        })
        .await??)
    }
}
