use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::orders::{OrderEntity, OrderItemEntity},
    value_objects::{checkout::NewOrder, enums::order_statuses::OrderStatus},
};

#[async_trait]
#[automock]
pub trait OrderRepository {
    /// Writes the order and its items in one transaction.
    async fn create_with_items(&self, order: NewOrder) -> Result<OrderEntity>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderEntity>>;

    async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<(OrderEntity, Vec<OrderItemEntity>)>>;

    /// Moves the order only if it is still in `from`. Returns whether a row changed.
    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        transaction_id: Option<String>,
    ) -> Result<bool>;
}
