use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Completed,
    Rejected,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Completed => "completed",
            OrderStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl OrderStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "approved" => OrderStatus::Approved,
            "completed" => OrderStatus::Completed,
            "rejected" => OrderStatus::Rejected,
            _ => OrderStatus::Pending,
        }
    }

    /// Maps a Mercado Pago payment status onto the order lifecycle.
    pub fn from_payment_status(value: &str) -> Self {
        match value {
            "approved" => OrderStatus::Approved,
            "rejected" | "cancelled" | "refunded" | "charged_back" => OrderStatus::Rejected,
            _ => OrderStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Only pending orders move; replays of a terminal status are no-ops.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == OrderStatus::Pending && next != OrderStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_statuses_map_onto_order_statuses() {
        assert_eq!(OrderStatus::from_payment_status("approved"), OrderStatus::Approved);
        assert_eq!(OrderStatus::from_payment_status("cancelled"), OrderStatus::Rejected);
        assert_eq!(OrderStatus::from_payment_status("in_process"), OrderStatus::Pending);
    }

    #[test]
    fn terminal_orders_do_not_transition() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Approved));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Approved.can_transition_to(OrderStatus::Rejected));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Approved));
    }
}
